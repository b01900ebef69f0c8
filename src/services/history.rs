//! 历史记录监视 - 业务能力层
//!
//! 页面刷新后仍在处理中的任务由监视器被动轮询。每个任务独立轮询，
//! 互不阻塞；任务消失（404）只停止该任务的轮询。

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::ProcessingBackend;
use crate::config::Config;
use crate::models::TaskStatus;
use crate::services::status_poller::{PollOutcome, PollPolicy, StatusPoller};

/// 状态查询地址前缀
pub const TASK_STATUS_PATH: &str = "/audio/task-status";

/// 一条历史记录
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub task_id: String,
    pub file_name: String,
    pub status: TaskStatus,
    pub status_url: Option<String>,
    pub processed_file_url: Option<String>,
}

impl HistoryEntry {
    /// 仍在处理中的任务
    pub fn pending(task_id: impl Into<String>, file_name: impl Into<String>) -> Self {
        let task_id = task_id.into();
        Self {
            status_url: Some(format!("{}/{}", TASK_STATUS_PATH, task_id)),
            task_id,
            file_name: file_name.into(),
            status: TaskStatus::Processing,
            processed_file_url: None,
        }
    }
}

/// 状态筛选
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    Processing,
    Failed,
}

impl StatusFilter {
    pub fn matches(self, status: TaskStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => status == TaskStatus::Completed,
            StatusFilter::Processing => status.is_pending(),
            StatusFilter::Failed => status == TaskStatus::Failed,
        }
    }
}

/// 历史记录筛选条件：文件名（不区分大小写）+ 状态
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub search: String,
    pub status: StatusFilter,
}

impl HistoryFilter {
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        let search = self.search.to_lowercase();
        entry.file_name.to_lowercase().contains(&search) && self.status.matches(entry.status)
    }

    pub fn apply<'a>(&self, entries: &'a [HistoryEntry]) -> Vec<&'a HistoryEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// 单条记录的监视结果
#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    /// 已到达终态，记录已更新
    Settled(HistoryEntry),
    /// 任务已不存在
    Vanished(HistoryEntry),
    /// 无需轮询（已是终态或没有状态地址）
    Skipped(HistoryEntry),
    /// 轮询中断（例如超时）
    Abandoned(HistoryEntry),
}

impl WatchOutcome {
    pub fn entry(&self) -> &HistoryEntry {
        match self {
            WatchOutcome::Settled(e)
            | WatchOutcome::Vanished(e)
            | WatchOutcome::Skipped(e)
            | WatchOutcome::Abandoned(e) => e,
        }
    }
}

/// 历史记录监视器
pub struct HistoryWatcher {
    poller: Arc<StatusPoller>,
}

impl HistoryWatcher {
    pub fn new(backend: Arc<dyn ProcessingBackend>, config: &Config) -> Self {
        Self::with_policy(backend, PollPolicy::watcher(config))
    }

    pub fn with_policy(backend: Arc<dyn ProcessingBackend>, policy: PollPolicy) -> Self {
        Self {
            poller: Arc::new(StatusPoller::new(backend, policy)),
        }
    }

    /// 并发监视所有处理中的记录，结果顺序与输入一致
    pub async fn watch(&self, entries: Vec<HistoryEntry>) -> Vec<WatchOutcome> {
        info!("👀 监视 {} 条历史记录", entries.len());
        join_all(entries.into_iter().map(|entry| self.watch_one(entry))).await
    }

    async fn watch_one(&self, mut entry: HistoryEntry) -> WatchOutcome {
        let status_url = match (&entry.status_url, entry.status.is_pending()) {
            (Some(url), true) => url.clone(),
            _ => return WatchOutcome::Skipped(entry),
        };

        match self.poller.poll(&status_url).await {
            Ok(PollOutcome::Terminal(response)) => {
                entry.status = response.status;
                if response.status == TaskStatus::Completed {
                    match response.task_result() {
                        Ok(result) => entry.processed_file_url = Some(result.processed_file_url),
                        Err(e) => warn!("任务 {} 的结果无法解析: {}", entry.task_id, e),
                    }
                }
                info!("任务 {} ({}) → {:?}", entry.task_id, entry.file_name, entry.status);
                WatchOutcome::Settled(entry)
            }
            Ok(PollOutcome::Vanished) => {
                info!("任务 {} 已不存在，停止监视", entry.task_id);
                WatchOutcome::Vanished(entry)
            }
            Err(e) => {
                warn!("任务 {} 监视中断: {}", entry.task_id, e);
                WatchOutcome::Abandoned(entry)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, status: TaskStatus) -> HistoryEntry {
        HistoryEntry {
            status,
            ..HistoryEntry::pending("1", name)
        }
    }

    #[test]
    fn test_pending_entry_status_url() {
        let entry = HistoryEntry::pending("42", "a.wav");
        assert_eq!(entry.status_url.as_deref(), Some("/audio/task-status/42"));
        assert_eq!(entry.status, TaskStatus::Processing);
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let filter = HistoryFilter {
            search: "MIX".to_string(),
            status: StatusFilter::All,
        };
        assert!(filter.matches(&entry("final_mix.wav", TaskStatus::Completed)));
        assert!(!filter.matches(&entry("master.wav", TaskStatus::Completed)));
    }

    #[test]
    fn test_processing_filter_covers_all_pending_states() {
        let filter = HistoryFilter {
            search: String::new(),
            status: StatusFilter::Processing,
        };
        let entries = vec![
            entry("a.wav", TaskStatus::Pending),
            entry("b.wav", TaskStatus::Queued),
            entry("c.wav", TaskStatus::Processing),
            entry("d.wav", TaskStatus::Completed),
            entry("e.wav", TaskStatus::Failed),
        ];
        let names: Vec<_> = filter.apply(&entries).iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);
    }
}
