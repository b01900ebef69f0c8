//! 队列中的单个文件

use std::fmt;
use std::sync::Arc;

use crate::models::{MediaFile, TaskResult};

/// 队列项状态
///
/// 只允许沿 `Waiting → Uploading → Processing → {Completed | Failed}` 前进（可跳过中间状态），
/// `Completed` / `Failed` 为终态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Waiting,
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl ItemStatus {
    fn rank(self) -> u8 {
        match self {
            ItemStatus::Waiting => 0,
            ItemStatus::Uploading => 1,
            ItemStatus::Processing => 2,
            ItemStatus::Completed | ItemStatus::Failed => 3,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Failed)
    }

    /// 是否正在上传或处理
    pub fn is_in_flight(self) -> bool {
        matches!(self, ItemStatus::Uploading | ItemStatus::Processing)
    }

    /// 是否允许迁移到 `next`
    pub fn can_advance_to(self, next: ItemStatus) -> bool {
        !self.is_terminal() && next.rank() > self.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Waiting => "waiting",
            ItemStatus::Uploading => "uploading",
            ItemStatus::Processing => "processing",
            ItemStatus::Completed => "completed",
            ItemStatus::Failed => "failed",
        }
    }

    /// 界面上显示的状态文字
    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Waiting => "等待中...",
            ItemStatus::Uploading => "上传中...",
            ItemStatus::Processing => "处理中...",
            ItemStatus::Completed => "已完成",
            ItemStatus::Failed => "失败",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 队列项
#[derive(Debug, Clone)]
pub struct QueueItem {
    file: Arc<MediaFile>,
    status: ItemStatus,
    result: Option<TaskResult>,
    error_message: Option<String>,
}

impl QueueItem {
    pub fn new(file: MediaFile) -> Self {
        Self {
            file: Arc::new(file),
            status: ItemStatus::Waiting,
            result: None,
            error_message: None,
        }
    }

    pub fn file(&self) -> &Arc<MediaFile> {
        &self.file
    }

    pub fn status(&self) -> ItemStatus {
        self.status
    }

    /// 仅在 `Completed` 时存在
    pub fn result(&self) -> Option<&TaskResult> {
        self.result.as_ref()
    }

    /// 仅在 `Failed` 时存在
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// 推进状态，返回迁移前的状态；非法迁移返回 `Err(当前状态)`
    pub(crate) fn advance(&mut self, next: ItemStatus) -> Result<ItemStatus, ItemStatus> {
        if !self.status.can_advance_to(next) {
            return Err(self.status);
        }
        let previous = self.status;
        self.status = next;
        Ok(previous)
    }

    pub(crate) fn complete(&mut self, result: TaskResult) -> Result<ItemStatus, ItemStatus> {
        let previous = self.advance(ItemStatus::Completed)?;
        self.result = Some(result);
        Ok(previous)
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) -> Result<ItemStatus, ItemStatus> {
        let previous = self.advance(ItemStatus::Failed)?;
        self.error_message = Some(message.into());
        Ok(previous)
    }
}
