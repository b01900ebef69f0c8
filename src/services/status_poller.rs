//! 状态轮询服务 - 业务能力层
//!
//! 上传流程和历史记录监视器共用同一个轮询实现，差异由 `PollPolicy` 表达：
//!
//! | 策略 | 间隔 | 404 | 其他错误 |
//! |------|------|-----|----------|
//! | `upload` | 2.5s | 失败 | 失败 |
//! | `watcher` | 3s | 静默停止 | 记录后继续 |
//!
//! 首次请求在一个间隔之后发出；非终态（PENDING / QUEUED / PROCESSING 以及未知状态）
//! 按固定间隔继续轮询，无退避。

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::clients::ProcessingBackend;
use crate::config::Config;
use crate::error::{AppResult, RemoteJobError, ServerError};
use crate::models::{TaskStatus, TaskStatusResponse};

/// 后端没有给出失败原因时的提示
pub const UNKNOWN_FAILURE_MESSAGE: &str = "未知的执行错误。";

/// 收到 HTTP 404 时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// 作为错误返回
    Fail,
    /// 任务已不存在，停止轮询但不算失败
    StopSilently,
}

/// 其他传输 / HTTP 错误的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// 停止轮询并返回错误
    Fail,
    /// 记录警告后在下一个间隔重试
    LogAndContinue,
}

/// 轮询策略
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    /// 最长等待时间，`None` 表示不限制
    pub deadline: Option<Duration>,
    pub not_found: NotFoundPolicy,
    pub on_error: ErrorPolicy,
}

impl PollPolicy {
    /// 上传流程：任何错误都让当前文件失败
    pub fn upload(config: &Config) -> Self {
        Self {
            interval: config.upload_poll_interval(),
            deadline: config.poll_deadline(),
            not_found: NotFoundPolicy::Fail,
            on_error: ErrorPolicy::Fail,
        }
    }

    /// 历史记录监视器：404 视为任务消失，其他错误不影响继续轮询
    pub fn watcher(config: &Config) -> Self {
        Self {
            interval: config.watch_poll_interval(),
            deadline: config.poll_deadline(),
            not_found: NotFoundPolicy::StopSilently,
            on_error: ErrorPolicy::LogAndContinue,
        }
    }
}

/// 轮询结果
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// 到达终态（COMPLETED / FAILED）
    Terminal(TaskStatusResponse),
    /// 任务已不存在（仅 `NotFoundPolicy::StopSilently`）
    Vanished,
}

/// 状态轮询器
pub struct StatusPoller {
    backend: Arc<dyn ProcessingBackend>,
    policy: PollPolicy,
}

impl StatusPoller {
    pub fn new(backend: Arc<dyn ProcessingBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// 轮询直到终态、任务消失、出错或超时
    pub async fn poll(&self, status_url: &str) -> AppResult<PollOutcome> {
        let started = Instant::now();
        let period = self.policy.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(started + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts = 0u32;
        loop {
            ticker.tick().await;
            attempts += 1;

            match self.backend.fetch_status(status_url).await {
                Ok(response) if response.status.is_terminal() => {
                    debug!("{} 第 {} 次查询到达终态 {:?}", status_url, attempts, response.status);
                    return Ok(PollOutcome::Terminal(response));
                }
                Ok(response) => {
                    debug!("{} 第 {} 次查询: {:?}", status_url, attempts, response.status);
                }
                Err(e)
                    if e.http_status() == Some(404)
                        && self.policy.not_found == NotFoundPolicy::StopSilently =>
                {
                    debug!("{} 返回 404，停止轮询", status_url);
                    return Ok(PollOutcome::Vanished);
                }
                Err(e) => match self.policy.on_error {
                    ErrorPolicy::Fail => return Err(e),
                    ErrorPolicy::LogAndContinue => {
                        warn!("查询任务状态失败 ({}): {}", status_url, e);
                    }
                },
            }

            if let Some(deadline) = self.policy.deadline {
                let waited = started.elapsed();
                if waited >= deadline {
                    return Err(RemoteJobError::DeadlineExceeded {
                        status_url: status_url.to_string(),
                        waited,
                    }
                    .into());
                }
            }
        }
    }

    /// 等待任务完成：COMPLETED 返回完整响应，FAILED 返回后端给出的错误
    pub async fn wait_for_completion(&self, status_url: &str) -> AppResult<TaskStatusResponse> {
        match self.poll(status_url).await? {
            PollOutcome::Terminal(response) if response.status == TaskStatus::Completed => {
                Ok(response)
            }
            PollOutcome::Terminal(response) => Err(RemoteJobError::Failed {
                message: response
                    .failure_message()
                    .unwrap_or_else(|| UNKNOWN_FAILURE_MESSAGE.to_string()),
            }
            .into()),
            PollOutcome::Vanished => Err(ServerError::HttpStatus { status: 404 }.into()),
        }
    }
}
