//! 队列运行器 - 编排层
//!
//! 按队列顺序逐个处理文件，同一时间只有一个文件在上传或处理中：
//! 第 i 个文件到达终态后才开始提交第 i+1 个。单个文件失败不会中断批次。
//!
//! 运行状态：`Idle → Running → Done`。运行期间处理选项以 `Arc` 冻结，
//! 队列成员只读。

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

use crate::error::AppResult;
use crate::models::{ItemStatus, ProcessingOptions};
use crate::orchestrator::queue_store::QueueStore;
use crate::services::QueueObserver;
use crate::workflow::{ItemCtx, ItemFlow, ItemOutcome};

/// 批次汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.succeeded, self.total)
    }
}

/// 运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Done(RunSummary),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

/// 队列运行器
pub struct QueueRunner {
    flow: ItemFlow,
    observer: Arc<dyn QueueObserver>,
    state: watch::Sender<RunState>,
}

impl QueueRunner {
    pub fn new(flow: ItemFlow, observer: Arc<dyn QueueObserver>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            flow,
            observer,
            state,
        }
    }

    /// 订阅运行状态
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// 处理队列中的所有文件
    ///
    /// 只有队列操作错误（队列已冻结、状态迁移非法）会返回 `Err`，
    /// 单个文件的上传 / 处理错误记录在该文件上
    pub async fn run(
        &self,
        store: &mut QueueStore,
        options: ProcessingOptions,
    ) -> AppResult<RunSummary> {
        if store.is_frozen() {
            return Err(crate::error::QueueError::Frozen.into());
        }

        let options = Arc::new(options);
        store.freeze();
        self.state.send_replace(RunState::Running);

        let total = store.len();
        let mut summary = RunSummary {
            total,
            ..RunSummary::default()
        };

        info!("📋 开始处理队列，共 {} 个文件", total);

        for index in 0..total {
            let file = match store.get(index) {
                Some(item) => item.file().clone(),
                None => break,
            };
            let ctx = ItemCtx::new(index, total, file.name());

            self.observer.on_queue_progress(ctx.position(), total);

            let mut transition = Ok(());
            let outcome = self
                .flow
                .run(&file, &options, &ctx, |status| {
                    if transition.is_ok() {
                        transition = store.advance(index, status);
                    }
                })
                .await;
            transition?;

            match outcome {
                ItemOutcome::Completed(result) => {
                    store.complete(index, result.clone())?;
                    summary.succeeded += 1;
                    self.observer.on_status(&ctx, ItemStatus::Completed);
                    self.observer.on_result(&ctx, &result);
                }
                ItemOutcome::Failed(message) => {
                    store.fail(index, &message)?;
                    summary.failed += 1;
                    self.observer.on_status(&ctx, ItemStatus::Failed);
                    self.observer.on_error(&ctx, &message);
                }
            }
        }

        self.state.send_replace(RunState::Done(summary));
        self.observer.on_run_finished(&summary);

        Ok(summary)
    }
}
