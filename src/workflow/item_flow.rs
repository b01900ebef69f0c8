//! 单个文件处理流程 - 流程层
//!
//! 核心职责：定义"一个文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 上传（Uploading，上报进度）
//! 2. 等待后端处理（Processing，按固定间隔轮询）
//! 3. 解析结果 → Completed / Failed
//!
//! 任何错误都只影响当前文件，以 `ItemOutcome::Failed` 返回，不会向上传播。

use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{ProgressFn, UploadProgress};
use crate::error::{AppResult, RemoteJobError};
use crate::models::{ItemStatus, MediaFile, ProcessingOptions, TaskResult};
use crate::services::{QueueObserver, StatusPoller, SubmissionClient};
use crate::workflow::item_ctx::ItemCtx;

/// 单个文件的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Completed(TaskResult),
    /// 失败原因（展示给用户的文字）
    Failed(String),
}

impl ItemOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Completed(_))
    }
}

/// 单个文件处理流程
///
/// - 决定何时上传、何时轮询、如何解释结果
/// - 不持有队列，状态变化通过回调交给调用方写回
pub struct ItemFlow {
    submission: SubmissionClient,
    poller: StatusPoller,
    observer: Arc<dyn QueueObserver>,
}

impl ItemFlow {
    pub fn new(
        submission: SubmissionClient,
        poller: StatusPoller,
        observer: Arc<dyn QueueObserver>,
    ) -> Self {
        Self {
            submission,
            poller,
            observer,
        }
    }

    /// 处理一个文件
    ///
    /// `on_status` 在进入 Uploading / Processing 时被调用，先于观察者通知
    pub async fn run<F>(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        ctx: &ItemCtx,
        mut on_status: F,
    ) -> ItemOutcome
    where
        F: FnMut(ItemStatus) + Send,
    {
        match self.execute(file, options, ctx, &mut on_status).await {
            Ok(result) => {
                info!("{} ✓ 处理完成", ctx);
                ItemOutcome::Completed(result)
            }
            Err(e) => {
                debug!("{} 处理失败: {:?}", ctx, e);
                ItemOutcome::Failed(e.user_message())
            }
        }
    }

    async fn execute<F>(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        ctx: &ItemCtx,
        on_status: &mut F,
    ) -> AppResult<TaskResult>
    where
        F: FnMut(ItemStatus) + Send,
    {
        // ========== 1. 上传 ==========
        self.enter(ctx, ItemStatus::Uploading, on_status);
        let status_url = self
            .submission
            .submit(file, options, self.progress_reporter(ctx))
            .await?;

        // ========== 2. 等待处理 ==========
        self.enter(ctx, ItemStatus::Processing, on_status);
        let response = self.poller.wait_for_completion(&status_url).await?;

        // ========== 3. 解析结果 ==========
        let result = response
            .task_result()
            .map_err(|e| RemoteJobError::MalformedResult {
                detail: e.to_string(),
            })?;

        Ok(result)
    }

    fn enter<F>(&self, ctx: &ItemCtx, status: ItemStatus, on_status: &mut F)
    where
        F: FnMut(ItemStatus) + Send,
    {
        on_status(status);
        self.observer.on_status(ctx, status);
    }

    fn progress_reporter(&self, ctx: &ItemCtx) -> ProgressFn {
        let observer = self.observer.clone();
        let ctx = ctx.clone();
        Arc::new(move |progress: UploadProgress| observer.on_upload_progress(&ctx, progress))
    }
}
