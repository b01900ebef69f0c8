//! 结果展示 - 业务能力层
//!
//! 队列运行过程中所有面向用户的输出都经过 `QueueObserver`：
//! 校验提示、状态变化、上传进度、处理结果和错误信息。
//! 控制台实现 `ConsoleRenderer` 通过 tracing 输出。

use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{error, info, warn};

use crate::clients::UploadProgress;
use crate::models::{ItemStatus, TaskResult};
use crate::orchestrator::queue_runner::RunSummary;
use crate::utils::format::{format_duration, format_file_size, format_lufs};
use crate::utils::logging::truncate_text;
use crate::workflow::ItemCtx;

/// 队列事件的接收方
///
/// 除 `on_result` / `on_error` 外均有空的默认实现
pub trait QueueObserver: Send + Sync {
    /// 文件未通过校验
    fn on_rejected(&self, _message: &str) {}

    /// 文件被加入队列
    fn on_admitted(&self, _name: &str, _size: u64) {}

    /// 文件状态变化
    fn on_status(&self, _ctx: &ItemCtx, _status: ItemStatus) {}

    /// 上传进度变化
    fn on_upload_progress(&self, _ctx: &ItemCtx, _progress: UploadProgress) {}

    /// 处理成功
    fn on_result(&self, ctx: &ItemCtx, result: &TaskResult);

    /// 处理失败
    fn on_error(&self, ctx: &ItemCtx, message: &str);

    /// 队列进度：正在处理第 `current` 个，共 `total` 个
    fn on_queue_progress(&self, _current: usize, _total: usize) {}

    /// 整个批次处理完成
    fn on_run_finished(&self, _summary: &RunSummary) {}
}

/// 队列进度文字
pub fn queue_progress_text(current: usize, total: usize) -> String {
    format!("队列进度: {} / {}", current, total)
}

/// 批次完成后的汇总文字
pub fn run_finished_text(summary: &RunSummary) -> String {
    format!(
        "处理完成: 成功 {} / 共 {} 个文件",
        summary.succeeded, summary.total
    )
}

/// 控制台输出
///
/// 上传进度按 25% 一档输出，避免刷屏
pub struct ConsoleRenderer {
    progress_buckets: Mutex<HashMap<usize, u32>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self {
            progress_buckets: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueObserver for ConsoleRenderer {
    fn on_rejected(&self, message: &str) {
        warn!("⚠️ {}", message);
    }

    fn on_admitted(&self, name: &str, size: u64) {
        info!("➕ 加入队列: {} ({})", truncate_text(name, 60), format_file_size(size));
    }

    fn on_status(&self, ctx: &ItemCtx, status: ItemStatus) {
        info!(
            "{} {} - {}",
            ctx,
            truncate_text(&ctx.file_name, 60),
            status.label()
        );
    }

    fn on_upload_progress(&self, ctx: &ItemCtx, progress: UploadProgress) {
        let bucket = progress.percent() / 25;
        let mut buckets = match self.progress_buckets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if buckets.insert(ctx.index, bucket) != Some(bucket) {
            info!("{} 📤 上传进度 {}%", ctx, progress.percent());
        }
    }

    fn on_result(&self, ctx: &ItemCtx, result: &TaskResult) {
        info!(
            "{} ✅ {} | 时长 {} | 下载: {}",
            ctx,
            format_lufs(result.loudness_lufs),
            format_duration(result.duration_seconds),
            result.processed_file_url
        );
    }

    fn on_error(&self, ctx: &ItemCtx, message: &str) {
        error!("{} ❌ {}", ctx, message);
    }

    fn on_queue_progress(&self, current: usize, total: usize) {
        info!("\n{}", "─".repeat(60));
        info!("{}", queue_progress_text(current, total));
    }

    fn on_run_finished(&self, summary: &RunSummary) {
        info!("{}", run_finished_text(summary));
    }
}
