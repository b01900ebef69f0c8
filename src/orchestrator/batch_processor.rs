//! 批量音频处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源创建和各个命令的调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建处理后端客户端
//! 2. **批量处理**：加载文件 → 校验入队 → 逐个上传处理 → 统计
//! 3. **中断保护**：运行期间第一次 Ctrl-C 只提示有文件正在处理，第二次才退出
//! 4. **历史记录**：监视处理中的任务，按文件名和状态筛选
//! 5. **批量操作**：删除和下载已处理的文件
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文件的细节
//! - **资源所有者**：唯一创建 `ProcessingBackend` 的模块
//! - **向下委托**：委托 `QueueRunner` 处理整个队列

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use crate::clients::{HttpBackend, ProcessingBackend};
use crate::config::Config;
use crate::models::{self, DeleteReport, OptionsForm, ProcessingOptions};
use crate::orchestrator::queue_runner::{QueueRunner, RunSummary};
use crate::orchestrator::queue_store::QueueStore;
use crate::services::status_poller::PollPolicy;
use crate::services::{
    BulkService, ConsoleRenderer, HistoryEntry, HistoryFilter, HistoryWatcher, QueueObserver,
    StatusPoller, SubmissionClient, Validator, WatchOutcome,
};
use crate::utils::logging::{init_log_file, log_files_loaded, log_startup, print_final_stats};
use crate::workflow::ItemFlow;

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<dyn ProcessingBackend>,
    observer: Arc<dyn QueueObserver>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config.base_url, config.upload_poll_interval_ms);

        let backend = Arc::new(HttpBackend::new(&config)?);

        Ok(Self::with_backend(
            config,
            backend,
            Arc::new(ConsoleRenderer::new()),
        ))
    }

    /// 使用指定的后端和观察者创建应用
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn ProcessingBackend>,
        observer: Arc<dyn QueueObserver>,
    ) -> Self {
        Self {
            config,
            backend,
            observer,
        }
    }

    /// 上传并处理一批文件
    ///
    /// # 参数
    /// - `paths`: 文件或文件夹
    /// - `options_file`: 处理选项 TOML，缺省时使用默认选项
    /// - `cover_art`: 封面图，附加到每个文件
    pub async fn process(
        &self,
        paths: &[PathBuf],
        options_file: Option<&Path>,
        cover_art: Option<&Path>,
    ) -> Result<RunSummary> {
        let options = self.load_options(options_file).await?;

        let cover_art = match cover_art {
            Some(path) => Some(Arc::new(models::load_media_file(path).await?)),
            None => None,
        };

        info!("\n📁 正在加载待处理的文件...");
        let files = models::load_media_files(paths).await?;
        let candidates = files.len();

        let mut store = QueueStore::new();
        let validator = Validator::new(&self.config, self.observer.clone());
        let admitted = store.admit(files, &validator)?;
        for item in store.items() {
            self.observer.on_admitted(item.file().name(), item.file().size());
        }
        log_files_loaded(admitted, candidates);

        if !store.summary().can_submit() {
            warn!("⚠️ 没有可处理的文件，程序结束");
            return Ok(RunSummary::default());
        }

        let runner = self.queue_runner(cover_art);
        let progress = store.subscribe();
        let summary = tokio::select! {
            result = runner.run(&mut store, options) => result?,
            _ = interrupt_guard() => {
                let queue = *progress.borrow();
                error!(
                    "⛔ 用户中断，{} 个文件尚未完成",
                    queue.total - queue.completed - queue.failed
                );
                return Err(anyhow!("处理被用户中断"));
            }
        };

        print_final_stats(
            summary.succeeded,
            summary.failed,
            summary.total,
            &self.config.output_log_file,
        );

        Ok(summary)
    }

    /// 监视处理中的任务，返回按 `filter` 筛选后的记录
    pub async fn watch(
        &self,
        entries: Vec<HistoryEntry>,
        filter: &HistoryFilter,
    ) -> Vec<HistoryEntry> {
        let watcher = HistoryWatcher::new(self.backend.clone(), &self.config);
        let outcomes = watcher.watch(entries).await;

        // 已消失的任务保留最后一次的状态
        let entries: Vec<HistoryEntry> = outcomes
            .iter()
            .map(WatchOutcome::entry)
            .cloned()
            .collect();

        let shown: Vec<HistoryEntry> = filter.apply(&entries).into_iter().cloned().collect();
        info!("📜 历史记录: 显示 {} / {} 条", shown.len(), entries.len());
        for entry in &shown {
            info!(
                "  {} | {} | {:?} | {}",
                entry.task_id,
                entry.file_name,
                entry.status,
                entry.processed_file_url.as_deref().unwrap_or("-")
            );
        }
        shown
    }

    /// 批量删除
    pub async fn delete(&self, ids: &[String]) -> Result<DeleteReport> {
        Ok(BulkService::new(self.backend.clone()).delete_files(ids).await?)
    }

    /// 批量下载到 `dir`
    pub async fn download(&self, ids: &[String], dir: &Path) -> Result<Option<PathBuf>> {
        Ok(BulkService::new(self.backend.clone())
            .download_multiple(ids, dir)
            .await?)
    }

    async fn load_options(&self, options_file: Option<&Path>) -> Result<ProcessingOptions> {
        let form = match options_file {
            Some(path) => models::load_options_form(path).await?,
            None => OptionsForm::default(),
        };
        let options = ProcessingOptions::from_form(&form);
        info!(
            "🎛️ 处理选项: 格式 {} | 目标响度 {:?}",
            options.format,
            options.effective_target_lufs()
        );
        Ok(options)
    }

    fn queue_runner(&self, cover_art: Option<Arc<models::MediaFile>>) -> QueueRunner {
        let flow = ItemFlow::new(
            SubmissionClient::new(self.backend.clone(), cover_art),
            StatusPoller::new(self.backend.clone(), PollPolicy::upload(&self.config)),
            self.observer.clone(),
        );
        QueueRunner::new(flow, self.observer.clone())
    }
}

/// 运行期间的 Ctrl-C 保护：第一次只警告，第二次返回
async fn interrupt_guard() {
    if signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    warn!("⚠️ 仍有文件正在处理，再次按 Ctrl-C 将放弃剩余文件");

    if signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
