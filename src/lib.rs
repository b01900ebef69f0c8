//! # Wavebulk
//!
//! 一个用于批量上传音频并等待后端处理完成的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与处理后端的全部 HTTP 交互
//! - `ProcessingBackend` - 上传 / 状态查询 / 批量删除 / 批量下载能力
//! - `HttpBackend` - 基于 reqwest 的实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件或单个任务
//! - `Validator` - 判断文件能否加入队列
//! - `SubmissionClient` - 上传一个文件并拿到状态地址
//! - `StatusPoller` - 轮询任务直到终态
//! - `QueueObserver` - 结果展示
//! - `HistoryWatcher` / `BulkService` - 历史记录与批量操作
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `ItemCtx` - 上下文封装（队列位置 + 文件名）
//! - `ItemFlow` - 流程编排（upload → poll → result）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/queue_store` - 队列存储
//! - `orchestrator/queue_runner` - 逐个处理队列
//! - `orchestrator/batch_processor` - 应用入口，管理资源和命令
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{HttpBackend, ProcessingBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ItemStatus, MediaFile, ProcessingOptions, QueueItem};
pub use orchestrator::{App, QueueRunner, QueueStore, RunSummary};
pub use workflow::{ItemCtx, ItemFlow, ItemOutcome};
