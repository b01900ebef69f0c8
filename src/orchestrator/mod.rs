//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责队列管理和批次调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 管理应用生命周期（初始化、运行、统计）
//! - 加载文件、校验并加入队列
//! - 处理 Ctrl-C（运行期间第一次只警告）
//! - 历史记录监视、批量删除和下载
//!
//! ### `queue_store` - 队列存储
//! - 按插入顺序保存文件，发布队列变化
//! - 运行期间冻结成员
//!
//! ### `queue_runner` - 队列运行器
//! - 逐个处理文件，同一时间只有一个在途
//! - 单个文件失败不影响后续文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App)
//!     ↓
//! queue_runner (处理 QueueStore)
//!     ↓
//! workflow::ItemFlow (处理单个文件)
//!     ↓
//! services (能力层：validator / submission / status_poller / renderer)
//!     ↓
//! clients (ProcessingBackend)
//! ```

pub mod batch_processor;
pub mod queue_runner;
pub mod queue_store;

// 重新导出主要类型
pub use batch_processor::App;
pub use queue_runner::{QueueRunner, RunState, RunSummary};
pub use queue_store::{QueueStore, QueueSummary};
