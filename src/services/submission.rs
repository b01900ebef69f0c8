//! 上传提交服务 - 业务能力层
//!
//! 只负责"上传一个文件并拿到状态地址"，不重试，不关心队列

use std::sync::Arc;
use tracing::{debug, info};

use crate::clients::{ProcessingBackend, ProgressFn};
use crate::error::AppResult;
use crate::models::{MediaFile, ProcessingOptions};

/// 上传提交服务
///
/// 封面图在一次批处理中只选择一次，同样附加到每个文件
pub struct SubmissionClient {
    backend: Arc<dyn ProcessingBackend>,
    cover_art: Option<Arc<MediaFile>>,
}

impl SubmissionClient {
    pub fn new(backend: Arc<dyn ProcessingBackend>, cover_art: Option<Arc<MediaFile>>) -> Self {
        Self { backend, cover_art }
    }

    /// 上传文件和处理选项，成功时返回状态查询地址
    pub async fn submit(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        progress: ProgressFn,
    ) -> AppResult<String> {
        debug!(
            "提交 {} | 格式 {} | 封面图: {}",
            file.name(),
            options.format,
            self.cover_art.as_ref().map(|c| c.name()).unwrap_or("无")
        );

        let status_url = self
            .backend
            .upload(file, options, self.cover_art.as_deref(), progress)
            .await?;

        info!("✓ {} 已进入处理队列", file.name());

        Ok(status_url)
    }
}
