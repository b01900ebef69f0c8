//! 批量删除 / 批量下载 - 业务能力层

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::clients::ProcessingBackend;
use crate::error::{AppResult, FileError};
use crate::models::DeleteReport;

/// 批量下载的文件名：`wavebulk_files_<YYYY-MM-DD>.zip`
pub fn archive_file_name(date: chrono::NaiveDate) -> String {
    format!("wavebulk_files_{}.zip", date.format("%Y-%m-%d"))
}

/// 批量操作服务
pub struct BulkService {
    backend: Arc<dyn ProcessingBackend>,
}

impl BulkService {
    pub fn new(backend: Arc<dyn ProcessingBackend>) -> Self {
        Self { backend }
    }

    /// 删除已处理的文件；部分失败（207）的逐项错误以警告输出
    pub async fn delete_files(&self, ids: &[String]) -> AppResult<DeleteReport> {
        if ids.is_empty() {
            return Ok(DeleteReport::default());
        }

        let report = self.backend.delete_files(ids).await?;

        info!("🗑️ {}", report.message);
        for error in &report.errors {
            warn!("⚠️ {}", error);
        }

        Ok(report)
    }

    /// 下载多个文件的压缩包到 `dir`，返回写入的路径；`ids` 为空时返回 `None`
    pub async fn download_multiple(&self, ids: &[String], dir: &Path) -> AppResult<Option<PathBuf>> {
        if ids.is_empty() {
            return Ok(None);
        }

        let mut stream = self.backend.download_archive(ids).await?;

        let path = dir.join(archive_file_name(chrono::Local::now().date_naive()));
        let write_err = |source| FileError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        let mut file = File::create(&path).await.map_err(write_err)?;
        let mut written = 0usize;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len();
            file.write_all(&chunk).await.map_err(write_err)?;
        }
        file.flush().await.map_err(write_err)?;

        info!("📦 已下载 {} 个文件 ({} 字节) → {}", ids.len(), written, path.display());

        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_file_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(archive_file_name(date), "wavebulk_files_2024-03-09.zip");
    }
}
