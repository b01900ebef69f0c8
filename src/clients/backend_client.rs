/// 处理后端 API 客户端
///
/// 封装所有与处理后端的 HTTP 交互：上传、状态查询、批量删除、批量下载
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ServerError, TransportError};
use crate::models::task::{ErrorBody, UploadAccepted};
use crate::models::{DeleteReport, MediaFile, ProcessingOptions, TaskStatusResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, StatusCode, Url};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 上传接口
pub const UPLOAD_ENDPOINT: &str = "/audio/upload-and-process";
/// 批量删除接口
pub const DELETE_ENDPOINT: &str = "/audio/delete-files";
/// 批量下载接口
pub const DOWNLOAD_ENDPOINT: &str = "/audio/download-multiple";

/// 上传请求体分块大小
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// 上传进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

impl UploadProgress {
    /// 已发送比例，范围 0.0 ~ 1.0
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.sent as f64 / self.total as f64
        }
    }

    /// 百分比（四舍五入）
    pub fn percent(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }
}

/// 上传进度回调
pub type ProgressFn = Arc<dyn Fn(UploadProgress) + Send + Sync>;

/// 批量下载的字节流
pub type ArchiveStream = BoxStream<'static, AppResult<Bytes>>;

/// 处理后端能力
#[async_trait]
pub trait ProcessingBackend: Send + Sync {
    /// 上传文件并提交处理，返回状态查询地址
    async fn upload(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        cover_art: Option<&MediaFile>,
        progress: ProgressFn,
    ) -> AppResult<String>;

    /// 查询任务状态
    async fn fetch_status(&self, status_url: &str) -> AppResult<TaskStatusResponse>;

    /// 批量删除已处理的文件
    async fn delete_files(&self, ids: &[String]) -> AppResult<DeleteReport>;

    /// 批量下载，返回 ZIP 字节流
    async fn download_archive(&self, ids: &[String]) -> AppResult<ArchiveStream>;
}

/// 基于 reqwest 的处理后端客户端
///
/// 上传和批量下载只限制连接时间，状态查询和批量删除使用 `request_timeout`
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    request_timeout: Duration,
}

impl HttpBackend {
    /// 创建新的后端客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|source| TransportError::Request { source })?;

        Ok(Self {
            client,
            base_url,
            request_timeout: config.request_timeout(),
        })
    }

    /// 将相对路径（如 `/audio/task-status/5`）解析为完整地址
    fn resolve(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|e| {
            ConfigError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// 构建带进度上报的文件分块
    fn file_part(file: &MediaFile, progress: Option<ProgressFn>) -> AppResult<Part> {
        let data = file.data();
        let total = data.len() as u64;

        let chunks: Vec<Bytes> = (0..data.len())
            .step_by(UPLOAD_CHUNK_SIZE)
            .map(|start| data.slice(start..(start + UPLOAD_CHUNK_SIZE).min(data.len())))
            .collect();

        let mut sent = 0u64;
        let body_stream = stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            if let Some(report) = &progress {
                report(UploadProgress { sent, total });
            }
            Ok::<Bytes, std::io::Error>(chunk)
        });

        Part::stream_with_length(Body::wrap_stream(body_stream), total)
            .file_name(file.name().to_string())
            .mime_str(file.media_type())
            .map_err(|source| TransportError::Request { source }.into())
    }

    /// 从错误响应体中提取服务器给出的错误信息
    async fn rejection(response: reqwest::Response, fallback: String) -> AppError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback);

        ServerError::Rejected { status, message }.into()
    }
}

#[async_trait]
impl ProcessingBackend for HttpBackend {
    async fn upload(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        cover_art: Option<&MediaFile>,
        progress: ProgressFn,
    ) -> AppResult<String> {
        let url = self.resolve(UPLOAD_ENDPOINT)?;

        let mut form = Form::new()
            .part("file", Self::file_part(file, Some(progress))?)
            .text("options", serde_json::to_string(options)?);
        if let Some(cover) = cover_art {
            form = form.part("cover_art", Self::file_part(cover, None)?);
        }

        debug!("上传文件 {} ({} 字节) 到 {}", file.name(), file.size(), url);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::network(UPLOAD_ENDPOINT, e))?;

        let status = response.status();
        if status != StatusCode::ACCEPTED {
            let fallback = format!("服务器错误 {}", status.as_u16());
            return Err(Self::rejection(response, fallback).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(UPLOAD_ENDPOINT, e))?;
        let accepted: UploadAccepted =
            serde_json::from_str(&body).map_err(|e| AppError::malformed(UPLOAD_ENDPOINT, e))?;

        debug!("上传完成，状态地址: {}", accepted.status_url);

        Ok(accepted.status_url)
    }

    async fn fetch_status(&self, status_url: &str) -> AppResult<TaskStatusResponse> {
        let url = self.resolve(status_url)?;

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| AppError::network(status_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServerError::HttpStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(status_url, e))?;

        serde_json::from_str(&body).map_err(|e| AppError::malformed(status_url, e))
    }

    async fn delete_files(&self, ids: &[String]) -> AppResult<DeleteReport> {
        let url = self.resolve(DELETE_ENDPOINT)?;

        let response = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(&json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| AppError::network(DELETE_ENDPOINT, e))?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::MULTI_STATUS {
            return Err(Self::rejection(response, "服务器错误。".to_string()).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::network(DELETE_ENDPOINT, e))?;

        serde_json::from_str(&body).map_err(|e| AppError::malformed(DELETE_ENDPOINT, e))
    }

    async fn download_archive(&self, ids: &[String]) -> AppResult<ArchiveStream> {
        let url = self.resolve(DOWNLOAD_ENDPOINT)?;

        let response = self
            .client
            .post(url)
            .json(&json!({ "ids": ids }))
            .send()
            .await
            .map_err(|e| AppError::network(DOWNLOAD_ENDPOINT, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::rejection(response, "下载失败".to_string()).await);
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AppError::network(DOWNLOAD_ENDPOINT, e)))
            .boxed();

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_fraction() {
        let progress = UploadProgress { sent: 50, total: 200 };
        assert_eq!(progress.fraction(), 0.25);
        assert_eq!(progress.percent(), 25);
        assert_eq!(UploadProgress { sent: 0, total: 0 }.percent(), 100);
    }

    #[test]
    fn test_resolve_relative_status_url() {
        let config = Config {
            base_url: "http://backend.local:8080".to_string(),
            ..Config::default()
        };
        let backend = HttpBackend::new(&config).unwrap();

        let url = backend.resolve("/audio/task-status/7").unwrap();
        assert_eq!(url.as_str(), "http://backend.local:8080/audio/task-status/7");

        let absolute = backend.resolve("http://other.local/status/1").unwrap();
        assert_eq!(absolute.as_str(), "http://other.local/status/1");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(AppError::Config(ConfigError::InvalidUrl { .. }))
        ));
    }
}
