//! 文件校验服务 - 业务能力层
//!
//! 只负责判断"这个文件能否加入队列"，每个文件独立判断

use phf::phf_set;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ValidationError;
use crate::models::MediaFile;
use crate::services::renderer::QueueObserver;

/// 允许上传的媒体类型
pub static ALLOWED_MEDIA_TYPES: phf::Set<&'static str> = phf_set! {
    "audio/wav", "audio/x-wav",
    "audio/mpeg", "audio/mp3",
    "audio/mp4", "audio/x-m4a",
    "audio/aac", "audio/aacp",
    "audio/flac", "audio/x-flac",
    "audio/ogg", "audio/vorbis",
    "audio/x-ms-wma",
    "audio/aiff", "audio/x-aiff",
};

/// 文件校验器
///
/// 校验失败时通过 `QueueObserver::on_rejected` 输出原因，不返回错误
pub struct Validator {
    max_size_mb: u64,
    observer: Arc<dyn QueueObserver>,
}

impl Validator {
    pub fn new(config: &Config, observer: Arc<dyn QueueObserver>) -> Self {
        Self {
            max_size_mb: config.max_file_size_mb,
            observer,
        }
    }

    /// 检查文件，返回具体的校验错误
    pub fn check(&self, file: &MediaFile) -> Result<(), ValidationError> {
        if !ALLOWED_MEDIA_TYPES.contains(file.media_type()) {
            return Err(ValidationError::UnsupportedType {
                name: file.name().to_string(),
                media_type: file.media_type().to_string(),
            });
        }

        if file.size() > self.max_size_mb.saturating_mul(1024 * 1024) {
            return Err(ValidationError::TooLarge {
                name: file.name().to_string(),
                size: file.size(),
                max_mb: self.max_size_mb,
            });
        }

        Ok(())
    }

    /// 校验文件是否可以加入队列
    pub fn validate(&self, file: &MediaFile) -> bool {
        match self.check(file) {
            Ok(()) => true,
            Err(e) => {
                self.observer.on_rejected(&e.to_string());
                false
            }
        }
    }
}
