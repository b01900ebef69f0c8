//! 待上传的媒体文件

use bytes::Bytes;

/// 用户提供的文件：名称、声明的媒体类型和内容，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    name: String,
    media_type: String,
    data: Bytes,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 声明的媒体类型（如 `audio/wav`）
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// 字节大小
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// 文件内容（`Bytes` 克隆只增加引用计数）
    pub fn data(&self) -> Bytes {
        self.data.clone()
    }
}
