use crate::models::MediaFile;
use anyhow::{Context, Result};
use phf::phf_map;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 未知扩展名时声明的媒体类型
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// mime_guess 与浏览器声明不一致的类型
static BROWSER_MEDIA_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "audio/m4a" => "audio/x-m4a",
};

/// 按扩展名推断浏览器会声明的媒体类型
pub fn guess_media_type(path: &Path) -> &'static str {
    mime_guess::from_path(path)
        .iter_raw()
        .next()
        .map(|guessed| BROWSER_MEDIA_TYPES.get(guessed).copied().unwrap_or(guessed))
        .unwrap_or(FALLBACK_MEDIA_TYPE)
}

/// 读取单个文件，媒体类型按扩展名推断（与浏览器声明的类型一致）
pub async fn load_media_file(path: &Path) -> Result<MediaFile> {
    let data = fs::read(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(MediaFile::new(name, guess_media_type(path), data))
}

/// 加载多个路径；目录会展开为其中的文件（不递归）
///
/// 读取失败的文件记录警告后跳过，顺序与输入一致，目录内按文件名排序
pub async fn load_media_files(paths: &[PathBuf]) -> Result<Vec<MediaFile>> {
    let mut files = Vec::new();

    for path in paths {
        let metadata = fs::metadata(path)
            .await
            .with_context(|| format!("路径不存在: {}", path.display()))?;

        let candidates = if metadata.is_dir() {
            list_directory(path).await?
        } else {
            vec![path.clone()]
        };

        for candidate in candidates {
            match load_media_file(&candidate).await {
                Ok(file) => {
                    tracing::info!("正在加载: {} ({})", file.name(), file.media_type());
                    files.push(file);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", candidate.display(), e);
                }
            }
        }
    }

    Ok(files)
}

async fn list_directory(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();

    Ok(paths)
}
