use crate::models::options::OptionsForm;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载处理选项表单
///
/// 文件中未出现的字段取表单默认值
pub async fn load_options_form(toml_file_path: &Path) -> Result<OptionsForm> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let form: OptionsForm = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "已加载处理选项: 格式 {}, 预设 {}",
        form.format,
        form.lufs_preset
    );

    Ok(form)
}
