use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 默认级别 `info`，可通过 `RUST_LOG` 覆盖；重复调用不会报错
pub fn init() {
    init_with_verbose(false);
}

/// 初始化 tracing 日志，`verbose` 为真时默认级别为 `debug`
pub fn init_with_verbose(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n音频批处理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `base_url`: 处理后端地址
/// - `poll_interval_ms`: 轮询间隔
pub fn log_startup(base_url: &str, poll_interval_ms: u64) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 顺序上传处理模式");
    info!("🌐 处理后端: {}", base_url);
    info!("⏱️ 状态轮询间隔: {} ms", poll_interval_ms);
    info!("{}", "=".repeat(60));
}

/// 记录文件加载信息
///
/// # 参数
/// - `admitted`: 通过校验的文件数
/// - `total`: 候选文件总数
pub fn log_files_loaded(admitted: usize, total: usize) {
    info!("✓ 共 {} 个文件，{} 个通过校验", total, admitted);
    info!("💡 文件将逐个上传，上一个处理完成后再开始下一个\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `total`: 总数
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
