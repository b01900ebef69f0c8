/// 展示用的格式化函数

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// 将字节数格式化为易读的大小，如 `1.5 KB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let k = 1024f64;
    let exponent = ((bytes as f64).ln() / k.ln()).floor() as usize;
    let exponent = exponent.min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / k.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, SIZE_UNITS[exponent])
}

/// 将秒数格式化为 `m:ss`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// 响度显示，保留一位小数
pub fn format_lufs(lufs: f64) -> String {
    format!("{:.1} LUFS", lufs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(100 * 1024 * 1024), "100 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.9), "0:59");
        assert_eq!(format_duration(183.4), "3:03");
    }

    #[test]
    fn test_format_lufs() {
        assert_eq!(format_lufs(-14.04), "-14.0 LUFS");
    }
}
