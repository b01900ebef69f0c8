use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 处理后端地址
    pub base_url: String,
    /// 上传流程的状态轮询间隔（毫秒）
    pub upload_poll_interval_ms: u64,
    /// 历史记录监视器的轮询间隔（毫秒）
    pub watch_poll_interval_ms: u64,
    /// 单个任务的最长等待时间（秒），0 表示不限制
    pub poll_deadline_secs: u64,
    /// 单个文件大小上限（MB）
    pub max_file_size_mb: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    /// 输出日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            upload_poll_interval_ms: 2500,
            watch_poll_interval_ms: 3000,
            poll_deadline_secs: 1800,
            max_file_size_mb: 100,
            request_timeout_secs: 300,
            output_log_file: "wavebulk.log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            base_url: std::env::var("WAVEBULK_BASE_URL").unwrap_or(default.base_url),
            upload_poll_interval_ms: std::env::var("UPLOAD_POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.upload_poll_interval_ms),
            watch_poll_interval_ms: std::env::var("WATCH_POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.watch_poll_interval_ms),
            poll_deadline_secs: std::env::var("POLL_DEADLINE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_deadline_secs),
            max_file_size_mb: std::env::var("MAX_FILE_SIZE_MB").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_file_size_mb),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    pub fn upload_poll_interval(&self) -> Duration {
        Duration::from_millis(self.upload_poll_interval_ms)
    }

    pub fn watch_poll_interval(&self) -> Duration {
        Duration::from_millis(self.watch_poll_interval_ms)
    }

    /// 最长等待时间，`None` 表示一直轮询
    pub fn poll_deadline(&self) -> Option<Duration> {
        (self.poll_deadline_secs > 0).then(|| Duration::from_secs(self.poll_deadline_secs))
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upload_flow() {
        let config = Config::default();
        assert_eq!(config.upload_poll_interval(), Duration::from_millis(2500));
        assert_eq!(config.watch_poll_interval(), Duration::from_millis(3000));
        assert_eq!(config.max_file_size_bytes(), 100 * 1024 * 1024);
        assert_eq!(config.poll_deadline(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_zero_deadline_disables_limit() {
        let config = Config {
            poll_deadline_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.poll_deadline(), None);
    }

    #[test]
    fn test_huge_size_limit_saturates() {
        let config = Config {
            max_file_size_mb: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.max_file_size_bytes(), u64::MAX);
    }
}
