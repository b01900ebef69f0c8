use std::time::Duration;
use thiserror::Error;

/// 应用程序错误类型
///
/// 单个文件的错误（传输、服务器、远端任务）只会让该文件失败，
/// 由队列运行器在边界处捕获，不会中断整个批次。
#[derive(Debug, Error)]
pub enum AppError {
    /// 文件校验失败（类型 / 大小）
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// 网络传输错误
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// 服务器返回了非预期的响应
    #[error(transparent)]
    Server(#[from] ServerError),
    /// 后端任务执行失败
    #[error(transparent)]
    RemoteJob(#[from] RemoteJobError),
    /// 队列操作错误
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// 文件校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 媒体类型不在允许列表中
    #[error("不支持的文件类型: {name}")]
    UnsupportedType { name: String, media_type: String },
    /// 文件超过大小上限
    #[error("文件 {name} 过大 (最大 {max_mb} MB)")]
    TooLarge { name: String, size: u64, max_mb: u64 },
}

/// 网络传输错误
#[derive(Debug, Error)]
pub enum TransportError {
    /// 请求没有得到任何响应
    #[error("网络错误。")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 请求体构建失败
    #[error("请求构建失败: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
}

/// 服务器响应错误
#[derive(Debug, Error)]
pub enum ServerError {
    /// 服务器拒绝了请求，附带服务器给出的（或通用的）错误信息
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// 非成功的 HTTP 状态码
    #[error("HTTP 错误 {status}")]
    HttpStatus { status: u16 },
    /// 响应体无法解析
    #[error("响应格式无效 ({endpoint}): {detail}")]
    MalformedResponse { endpoint: String, detail: String },
}

/// 后端任务错误
#[derive(Debug, Error)]
pub enum RemoteJobError {
    /// 后端报告 FAILED
    #[error("{message}")]
    Failed { message: String },
    /// 超过最长等待时间仍未到达终态
    #[error("等待任务完成超时 (已等待 {}s)", .waited.as_secs())]
    DeadlineExceeded { status_url: String, waited: Duration },
    /// 任务完成但结果无法解析
    #[error("无法解析处理结果: {detail}")]
    MalformedResult { detail: String },
}

/// 队列操作错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// 运行期间队列成员只读
    #[error("队列正在处理中，无法修改")]
    Frozen,
    /// 索引超出范围
    #[error("索引 {index} 超出范围 (队列长度 {len})")]
    IndexOutOfRange { index: usize, len: usize },
    /// 非法的状态迁移
    #[error("文件 {index} 不能从 {from} 迁移到 {to}")]
    InvalidTransition {
        index: usize,
        from: &'static str,
        to: &'static str,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 后端地址无效
    #[error("无效的地址 {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Server(ServerError::MalformedResponse {
            endpoint: String::new(),
            detail: err.to_string(),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络错误
    pub fn network(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Transport(TransportError::Network {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建响应解析错误
    pub fn malformed(endpoint: impl Into<String>, detail: impl ToString) -> Self {
        AppError::Server(ServerError::MalformedResponse {
            endpoint: endpoint.into(),
            detail: detail.to_string(),
        })
    }

    /// 返回 HTTP 状态码（如果错误来自服务器响应）
    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::Server(ServerError::Rejected { status, .. })
            | AppError::Server(ServerError::HttpStatus { status }) => Some(*status),
            _ => None,
        }
    }

    /// 展示给用户的错误信息
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
