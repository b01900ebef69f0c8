//! 后端任务状态与结果

use serde::{Deserialize, Serialize};

/// 后端任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
    /// 无法识别的状态，按未完成处理
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    /// 是否为终态（轮询在此停止）
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// 是否仍在处理中
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            TaskStatus::Pending | TaskStatus::Queued | TaskStatus::Processing
        )
    }
}

/// `GET <status_url>` 的响应体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: TaskStatus,
    /// JSON 编码的结果字符串，仅在终态时存在
    #[serde(default)]
    pub result: Option<String>,
}

impl TaskStatusResponse {
    /// 解析成功结果
    pub fn task_result(&self) -> Result<TaskResult, serde_json::Error> {
        serde_json::from_str(self.result.as_deref().unwrap_or("null"))
    }

    /// 提取失败原因；结果缺失、格式错误或为空时返回 `None`
    pub fn failure_message(&self) -> Option<String> {
        let raw = self.result.as_deref()?;
        let failure: TaskFailure = serde_json::from_str(raw).ok()?;
        failure.error.filter(|message| !message.is_empty())
    }
}

/// 处理成功后的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub loudness_lufs: f64,
    pub duration_seconds: f64,
    pub processed_file_url: String,
}

#[derive(Debug, Deserialize)]
struct TaskFailure {
    #[serde(default)]
    error: Option<String>,
}

/// 上传被接受后的响应体（HTTP 202）
#[derive(Debug, Clone, Deserialize)]
pub struct UploadAccepted {
    pub status_url: String,
}

/// 错误响应体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// 批量删除的结果
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeleteReport {
    #[serde(default)]
    pub message: String,
    /// 部分成功（HTTP 207）时的逐项错误
    #[serde(default)]
    pub errors: Vec<String>,
}
