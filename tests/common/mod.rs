#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use wavebulk::clients::backend_client::ArchiveStream;
use wavebulk::clients::{ProcessingBackend, ProgressFn, UploadProgress};
use wavebulk::error::{AppResult, ServerError};
use wavebulk::models::{
    DeleteReport, ItemStatus, MediaFile, ProcessingOptions, TaskResult, TaskStatus,
    TaskStatusResponse,
};
use wavebulk::orchestrator::RunSummary;
use wavebulk::services::status_poller::{ErrorPolicy, NotFoundPolicy, PollPolicy};
use wavebulk::services::QueueObserver;
use wavebulk::workflow::ItemCtx;

/// 上传脚本
#[derive(Clone)]
pub enum Upload {
    Accept,
    Reject { status: u16, message: String },
}

/// 后端收到的请求
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload {
        file: String,
        format: String,
        cover_art: Option<String>,
    },
    Status(String),
}

/// 按文件名预设上传结果、按状态地址预设状态序列的后端
///
/// 状态序列用完后一直返回 PROCESSING
#[derive(Default)]
pub struct ScriptedBackend {
    uploads: Mutex<HashMap<String, Upload>>,
    statuses: Mutex<HashMap<String, VecDeque<TaskStatusResponse>>>,
    calls: Mutex<Vec<Call>>,
}

pub fn status_url(file: &str) -> String {
    format!("/audio/task-status/{}", file)
}

pub fn completed(file: &str) -> TaskStatusResponse {
    TaskStatusResponse {
        status: TaskStatus::Completed,
        result: Some(
            serde_json::json!({
                "loudness_lufs": -14.0,
                "duration_seconds": 60.0,
                "processed_file_url": format!("/uploads/{}", file),
            })
            .to_string(),
        ),
    }
}

pub fn failed(message: &str) -> TaskStatusResponse {
    TaskStatusResponse {
        status: TaskStatus::Failed,
        result: Some(serde_json::json!({ "error": message }).to_string()),
    }
}

pub fn pending(status: TaskStatus) -> TaskStatusResponse {
    TaskStatusResponse {
        status,
        result: None,
    }
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_upload(&self, file: &str, upload: Upload) {
        self.uploads.lock().unwrap().insert(file.to_string(), upload);
    }

    pub fn script_status(&self, file: &str, responses: Vec<TaskStatusResponse>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(status_url(file), responses.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { file, .. } => Some(file),
                Call::Status(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl ProcessingBackend for ScriptedBackend {
    async fn upload(
        &self,
        file: &MediaFile,
        options: &ProcessingOptions,
        cover_art: Option<&MediaFile>,
        progress: ProgressFn,
    ) -> AppResult<String> {
        self.calls.lock().unwrap().push(Call::Upload {
            file: file.name().to_string(),
            format: options.format.clone(),
            cover_art: cover_art.map(|c| c.name().to_string()),
        });

        let total = file.size();
        progress(UploadProgress {
            sent: total / 2,
            total,
        });
        progress(UploadProgress { sent: total, total });

        let upload = self
            .uploads
            .lock()
            .unwrap()
            .get(file.name())
            .cloned()
            .unwrap_or(Upload::Accept);

        match upload {
            Upload::Accept => Ok(status_url(file.name())),
            Upload::Reject { status, message } => {
                Err(ServerError::Rejected { status, message }.into())
            }
        }
    }

    async fn fetch_status(&self, status_url: &str) -> AppResult<TaskStatusResponse> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Status(status_url.to_string()));

        let next = self
            .statuses
            .lock()
            .unwrap()
            .get_mut(status_url)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(response) => Ok(response),
            None if self.statuses.lock().unwrap().contains_key(status_url) => {
                Ok(pending(TaskStatus::Processing))
            }
            None => Err(ServerError::HttpStatus { status: 404 }.into()),
        }
    }

    async fn delete_files(&self, ids: &[String]) -> AppResult<DeleteReport> {
        Ok(DeleteReport {
            message: format!("{} files deleted", ids.len()),
            errors: Vec::new(),
        })
    }

    async fn download_archive(&self, _ids: &[String]) -> AppResult<ArchiveStream> {
        let chunks = vec![Ok(Bytes::from_static(b"PK\x03\x04")), Ok(Bytes::from_static(b"zip"))];
        Ok(futures::stream::iter(chunks).boxed())
    }
}

/// 观察者收到的事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Rejected(String),
    Status(usize, ItemStatus),
    Progress(usize, u32),
    Result(usize, TaskResult),
    Error(usize, String),
    QueueProgress(usize, usize),
    Finished(RunSummary),
}

/// 记录所有事件的观察者
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn statuses_of(&self, index: usize) -> Vec<ItemStatus> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Status(i, status) if i == index => Some(status),
                _ => None,
            })
            .collect()
    }

    /// 按事件顺序计算同一时刻最多有几个文件在途
    pub fn max_in_flight(&self) -> usize {
        let mut in_flight = std::collections::HashSet::new();
        let mut max = 0;
        for event in self.events() {
            if let Event::Status(index, status) = event {
                if status.is_in_flight() {
                    in_flight.insert(index);
                } else {
                    in_flight.remove(&index);
                }
                max = max.max(in_flight.len());
            }
        }
        max
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl QueueObserver for RecordingObserver {
    fn on_rejected(&self, message: &str) {
        self.push(Event::Rejected(message.to_string()));
    }

    fn on_status(&self, ctx: &ItemCtx, status: ItemStatus) {
        self.push(Event::Status(ctx.index, status));
    }

    fn on_upload_progress(&self, ctx: &ItemCtx, progress: UploadProgress) {
        self.push(Event::Progress(ctx.index, progress.percent()));
    }

    fn on_result(&self, ctx: &ItemCtx, result: &TaskResult) {
        self.push(Event::Result(ctx.index, result.clone()));
    }

    fn on_error(&self, ctx: &ItemCtx, message: &str) {
        self.push(Event::Error(ctx.index, message.to_string()));
    }

    fn on_queue_progress(&self, current: usize, total: usize) {
        self.push(Event::QueueProgress(current, total));
    }

    fn on_run_finished(&self, summary: &RunSummary) {
        self.push(Event::Finished(*summary));
    }
}

/// 上传流程使用的轮询策略（2.5s，不设超时）
pub fn upload_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(2500),
        deadline: None,
        not_found: NotFoundPolicy::Fail,
        on_error: ErrorPolicy::Fail,
    }
}

pub fn wav(name: &str) -> MediaFile {
    MediaFile::new(name, "audio/wav", vec![0u8; 1024])
}
