mod common;

use std::sync::Arc;

use common::{completed, Event, RecordingObserver, ScriptedBackend};
use wavebulk::config::Config;
use wavebulk::models::TaskStatus;
use wavebulk::services::{HistoryEntry, HistoryFilter, StatusFilter};
use wavebulk::App;

fn app(backend: &Arc<ScriptedBackend>, observer: &Arc<RecordingObserver>) -> App {
    let config = Config {
        upload_poll_interval_ms: 5,
        watch_poll_interval_ms: 5,
        max_file_size_mb: 1,
        ..Config::default()
    };
    App::with_backend(config, backend.clone(), observer.clone())
}

#[tokio::test]
async fn test_process_folder_admits_only_valid_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.wav"), vec![0u8; 64]).unwrap();
    std::fs::write(dir.path().join("b.mp3"), vec![0u8; 64]).unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
    std::fs::write(dir.path().join("huge.wav"), vec![0u8; 1024 * 1024 + 1]).unwrap();
    let options_dir = tempfile::tempdir().unwrap();
    let options = options_dir.path().join("options.toml");
    std::fs::write(&options, "format = \"mp3\"\nbitrate = \"192\"\n").unwrap();

    let backend = ScriptedBackend::new();
    backend.script_status("a.wav", vec![completed("a.wav")]);
    backend.script_status("b.mp3", vec![completed("b.mp3")]);
    let observer = RecordingObserver::new();

    let summary = app(&backend, &observer)
        .process(&[dir.path().to_path_buf()], Some(options.as_path()), None)
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(backend.uploaded_files(), vec!["a.wav", "b.mp3"]);

    let rejected: Vec<_> = observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Rejected(message) => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(rejected.len(), 2);
    assert!(rejected.iter().any(|m| m.contains("huge.wav")));
    assert!(rejected.iter().any(|m| m.contains("notes.txt")));

    assert!(backend.calls().iter().any(|c| matches!(
        c,
        common::Call::Upload { format, .. } if format == "mp3"
    )));
}

#[tokio::test]
async fn test_process_without_valid_files_does_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

    let backend = ScriptedBackend::new();
    let observer = RecordingObserver::new();

    let summary = app(&backend, &observer)
        .process(&[dir.path().to_path_buf()], None, None)
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_watch_filters_settled_tasks() {
    let backend = ScriptedBackend::new();
    // 状态地址按任务 ID 生成：/audio/task-status/<id>
    backend.script_status("1", vec![completed("mix.wav")]);
    backend.script_status("2", vec![common::failed("decode error")]);
    let observer = RecordingObserver::new();
    let app = app(&backend, &observer);

    let entries = vec![
        HistoryEntry::pending("1", "Final_Mix.wav"),
        HistoryEntry::pending("2", "mix_v2.wav"),
        HistoryEntry::pending("3", "gone.wav"),
    ];
    let filter = HistoryFilter {
        search: "mix".to_string(),
        status: StatusFilter::Completed,
    };

    let shown = app.watch(entries, &filter).await;

    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].task_id, "1");
    assert_eq!(shown[0].status, TaskStatus::Completed);
    assert_eq!(
        shown[0].processed_file_url.as_deref(),
        Some("/uploads/mix.wav")
    );
}

#[tokio::test]
async fn test_watch_keeps_vanished_task_with_last_status() {
    let backend = ScriptedBackend::new();
    backend.script_status("1", vec![completed("a.wav")]);
    let observer = RecordingObserver::new();
    let app = app(&backend, &observer);

    let entries = vec![
        HistoryEntry::pending("1", "a.wav"),
        HistoryEntry::pending("3", "gone.wav"),
    ];

    let shown = app.watch(entries, &HistoryFilter::default()).await;

    let rows: Vec<_> = shown
        .iter()
        .map(|e| (e.task_id.as_str(), e.status))
        .collect();
    assert_eq!(
        rows,
        vec![("1", TaskStatus::Completed), ("3", TaskStatus::Processing)]
    );
    assert!(shown[1].processed_file_url.is_none());
}

#[tokio::test]
async fn test_bulk_operations_skip_empty_selection() {
    let backend = ScriptedBackend::new();
    let observer = RecordingObserver::new();
    let app = app(&backend, &observer);
    let dir = tempfile::tempdir().unwrap();

    let report = app.delete(&[]).await.unwrap();
    assert!(report.errors.is_empty());
    assert!(app.download(&[], dir.path()).await.unwrap().is_none());

    let report = app.delete(&["1".to_string()]).await.unwrap();
    assert_eq!(report.message, "1 files deleted");

    let path = app
        .download(&["1".to_string()], dir.path())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(std::fs::read(path).unwrap(), b"PK\x03\x04zip");
}
