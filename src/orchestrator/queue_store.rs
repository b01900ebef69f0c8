//! 队列存储 - 编排层
//!
//! 按插入顺序保存待处理的文件。每次修改后通过 `watch` 通道发布完整的
//! `QueueSummary`（不做增量），界面据此重新计算计数和提交按钮状态。
//!
//! 按索引删除后，后面的索引整体减一；外部持有的索引在删除后需要重新确认。
//! 运行开始后队列被冻结：成员只读，只有队列运行器可以修改状态。

use tokio::sync::watch;

use crate::error::QueueError;
use crate::models::{ItemStatus, MediaFile, QueueItem, TaskResult};
use crate::services::Validator;

/// 队列汇总（每次修改后完整重算）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub total: usize,
    pub waiting: usize,
    pub uploading: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    pub frozen: bool,
}

impl QueueSummary {
    fn compute(items: &[QueueItem], frozen: bool) -> Self {
        let mut summary = Self {
            total: items.len(),
            frozen,
            ..Self::default()
        };
        for item in items {
            match item.status() {
                ItemStatus::Waiting => summary.waiting += 1,
                ItemStatus::Uploading => summary.uploading += 1,
                ItemStatus::Processing => summary.processing += 1,
                ItemStatus::Completed => summary.completed += 1,
                ItemStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// 正在上传或处理的文件数
    pub fn in_flight(&self) -> usize {
        self.uploading + self.processing
    }

    /// 是否可以提交
    pub fn can_submit(&self) -> bool {
        self.total > 0 && !self.frozen
    }
}

/// 队列存储
pub struct QueueStore {
    items: Vec<QueueItem>,
    frozen: bool,
    changes: watch::Sender<QueueSummary>,
}

impl QueueStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(QueueSummary::default());
        Self {
            items: Vec::new(),
            frozen: false,
            changes,
        }
    }

    /// 订阅队列变化
    pub fn subscribe(&self) -> watch::Receiver<QueueSummary> {
        self.changes.subscribe()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn summary(&self) -> QueueSummary {
        QueueSummary::compute(&self.items, self.frozen)
    }

    /// 追加到队尾
    pub fn append(&mut self, item: QueueItem) -> Result<(), QueueError> {
        if self.frozen {
            return Err(QueueError::Frozen);
        }
        self.items.push(item);
        self.notify();
        Ok(())
    }

    /// 按索引删除，返回被删除的项
    pub fn remove_at(&mut self, index: usize) -> Result<QueueItem, QueueError> {
        if self.frozen {
            return Err(QueueError::Frozen);
        }
        if index >= self.items.len() {
            return Err(QueueError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.notify();
        Ok(removed)
    }

    /// 逐个校验并加入队列，返回加入的数量
    ///
    /// 每个文件独立判断，未通过的文件不会改变队列
    pub fn admit(&mut self, files: Vec<MediaFile>, validator: &Validator) -> Result<usize, QueueError> {
        if self.frozen {
            return Err(QueueError::Frozen);
        }
        let before = self.items.len();
        self.items.extend(
            files
                .into_iter()
                .filter(|file| validator.validate(file))
                .map(QueueItem::new),
        );
        let admitted = self.items.len() - before;
        if admitted > 0 {
            self.notify();
        }
        Ok(admitted)
    }

    pub(crate) fn freeze(&mut self) {
        self.frozen = true;
        self.notify();
    }

    /// 推进状态（仅队列运行器使用）
    pub(crate) fn advance(&mut self, index: usize, next: ItemStatus) -> Result<(), QueueError> {
        self.update(index, next, |item| item.advance(next))
    }

    pub(crate) fn complete(&mut self, index: usize, result: TaskResult) -> Result<(), QueueError> {
        self.update(index, ItemStatus::Completed, |item| item.complete(result))
    }

    pub(crate) fn fail(&mut self, index: usize, message: &str) -> Result<(), QueueError> {
        self.update(index, ItemStatus::Failed, |item| item.fail(message))
    }

    fn update<F>(&mut self, index: usize, next: ItemStatus, apply: F) -> Result<(), QueueError>
    where
        F: FnOnce(&mut QueueItem) -> Result<ItemStatus, ItemStatus>,
    {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(QueueError::IndexOutOfRange { index, len })?;

        apply(item).map_err(|current| QueueError::InvalidTransition {
            index,
            from: current.as_str(),
            to: next.as_str(),
        })?;

        self.notify();
        Ok(())
    }

    fn notify(&self) {
        self.changes.send_replace(self.summary());
    }
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> QueueItem {
        QueueItem::new(MediaFile::new(name, "audio/wav", vec![1u8, 2, 3]))
    }

    fn names(store: &QueueStore) -> Vec<&str> {
        store.items().iter().map(|i| i.file().name()).collect()
    }

    #[test]
    fn test_remove_shifts_following_indices() {
        let mut store = QueueStore::new();
        for name in ["a.wav", "b.wav", "c.wav"] {
            store.append(item(name)).unwrap();
        }

        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.file().name(), "b.wav");
        assert_eq!(names(&store), vec!["a.wav", "c.wav"]);
        assert_eq!(store.get(1).unwrap().file().name(), "c.wav");
        assert_eq!(
            store.remove_at(2).unwrap_err(),
            QueueError::IndexOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn test_every_mutation_publishes_summary() {
        let mut store = QueueStore::new();
        let mut changes = store.subscribe();
        assert!(!changes.borrow().can_submit());

        store.append(item("a.wav")).unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().total, 1);
        assert!(changes.borrow().can_submit());

        store.advance(0, ItemStatus::Uploading).unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().in_flight(), 1);

        store.fail(0, "boom").unwrap();
        let summary = *changes.borrow_and_update();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.in_flight(), 0);
    }

    #[test]
    fn test_frozen_queue_rejects_membership_changes() {
        let mut store = QueueStore::new();
        store.append(item("a.wav")).unwrap();
        store.freeze();

        assert_eq!(store.append(item("b.wav")), Err(QueueError::Frozen));
        assert_eq!(store.remove_at(0).unwrap_err(), QueueError::Frozen);
        assert!(!store.summary().can_submit());

        store.advance(0, ItemStatus::Uploading).unwrap();
        assert_eq!(store.get(0).unwrap().status(), ItemStatus::Uploading);
    }

    #[test]
    fn test_invalid_transition_is_reported() {
        let mut store = QueueStore::new();
        store.append(item("a.wav")).unwrap();
        store.complete(
            0,
            TaskResult {
                loudness_lufs: -14.0,
                duration_seconds: 1.0,
                processed_file_url: "/uploads/a.wav".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            store.fail(0, "late"),
            Err(QueueError::InvalidTransition {
                index: 0,
                from: "completed",
                to: "failed",
            })
        );
    }
}
