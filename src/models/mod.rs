pub mod loaders;
pub mod media_file;
pub mod options;
pub mod queue_item;
pub mod task;

pub use loaders::{load_media_file, load_media_files, load_options_form};
pub use media_file::MediaFile;
pub use options::{OptionsForm, ProcessingOptions};
pub use queue_item::{ItemStatus, QueueItem};
pub use task::{DeleteReport, TaskResult, TaskStatus, TaskStatusResponse};
