pub mod backend_client;

pub use backend_client::{HttpBackend, ProcessingBackend, ProgressFn, UploadProgress};
