pub mod bulk;
pub mod history;
pub mod renderer;
pub mod status_poller;
pub mod submission;
pub mod validator;

pub use bulk::BulkService;
pub use history::{HistoryEntry, HistoryFilter, HistoryWatcher, StatusFilter, WatchOutcome};
pub use renderer::{ConsoleRenderer, QueueObserver};
pub use status_poller::{PollOutcome, PollPolicy, StatusPoller};
pub use submission::SubmissionClient;
pub use validator::Validator;
