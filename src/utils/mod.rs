pub mod format;
pub mod logging;

pub use logging::init;
