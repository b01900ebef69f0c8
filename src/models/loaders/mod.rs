pub mod file_loader;
pub mod toml_loader;

pub use file_loader::{load_media_file, load_media_files};
pub use toml_loader::load_options_form;
