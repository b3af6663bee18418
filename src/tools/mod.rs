mod ffmpeg_locator;
mod path_validator;

pub use ffmpeg_locator::locate_ffmpeg;
pub use path_validator::{ensure_directory_exists, validate_input_file};
