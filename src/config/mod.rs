pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, FileTypeTable, MAX_RECENT_PATHS, PreviewSettings, TranscoderSettings, UserSettings,
};
