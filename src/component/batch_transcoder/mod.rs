//! 影片批次轉檔元件
//!
//! 依畫質階梯產生多個變體，在固定併發上限下同時執行 ffmpeg

mod ffmpeg_command;
mod job_spec;
mod main;
mod task_scheduler;

pub use ffmpeg_command::TranscodeCommand;
pub use job_spec::JobSpec;
pub use main::BatchTranscoder;
pub use task_scheduler::{EncodeJob, TaskScheduler, TaskStatus, TranscodeTask};
