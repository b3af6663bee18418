//! 影片預覽圖生成元件
//!
//! 從 ffmpeg 的 PNG 串流切出影格，拼成 10x10 的預覽圖

mod ffmpeg_command;
mod frame_demuxer;
mod main;
mod mosaic_assembler;

pub use ffmpeg_command::PreviewCommand;
pub use frame_demuxer::{DecodedFrames, DemuxedStream, FrameDemuxer, FrameRange, PNG_SIGNATURE};
pub use main::PreviewGenerator;
pub use mosaic_assembler::{
    FRAMES_PER_SHEET, GRID_COLS, GRID_ROWS, MosaicAssembler, cell_position, compose_sheet,
};
