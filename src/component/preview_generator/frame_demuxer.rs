use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use log::warn;
use rayon::prelude::*;
use std::io::Read;

/// PNG 檔頭的 8 位元組魔術簽章
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
/// 終止 chunk 的類型標籤
const TERMINAL_CHUNK_TAG: [u8; 4] = *b"IEND";
/// 每個 chunk 的固定額外負擔：長度欄位 4 + 類型 4 + CRC 4
const CHUNK_OVERHEAD: usize = 12;
/// 每次向來源讀取的區塊大小
const READ_BLOCK: usize = 64 * 1024;

/// 指向串流緩衝區中一張完整 PNG 的半開區間 [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

/// PNG 串流解多工器
///
/// 從 ffmpeg image2pipe 輸出的位元組串流中逐一切出 PNG 影格。
/// 掃描時逐位元組比對簽章，因此影格之間夾雜的雜訊會被自動略過；
/// 來源的 `read` 會阻塞到有新資料或串流結束，
/// 所以緩衝區讀到尾端時等同於「等待 ffmpeg 寫出更多資料」。
pub struct FrameDemuxer<R: Read> {
    source: R,
    buffer: Vec<u8>,
    eof: bool,
}

impl<R: Read> FrameDemuxer<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            eof: false,
        }
    }

    /// 消耗整個串流，回傳緩衝區與所有找到的影格區間
    ///
    /// 區間依位移遞增且互不重疊。簽章之後走訪 chunk 時
    /// 若在找到終止 chunk 前就碰到真正的串流結尾，該影格會被捨棄。
    pub fn scan(mut self) -> Result<DemuxedStream> {
        let mut ranges = Vec::new();
        let mut cursor = 0usize;

        loop {
            if !self.fill_to(cursor + PNG_SIGNATURE.len())? {
                break;
            }

            if self.buffer[cursor..cursor + PNG_SIGNATURE.len()] != PNG_SIGNATURE {
                cursor += 1;
                continue;
            }

            match self.walk_chunks(cursor)? {
                Some(end) => {
                    ranges.push(FrameRange { start: cursor, end });
                    cursor = end;
                }
                None => {
                    warn!("串流在影格結束前中斷，捨棄不完整的影格 (位移 {cursor})");
                    break;
                }
            }
        }

        Ok(DemuxedStream {
            buffer: self.buffer,
            ranges,
        })
    }

    /// 從簽章位置開始走訪 chunk，回傳影格結尾位移
    ///
    /// 終止條件：chunk 宣告長度為 0 且類型為 IEND。
    /// 回傳 `None` 表示串流在影格完成前就結束了。
    fn walk_chunks(&mut self, start: usize) -> Result<Option<usize>> {
        let mut cursor = start + PNG_SIGNATURE.len();

        loop {
            // 長度欄位 + 類型標籤
            if !self.fill_to(cursor + 8)? {
                return Ok(None);
            }

            let body_len = u32::from_be_bytes([
                self.buffer[cursor],
                self.buffer[cursor + 1],
                self.buffer[cursor + 2],
                self.buffer[cursor + 3],
            ]) as usize;

            let terminal = body_len == 0
                && self.buffer[cursor + 4..cursor + 8] == TERMINAL_CHUNK_TAG;

            let total = body_len + CHUNK_OVERHEAD;
            if !self.fill_to(cursor + total)? {
                return Ok(None);
            }
            cursor += total;

            if terminal {
                return Ok(Some(cursor));
            }
        }
    }

    /// 持續讀取直到緩衝區長度達到 needed 或來源結束，回傳是否達到
    fn fill_to(&mut self, needed: usize) -> Result<bool> {
        while !self.eof && self.buffer.len() < needed {
            let mut block = [0u8; READ_BLOCK];
            let n = self
                .source
                .read(&mut block)
                .context("讀取影格串流失敗")?;
            if n == 0 {
                self.eof = true;
                break;
            }
            self.buffer.extend_from_slice(&block[..n]);
        }
        Ok(self.buffer.len() >= needed)
    }
}

/// 掃描完成的串流：完整緩衝區加上所有影格區間
pub struct DemuxedStream {
    buffer: Vec<u8>,
    ranges: Vec<FrameRange>,
}

/// 解碼結果，失敗的影格會被略過並計數
pub struct DecodedFrames {
    pub frames: Vec<RgbImage>,
    pub failed: usize,
}

impl DemuxedStream {
    #[must_use]
    pub fn ranges(&self) -> &[FrameRange] {
        &self.ranges
    }

    #[must_use]
    pub fn frame_bytes(&self, range: &FrameRange) -> &[u8] {
        &self.buffer[range.start..range.end]
    }

    /// 將每個影格區間獨立解碼成影像
    ///
    /// 各區間之間沒有共享狀態，因此用 rayon 平行解碼；
    /// 輸出順序維持影格在串流中出現的順序。
    #[must_use]
    pub fn decode_frames(&self) -> DecodedFrames {
        let decoded: Vec<Option<RgbImage>> = self
            .ranges
            .par_iter()
            .enumerate()
            .map(|(index, range)| {
                match image::load_from_memory_with_format(self.frame_bytes(range), ImageFormat::Png)
                {
                    Ok(img) => Some(img.into_rgb8()),
                    Err(e) => {
                        warn!("影格 {index} 解碼失敗，已略過: {e}");
                        None
                    }
                }
            })
            .collect();

        let failed = decoded.iter().filter(|d| d.is_none()).count();
        let frames = decoded.into_iter().flatten().collect();

        DecodedFrames { frames, failed }
    }
}
