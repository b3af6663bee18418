use anyhow::{Context, Result, bail};
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, imageops};
use indicatif::ProgressBar;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// 預設網格配置：10 欄 x 10 列 = 100 張影格
pub const GRID_COLS: usize = 10;
pub const GRID_ROWS: usize = 10;
pub const FRAMES_PER_SHEET: usize = GRID_COLS * GRID_ROWS;

/// 預覽圖拼貼器
///
/// 把依序排列的影格以 100 張為一組拼成 10x10 的預覽圖，
/// 每組輸出一個 JPEG 檔，檔名樣板中的 %n 會被替換成該組的起始影格編號。
///
/// 前置條件：所有影格尺寸一致，畫布大小取自整個序列的第一張影格。
pub struct MosaicAssembler {
    output_template: String,
    jpeg_quality: u8,
}

impl MosaicAssembler {
    #[must_use]
    pub fn new(output_template: &str, jpeg_quality: u8) -> Self {
        Self {
            output_template: output_template.to_string(),
            jpeg_quality,
        }
    }

    /// 依輸入順序逐組拼貼並寫出，回傳所有輸出檔路徑
    ///
    /// 空的影格序列是前置條件違反，直接回報錯誤而不是默默不輸出
    pub fn assemble(&self, frames: &[RgbImage]) -> Result<Vec<PathBuf>> {
        if frames.is_empty() {
            bail!("沒有任何可用影格，無法產生預覽圖");
        }

        let (frame_w, frame_h) = frames[0].dimensions();
        let sheet_total = frames.len().div_ceil(FRAMES_PER_SHEET);
        let progress = ProgressBar::new(sheet_total as u64);

        let mut written = Vec::with_capacity(sheet_total);
        for (sheet_index, group) in frames.chunks(FRAMES_PER_SHEET).enumerate() {
            let start_frame = sheet_index * FRAMES_PER_SHEET;
            let canvas = compose_sheet(group, frame_w, frame_h);

            let path = self.output_path(start_frame);
            self.save_jpeg(&canvas, &path)?;
            info!("已寫出預覽圖: {}", path.display());

            written.push(path);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(written)
    }

    /// 將樣板中的 %n 替換成起始影格編號
    #[must_use]
    pub fn output_path(&self, start_frame: usize) -> PathBuf {
        PathBuf::from(
            self.output_template
                .replace("%n", &start_frame.to_string()),
        )
    }

    fn save_jpeg(&self, canvas: &RgbImage, path: &std::path::Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("無法建立預覽圖檔案: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality);

        canvas
            .write_with_encoder(encoder)
            .with_context(|| format!("JPEG 編碼失敗: {}", path.display()))?;
        Ok(())
    }
}

/// 把一組（至多 100 張）影格拼成一張畫布
///
/// 組內第 j 張放在 row = j / 10、col = j % 10 的格子，
/// 不足一組時剩餘的格子維持畫布底色
#[must_use]
pub fn compose_sheet(group: &[RgbImage], frame_w: u32, frame_h: u32) -> RgbImage {
    let mut canvas = RgbImage::new(frame_w * GRID_COLS as u32, frame_h * GRID_ROWS as u32);

    for (j, frame) in group.iter().take(FRAMES_PER_SHEET).enumerate() {
        let (row, col) = cell_position(j);
        imageops::replace(
            &mut canvas,
            frame,
            (col as u32 * frame_w) as i64,
            (row as u32 * frame_h) as i64,
        );
    }

    canvas
}

/// 組內索引對應的 (row, col)
#[must_use]
pub const fn cell_position(local_index: usize) -> (usize, usize) {
    (local_index / GRID_COLS, local_index % GRID_COLS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(color))
    }

    #[test]
    fn test_cell_position() {
        assert_eq!(cell_position(0), (0, 0));
        assert_eq!(cell_position(9), (0, 9));
        assert_eq!(cell_position(10), (1, 0));
        assert_eq!(cell_position(99), (9, 9));
    }

    #[test]
    fn test_compose_sheet_places_frames_row_major() {
        let frames = vec![
            solid(4, 2, [255, 0, 0]),
            solid(4, 2, [0, 255, 0]),
            solid(4, 2, [0, 0, 255]),
        ];
        let canvas = compose_sheet(&frames, 4, 2);

        assert_eq!(canvas.dimensions(), (40, 20));
        // j=0 -> (row 0, col 0)、j=1 -> (row 0, col 1)、j=2 -> (row 0, col 2)
        assert_eq!(canvas.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(canvas.get_pixel(4, 0), &Rgb([0, 255, 0]));
        assert_eq!(canvas.get_pixel(8, 1), &Rgb([0, 0, 255]));
        // 沒有影格的格子維持底色
        assert_eq!(canvas.get_pixel(12, 0), &Rgb([0, 0, 0]));
        assert_eq!(canvas.get_pixel(0, 2), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_compose_sheet_second_row() {
        // 第 10 張（j=10）應落在第二列開頭
        let mut frames = vec![solid(2, 2, [1, 1, 1]); 10];
        frames.push(solid(2, 2, [200, 100, 50]));

        let canvas = compose_sheet(&frames, 2, 2);
        assert_eq!(canvas.get_pixel(0, 2), &Rgb([200, 100, 50]));
    }

    #[test]
    fn test_assemble_partitions_into_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("pre%n.jpg");
        let assembler = MosaicAssembler::new(template.to_str().unwrap(), 80);

        // 205 張 -> 3 張預覽圖，起始編號 0 / 100 / 200
        let frames = vec![solid(2, 2, [5, 5, 5]); 205];
        let written = assembler.assemble(&frames).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written[0], dir.path().join("pre0.jpg"));
        assert_eq!(written[1], dir.path().join("pre100.jpg"));
        assert_eq!(written[2], dir.path().join("pre200.jpg"));
        for path in &written {
            assert!(path.is_file());
        }
    }

    #[test]
    fn test_assemble_exact_multiple() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("p%n.jpg");
        let assembler = MosaicAssembler::new(template.to_str().unwrap(), 80);

        let frames = vec![solid(1, 1, [9, 9, 9]); 100];
        let written = assembler.assemble(&frames).unwrap();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_assemble_empty_is_error() {
        let assembler = MosaicAssembler::new("pre%n.jpg", 80);
        let err = assembler.assemble(&[]).unwrap_err();
        assert!(err.to_string().contains("沒有任何可用影格"));
    }

    #[test]
    fn test_output_path_substitution() {
        let assembler = MosaicAssembler::new("out/pre%n.jpg", 80);
        assert_eq!(assembler.output_path(200), PathBuf::from("out/pre200.jpg"));
    }
}
