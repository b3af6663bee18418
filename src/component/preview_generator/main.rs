use super::ffmpeg_command::PreviewCommand;
use super::frame_demuxer::FrameDemuxer;
use super::mosaic_assembler::MosaicAssembler;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{locate_ffmpeg, validate_input_file};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use log::{info, warn};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 預覽圖生成器
///
/// 四階段流程：
/// A. 啟動 ffmpeg，把影格以 PNG 串流輸出到 stdout
/// B. 從串流切出每一張 PNG 的位元組區間
/// C. 平行解碼影格（失敗的影格略過並計數）
/// D. 以 100 張為一組拼成 10x10 預覽圖並輸出 JPEG
pub struct PreviewGenerator {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewGenerator {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 影片預覽圖生成 ===").cyan().bold());

        let input_path = PathBuf::from(self.prompt_input_path()?);
        validate_input_file(&input_path, &self.config.file_type_table)?;

        let output_template = self.prompt_output_template()?;

        // 外部工具解析失敗是致命錯誤，不啟動任何工作
        let ffmpeg_path = locate_ffmpeg(self.config.settings.ffmpeg_path.as_deref())?;

        let preview = &self.config.settings.preview;
        let command = PreviewCommand::new(
            &ffmpeg_path,
            &input_path,
            preview.frame_width,
            preview.frame_height,
            &preview.frequency,
        );

        println!("{}", style("擷取影格中...").dim());
        let mut child = command
            .build_command()
            .stdout(Stdio::piped())
            .spawn()
            .context("無法啟動 ffmpeg")?;

        let stdout = child
            .stdout
            .take()
            .context("無法取得 ffmpeg 輸出串流")?;

        // Stage B: 邊讀邊掃描，直到 ffmpeg 關閉輸出
        let demuxed = FrameDemuxer::new(stdout).scan()?;
        let status = child.wait().context("等待 ffmpeg 結束失敗")?;
        if !status.success() {
            warn!("ffmpeg 以非零狀態結束: {status}");
        }

        info!("串流中找到 {} 個影格", demuxed.ranges().len());
        println!(
            "{}",
            style(format!("找到 {} 個影格", demuxed.ranges().len())).green()
        );

        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!("收到中斷訊號，停止處理");
            return Ok(());
        }

        // Stage C: 平行解碼
        println!("{}", style("解碼影格中...").dim());
        let decoded = demuxed.decode_frames();
        if decoded.failed > 0 {
            println!(
                "{}",
                style(format!("{} 個影格解碼失敗，已略過", decoded.failed)).yellow()
            );
        }

        // Stage D: 拼貼輸出
        println!("{}", style("產生預覽圖中...").cyan());
        let assembler =
            MosaicAssembler::new(&output_template, self.config.settings.preview.jpeg_quality);
        let written = assembler.assemble(&decoded.frames)?;

        self.remember_input_path(&input_path);
        self.print_summary(decoded.frames.len(), decoded.failed, written.len());

        Ok(())
    }

    fn prompt_input_path(&self) -> Result<String> {
        let mut prompt = Input::new().with_prompt("請輸入影片檔案路徑");
        if let Some(recent) = self.config.settings.recent_paths.first() {
            prompt = prompt.default(recent.clone());
        }
        let path: String = prompt.interact_text()?;
        Ok(path.trim().to_string())
    }

    fn prompt_output_template(&self) -> Result<String> {
        let template: String = Input::new()
            .with_prompt("請輸入輸出檔名樣板（%n 會替換成起始影格編號）")
            .default(self.config.settings.preview.output_template.clone())
            .interact_text()?;
        Ok(template.trim().to_string())
    }

    fn remember_input_path(&self, input_path: &std::path::Path) {
        let mut settings = self.config.settings.clone();
        add_recent_path(&mut settings, &input_path.to_string_lossy());
        if let Err(e) = save_settings(&settings) {
            warn!("無法儲存設定: {e}");
        }
    }

    fn print_summary(&self, frames: usize, failed: usize, sheets: usize) {
        println!();
        println!("{}", style("=== 預覽圖生成摘要 ===").cyan().bold());
        println!("  影格: {} 張", frames);
        if failed > 0 {
            println!("  解碼失敗: {} 張", style(failed).yellow());
        }
        println!("  預覽圖: {} 張", style(sheets).green());

        info!("預覽圖生成完成 - 影格: {frames}, 失敗: {failed}, 輸出: {sheets}");
    }
}
