use super::ffmpeg_command::TranscodeCommand;
use super::job_spec::JobSpec;
use super::task_scheduler::{TaskScheduler, TaskStatus, TranscodeTask};
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{ensure_directory_exists, locate_ffmpeg, validate_input_file};
use anyhow::Result;
use console::style;
use dialoguer::Input;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 批次轉檔器
///
/// 對單一輸入檔依畫質階梯建立多個轉檔工作，
/// 交給固定槽位的排程器以設定的併發上限同時執行
pub struct BatchTranscoder {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl BatchTranscoder {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&self) -> Result<()> {
        println!("{}", style("=== 影片批次轉檔 ===").cyan().bold());

        let input_path = PathBuf::from(self.prompt_input_path()?);
        validate_input_file(&input_path, &self.config.file_type_table)?;

        let output_dir = PathBuf::from(self.prompt_output_dir()?);
        ensure_directory_exists(&output_dir)?;

        let ffmpeg_path = locate_ffmpeg(self.config.settings.ffmpeg_path.as_deref())?;

        let transcoder = &self.config.settings.transcoder;
        let jobs: Vec<TranscodeCommand> = transcoder
            .quality_ladder
            .iter()
            .map(|quality| {
                let spec = JobSpec::new(
                    &input_path,
                    *quality,
                    &output_dir,
                    transcoder.use_acceleration,
                );
                TranscodeCommand::new(&ffmpeg_path, spec)
            })
            .collect();

        println!(
            "{}",
            style(format!(
                "共 {} 個變體（{}），併發上限 {}{}",
                jobs.len(),
                transcoder
                    .quality_ladder
                    .iter()
                    .map(|q| format!("{q}p"))
                    .collect::<Vec<_>>()
                    .join("/"),
                transcoder.concurrency,
                if transcoder.use_acceleration {
                    "，使用 NVENC"
                } else {
                    ""
                }
            ))
            .green()
        );
        println!("{}", style("開始轉檔任務...").cyan());

        let mut scheduler = TaskScheduler::new(
            jobs,
            transcoder.concurrency,
            Arc::clone(&self.shutdown_signal),
        )?;
        scheduler.run()?;

        self.remember_input_path(&input_path);
        self.print_summary(scheduler.tasks());

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

    fn prompt_output_dir(&self) -> Result<String> {
        let default_dir = if self.config.settings.transcoder.output_dir.is_empty() {
            ".".to_string()
        } else {
            self.config.settings.transcoder.output_dir.clone()
        };

        let dir: String = Input::new()
            .with_prompt("請輸入輸出資料夾")
            .default(default_dir)
            .interact_text()?;
        Ok(dir.trim().to_string())
    }

    fn remember_input_path(&self, input_path: &std::path::Path) {
        let mut settings = self.config.settings.clone();
        add_recent_path(&mut settings, &input_path.to_string_lossy());
        if let Err(e) = save_settings(&settings) {
            warn!("無法儲存設定: {e}");
        }
    }

    /// 整批結束後彙整結果，失敗的變體逐一列出
    fn print_summary(&self, tasks: &[TranscodeTask<TranscodeCommand>]) {
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        let failed: Vec<_> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .collect();

        println!();
        println!("{}", style("=== 轉檔任務摘要 ===").cyan().bold());
        println!("  總計: {} 個變體", tasks.len());
        println!("  成功: {} 個", style(completed).green());
        if !failed.is_empty() {
            println!("  失敗: {} 個", style(failed.len()).red());
            for task in &failed {
                println!(
                    "    {} {}",
                    style("✗").red(),
                    task.job.spec().output_path.display()
                );
            }
        }

        info!("轉檔任務完成 - 成功: {completed}, 失敗: {}", failed.len());
    }
}
