use crate::component::{BatchTranscoder, PreviewGenerator};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_preview_generator(term: &Term, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let config = Config::new()?;
    let generator = PreviewGenerator::new(config, Arc::clone(shutdown_signal));

    if let Err(e) = generator.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_batch_transcoder(term: &Term, shutdown_signal: &Arc<AtomicBool>) -> Result<()> {
    let config = Config::new()?;
    let transcoder = BatchTranscoder::new(config, Arc::clone(shutdown_signal));

    if let Err(e) = transcoder.run() {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
    }

    pause(term)?;
    Ok(())
}
