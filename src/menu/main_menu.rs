use crate::config::save::save_settings;
use crate::config::types::Config;
use crate::menu::handlers::{run_batch_transcoder, run_preview_generator};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== 影片批次工具 ===").cyan().bold());
    println!("{}", style("按 ESC 返回上一層").dim());

    let options = vec!["預覽圖生成", "批次轉檔", "設定", "離開"];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_preview_generator(term, shutdown_signal)?;
            Ok(true)
        }
        Some(1) => {
            run_batch_transcoder(term, shutdown_signal)?;
            Ok(true)
        }
        Some(2) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(3) => Ok(false),
        None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style("=== 設定 ===").cyan().bold());
        println!("{}", style("按 ESC 返回上一層").dim());

        let options = vec!["轉檔設定", "預覽圖設定", "返回"];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇設定項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_transcoder_settings_menu(term, config)?,
            Some(1) => show_preview_settings_menu(term, config)?,
            Some(2) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 批次轉檔設定選單
fn show_transcoder_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style("=== 轉檔設定 ===").cyan().bold());
    println!(
        "\n{} 併發 {}，NVENC: {}",
        style("目前設定:").dim(),
        config.settings.transcoder.concurrency,
        if config.settings.transcoder.use_acceleration {
            "開"
        } else {
            "關"
        }
    );
    println!();

    let concurrency: usize = Input::new()
        .with_prompt("同時執行的轉檔程序數")
        .default(config.settings.transcoder.concurrency)
        .validate_with(|value: &usize| {
            if *value >= 1 {
                Ok(())
            } else {
                Err("必須至少為 1")
            }
        })
        .interact_text()?;

    let accel_items = vec!["關閉（libx264）", "開啟（h264_nvenc）"];
    let accel_selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("NVENC 硬體加速")
        .items(&accel_items)
        .default(usize::from(config.settings.transcoder.use_acceleration))
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(accel_selection) = accel_selection else {
        return Ok(());
    };

    config.settings.transcoder.concurrency = concurrency;
    config.settings.transcoder.use_acceleration = accel_selection == 1;
    save_settings(&config.settings)?;
    println!("\n{}", style("設定已儲存").green());
    std::thread::sleep(std::time::Duration::from_secs(1));

    Ok(())
}

/// 預覽圖設定選單
fn show_preview_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style("=== 預覽圖設定 ===").cyan().bold());
    println!(
        "\n{} JPEG 品質 {}，頻率 {}",
        style("目前設定:").dim(),
        config.settings.preview.jpeg_quality,
        config.settings.preview.frequency
    );
    println!();

    let quality: u8 = Input::new()
        .with_prompt("JPEG 品質 (1-100)")
        .default(config.settings.preview.jpeg_quality)
        .validate_with(|value: &u8| {
            if (1..=100).contains(value) {
                Ok(())
            } else {
                Err("必須在 1 到 100 之間")
            }
        })
        .interact_text()?;

    let frequency: String = Input::new()
        .with_prompt("擷取頻率（例如 1 或 1/2）")
        .default(config.settings.preview.frequency.clone())
        .interact_text()?;

    config.settings.preview.jpeg_quality = quality;
    config.settings.preview.frequency = frequency.trim().to_string();
    save_settings(&config.settings)?;
    println!("\n{}", style("設定已儲存").green());
    std::thread::sleep(std::time::Duration::from_secs(1));

    Ok(())
}
