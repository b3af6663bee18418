use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// 解析 ffmpeg 可執行檔路徑
///
/// 優先使用設定中明確指定的路徑，否則從 PATH 尋找。
/// 找不到時為致命錯誤，呼叫端不應在此之後啟動任何工作。
pub fn locate_ffmpeg(override_path: Option<&str>) -> Result<PathBuf> {
    if let Some(configured) = override_path
        && !configured.trim().is_empty()
    {
        let path = PathBuf::from(configured);
        if !path.is_file() {
            bail!("設定中的 ffmpeg 路徑不存在: {}", path.display());
        }
        return Ok(path);
    }

    which::which("ffmpeg").context("找不到 ffmpeg，請先安裝或在設定中指定路徑")
}
