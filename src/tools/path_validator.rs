use crate::config::FileTypeTable;
use anyhow::{Result, bail};
use std::path::Path;

/// 驗證輸入影片檔案：必須存在、是一般檔案、且副檔名在支援清單內
///
/// 所有檢查都在啟動任何外部程序之前完成
pub fn validate_input_file(path: &Path, file_type_table: &FileTypeTable) -> Result<()> {
    if !path.exists() {
        bail!("檔案不存在: {}", path.display());
    }
    if !path.is_file() {
        bail!("路徑不是檔案: {}", path.display());
    }
    if !file_type_table.is_video_file(path) {
        bail!("不支援的檔案格式: {}", path.display());
    }
    Ok(())
}

pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
