use std::path::{Path, PathBuf};

/// 一個轉檔變體的不可變描述
///
/// 輸出檔名規則：輸入檔名第一個 `.` 之前的部分接上畫質數字，
/// 副檔名固定為 mp4，放在呼叫端指定的輸出資料夾
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// 目標垂直解析度
    pub quality: u32,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub use_acceleration: bool,
}

impl JobSpec {
    #[must_use]
    pub fn new(input_path: &Path, quality: u32, output_dir: &Path, use_acceleration: bool) -> Self {
        let output_path = output_dir.join(format!("{}{}.mp4", Self::base_name(input_path), quality));
        Self {
            quality,
            input_path: input_path.to_path_buf(),
            output_path,
            use_acceleration,
        }
    }

    fn base_name(path: &Path) -> &str {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        name.split('.').next().unwrap_or(name)
    }
}
