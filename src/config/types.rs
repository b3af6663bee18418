use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const MAX_RECENT_PATHS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 預覽圖生成設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// 輸出檔名樣板，%n 會被替換成該張預覽圖的起始影格編號
    pub output_template: String,
    pub jpeg_quality: u8,
    /// 擷取影格寬度，-2 表示依比例自動
    pub frame_width: i32,
    /// 擷取影格高度，-1 表示依比例自動
    pub frame_height: i32,
    /// 擷取頻率，例如 "1/2" 表示每兩秒一張
    pub frequency: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            output_template: "pre%n.jpg".to_string(),
            jpeg_quality: 20,
            frame_width: -2,
            frame_height: 60,
            frequency: "1".to_string(),
        }
    }
}

/// 批次轉檔設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderSettings {
    /// 同時執行的 ffmpeg 程序數上限
    pub concurrency: usize,
    /// 要產生的畫質階梯（目標垂直解析度）
    pub quality_ladder: Vec<u32>,
    /// 使用 NVENC 硬體加速
    pub use_acceleration: bool,
    pub output_dir: String,
}

impl Default for TranscoderSettings {
    fn default() -> Self {
        Self {
            concurrency: 2,
            quality_ladder: vec![1080, 720, 480],
            use_acceleration: false,
            output_dir: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub preview: PreviewSettings,
    pub transcoder: TranscoderSettings,
    /// 明確指定的 ffmpeg 路徑，未設定時從 PATH 尋找
    pub ffmpeg_path: Option<String>,
    pub recent_paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        let table = FileTypeTable {
            video_file: vec![".mkv".to_string(), ".mp4".to_string(), ".m4v".to_string()],
        };

        assert!(table.is_video_file(Path::new("/videos/a.mkv")));
        assert!(table.is_video_file(Path::new("/videos/a.MP4")));
        assert!(!table.is_video_file(Path::new("/videos/a.avi")));
        assert!(!table.is_video_file(Path::new("/videos/noext")));
    }

    #[test]
    fn test_settings_defaults() {
        let settings = UserSettings::default();
        assert_eq!(settings.preview.output_template, "pre%n.jpg");
        assert_eq!(settings.preview.jpeg_quality, 20);
        assert_eq!(settings.transcoder.concurrency, 2);
        assert_eq!(settings.transcoder.quality_ladder, vec![1080, 720, 480]);
        assert!(!settings.transcoder.use_acceleration);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = UserSettings::default();
        settings.transcoder.concurrency = 4;
        settings.ffmpeg_path = Some("/opt/ffmpeg/bin/ffmpeg".to_string());

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: UserSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.transcoder.concurrency, 4);
        assert_eq!(parsed.ffmpeg_path.as_deref(), Some("/opt/ffmpeg/bin/ffmpeg"));
    }

    #[test]
    fn test_settings_parse_partial_json() {
        // 舊版設定檔缺欄位時應回退到預設值
        let parsed: UserSettings = serde_json::from_str(r#"{"recent_paths":["/tmp/a.mkv"]}"#).unwrap();
        assert_eq!(parsed.recent_paths, vec!["/tmp/a.mkv".to_string()]);
        assert_eq!(parsed.preview.frame_height, 60);
    }
}
