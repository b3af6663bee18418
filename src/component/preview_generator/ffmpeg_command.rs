use std::path::{Path, PathBuf};
use std::process::Command;

/// 組出把影格以 PNG 串流輸出到 stdout 的 ffmpeg 命令
pub struct PreviewCommand {
    ffmpeg_path: PathBuf,
    input_path: PathBuf,
    frame_width: i32,
    frame_height: i32,
    frequency: String,
}

impl PreviewCommand {
    #[must_use]
    pub fn new(
        ffmpeg_path: &Path,
        input_path: &Path,
        frame_width: i32,
        frame_height: i32,
        frequency: &str,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.to_path_buf(),
            input_path: input_path.to_path_buf(),
            frame_width,
            frame_height,
            frequency: frequency.to_string(),
        }
    }

    /// 呼叫端負責把 stdout 設成 piped 並接上解多工器
    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);

        cmd.args(["-hide_banner", "-loglevel", "error"]);
        cmd.arg("-i").arg(&self.input_path);
        cmd.arg("-vf").arg(format!(
            "scale={}:{}, fps={}",
            self.frame_width, self.frame_height, self.frequency
        ));
        cmd.args(["-c:v", "png", "-f", "image2pipe", "-"]);

        cmd
    }
}
