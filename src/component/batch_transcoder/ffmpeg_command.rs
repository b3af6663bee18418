use super::job_spec::JobSpec;
use super::task_scheduler::EncodeJob;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 依 JobSpec 組出單一變體的 ffmpeg 轉檔命令
pub struct TranscodeCommand {
    ffmpeg_path: PathBuf,
    spec: JobSpec,
}

impl TranscodeCommand {
    #[must_use]
    pub fn new(ffmpeg_path: &Path, spec: JobSpec) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.to_path_buf(),
            spec,
        }
    }

    #[must_use]
    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }
}

impl EncodeJob for TranscodeCommand {
    fn label(&self) -> String {
        format!(
            "{}p -> {}",
            self.spec.quality,
            self.spec.output_path.display()
        )
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);

        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]);
        cmd.arg("-i").arg(&self.spec.input_path);
        cmd.arg("-vf")
            .arg(format!("scale=-2:{}", self.spec.quality));

        if self.spec.use_acceleration {
            cmd.args(["-c:v", "h264_nvenc", "-preset", "p4"]);
        } else {
            cmd.args(["-c:v", "libx264", "-preset", "fast"]);
        }

        cmd.args(["-c:a", "aac", "-b:a", "128k", "-movflags", "+faststart"]);
        cmd.arg(&self.spec.output_path);

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_software_encode_by_default() {
        let spec = JobSpec::new(Path::new("a.mkv"), 720, Path::new("out"), false);
        let cmd = TranscodeCommand::new(Path::new("ffmpeg"), spec).build_command();

        let args = args_of(&cmd);
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"scale=-2:720".to_string()));
        assert!(!args.contains(&"h264_nvenc".to_string()));
    }

    #[test]
    fn test_nvenc_when_acceleration_enabled() {
        let spec = JobSpec::new(Path::new("a.mkv"), 1080, Path::new("out"), true);
        let cmd = TranscodeCommand::new(Path::new("ffmpeg"), spec).build_command();

        assert!(args_of(&cmd).contains(&"h264_nvenc".to_string()));
    }
}
