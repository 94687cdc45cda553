use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::TranscriberConfig;
use crate::error::{Result, TransubError};
use super::{Transcriber, common::{FasterWhisperOutput, Transcription}};

/// Transcriber backed by the faster-whisper command-line front end
pub struct FasterWhisperTranscriber {
    config: TranscriberConfig,
}

impl FasterWhisperTranscriber {
    pub fn new(config: TranscriberConfig) -> Self {
        Self { config }
    }

    /// Arguments for one transcription run writing JSON into `output_dir`
    pub fn build_args(&self, input_path: &Path, language: &str, output_dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            input_path.into(),
            "--model".into(), self.config.model.clone().into(),
            "--language".into(), language.into(),
            "--output_dir".into(), output_dir.into(),
            "--output_format".into(), "json".into(),
            "--verbose".into(), "True".into(),
        ];

        if self.config.word_timestamps {
            args.push("--word_timestamps".into());
            args.push("True".into());
        }

        if let Some(device) = &self.config.device {
            args.push("--device".into());
            args.push(device.into());
        }

        args.extend(self.config.vad.to_args().into_iter().map(OsString::from));
        args
    }

    /// Read the JSON result the transcriber wrote for `input_path`
    async fn read_output(&self, input_path: &Path, language: &str, output_dir: &Path) -> Result<Transcription> {
        let stem = input_path.file_stem()
            .ok_or_else(|| TransubError::Transcription("Invalid input filename".to_string()))?;
        let json_file = output_dir.join(format!("{}.json", stem.to_string_lossy()));

        let json_content = tokio::fs::read_to_string(&json_file).await
            .map_err(|e| TransubError::Transcription(format!(
                "Failed to read transcriber output {}: {}", json_file.display(), e
            )))?;

        let output: FasterWhisperOutput = serde_json::from_str(&json_content)
            .map_err(|e| TransubError::Transcription(format!("Failed to parse transcriber JSON: {}", e)))?;

        Ok(output.into_transcription(language))
    }
}

/// Whether a runner stdout line reports a transcribed segment (`[00:00.000 --> 00:01.500] text`)
fn is_segment_line(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with('[') && line.split(']').next().is_some_and(|stamp| stamp.contains("-->"))
}

/// Segments are shown as they are produced; other runner chatter only when verbose
fn echo_line(line: &str) {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return;
    }

    if is_segment_line(line) {
        info!("{}", line.trim_start());
    } else {
        debug!("transcriber: {}", line);
    }
}

#[async_trait]
impl Transcriber for FasterWhisperTranscriber {
    async fn load(&self) -> Result<()> {
        info!("Loading model: {}", self.config.model);

        let output = Command::new(&self.config.binary_path)
            .arg("--help")
            .output()
            .await
            .map_err(|e| TransubError::Transcription(format!(
                "{} not found: {}", self.config.binary_path, e
            )))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransubError::Transcription(format!(
                "{} is not usable. Install with: pip install whisper-ctranslate2\nError: {}",
                self.config.binary_path, stderr
            )));
        }

        Ok(())
    }

    async fn transcribe(&self, input_path: &Path, language: &str) -> Result<Transcription> {
        info!("Transcribing file: {}", input_path.display());

        let temp_dir = tempfile::tempdir()
            .map_err(|e| TransubError::Transcription(format!("Failed to create temp directory: {}", e)))?;

        let mut child = Command::new(&self.config.binary_path)
            .args(self.build_args(input_path, language, temp_dir.path()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TransubError::Transcription(format!(
                "Failed to execute {}: {}", self.config.binary_path, e
            )))?;

        let stdout = child.stdout.take()
            .ok_or_else(|| TransubError::Transcription("Transcriber stdout unavailable".to_string()))?;
        let mut stderr = child.stderr.take()
            .ok_or_else(|| TransubError::Transcription("Transcriber stderr unavailable".to_string()))?;

        // Both pipes are drained to EOF as raw bytes so neither fills up and stalls the
        // child; the runner's output encoding follows its locale
        let echo = async {
            let mut lines = BufReader::new(stdout).split(b'\n');
            loop {
                match lines.next_segment().await {
                    Ok(Some(bytes)) => echo_line(&String::from_utf8_lossy(&bytes)),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Failed to read transcriber output: {}", e);
                        break;
                    }
                }
            }
        };
        let collect_stderr = async {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).into_owned()
        };
        let ((), stderr_text) = tokio::join!(echo, collect_stderr);

        let status = child.wait().await?;
        if !status.success() {
            return Err(TransubError::Transcription(format!(
                "{} exited with {}: {}", self.config.binary_path, status, stderr_text.trim()
            )));
        }

        info!("Collecting transcribed segments...");
        let transcription = self.read_output(input_path, language, temp_dir.path()).await?;
        for segment in &transcription.segments {
            debug!("[{:.2}s -> {:.2}s] {}", segment.start, segment.end, segment.text);
        }

        info!("Transcription completed: {} segments", transcription.segments.len());
        Ok(transcription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VadConfig;
    use crate::transcribe::Segment;

    fn transcriber(binary_path: &str) -> FasterWhisperTranscriber {
        FasterWhisperTranscriber::new(TranscriberConfig {
            binary_path: binary_path.to_string(),
            ..TranscriberConfig::default()
        })
    }

    #[test]
    fn test_build_args() {
        let args = transcriber("whisper-ctranslate2")
            .build_args(Path::new("video.mp4"), "ja", Path::new("/tmp/out"));
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(args[0], "video.mp4");
        let pair = |flag: &str| {
            let pos = args.iter().position(|a| a == flag).unwrap_or_else(|| panic!("missing {}", flag));
            args[pos + 1].clone()
        };
        assert_eq!(pair("--model"), "large-v3");
        assert_eq!(pair("--language"), "ja");
        assert_eq!(pair("--output_dir"), "/tmp/out");
        assert_eq!(pair("--output_format"), "json");
        assert_eq!(pair("--word_timestamps"), "True");
        assert_eq!(pair("--vad_filter"), "True");
        assert_eq!(pair("--vad_threshold"), "0.35");
        assert_eq!(pair("--vad_max_speech_duration_s"), "inf");
        assert!(!args.iter().any(|a| a == "--device"));
    }

    #[test]
    fn test_build_args_with_device_and_no_vad() {
        let transcriber = FasterWhisperTranscriber::new(TranscriberConfig {
            device: Some("cuda".to_string()),
            word_timestamps: false,
            vad: VadConfig { enabled: false, ..VadConfig::default() },
            ..TranscriberConfig::default()
        });
        let args: Vec<String> = transcriber
            .build_args(Path::new("a.wav"), "en", Path::new("out"))
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert!(args.windows(2).any(|w| w[0] == "--device" && w[1] == "cuda"));
        assert!(args.windows(2).any(|w| w[0] == "--vad_filter" && w[1] == "False"));
        assert!(!args.iter().any(|a| a == "--word_timestamps"));
        assert!(!args.iter().any(|a| a == "--vad_threshold"));
    }

    #[tokio::test]
    async fn test_load_fails_for_missing_binary() {
        let result = transcriber("transub-no-such-transcriber").load().await;
        assert!(matches!(result, Err(TransubError::Transcription(_))));
    }

    #[tokio::test]
    async fn test_transcribe_fails_for_missing_binary() {
        let result = transcriber("transub-no-such-transcriber")
            .transcribe(Path::new("video.mp4"), "ja")
            .await;
        assert!(matches!(result, Err(TransubError::Transcription(_))));
    }

    #[tokio::test]
    async fn test_read_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("video.json"),
            r#"{"text": "x", "segments": [{"start": 0.0, "end": 1.5, "text": " こんにちは"}], "language": "ja"}"#,
        )
        .unwrap();

        let transcription = transcriber("whisper-ctranslate2")
            .read_output(Path::new("/somewhere/video.mp4"), "ja", dir.path())
            .await
            .unwrap();
        assert_eq!(transcription.segments, vec![Segment::new(0.0, 1.5, "こんにちは")]);
    }

    #[tokio::test]
    async fn test_read_output_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = transcriber("whisper-ctranslate2")
            .read_output(Path::new("video.mp4"), "ja", dir.path())
            .await;
        assert!(matches!(result, Err(TransubError::Transcription(_))));
    }

    #[test]
    fn test_is_segment_line() {
        assert!(is_segment_line("[00:00.000 --> 00:01.500] こんにちは"));
        assert!(is_segment_line("  [01:02:05.678 --> 01:02:07.000]"));
        assert!(!is_segment_line("Detected language 'Japanese' with probability 1.00"));
        assert!(!is_segment_line("[INFO] loading model"));
        assert!(!is_segment_line(""));
    }

    /// Shell script standing in for the runner: invoked as `sh <script> --model ...`,
    /// it prints a non-UTF-8 line and enough output to overflow a pipe buffer before
    /// writing its JSON result
    const NOISY_RUNNER: &str = r#"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output_dir" ]; then out="$2"; fi
  shift
done
printf 'bad \377\376 line\n'
i=0
while [ $i -lt 5000 ]; do
  printf '[00:00.000 --> 00:01.500] filler line %d\n' $i
  i=$((i+1))
done
printf '\377 on stderr\n' >&2
printf '{"segments":[{"start":0.0,"end":1.5,"text":" \343\201\223\343\202\223\343\201\253\343\201\241\343\201\257"}],"language":"ja"}' > "$out/video.json"
"#;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_survives_non_utf8_output() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("video.sh");
        std::fs::write(&script, NOISY_RUNNER).unwrap();

        let transcription = transcriber("sh").transcribe(&script, "ja").await.unwrap();

        assert_eq!(transcription.language, "ja");
        assert_eq!(transcription.segments, vec![Segment::new(0.0, 1.5, "こんにちは")]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_transcribe_reports_runner_failure() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("video.sh");
        std::fs::write(&script, "printf 'model \\377 missing\\n' >&2\nexit 3\n").unwrap();

        let result = transcriber("sh").transcribe(&script, "ja").await;
        match result {
            Err(TransubError::Transcription(message)) => assert!(message.contains("model")),
            other => panic!("expected transcription error, got {:?}", other),
        }
    }
}
