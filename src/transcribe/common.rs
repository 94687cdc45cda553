use serde::{Deserialize, Serialize};

use crate::config::VadConfig;

/// A single timed unit of transcribed speech
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    /// Text as transcribed in the source language
    pub text: String,
    /// Translated text, filled in once translation has been attempted
    pub translation: Option<String>,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            translation: None,
        }
    }

    /// Text shown in the subtitle: the translation, or the original until one exists
    pub fn display_text(&self) -> &str {
        self.translation.as_deref().unwrap_or(&self.text)
    }
}

/// Ordered segments produced by one transcription run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcription {
    pub segments: Vec<Segment>,
    pub language: String,
}

/// faster-whisper JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FasterWhisperOutput {
    #[serde(default)]
    pub text: String,
    pub segments: Vec<FasterWhisperSegment>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FasterWhisperSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
    #[serde(default)]
    pub words: Option<Vec<FasterWhisperWord>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FasterWhisperWord {
    pub start: f64,
    pub end: f64,
    pub word: String,
    pub probability: Option<f64>,
}

impl FasterWhisperOutput {
    /// Convert into a transcription, falling back to `language` when the output omits it
    pub fn into_transcription(self, language: &str) -> Transcription {
        let segments = self
            .segments
            .into_iter()
            .map(|seg| Segment::new(seg.start, seg.end, seg.text.trim()))
            .collect();

        Transcription {
            segments,
            language: self.language.unwrap_or_else(|| language.to_string()),
        }
    }
}

impl VadConfig {
    /// Command-line arguments selecting voice-activity detection
    pub fn to_args(&self) -> Vec<String> {
        if !self.enabled {
            return vec!["--vad_filter".to_string(), "False".to_string()];
        }

        let max_speech = match self.max_speech_duration_s {
            Some(seconds) => seconds.to_string(),
            None => "inf".to_string(),
        };

        vec![
            "--vad_filter".to_string(), "True".to_string(),
            "--vad_threshold".to_string(), self.threshold.to_string(),
            "--vad_speech_pad_ms".to_string(), self.speech_pad_ms.to_string(),
            "--vad_max_speech_duration_s".to_string(), max_speech,
            "--vad_min_speech_duration_ms".to_string(), self.min_speech_duration_ms.to_string(),
            "--vad_min_silence_duration_ms".to_string(), self.min_silence_duration_ms.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_falls_back_to_original() {
        let mut segment = Segment::new(0.0, 1.5, "こんにちは");
        assert_eq!(segment.display_text(), "こんにちは");

        segment.translation = Some("你好".to_string());
        assert_eq!(segment.display_text(), "你好");
    }

    #[test]
    fn test_parse_output() {
        let json = r#"{
            "text": " こんにちは ありがとう",
            "segments": [
                {"id": 0, "start": 0.0, "end": 1.5, "text": " こんにちは",
                 "words": [{"start": 0.0, "end": 1.5, "word": "こんにちは", "probability": 0.98}]},
                {"id": 1, "start": 1.5, "end": 3.0, "text": " ありがとう"}
            ],
            "language": "ja"
        }"#;

        let output: FasterWhisperOutput = serde_json::from_str(json).unwrap();
        let transcription = output.into_transcription("en");

        assert_eq!(transcription.language, "ja");
        assert_eq!(transcription.segments, vec![
            Segment::new(0.0, 1.5, "こんにちは"),
            Segment::new(1.5, 3.0, "ありがとう"),
        ]);
    }

    #[test]
    fn test_parse_output_without_language() {
        let json = r#"{"segments": []}"#;
        let output: FasterWhisperOutput = serde_json::from_str(json).unwrap();
        let transcription = output.into_transcription("ja");
        assert_eq!(transcription.language, "ja");
        assert!(transcription.segments.is_empty());
    }

    #[test]
    fn test_vad_args() {
        let args = VadConfig::default().to_args();
        assert_eq!(args, vec![
            "--vad_filter", "True",
            "--vad_threshold", "0.35",
            "--vad_speech_pad_ms", "400",
            "--vad_max_speech_duration_s", "inf",
            "--vad_min_speech_duration_ms", "200",
            "--vad_min_silence_duration_ms", "500",
        ]);

        let disabled = VadConfig { enabled: false, ..VadConfig::default() };
        assert_eq!(disabled.to_args(), vec!["--vad_filter", "False"]);
    }
}
