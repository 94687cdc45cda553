use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Transcribe an audio/video file and write translated SRT subtitles beside it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input audio/video file, or a directory of media files
    pub input: PathBuf,

    /// Whisper model size (default: large-v3)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Source language code (default: ja)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Target language code (default: zh-cn)
    #[arg(short, long)]
    pub target_language: Option<String>,

    /// Maximum concurrent translation requests (default: logical core count)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(model) = &self.model {
            config.transcriber.model = model.clone();
        }
        if let Some(language) = &self.language {
            config.transcriber.language = language.clone();
        }
        if let Some(target) = &self.target_language {
            config.translate.target_language = target.clone();
        }
        if let Some(jobs) = self.jobs {
            config.translate.max_concurrency = Some(jobs);
        }
    }
}
