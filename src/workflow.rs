use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, TransubError};
use crate::subtitle::{srt_path_for, write_srt};
use crate::transcribe::{Transcriber, TranscriberFactory};
use crate::translate::{Translator, TranslatorFactory, translate_segments};

/// Extensions picked up when the input is a directory
const MEDIA_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm",
    "mp3", "wav", "m4a", "flac", "ogg", "aac", "opus",
];

/// Load model → transcribe → translate → write, each phase finishing before the next
pub struct Workflow {
    config: Config,
    transcriber: Box<dyn Transcriber>,
    translator: Arc<dyn Translator>,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let transcriber = TranscriberFactory::create_transcriber(config.transcriber.clone());
        let translator = TranslatorFactory::create_translator(&config.translate)?;

        Ok(Self::with_components(config, transcriber, translator))
    }

    pub fn with_components(
        config: Config,
        transcriber: Box<dyn Transcriber>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            config,
            transcriber,
            translator,
        }
    }

    /// Process a file, or every media file under a directory.
    ///
    /// Returns the subtitle files written.
    pub async fn run<P: AsRef<Path>>(&self, input_path: P) -> Result<Vec<PathBuf>> {
        let input_path = input_path.as_ref();

        if !input_path.exists() {
            return Err(TransubError::FileNotFound(input_path.display().to_string()));
        }

        self.transcriber.load().await?;

        if input_path.is_dir() {
            self.process_directory(input_path).await
        } else {
            Ok(vec![self.process_file(input_path).await?])
        }
    }

    /// Transcribe, translate and write subtitles for a single file
    pub async fn process_file(&self, input_path: &Path) -> Result<PathBuf> {
        let language = &self.config.transcriber.language;
        let target_language = &self.config.translate.target_language;

        let mut transcription = self.transcriber.transcribe(input_path, language).await?;

        info!("Translating into {}", target_language);
        translate_segments(
            Arc::clone(&self.translator),
            &mut transcription.segments,
            language,
            target_language,
            self.config.translate.concurrency(),
        )
        .await;

        let srt_path = write_srt(&transcription.segments, input_path).await?;
        info!("Done! SRT file saved to: {}", srt_path.display());
        Ok(srt_path)
    }

    /// Process every media file under `input_dir` that has no subtitle yet
    async fn process_directory(&self, input_dir: &Path) -> Result<Vec<PathBuf>> {
        info!("Processing directory: {}", input_dir.display());

        let media_files = find_media_files(input_dir);
        info!("Found {} media files", media_files.len());

        let mut written = Vec::new();
        for media_path in media_files {
            if srt_path_for(&media_path)?.exists() {
                info!("Skipping {} (subtitle already exists)", media_path.display());
                continue;
            }

            match self.process_file(&media_path).await {
                Ok(srt_path) => written.push(srt_path),
                Err(e) => warn!("Failed to process {}: {}", media_path.display(), e),
            }
        }

        Ok(written)
    }
}

/// Media files under `dir`, sorted by path
pub fn find_media_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path().extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        })
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}
