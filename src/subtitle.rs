use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{Result, TransubError};
use crate::transcribe::Segment;

/// Render segments as SRT text, using each segment's translation when present
pub fn render_srt(segments: &[Segment]) -> String {
    let mut srt_content = String::new();

    for (index, segment) in segments.iter().enumerate() {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_srt_time(segment.start),
            format_srt_time(segment.end),
            segment.display_text().trim()
        ));
    }

    srt_content
}

/// Write the SRT file next to `input_path` and return the path actually written.
///
/// The name is `<stem>.srt` in the input's directory. An existing file is never
/// overwritten: the path is de-duplicated with a random suffix, and the file is
/// created with create-if-absent so a concurrent writer cannot be clobbered.
pub async fn write_srt<P: AsRef<Path>>(segments: &[Segment], input_path: P) -> Result<PathBuf> {
    let base_path = srt_path_for(input_path.as_ref())?;
    let srt_content = render_srt(segments);

    loop {
        let srt_path = unique_path(&base_path);
        info!("Generating SRT file: {}", srt_path.display());

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&srt_path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("{} was created concurrently, picking another name", srt_path.display());
                continue;
            }
            Err(e) => return Err(TransubError::Io(e)),
        };

        file.write_all(srt_content.as_bytes()).await?;
        file.flush().await?;

        info!("SRT file generated successfully");
        return Ok(srt_path);
    }
}

/// `<dir>/<stem>.srt` for a media file
pub fn srt_path_for(input_path: &Path) -> Result<PathBuf> {
    let stem = input_path.file_stem()
        .ok_or_else(|| TransubError::Config(format!("Invalid input filename: {}", input_path.display())))?
        .to_string_lossy();

    let dir = input_path.parent().unwrap_or_else(|| Path::new(""));
    Ok(dir.join(format!("{}.srt", stem)))
}

/// Return `path` if nothing exists there, otherwise a free sibling named
/// `<stem>_<NNNN><.ext>`.
///
/// The existence check and the later file creation are not atomic.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    loop {
        let candidate = dir.join(format!("{}_{}{}", stem, random_suffix(), extension));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Random number in 1000..=9999, drawn from the crate's only randomness source (uuid v4)
fn random_suffix() -> u16 {
    1000 + (Uuid::new_v4().as_u128() % 9000) as u16
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm), truncating
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}
