//! Transub - Translated Subtitles from Speech
//!
//! Transcribes an audio/video file with faster-whisper, translates every
//! segment with a bounded number of concurrent requests, and writes an SRT
//! file beside the input.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod transcribe;
pub mod translate;
pub mod subtitle;
pub mod error;
