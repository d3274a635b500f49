//! Still-image video assembly.
//!
//! The slide is looped for the length of the audio track and the result is
//! written as H.264 + AAC in an MP4 container.

use crate::traits::Encoder;
use crate::types::{EncodeError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

pub const VIDEO_FILE_NAME: &str = "video.mp4";

/// Longest stderr excerpt attached to an encoder failure.
const STDERR_TAIL_CHARS: usize = 2000;

/// Arguments for a single ffmpeg run combining `image` and `audio` into `output`.
pub fn ffmpeg_args(image: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loop", "1", "-i"].iter().map(OsString::from).collect();
    args.push(image.as_os_str().to_owned());
    args.push("-i".into());
    args.push(audio.as_os_str().to_owned());
    args.extend(
        [
            "-c:v", "libx264", "-tune", "stillimage", "-c:a", "aac", "-shortest", "-pix_fmt", "yuv420p",
        ]
        .iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// ffmpeg subprocess encoder
pub struct FfmpegEncoder {
    ffmpeg_path: String,
}

impl FfmpegEncoder {
    /// Use `ffmpeg` from PATH, or the bare name if it cannot be located
    pub fn new() -> Self {
        Self {
            ffmpeg_path: which::which("ffmpeg").map_or_else(
                |_| "ffmpeg".to_string(),
                |p| p.to_string_lossy().to_string(),
            ),
        }
    }

    pub fn with_path(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.ffmpeg_path
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> std::result::Result<(), EncodeError> {
        let args = ffmpeg_args(image, audio, output);
        debug!("Running {} {:?}", self.ffmpeg_path, args);

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| EncodeError::Spawn {
                program: self.ffmpeg_path.clone(),
                source,
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(EncodeError::Failed {
                status: result.status,
                stderr: stderr_tail(&stderr).to_string(),
            });
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &str) -> &str {
    let stderr = stderr.trim_end();
    let count = stderr.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return stderr;
    }
    match stderr.char_indices().nth(count - STDERR_TAIL_CHARS) {
        Some((i, _)) => &stderr[i..],
        None => stderr,
    }
}

/// Combines slide and audio into `video.mp4`.
pub struct VideoMuxer {
    encoder: Box<dyn Encoder>,
    output_dir: PathBuf,
}

impl VideoMuxer {
    pub fn new(encoder: Box<dyn Encoder>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            encoder,
            output_dir: output_dir.into(),
        }
    }

    pub fn video_path(&self) -> PathBuf {
        self.output_dir.join(VIDEO_FILE_NAME)
    }

    /// Run the encoder once. A failed run is fatal and is not retried.
    ///
    /// Only returns a path when the encoder succeeded and left a non-empty
    /// file behind.
    pub async fn mux(&self, slide: &Path, audio: &Path) -> Result<PathBuf> {
        let output = self.video_path();

        // A stale video from an earlier run must not pass the check below
        match tokio::fs::remove_file(&output).await {
            Ok(()) => debug!("Removed previous {}", output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        self.encoder.encode(slide, audio, &output).await?;

        let produced = tokio::fs::metadata(&output)
            .await
            .map(|m| m.is_file() && m.len() > 0)
            .unwrap_or(false);
        if !produced {
            return Err(EncodeError::MissingOutput { path: output }.into());
        }

        info!("Video written to {}", output.display());
        Ok(output)
    }
}
