use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use mediabay_core::{MediaError, ProcessingConfig};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;

/// Duration plus the first frame of a video.
#[derive(Debug, Clone)]
pub struct VideoAsset {
    pub duration_seconds: f64,
    pub frame: DynamicImage,
}

/// Reads duration and a still frame from a video file on disk.
///
/// Either both outputs are produced or the call fails with a single
/// [`MediaError::VideoDecode`].
#[async_trait]
pub trait FrameExtractor: Send + Sync {
    async fn extract(&self, input: &Path) -> Result<VideoAsset, MediaError>;
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// `ffprobe` for duration, `ffmpeg` for the frame.
#[derive(Clone)]
pub struct FfmpegFrameExtractor {
    ffmpeg_path: String,
    ffprobe_path: String,
    permits: Arc<Semaphore>,
}

impl FfmpegFrameExtractor {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, max_concurrent: usize) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn from_config(config: &ProcessingConfig) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            config.max_concurrent_video_decodes,
        )
    }

    async fn probe_duration(&self, input: &Path) -> Result<f64, MediaError> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg(input)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::VideoDecode(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(stderr = %stderr, "ffprobe failed");
            return Err(MediaError::VideoDecode(format!("ffprobe failed: {}", stderr.trim())));
        }

        parse_ffprobe_duration(&output.stdout)
    }

    async fn first_frame(&self, input: &Path) -> Result<DynamicImage, MediaError> {
        // output-side -ss: decode from the start and keep the frame at exactly 0
        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-i"])
            .arg(input)
            .args([
                "-ss", "0", "-frames:v", "1", "-f", "image2pipe", "-c:v", "png", "pipe:1",
            ])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MediaError::VideoDecode(format!("Failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(stderr = %stderr, "ffmpeg frame extraction failed");
            return Err(MediaError::VideoDecode(format!("ffmpeg failed: {}", stderr.trim())));
        }

        if output.stdout.is_empty() {
            return Err(MediaError::VideoDecode("ffmpeg produced no frame".to_string()));
        }

        let png = output.stdout;
        tokio::task::spawn_blocking(move || {
            image::load_from_memory_with_format(&png, ImageFormat::Png)
                .map_err(|e| MediaError::VideoDecode(format!("Extracted frame unreadable: {}", e)))
        })
        .await
        .map_err(|e| MediaError::Internal(e.to_string()))?
    }
}

#[async_trait]
impl FrameExtractor for FfmpegFrameExtractor {
    async fn extract(&self, input: &Path) -> Result<VideoAsset, MediaError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| MediaError::Internal(format!("Video decode limiter closed: {}", e)))?;

        let start = std::time::Instant::now();
        let duration_seconds = self.probe_duration(input).await?;
        let frame = self.first_frame(input).await?;

        tracing::info!(
            duration_seconds = duration_seconds,
            frame_width = frame.width(),
            frame_height = frame.height(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Extracted video frame"
        );

        Ok(VideoAsset {
            duration_seconds,
            frame,
        })
    }
}

/// Container duration from `ffprobe -of json` output.
fn parse_ffprobe_duration(stdout: &[u8]) -> Result<f64, MediaError> {
    let parsed: FfprobeOutput = serde_json::from_slice(stdout)
        .map_err(|e| MediaError::VideoDecode(format!("Failed to parse ffprobe output: {}", e)))?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| MediaError::VideoDecode("ffprobe reported no duration".to_string()))?;

    match raw.trim().parse::<f64>() {
        Ok(duration) if duration.is_finite() && duration >= 0.0 => Ok(duration),
        _ => Err(MediaError::VideoDecode(format!(
            "Unparsable duration: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = br#"{"format": {"duration": "12.480000"}}"#;
        assert_eq!(parse_ffprobe_duration(json).unwrap(), 12.48);
    }

    #[test]
    fn test_parse_duration_failures() {
        for json in [
            &br#"{"format": {"duration": "N/A"}}"#[..],
            &br#"{"format": {}}"#[..],
            &br#"{}"#[..],
            &b"not json"[..],
        ] {
            assert!(matches!(
                parse_ffprobe_duration(json),
                Err(MediaError::VideoDecode(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_missing_binary_is_video_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.mp4");
        tokio::fs::write(&input, b"not a video").await.unwrap();

        let extractor = FfmpegFrameExtractor::new(
            "/nonexistent/ffmpeg".to_string(),
            "/nonexistent/ffprobe".to_string(),
            1,
        );

        let result = extractor.extract(&input).await;
        assert!(matches!(result, Err(MediaError::VideoDecode(_))));
    }
}
