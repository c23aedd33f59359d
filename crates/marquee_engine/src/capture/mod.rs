//! Frame capture
//!
//! Encodes the retained colour target as PNG. A target that discards its
//! contents on presentation cannot be captured until the next frame is drawn.

use crate::config::CaptureConfig;
use crate::render::software::{BufferState, Framebuffer};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::path::PathBuf;
use thiserror::Error;

/// MIME type the data URL is labelled with, so browsers download rather than display it
pub const DOWNLOAD_MIME: &str = "image/octet-stream";

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The colour target was presented without retention
    #[error("Drawing buffer was discarded after presentation; enable preserve_drawing_buffer to capture")]
    BufferDiscarded,

    /// Nothing has been drawn yet
    #[error("Nothing has been rendered yet")]
    NothingRendered,

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// Writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encode the colour target as PNG bytes
pub fn capture_png(target: &Framebuffer) -> Result<Vec<u8>, CaptureError> {
    if target.state() == BufferState::Empty {
        return Err(CaptureError::NothingRendered);
    }
    let pixels = target.readback().ok_or(CaptureError::BufferDiscarded)?;

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(pixels, target.width(), target.height(), ExtendedColorType::Rgba8)?;
    log::debug!("Captured {}x{} frame ({} bytes)", target.width(), target.height(), png.len());
    Ok(png)
}

/// Write the colour target to the configured screenshot file
pub fn export(target: &Framebuffer, config: &CaptureConfig) -> Result<PathBuf, CaptureError> {
    let png = capture_png(target)?;
    if !config.output_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(&config.output_dir)?;
    }
    let path = config.output_dir.join(&config.file_name);
    std::fs::write(&path, &png)?;
    log::info!("Screenshot saved to {}", path.display());
    Ok(path)
}

/// `data:` URL of an encoded image, labelled as a generic download
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:{};base64,{}", DOWNLOAD_MIME, STANDARD.encode(png))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn drawn(preserve: bool) -> Framebuffer {
        let mut fb = Framebuffer::new(4, 3, preserve);
        fb.clear([200, 10, 10, 255]);
        fb
    }

    #[test]
    fn test_capture_after_presentation_with_retention() {
        let mut fb = drawn(true);
        fb.mark_presented();
        let png = capture_png(&fb).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(3, 2).0, [200, 10, 10, 255]);
    }

    #[test]
    fn test_capture_after_discard_fails() {
        let mut fb = drawn(false);
        assert!(capture_png(&fb).is_ok());
        fb.mark_presented();
        assert!(matches!(capture_png(&fb), Err(CaptureError::BufferDiscarded)));
    }

    #[test]
    fn test_capture_before_first_frame_fails() {
        let fb = Framebuffer::new(2, 2, true);
        assert!(matches!(capture_png(&fb), Err(CaptureError::NothingRendered)));
    }

    #[test]
    fn test_export_writes_canvas_png() {
        let dir = tempfile::tempdir().unwrap();
        let config = CaptureConfig {
            output_dir: dir.path().join("shots"),
            ..CaptureConfig::default()
        };
        let path = export(&drawn(true), &config).unwrap();
        assert_eq!(path.file_name().unwrap(), "canvas.png");
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn test_data_url_is_octet_stream() {
        let url = to_data_url(&[1, 2, 3]);
        assert_eq!(url, "data:image/octet-stream;base64,AQID");
    }
}
