use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{CardError, CardResult};
use crate::render::cpu::RenderedImage;

/// JPEG quality used for lossy output.
pub const JPEG_QUALITY: u8 = 85;

/// Output container chosen from the destination file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Lossy; alpha is flattened to full opacity.
    Jpeg,
    /// Lossless; keeps the template's channel layout.
    Png,
}

impl OutputFormat {
    /// `.jpg`/`.jpeg` select JPEG, anything else PNG (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => Self::Jpeg,
            _ => Self::Png,
        }
    }

    /// MIME type sent with media uploads.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

/// Encode a rendered postcard into `format`.
pub fn encode_image(img: &RenderedImage, format: OutputFormat) -> CardResult<Vec<u8>> {
    let rgba = image::RgbaImage::from_raw(img.width, img.height, img.data.clone())
        .ok_or_else(|| CardError::render("rendered buffer does not match its dimensions"))?;
    let dyn_img = image::DynamicImage::ImageRgba8(rgba);

    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let rgb = dyn_img.to_rgb8();
            let mut encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
            encoder
                .encode_image(&rgb)
                .context("encode jpeg postcard")?;
        }
        OutputFormat::Png => {
            let native = if img.has_alpha {
                dyn_img
            } else {
                image::DynamicImage::ImageRgb8(dyn_img.to_rgb8())
            };
            native
                .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .context("encode png postcard")?;
        }
    }
    Ok(buf)
}

/// Create parent directories if needed.
pub fn ensure_parent_dir(path: &Path) -> CardResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }
    Ok(())
}

/// Encode by extension and write to `path`, returning the encoded bytes.
pub fn write_image(img: &RenderedImage, path: &Path) -> CardResult<Vec<u8>> {
    let bytes = encode_image(img, OutputFormat::from_path(path))?;
    ensure_parent_dir(path)?;
    std::fs::write(path, &bytes).with_context(|| format!("write postcard '{}'", path.display()))?;
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/output.rs"]
mod tests;
