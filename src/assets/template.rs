use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CardError, CardResult};

/// Decoded postcard background in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct TemplateImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
    /// Whether the source file carried an alpha channel.
    pub has_alpha: bool,
}

impl TemplateImage {
    /// Canvas covered by the template.
    pub fn canvas(&self) -> CardResult<Canvas> {
        Canvas::new(self.width, self.height)
    }
}

/// Clean up a template name given relative to the template directory.
///
/// Backslashes count as separators and empty or `.` segments are dropped. Absolute names and `..`
/// segments are rejected so a template can never be read from outside the directory.
pub fn normalize_rel_path(name: &str) -> CardResult<String> {
    let unified = name.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(CardError::validation(format!(
            "template name \"{name}\" must be relative"
        )));
    }
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    if segments.contains(&"..") {
        return Err(CardError::validation(format!(
            "template name \"{name}\" leaves the template directory"
        )));
    }
    if segments.is_empty() {
        return Err(CardError::validation(format!(
            "template name \"{name}\" has no file name"
        )));
    }
    Ok(segments.join("/"))
}

/// Resolve a named template inside `dir`.
pub fn resolve_template(dir: &Path, name: &str) -> CardResult<PathBuf> {
    let norm = normalize_rel_path(name)?;
    Ok(dir.join(Path::new(&norm)))
}

/// Read and decode a template from disk. A missing file is [`CardError::AssetMissing`].
pub fn load_template(path: &Path) -> CardResult<TemplateImage> {
    if !path.is_file() {
        return Err(CardError::asset_missing(path.display().to_string()));
    }
    let bytes =
        std::fs::read(path).with_context(|| format!("read template '{}'", path.display()))?;
    decode_template(&bytes)
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_template(bytes: &[u8]) -> CardResult<TemplateImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode template from memory")?;
    let has_alpha = dyn_img.color().has_alpha();
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(TemplateImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
        has_alpha,
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/template.rs"]
mod tests;
