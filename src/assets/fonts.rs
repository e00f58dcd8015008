use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::{FontRole, TextMetrics};

/// Generic family used when the configured typefaces cannot be loaded.
pub const FALLBACK_FAMILY: &str = "serif";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Regular and bold typefaces plus the Parley contexts that shape with them.
///
/// Both faces are registered under their own family names. Bold roles additionally request a bold
/// weight so a family that ships both weights under one name still resolves to the right face.
pub struct FontSet {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular_family: String,
    bold_family: String,
    fallback: bool,
    raster_fonts: HashMap<(u64, u32), vello_cpu::peniko::FontData>,
}

impl FontSet {
    /// Load the two faces from disk, degrading to [`FALLBACK_FAMILY`] for every role on failure.
    pub fn load(regular: &Path, bold: &Path) -> Self {
        let mut set = Self::fallback();
        match set.register_pair(regular, bold) {
            Ok((regular_family, bold_family)) => {
                tracing::debug!(%regular_family, %bold_family, "loaded postcard typefaces");
                set.regular_family = regular_family;
                set.bold_family = bold_family;
                set.fallback = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "could not load postcard fonts, using default typeface");
            }
        }
        set
    }

    /// Font set that only uses the system's generic serif family.
    pub fn fallback() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            regular_family: FALLBACK_FAMILY.to_string(),
            bold_family: FALLBACK_FAMILY.to_string(),
            fallback: true,
            raster_fonts: HashMap::new(),
        }
    }

    /// `true` when the configured faces could not be loaded.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Family name used for `role`.
    pub fn family_for(&self, role: FontRole) -> &str {
        if role.is_bold() {
            &self.bold_family
        } else {
            &self.regular_family
        }
    }

    fn register_pair(&mut self, regular: &Path, bold: &Path) -> CardResult<(String, String)> {
        let regular_bytes = read_font(regular)?;
        let bold_bytes = read_font(bold)?;
        let regular_family = self.register_font(regular_bytes)?;
        let bold_family = self.register_font(bold_bytes)?;
        Ok((regular_family, bold_family))
    }

    /// Add a face to the font collection and return its family name.
    pub fn register_font(&mut self, font_bytes: Vec<u8>) -> CardResult<String> {
        let collection = &mut self.font_ctx.collection;
        let registered = collection.register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let Some(&(family_id, _)) = registered.first() else {
            return Err(CardError::validation("font data contains no usable face"));
        };
        collection
            .family_name(family_id)
            .map(str::to_owned)
            .ok_or_else(|| CardError::validation("font face has no family name"))
    }

    /// Shape a single unwrapped line of `text` in `role`.
    pub fn shape(
        &mut self,
        role: FontRole,
        size_px: f32,
        text: &str,
        brush: TextBrushRgba8,
    ) -> CardResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CardError::validation("text size_px must be finite and > 0"));
        }

        let family = self.family_for(role).to_owned();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        if role.is_bold() {
            builder.push_default(parley::style::StyleProperty::FontWeight(
                parley::style::FontWeight::BOLD,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Rasterizer handle for a font Parley resolved while shaping, keyed by blob id and face index.
    pub(crate) fn raster_font(
        &mut self,
        blob_id: u64,
        index: u32,
        bytes: &[u8],
    ) -> vello_cpu::peniko::FontData {
        self.raster_fonts
            .entry((blob_id, index))
            .or_insert_with(|| {
                vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(bytes.to_vec()),
                    index,
                )
            })
            .clone()
    }
}

impl TextMetrics for FontSet {
    fn line_height(&mut self, role: FontRole, size_px: f32, probe: &str) -> CardResult<f32> {
        let layout = self.shape(role, size_px, probe, TextBrushRgba8::default())?;
        let h = layout
            .lines()
            .next()
            .map(|line| {
                let m = line.metrics();
                m.ascent + m.descent
            })
            .unwrap_or(size_px);
        // No glyphs resolved (no usable face at all): fall back to the nominal size.
        Ok(if h > 0.0 { h } else { size_px })
    }

    fn text_width(&mut self, role: FontRole, size_px: f32, text: &str) -> CardResult<f32> {
        let layout = self.shape(role, size_px, text, TextBrushRgba8::default())?;
        Ok(layout
            .lines()
            .map(|line| line.metrics().advance)
            .fold(0.0f32, f32::max))
    }
}

fn read_font(path: &Path) -> CardResult<Vec<u8>> {
    std::fs::read(path).map_err(|e| CardError::asset_missing(format!("{} ({e})", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
