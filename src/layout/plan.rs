use crate::{
    compose::text::{Line, TextBlock},
    foundation::core::{Canvas, Rgba8},
    foundation::error::{CardError, CardResult},
};

/// Typographic role of a drawn line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    /// Section header, bold face.
    Header,
    /// Celebrant name, regular face.
    Name,
    /// Date line, regular face.
    Date,
}

impl FontRole {
    /// `true` for roles drawn with the bold face.
    pub fn is_bold(self) -> bool {
        matches!(self, FontRole::Header)
    }
}

/// Text measurement backend used by [`layout`].
pub trait TextMetrics {
    /// Height of one line of `probe` set in `role` at `size_px`.
    fn line_height(&mut self, role: FontRole, size_px: f32, probe: &str) -> CardResult<f32>;

    /// Advance width of `text` set in `role` at `size_px`.
    fn text_width(&mut self, role: FontRole, size_px: f32, text: &str) -> CardResult<f32>;
}

/// Geometry, typography and color parameters of the postcard.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Top of the safe zone as a fraction of canvas height.
    pub safe_top: f32,
    /// Bottom of the safe zone as a fraction of canvas height.
    pub safe_bottom: f32,
    /// Fixed vertical position of the date line as a fraction of canvas height.
    pub date_y: f32,
    /// Lower bound for the base font size in pixels.
    pub min_font_px: u32,
    /// Upper bound for the base font size in pixels.
    pub max_font_px: u32,
    /// Line pitch factor used when deriving the base size from the line count.
    pub line_factor: f32,
    /// Header size relative to base.
    pub header_scale: f32,
    /// Name size relative to base.
    pub name_scale: f32,
    /// Date size relative to base.
    pub date_scale: f32,
    /// Gap after a header line.
    pub header_gap_px: f32,
    /// Gap after a name line.
    pub name_gap_px: f32,
    /// Height contributed by a blank separator.
    pub blank_gap_px: f32,
    /// Probe string measured once per role for uniform line pitch.
    pub probe: String,
    /// Header color.
    pub header_color: Rgba8,
    /// Name and date color.
    pub text_color: Rgba8,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            safe_top: 0.25,
            safe_bottom: 0.80,
            date_y: 0.82,
            min_font_px: 30,
            max_font_px: 100,
            line_factor: 1.3,
            header_scale: 1.2,
            name_scale: 1.0,
            date_scale: 0.9,
            header_gap_px: 8.0,
            name_gap_px: 15.0,
            blank_gap_px: 35.0,
            probe: "Ag".to_string(),
            header_color: Rgba8::rgb(0x75, 0x6a, 0x54),
            text_color: Rgba8::rgb(0x9c, 0x8b, 0x6a),
        }
    }
}

impl StyleConfig {
    /// Reject fractions and bounds that cannot produce a layout.
    pub fn validate(&self) -> CardResult<()> {
        let frac_ok = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if !frac_ok(self.safe_top) || !frac_ok(self.safe_bottom) || !frac_ok(self.date_y) {
            return Err(CardError::validation(
                "safe zone and date fractions must be within [0, 1]",
            ));
        }
        if self.safe_top >= self.safe_bottom {
            return Err(CardError::validation("safe_top must be above safe_bottom"));
        }
        if self.min_font_px == 0 || self.min_font_px > self.max_font_px {
            return Err(CardError::validation(
                "font bounds must satisfy 0 < min_font_px <= max_font_px",
            ));
        }
        if !(self.line_factor.is_finite() && self.line_factor > 0.0) {
            return Err(CardError::validation("line_factor must be finite and > 0"));
        }
        Ok(())
    }

    /// Pixel size for `role` given the base size.
    pub fn size_for(&self, role: FontRole, base: u32) -> f32 {
        let scale = match role {
            FontRole::Header => self.header_scale,
            FontRole::Name => self.name_scale,
            FontRole::Date => self.date_scale,
        };
        (base as f32 * scale).floor().max(1.0)
    }

    /// Fill color for `role`.
    pub fn color_for(&self, role: FontRole) -> Rgba8 {
        match role {
            FontRole::Header => self.header_color,
            FontRole::Name | FontRole::Date => self.text_color,
        }
    }
}

/// One positioned line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedLine {
    /// Text to draw.
    pub text: String,
    /// Font role.
    pub role: FontRole,
    /// Font size in pixels.
    pub size_px: f32,
    /// Reference line height used for pitch.
    pub height: f32,
    /// Left edge after horizontal centering.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Measured advance width.
    pub width: f32,
    /// Fill color.
    pub color: Rgba8,
}

/// Resolved positions for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    /// Canvas the plan was computed for.
    pub canvas: Canvas,
    /// Base font size in pixels.
    pub base_size_px: u32,
    /// Safe zone as `[top, bottom]` pixel rows.
    pub safe_zone: (f32, f32),
    /// Sum of line heights and gaps of the centered content.
    pub content_height: f32,
    /// Header and name lines that fit, top to bottom.
    pub lines: Vec<PlacedLine>,
    /// Date line at its fixed position.
    pub date: Option<PlacedLine>,
    /// Header and name lines left out by the truncation guard.
    pub dropped_lines: usize,
}

impl LayoutPlan {
    /// `true` when some lines did not fit in the safe zone.
    pub fn is_truncated(&self) -> bool {
        self.dropped_lines > 0
    }

    /// All drawable lines, date last.
    pub fn drawn_lines(&self) -> impl Iterator<Item = &PlacedLine> {
        self.lines.iter().chain(self.date.iter())
    }
}

/// Base font size: more lines give smaller text, clamped to the style bounds.
pub fn base_font_size(available_height: f32, line_count: usize, style: &StyleConfig) -> u32 {
    if line_count == 0 {
        return style.max_font_px;
    }
    let raw = (available_height / (line_count as f32 * style.line_factor)).floor();
    let raw = if raw.is_finite() { raw.max(0.0) } else { 0.0 };
    // Saturating float-to-int cast.
    (raw as u32).clamp(style.min_font_px, style.max_font_px)
}

/// Compute font sizes and positions for `block` on `canvas`.
#[tracing::instrument(skip_all, fields(lines = block.len(), w = canvas.width, h = canvas.height))]
pub fn layout(
    canvas: Canvas,
    block: &TextBlock,
    style: &StyleConfig,
    metrics: &mut dyn TextMetrics,
) -> CardResult<LayoutPlan> {
    style.validate()?;

    let w = canvas.width as f32;
    let h = canvas.height as f32;
    let y_start = (h * style.safe_top).floor();
    let y_end = (h * style.safe_bottom).floor();
    let available = y_end - y_start;

    let base = base_font_size(available, block.len(), style);
    let header_px = style.size_for(FontRole::Header, base);
    let name_px = style.size_for(FontRole::Name, base);
    let date_px = style.size_for(FontRole::Date, base);

    let header_h = metrics.line_height(FontRole::Header, header_px, &style.probe)?;
    let name_h = metrics.line_height(FontRole::Name, name_px, &style.probe)?;

    let pitch = |line: &Line| -> f32 {
        match line {
            Line::SectionHeader(_) => header_h + style.header_gap_px,
            Line::NameLine(_) => name_h + style.name_gap_px,
            Line::BlankSeparator => style.blank_gap_px,
            Line::DateLine(_) => 0.0,
        }
    };

    let content_height: f32 = block.lines().iter().map(pitch).sum();
    let mut y = (y_start + (available - content_height) / 2.0).max(y_start);

    let mut lines = Vec::new();
    let mut dropped_lines = 0usize;
    let mut overflowed = false;
    for line in block.lines() {
        let (role, text, line_h, size_px) = match line {
            Line::SectionHeader(t) => (FontRole::Header, t, header_h, header_px),
            Line::NameLine(t) => (FontRole::Name, t, name_h, name_px),
            Line::BlankSeparator => {
                if !overflowed {
                    y += style.blank_gap_px;
                }
                continue;
            }
            Line::DateLine(_) => continue,
        };
        if overflowed {
            dropped_lines += 1;
            continue;
        }

        let width = metrics.text_width(role, size_px, text)?;
        lines.push(PlacedLine {
            text: text.clone(),
            role,
            size_px,
            height: line_h,
            x: (w - width) / 2.0,
            y,
            width,
            color: style.color_for(role),
        });
        y += pitch(line);
        if y > y_end {
            overflowed = true;
        }
    }

    let date = match block.lines().iter().rev().find_map(|l| match l {
        Line::DateLine(t) => Some(t),
        _ => None,
    }) {
        Some(text) => {
            let width = metrics.text_width(FontRole::Date, date_px, text)?;
            let height = metrics.line_height(FontRole::Date, date_px, &style.probe)?;
            Some(PlacedLine {
                text: text.clone(),
                role: FontRole::Date,
                size_px: date_px,
                height,
                x: (w - width) / 2.0,
                y: (h * style.date_y).floor(),
                width,
                color: style.color_for(FontRole::Date),
            })
        }
        None => None,
    };

    if dropped_lines > 0 {
        tracing::warn!(
            dropped_lines,
            "truncating text, too many names to fit in the safe zone"
        );
    }

    Ok(LayoutPlan {
        canvas,
        base_size_px: base,
        safe_zone: (y_start, y_end),
        content_height,
        lines,
        date,
        dropped_lines,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
