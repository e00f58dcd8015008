use std::sync::Arc;

use crate::assets::fonts::{FontSet, TextBrushRgba8};
use crate::assets::template::{TemplateImage, unpremultiply_rgba8_in_place};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::{LayoutPlan, PlacedLine};

/// A rendered postcard as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct RenderedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, not premultiplied.
    pub data: Vec<u8>,
    /// Whether the template carried alpha; PNG output keeps it only then.
    pub has_alpha: bool,
    /// Lines the truncation guard left out.
    pub dropped_lines: usize,
}

impl RenderedImage {
    /// `true` when some names did not fit on the card.
    pub fn is_truncated(&self) -> bool {
        self.dropped_lines > 0
    }
}

/// Draw `plan` over `template` with `vello_cpu`.
///
/// The template is painted first as an image fill covering the canvas, then every planned line is
/// shaped with Parley and filled glyph run by glyph run.
#[tracing::instrument(skip_all, fields(lines = plan.lines.len(), dropped = plan.dropped_lines))]
pub fn render(
    template: &TemplateImage,
    fonts: &mut FontSet,
    plan: &LayoutPlan,
) -> CardResult<RenderedImage> {
    if template.width != plan.canvas.width || template.height != plan.canvas.height {
        return Err(CardError::render(format!(
            "layout planned for {}x{} but template is {}x{}",
            plan.canvas.width, plan.canvas.height, template.width, template.height
        )));
    }
    let w: u16 = template
        .width
        .try_into()
        .map_err(|_| CardError::render("template width exceeds u16"))?;
    let h: u16 = template
        .height
        .try_into()
        .map_err(|_| CardError::render("template height exceeds u16"))?;

    let background = template_pixmap(template, w, h)?;

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(background)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(template.width),
        f64::from(template.height),
    ));

    for line in plan.drawn_lines() {
        draw_line(&mut ctx, fonts, line)?;
    }

    ctx.flush();
    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.render_to_pixmap(&mut pixmap);

    let mut data = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_rgba8_in_place(&mut data);

    if plan.is_truncated() {
        tracing::warn!(
            dropped_lines = plan.dropped_lines,
            "postcard rendered with truncated name list"
        );
    }

    Ok(RenderedImage {
        width: template.width,
        height: template.height,
        data,
        has_alpha: template.has_alpha,
        dropped_lines: plan.dropped_lines,
    })
}

fn draw_line(
    ctx: &mut vello_cpu::RenderContext,
    fonts: &mut FontSet,
    line: &PlacedLine,
) -> CardResult<()> {
    let layout = fonts.shape(
        line.role,
        line.size_px,
        &line.text,
        TextBrushRgba8::from(line.color),
    )?;

    // Positioned glyphs are relative to the layout's top-left, which is the line's top edge.
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        f64::from(line.x),
        f64::from(line.y),
    )));
    for layout_line in layout.lines() {
        for item in layout_line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let font_ref = run.run().font();
            let font = fonts.raster_font(font_ref.data.id(), font_ref.index, font_ref.data.data());
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
    Ok(())
}

/// Wrap the template's premultiplied bytes as a `vello_cpu` pixmap.
fn template_pixmap(template: &TemplateImage, w: u16, h: u16) -> CardResult<vello_cpu::Pixmap> {
    let expected = usize::from(w) * usize::from(h) * 4;
    if template.rgba8_premul.len() != expected {
        return Err(CardError::render(format!(
            "template holds {} bytes, expected {expected}",
            template.rgba8_premul.len()
        )));
    }
    let pixels = template
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        template.has_alpha,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
