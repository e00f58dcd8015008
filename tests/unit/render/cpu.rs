use super::*;
use crate::compose::text::compose;
use crate::foundation::core::{Canvas, Rgba8};
use crate::layout::plan::{FontRole, StyleConfig, TextMetrics, layout};
use crate::people::model::CelebrationEntry;

fn solid_template(w: u32, h: u32, rgba: [u8; 4]) -> TemplateImage {
    let mut bytes = Vec::with_capacity((w * h * 4) as usize);
    for _ in 0..(w * h) {
        bytes.extend_from_slice(&rgba);
    }
    crate::assets::template::premultiply_rgba8_in_place(&mut bytes);
    TemplateImage {
        width: w,
        height: h,
        rgba8_premul: Arc::new(bytes),
        has_alpha: rgba[3] != 255,
    }
}

fn empty_plan(canvas: Canvas) -> LayoutPlan {
    LayoutPlan {
        canvas,
        base_size_px: 30,
        safe_zone: (0.0, 0.0),
        content_height: 0.0,
        lines: Vec::new(),
        date: None,
        dropped_lines: 0,
    }
}

fn close(a: u8, b: u8) -> bool {
    (i16::from(a) - i16::from(b)).abs() <= 2
}

#[test]
fn empty_plan_reproduces_the_template() {
    let template = solid_template(16, 8, [240, 230, 200, 255]);
    let mut fonts = FontSet::fallback();
    let out = render(&template, &mut fonts, &empty_plan(template.canvas().unwrap())).unwrap();

    assert_eq!((out.width, out.height), (16, 8));
    assert_eq!(out.data.len(), 16 * 8 * 4);
    assert!(!out.has_alpha);
    for px in out.data.chunks_exact(4) {
        assert!(close(px[0], 240) && close(px[1], 230) && close(px[2], 200));
        assert_eq!(px[3], 255);
    }
}

#[test]
fn text_stays_inside_its_rows() {
    let template = solid_template(200, 200, [255, 255, 255, 255]);
    let mut fonts = FontSet::fallback();
    let block = compose(&[CelebrationEntry::new("Ana García")], &[], "Marzo 5, 2024");
    let plan = layout(
        template.canvas().unwrap(),
        &block,
        &StyleConfig::default(),
        &mut fonts,
    )
    .unwrap();
    let out = render(&template, &mut fonts, &plan).unwrap();

    // The top rows lie above the safe zone and must be untouched background.
    for px in out.data[..(200 * 4 * 10)].chunks_exact(4) {
        assert!(close(px[0], 255) && close(px[1], 255) && close(px[2], 255));
    }
    assert!(!out.is_truncated());
}

#[test]
fn canvas_mismatch_is_a_render_error() {
    let template = solid_template(10, 10, [0, 0, 0, 255]);
    let mut fonts = FontSet::fallback();
    let plan = empty_plan(Canvas::new(20, 10).unwrap());
    assert!(matches!(
        render(&template, &mut fonts, &plan),
        Err(CardError::Render(_))
    ));
}

#[test]
fn oversized_canvas_is_rejected() {
    let template = TemplateImage {
        width: 70_000,
        height: 1,
        rgba8_premul: Arc::new(Vec::new()),
        has_alpha: false,
    };
    let mut fonts = FontSet::fallback();
    let plan = empty_plan(Canvas::new(70_000, 1).unwrap());
    assert!(render(&template, &mut fonts, &plan).is_err());
}

#[test]
fn truncation_is_reported_on_the_image() {
    let template = solid_template(8, 8, [0, 0, 0, 255]);
    let mut fonts = FontSet::fallback();
    let mut plan = empty_plan(template.canvas().unwrap());
    plan.dropped_lines = 3;
    let out = render(&template, &mut fonts, &plan).unwrap();
    assert!(out.is_truncated());
    assert_eq!(out.dropped_lines, 3);
}

fn serif_face() -> Option<std::path::PathBuf> {
    [
        "fonts/Lora-Regular.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
        "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
        "/Library/Fonts/Georgia.ttf",
        "C:\\Windows\\Fonts\\georgia.ttf",
    ]
    .into_iter()
    .map(std::path::PathBuf::from)
    .find(|p| p.is_file())
}

/// Bounding box `(x0, x1, y0, y1)` of pixels that differ from white.
fn ink_bounds(out: &RenderedImage) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (i, px) in out.data.chunks_exact(4).enumerate() {
        if px[0] > 200 && px[1] > 200 && px[2] > 200 {
            continue;
        }
        let (x, y) = (i as u32 % out.width, i as u32 / out.width);
        bounds = Some(match bounds {
            None => (x, x, y, y),
            Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
        });
    }
    bounds
}

#[test]
fn glyphs_advance_along_the_line_inside_its_row() {
    let Some(face) = serif_face() else {
        return;
    };
    let mut fonts = FontSet::load(&face, &face);
    assert!(!fonts.is_fallback());

    let text = "MMMMMMMM";
    let width = fonts.text_width(FontRole::Name, 60.0, text).unwrap();
    let height = fonts.line_height(FontRole::Name, 60.0, "Ag").unwrap();
    let (x, y) = (100.0, 200.0);

    let template = solid_template(800, 400, [255, 255, 255, 255]);
    let mut plan = empty_plan(template.canvas().unwrap());
    plan.lines.push(PlacedLine {
        text: text.to_owned(),
        role: FontRole::Name,
        size_px: 60.0,
        height,
        x,
        y,
        width,
        color: Rgba8::rgb(0, 0, 0),
    });
    let out = render(&template, &mut fonts, &plan).unwrap();

    let (x0, x1, y0, y1) = ink_bounds(&out).expect("line left no ink");
    let ink_width = (x1 - x0 + 1) as f32;
    assert!(
        ink_width > width * 0.85 && ink_width <= width + 2.0,
        "ink {x0}..{x1} vs advance {width}"
    );
    assert!(x0 as f32 >= x - 2.0, "ink starts at x={x0}");
    assert!(y0 as f32 >= y - 1.0, "ink starts at y={y0}, line top {y}");
    assert!(
        y1 as f32 <= y + height + 1.0,
        "ink ends at y={y1}, line bottom {}",
        y + height
    );
}
