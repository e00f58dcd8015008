use super::*;

fn rendered(has_alpha: bool) -> RenderedImage {
    RenderedImage {
        width: 4,
        height: 2,
        data: [120u8, 60, 30, 128].repeat(8),
        has_alpha,
        dropped_lines: 0,
    }
}

#[test]
fn format_follows_extension() {
    assert_eq!(
        OutputFormat::from_path(Path::new("combined_celebrations.jpg")),
        OutputFormat::Jpeg
    );
    assert_eq!(OutputFormat::from_path(Path::new("x.JPEG")), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_path(Path::new("x.png")), OutputFormat::Png);
    assert_eq!(OutputFormat::from_path(Path::new("noext")), OutputFormat::Png);
    assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
    assert_eq!(OutputFormat::Png.mime_type(), "image/png");
}

#[test]
fn jpeg_output_is_opaque_rgb() {
    let bytes = encode_image(&rendered(true), OutputFormat::Jpeg).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert!(!decoded.color().has_alpha());
    assert_eq!((decoded.width(), decoded.height()), (4, 2));
}

#[test]
fn png_keeps_alpha_only_when_template_had_it() {
    let with_alpha = encode_image(&rendered(true), OutputFormat::Png).unwrap();
    let decoded = image::load_from_memory(&with_alpha).unwrap();
    assert!(decoded.color().has_alpha());
    assert_eq!(decoded.to_rgba8().get_pixel(0, 0).0, [120, 60, 30, 128]);

    let opaque = encode_image(&rendered(false), OutputFormat::Png).unwrap();
    let decoded = image::load_from_memory(&opaque).unwrap();
    assert!(!decoded.color().has_alpha());
}

#[test]
fn mismatched_buffer_is_a_render_error() {
    let mut img = rendered(false);
    img.data.truncate(3);
    assert!(matches!(
        encode_image(&img, OutputFormat::Png),
        Err(CardError::Render(_))
    ));
}

#[test]
fn write_image_creates_parent_dirs() {
    let dir = std::env::temp_dir().join(format!(
        "celebration_card_output_test_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("nested").join("card.png");
    let bytes = write_image(&rendered(false), &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
    std::fs::remove_dir_all(&dir).ok();
}
