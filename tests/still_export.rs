use postweave::{
    AdjustmentSet, Color, DecodedImage, ExportFormat, FontCatalog, NoopEvents, PresetRegistry,
    TemplateRegistry, encode_surface, render_still,
};

#[test]
fn still_pipeline_exports_a_decodable_png() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("facebook-post").unwrap();

    let image = DecodedImage::solid(300, 300, Color::opaque(120, 45, 200)).unwrap();
    let surface = render_still(
        &image,
        template,
        &AdjustmentSet::default(),
        None,
        &FontCatalog::new(),
        Color::BLACK,
        &mut NoopEvents,
    )
    .unwrap();

    let bytes = encode_surface(&surface, ExportFormat::Png, &mut NoopEvents).unwrap();
    let back = image::load_from_memory(&bytes).unwrap().to_rgba8();

    assert_eq!(back.dimensions(), (1200, 630));
    // A square image on a 1200x630 canvas is height-bound and centered:
    // a 630x630 middle band carries the image, the rest is background.
    assert_eq!(back.get_pixel(600, 315).0, [120, 45, 200, 255]);
    assert_eq!(back.get_pixel(50, 315).0, [0, 0, 0, 255]);
    assert_eq!(back.get_pixel(1150, 315).0, [0, 0, 0, 255]);
}

#[test]
fn preset_pipeline_changes_pixels_relative_to_identity() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("instagram-post").unwrap();
    let image = DecodedImage::solid(200, 200, Color::opaque(90, 140, 180)).unwrap();

    let identity = render_still(
        &image,
        template,
        &AdjustmentSet::default(),
        None,
        &FontCatalog::new(),
        Color::BLACK,
        &mut NoopEvents,
    )
    .unwrap();

    let presets = PresetRegistry::builtin();
    let vibrant = AdjustmentSet::from_preset(presets.get("vibrant").unwrap());
    let filtered = render_still(
        &image,
        template,
        &vibrant,
        None,
        &FontCatalog::new(),
        Color::BLACK,
        &mut NoopEvents,
    )
    .unwrap();

    assert_ne!(
        identity.pixel(540, 540),
        filtered.pixel(540, 540),
        "vibrant preset must visibly change the image"
    );

    // bw zeroes saturation: all channels equalize.
    let bw = AdjustmentSet::from_preset(presets.get("bw").unwrap());
    let grey = render_still(
        &image,
        template,
        &bw,
        None,
        &FontCatalog::new(),
        Color::BLACK,
        &mut NoopEvents,
    )
    .unwrap();
    let px = grey.pixel(540, 540);
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);
}

#[test]
fn every_export_format_roundtrips_dimensions() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("linkedin-post").unwrap();
    let image = DecodedImage::solid(64, 64, Color::opaque(10, 200, 10)).unwrap();

    let surface = render_still(
        &image,
        template,
        &AdjustmentSet::default(),
        None,
        &FontCatalog::new(),
        Color::BLACK,
        &mut NoopEvents,
    )
    .unwrap();

    for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Webp] {
        let bytes = encode_surface(&surface, format, &mut NoopEvents).unwrap();
        let back = image::load_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (1200, 627));
    }
}
