use postweave::{
    CollageSettings, Color, DecodedImage, LayoutRegistry, Rect, TemplateRegistry,
    collage::slot_pixel_rect, render_collage,
};

const RED: Color = Color::opaque(200, 0, 0);
const GREEN: Color = Color::opaque(0, 200, 0);
const BLUE: Color = Color::opaque(0, 0, 200);

fn center(rect: Rect) -> (u32, u32) {
    (
        ((rect.x0 + rect.x1) / 2.0) as u32,
        ((rect.y0 + rect.y1) / 2.0) as u32,
    )
}

#[test]
fn three_grid_slot_rects_follow_the_inset_rule() {
    let layouts = LayoutRegistry::builtin();
    let layout = layouts.get("3-grid").unwrap();

    let rects: Vec<Rect> = layout
        .slots
        .iter()
        .map(|s| slot_pixel_rect(s, 1080.0, 1080.0, 10.0))
        .collect();

    // Derived from the documented half/full inset arithmetic on a
    // 1080x1080 canvas with spacing 10.
    assert_eq!(rects[0], Rect::new(0.0, 0.0, 1075.0, 530.0));
    assert_eq!(rects[1], Rect::new(0.0, 545.0, 530.0, 1075.0));
    assert_eq!(rects[2], Rect::new(545.0, 545.0, 1075.0, 1075.0));
}

#[test]
fn three_grid_renders_three_images_into_their_slots() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("instagram-post").unwrap();
    let layouts = LayoutRegistry::builtin();
    let layout = layouts.get("3-grid").unwrap();

    let a = DecodedImage::solid(64, 64, RED).unwrap();
    let b = DecodedImage::solid(64, 64, GREEN).unwrap();
    let c = DecodedImage::solid(64, 64, BLUE).unwrap();

    let surface = render_collage(
        &[Some(&a), Some(&b), Some(&c)],
        layout,
        template,
        &CollageSettings::default(),
    )
    .unwrap();

    let rects: Vec<Rect> = layout
        .slots
        .iter()
        .map(|s| slot_pixel_rect(s, 1080.0, 1080.0, 10.0))
        .collect();

    let (x, y) = center(rects[0]);
    assert_eq!(surface.pixel(x, y), [200, 0, 0, 255]);
    let (x, y) = center(rects[1]);
    assert_eq!(surface.pixel(x, y), [0, 200, 0, 255]);
    let (x, y) = center(rects[2]);
    assert_eq!(surface.pixel(x, y), [0, 0, 200, 255]);

    // The gutter between the bottom slots stays background.
    assert_eq!(surface.pixel(537, 800), [0, 0, 0, 255]);
    // So does the row gutter.
    assert_eq!(surface.pixel(200, 537), [0, 0, 0, 255]);
}

#[test]
fn partially_assigned_collage_draws_only_assigned_slots() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("instagram-post").unwrap();
    let layouts = LayoutRegistry::builtin();
    let layout = layouts.get("3-grid").unwrap();

    let a = DecodedImage::solid(64, 64, RED).unwrap();
    let b = DecodedImage::solid(64, 64, GREEN).unwrap();

    let surface = render_collage(
        &[Some(&a), Some(&b)],
        layout,
        template,
        &CollageSettings::default(),
    )
    .unwrap();

    let rects: Vec<Rect> = layout
        .slots
        .iter()
        .map(|s| slot_pixel_rect(s, 1080.0, 1080.0, 10.0))
        .collect();

    let (x, y) = center(rects[0]);
    assert_eq!(surface.pixel(x, y), [200, 0, 0, 255]);
    let (x, y) = center(rects[1]);
    assert_eq!(surface.pixel(x, y), [0, 200, 0, 255]);
    // Third slot has no image and renders as pure background, not a
    // placeholder.
    let (x, y) = center(rects[2]);
    assert_eq!(surface.pixel(x, y), [0, 0, 0, 255]);
}

#[test]
fn every_builtin_layout_renders_fully_assigned() {
    let templates = TemplateRegistry::builtin();
    let template = templates.get("instagram-post").unwrap();
    let layouts = LayoutRegistry::builtin();

    let img = DecodedImage::solid(48, 32, RED).unwrap();

    for layout in layouts.iter() {
        let slots: Vec<Option<&DecodedImage>> =
            (0..layout.slot_count()).map(|_| Some(&img)).collect();
        let surface = render_collage(&slots, layout, template, &CollageSettings::default())
            .unwrap_or_else(|e| panic!("layout {} failed: {e}", layout.key));

        for slot in &layout.slots {
            let rect = slot_pixel_rect(slot, 1080.0, 1080.0, 10.0);
            let (x, y) = center(rect);
            assert_eq!(surface.pixel(x, y), [200, 0, 0, 255], "{}", layout.key);
        }
    }
}
