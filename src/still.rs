//! The single-image pipeline: contain-fit onto the template canvas,
//! filter chain, baked caption.

use crate::{
    adjust::{AdjustmentSet, apply_filter_chain, build_filter_chain},
    assets::DecodedImage,
    core::{Color, Rect},
    error::PostweaveResult,
    events::EventSink,
    geometry::contain_fit,
    surface::Surface,
    template::Template,
    text::{FontCatalog, TextOverlaySpec, render_text},
};

#[tracing::instrument(skip_all, fields(template = %template.id))]
pub fn render_still(
    image: &DecodedImage,
    template: &Template,
    adjustments: &AdjustmentSet,
    text: Option<&TextOverlaySpec>,
    fonts: &FontCatalog,
    background: Color,
    events: &mut dyn EventSink,
) -> PostweaveResult<Surface> {
    let mut surface = Surface::new(template.width, template.height)?;
    surface.fill(background);

    let fit = contain_fit(
        f64::from(image.width()),
        f64::from(image.height()),
        f64::from(template.width),
        f64::from(template.height),
    )?;
    surface.draw_image(
        image,
        Rect::new(0.0, 0.0, f64::from(image.width()), f64::from(image.height())),
        fit.dest_rect,
        1.0,
    );

    let chain = build_filter_chain(adjustments)?;
    if !chain.is_empty() {
        apply_filter_chain(&mut surface, &chain)?;
    }
    events.on_filter_applied(&chain);

    if let Some(spec) = text {
        render_text(&mut surface, spec, fonts)?;
    }

    Ok(surface)
}
