//! The collage compositor: assigns images to layout slots and renders
//! them onto one surface with spacing and border rules.

use crate::{
    assets::{DecodedImage, ImageAsset, find_image},
    core::{Color, Rect},
    error::{PostweaveError, PostweaveResult},
    events::EventSink,
    geometry::cover_fit_into,
    layout::{CollageLayout, SlotRect},
    surface::Surface,
    template::Template,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CollageSettings {
    pub spacing: f64,
    pub border_width: f64,
    pub border_color: Color,
    pub background_color: Color,
}

impl Default for CollageSettings {
    fn default() -> Self {
        Self {
            spacing: 10.0,
            border_width: 0.0,
            border_color: Color::WHITE,
            background_color: Color::BLACK,
        }
    }
}

impl CollageSettings {
    pub fn validate(&self) -> PostweaveResult<()> {
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(PostweaveError::validation("spacing must be >= 0"));
        }
        if !self.border_width.is_finite() || self.border_width < 0.0 {
            return Err(PostweaveError::validation("border width must be >= 0"));
        }
        Ok(())
    }
}

/// Ordered mapping from slot index to image id. Mutated by the caller
/// (drag-and-drop lives outside the engine); consumed here at render time.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SlotAssignment(pub Vec<Option<String>>);

impl SlotAssignment {
    /// Assigns the first images in gallery order, leaving the tail empty.
    pub fn sequential(assets: &[ImageAsset], slot_count: usize) -> Self {
        Self(
            (0..slot_count)
                .map(|i| assets.get(i).map(|a| a.id.clone()))
                .collect(),
        )
    }

    /// Resolves ids against the caller's image collection. The assignment
    /// length must equal the layout's slot count; unknown ids fail fast.
    pub fn resolve<'a>(
        &self,
        layout: &CollageLayout,
        assets: &'a [ImageAsset],
    ) -> PostweaveResult<Vec<Option<&'a DecodedImage>>> {
        if self.0.len() != layout.slot_count() {
            return Err(PostweaveError::validation(format!(
                "assignment length {} does not match layout '{}' slot count {}",
                self.0.len(),
                layout.key,
                layout.slot_count()
            )));
        }
        self.0
            .iter()
            .map(|entry| match entry {
                None => Ok(None),
                Some(id) => find_image(assets, id).map(Some).ok_or_else(|| {
                    PostweaveError::validation(format!("assignment references unknown image '{id}'"))
                }),
            })
            .collect()
    }
}

/// Pixel rectangle for a slot under the spacing rule.
///
/// The normalized rect is scaled to the template box, then inset: the
/// origin moves in by half the spacing on axes where the slot starts at
/// an interior coordinate, and the extent loses a full spacing on axes
/// where the slot touches any interior edge (half otherwise). The
/// half/full asymmetry at grid edges is intentional; exported collages
/// depend on these exact coordinates, so do not rework it into a
/// symmetric gutter.
pub fn slot_pixel_rect(slot: &SlotRect, width: f64, height: f64, spacing: f64) -> Rect {
    let x = slot.x * width + if slot.x > 0.0 { spacing / 2.0 } else { 0.0 };
    let y = slot.y * height + if slot.y > 0.0 { spacing / 2.0 } else { 0.0 };
    let w = slot.w * width
        - if slot.x > 0.0 || slot.x + slot.w < 1.0 {
            spacing
        } else {
            spacing / 2.0
        };
    let h = slot.h * height
        - if slot.y > 0.0 || slot.y + slot.h < 1.0 {
            spacing
        } else {
            spacing / 2.0
        };
    Rect::new(x, y, x + w, y + h)
}

/// Renders an ordered sequence of images (or gaps) into the layout's
/// slots. Empty slots draw nothing; images beyond the slot count are
/// ignored.
#[tracing::instrument(skip_all, fields(layout = %layout.key, template = %template.id))]
pub fn render_collage(
    images: &[Option<&DecodedImage>],
    layout: &CollageLayout,
    template: &Template,
    settings: &CollageSettings,
) -> PostweaveResult<Surface> {
    settings.validate()?;

    let mut surface = Surface::new(template.width, template.height)?;
    surface.fill(settings.background_color);

    let width = f64::from(template.width);
    let height = f64::from(template.height);

    for (i, slot) in layout.slots.iter().enumerate() {
        let Some(img) = images.get(i).copied().flatten() else {
            continue;
        };

        let rect = slot_pixel_rect(slot, width, height, settings.spacing);
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return Err(PostweaveError::geometry(format!(
                "spacing {} leaves slot {i} of layout '{}' with no area",
                settings.spacing, layout.key
            )));
        }

        let fit = cover_fit_into(f64::from(img.width()), f64::from(img.height()), rect)?;
        surface.draw_cover(img, &fit, 1.0);

        if settings.border_width > 0.0 {
            surface.stroke_rect(rect, settings.border_width, settings.border_color);
        }
    }

    Ok(surface)
}

/// Caller-facing entry point: resolves a [`SlotAssignment`] and renders,
/// notifying the event sink afterwards.
pub fn render_assignment(
    assets: &[ImageAsset],
    assignment: &SlotAssignment,
    layout: &CollageLayout,
    template: &Template,
    settings: &CollageSettings,
    events: &mut dyn EventSink,
) -> PostweaveResult<Surface> {
    let images = assignment.resolve(layout, assets)?;
    let surface = render_collage(&images, layout, template, settings)?;
    events.on_collage_rendered(&layout.key);
    Ok(surface)
}
