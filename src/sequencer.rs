//! The transition sequencer: a lazy, finite, one-shot generator of
//! slideshow frames. Each image holds for a configured duration; the
//! tail of that window interpolates to the next image. Progress is
//! recomputed from elapsed time each tick, so playback stays
//! time-accurate regardless of how the frames are consumed.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    assets::DecodedImage,
    error::{PostweaveError, PostweaveResult},
    events::EventSink,
    geometry::cover_fit_into,
    surface::Surface,
    template::Template,
    transition::{TransitionKind, compose_transition},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SlideshowSpec {
    pub image_duration_ms: u64,
    pub transition_duration_ms: u64,
    pub fps: u32,
    pub transition: TransitionKind,
    /// Determinism seed for the dissolve threshold pattern.
    pub seed: u64,
}

impl Default for SlideshowSpec {
    fn default() -> Self {
        Self {
            image_duration_ms: 3000,
            transition_duration_ms: 500,
            fps: 30,
            transition: TransitionKind::Fade,
            seed: 0,
        }
    }
}

impl SlideshowSpec {
    pub fn validate(&self) -> PostweaveResult<()> {
        if self.fps == 0 {
            return Err(PostweaveError::validation("fps must be > 0"));
        }
        if self.image_duration_ms == 0 {
            return Err(PostweaveError::validation("image duration must be > 0"));
        }
        if self.transition_duration_ms > self.image_duration_ms {
            return Err(PostweaveError::validation(
                "transition duration must not exceed the image duration",
            ));
        }
        Ok(())
    }
}

/// What a given tick shows, before any pixels are touched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FramePlan {
    Hold(usize),
    Blend {
        from: usize,
        to: usize,
        progress: f64,
    },
    End,
}

/// Cancels an in-flight sequence. Checked at every tick; cancelling is
/// how a caller must stop a run before starting another one against the
/// same output.
#[derive(Clone, Debug)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One rendered tick plus how long it should be presented.
pub struct SequencedFrame {
    pub surface: Surface,
    pub delay_ms: f64,
    pub index: u64,
}

pub struct FrameSequencer<'a> {
    images: Vec<&'a DecodedImage>,
    width: u32,
    height: u32,
    spec: SlideshowSpec,
    next_index: u64,
    done: bool,
    cancelled: Arc<AtomicBool>,
}

impl<'a> FrameSequencer<'a> {
    pub fn new(
        images: Vec<&'a DecodedImage>,
        template: &Template,
        spec: SlideshowSpec,
    ) -> PostweaveResult<(Self, CancelHandle)> {
        spec.validate()?;
        if images.is_empty() {
            return Err(PostweaveError::validation(
                "slideshow needs at least one image",
            ));
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let handle = CancelHandle(cancelled.clone());
        Ok((
            Self {
                images,
                width: template.width,
                height: template.height,
                spec,
                next_index: 0,
                done: false,
                cancelled,
            },
            handle,
        ))
    }

    pub fn frame_period_ms(&self) -> f64 {
        1000.0 / f64::from(self.spec.fps)
    }

    /// Pure timeline math for a tick index. The last image holds for its
    /// full duration; no transition trails it.
    pub fn plan(&self, index: u64) -> FramePlan {
        let elapsed = index as f64 * self.frame_period_ms();
        let dur = self.spec.image_duration_ms as f64;
        let trans = self.spec.transition_duration_ms as f64;

        let current = (elapsed / dur).floor() as usize;
        if current >= self.images.len() {
            return FramePlan::End;
        }

        let local = elapsed - current as f64 * dur;
        let has_next = current + 1 < self.images.len();
        let transitioning = has_next
            && trans > 0.0
            && self.spec.transition != TransitionKind::None
            && local > dur - trans;

        if transitioning {
            FramePlan::Blend {
                from: current,
                to: current + 1,
                progress: (local - (dur - trans)) / trans,
            }
        } else {
            FramePlan::Hold(current)
        }
    }

    /// Renders the next tick, or `None` once the sequence is exhausted
    /// or cancelled. Not restartable: after the first `None`, every
    /// subsequent call returns `None`.
    pub fn next_frame(&mut self) -> PostweaveResult<Option<SequencedFrame>> {
        if self.done {
            return Ok(None);
        }
        if self.cancelled.load(Ordering::Relaxed) {
            tracing::debug!(frame = self.next_index, "sequence cancelled");
            self.done = true;
            return Ok(None);
        }

        let index = self.next_index;
        let plan = self.plan(index);
        if plan == FramePlan::End {
            self.done = true;
            return Ok(None);
        }

        let mut surface = Surface::new(self.width, self.height)?;
        match plan {
            FramePlan::End => unreachable!(),
            FramePlan::Hold(i) => {
                let img = self.images[i];
                let fit = cover_fit_into(
                    f64::from(img.width()),
                    f64::from(img.height()),
                    surface.bounds(),
                )?;
                surface.draw_cover(img, &fit, 1.0);
            }
            FramePlan::Blend { from, to, progress } => {
                compose_transition(
                    &mut surface,
                    self.images[from],
                    self.images[to],
                    self.spec.transition,
                    progress,
                    frame_seed(self.spec.seed, index),
                )?;
            }
        }

        self.next_index += 1;
        Ok(Some(SequencedFrame {
            surface,
            delay_ms: self.frame_period_ms(),
            index,
        }))
    }
}

/// Consumes rendered frames; the encoding collaborator behind it may
/// finish asynchronously, which is why completion is an explicit call.
pub trait FrameSink {
    fn submit(&mut self, frame: &SequencedFrame) -> PostweaveResult<()>;
    fn finish(&mut self) -> PostweaveResult<()>;
}

/// Pumps a sequencer into a sink until exhaustion or cancellation,
/// then signals completion. Returns the number of frames produced.
#[tracing::instrument(skip(sequencer, sink, events))]
pub fn run_slideshow(
    mut sequencer: FrameSequencer<'_>,
    sink: &mut dyn FrameSink,
    events: &mut dyn EventSink,
) -> PostweaveResult<u64> {
    let mut frames = 0u64;
    while let Some(frame) = sequencer.next_frame()? {
        sink.submit(&frame)?;
        frames += 1;
    }
    sink.finish()?;
    events.on_sequence_complete(frames);
    Ok(frames)
}

/// Per-frame seed derived from the spec seed (splitmix-style finalizer).
fn frame_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
