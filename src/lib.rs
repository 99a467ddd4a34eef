#![forbid(unsafe_code)]

//! Composition engine for social-media graphics: templates, collage
//! layouts with cover-fit cropping, adjustment/filter chains, baked
//! captions, before/after comparisons, and a transition sequencer for
//! slideshow export. Pure and UI-free; a caller supplies decoded images
//! and configuration and gets pixel surfaces back.

pub mod adjust;
pub mod assets;
pub mod blur;
pub mod collage;
pub mod compare;
pub mod composite;
pub mod core;
pub mod encode_ffmpeg;
pub mod error;
pub mod events;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod sequencer;
pub mod still;
pub mod surface;
pub mod template;
pub mod text;
pub mod transition;

pub use adjust::{AdjustmentSet, FilterOp, FilterPreset, PresetRegistry, build_filter_chain};
pub use assets::{DecodedImage, ImageAsset, decode_image};
pub use collage::{CollageSettings, SlotAssignment, render_assignment, render_collage};
pub use compare::{ComparisonLabels, ComparisonOptions, SplitOrientation, render_comparison};
pub use core::{Color, Rect, Vec2};
pub use error::{PostweaveError, PostweaveResult};
pub use events::{EventSink, NoopEvents};
pub use export::{ExportFormat, encode_surface};
pub use geometry::{ContainFit, CoverFit, contain_fit, cover_fit};
pub use layout::{CollageLayout, LayoutRegistry, SlotRect};
pub use sequencer::{
    CancelHandle, FrameSequencer, FrameSink, SequencedFrame, SlideshowSpec, run_slideshow,
};
pub use still::render_still;
pub use surface::Surface;
pub use template::{Template, TemplateRegistry};
pub use text::{FontCatalog, TextOverlaySpec, TextPosition, render_text};
pub use transition::{TransitionKind, compose_transition, parse_transition_kind};
