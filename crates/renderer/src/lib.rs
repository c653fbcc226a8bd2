//! Favicon progress renderer.
//!
//! The crate draws a small pie or donut progress indicator into a 32x32
//! surface, installs it as the page favicon, and mirrors progress into the
//! document title. The overall flow is:
//!
//! ```text
//!   caller
//!     │ LoaderOptions
//!     ▼
//!   FaviconLoader::new ──▶ capture icons + title ──▶ switch_loader(true)
//!     │
//!     │ set_progress / set_max / set_palette / set_message
//!     ▼
//!   redraw() ──▶ Surface (pie wedge | donut ring) ──▶ repaint()
//!                                                       │
//!                       <link rel="icon" href=data:…> ◀─┤
//!                       document title (template)     ◀─┘
//! ```
//!
//! The document and the drawing surface are injected capabilities
//! ([`DocumentHost`] and [`Surface`]) so the loader runs the same way against
//! a browser DOM, the in-memory [`MemoryDocument`], or a test double.
//! [`RasterSurface`] is the native surface: it rasterises with `tiny-skia` and
//! exports PNG data URLs.

mod error;
mod geometry;
mod host;
mod loader;
pub mod registry;
mod surface;
mod template;
mod types;

pub use error::LoaderError;
pub use geometry::{
    center, effective_progress, percent, pie_radius, round_half_up, Point, RingMetrics, Sweep,
};
pub use host::{is_icon_relation, DocumentHost, LinkId, MemoryDocument};
pub use loader::FaviconLoader;
pub use surface::{RasterSurface, Surface, PNG_DATA_URL_PREFIX};
pub use template::{expand, format_number, TemplateValues};
pub use types::{
    ActivationState, Color, LoaderOptions, Palette, Shape, DEFAULT_MAX, DEFAULT_MESSAGE,
    ICON_SIZE, TRACK_COLOR,
};
