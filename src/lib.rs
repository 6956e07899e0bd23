//! Interactive data cursors for Iced plots.
//!
//! - Click (or hover) a plotted artist to pop up an annotation describing the
//!   selected point: coordinates, color and size values, labels
//! - Interpolates along lines and steps, looks up image pixels, contour levels,
//!   bar geometry, error bars and 3D surface positions
//! - One pop-up per plot area, a single pop-up, or one per click
//! - Optional highlighting of the selected artist
//!
//! The plotting host stays in charge of drawing: it implements [`PlotHost`],
//! forwards its events as [`CursorEvent`]s and renders the overlays it is
//! handed.
//!
//! Quick start:
//!
//! ```ignore
//! let line = Artist::line(axes, vec![DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)])
//!     .with_label("measurements");
//!
//! let mut cursor = DataCursorBuilder::new()
//!     .with_display("single")
//!     .build(host, [line.into()])?;
//!
//! cursor.handle_event(event);
//! ```
pub mod annotation;
pub mod artist;
pub mod axis_scale;
pub mod controls;
pub mod datacursor;
pub mod datacursor_builder;
pub mod error;
pub mod format;
pub mod geometry;
pub mod highlight;
pub mod host;
pub mod message;
pub mod pick_info;

pub(crate) mod convenience;

// Iced re-exports.
pub use iced::Color;

// Re-exports of public types.
pub use annotation::{Annotation, AnnotationId, AnnotationStyle, AnnotationStyleOverride};
pub use artist::{
    Artist, ArtistId, ArtistKind, AxesId, Container, ContourSet, FigureId, Plottable,
};
pub use axis_scale::AxisScale;
pub use controls::{ButtonBindings, CursorControls, KeyBindings};
pub use convenience::datacursor;
pub use datacursor::{DataCursor, DisplayMode};
pub use datacursor_builder::DataCursorBuilder;
pub use error::DataCursorError;
pub use format::{FormatContext, Formatter, default_formatter};
pub use highlight::{Highlight, HighlightStyle};
pub use host::PlotHost;
pub use message::{CursorEvent, Subscription};
pub use pick_info::{PickEvent, PickInfo, PointLabels, PropValue};
