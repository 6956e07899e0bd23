//! The interface a plotting host implements to drive a data cursor.
use std::time::Duration;

use glam::{DMat4, DVec2};
use iced::Rectangle;

use crate::{
    annotation::{Annotation, AnnotationId},
    artist::{Artist, ArtistId, AxesId, FigureId, Plottable},
    axis_scale::AxisScale,
    highlight::Highlight,
    message::Subscription,
};

/// A plotting host: owns figures, plot areas and their transforms, and renders
/// the overlays a [`crate::DataCursor`] asks for.
///
/// Screen coordinates are whatever the host delivers in
/// [`crate::CursorEvent`]s; the cursor never interprets them beyond passing
/// them back.
pub trait PlotHost {
    /// The figure that owns `axes`.
    fn figure_of(&self, axes: AxesId) -> FigureId;

    fn subscribe(&mut self, figure: FigureId, subscription: Subscription);

    fn unsubscribe(&mut self, figure: FigureId, subscription: Subscription);

    /// Make `artist` selectable within `tolerance` display points, or not at all.
    fn set_pickable(&mut self, artist: ArtistId, tolerance: Option<f32>);

    /// Test whether `screen` hits `artist` within `tolerance` display points.
    ///
    /// On a hit, returns the indices of the hit sub-items (possibly none).
    fn hit_test(&self, artist: &Artist, screen: DVec2, tolerance: f32) -> Option<Vec<usize>>;

    /// Map a screen position into the data coordinates of `axes`.
    fn screen_to_data(&self, axes: AxesId, screen: DVec2) -> Option<DVec2>;

    /// Map a data position of `axes` onto the screen.
    fn data_to_screen(&self, axes: AxesId, data: DVec2) -> Option<DVec2>;

    /// Scales of the x and y axes of `axes`.
    fn axis_scales(&self, _axes: AxesId) -> (AxisScale, AxisScale) {
        (AxisScale::Linear, AxisScale::Linear)
    }

    /// The data-to-screen projection of a 3D plot area, once it has been drawn.
    fn projection(&self, _axes: AxesId) -> Option<DMat4> {
        None
    }

    /// Create the annotation overlay or bring it in line with `annotation`.
    fn sync_annotation(&mut self, annotation: &Annotation);

    /// Screen-space bounding box of a laid-out annotation.
    fn annotation_extent(&self, id: AnnotationId) -> Option<Rectangle>;

    /// Whether `screen` lies on the rendered annotation.
    fn annotation_contains(&self, id: AnnotationId, screen: DVec2) -> bool {
        self.annotation_extent(id).is_some_and(|r| {
            r.contains(iced::Point::new(screen.x as f32, screen.y as f32))
        })
    }

    /// Screen-space bounds of `figure`.
    fn figure_extent(&self, figure: FigureId) -> Option<Rectangle>;

    /// Start (or restart) the single-shot debounce timer of `axes`.
    ///
    /// When it fires, the host delivers [`crate::CursorEvent::TimerFired`].
    fn start_timer(&mut self, axes: AxesId, interval: Duration);

    fn redraw(&mut self, figure: FigureId);

    /// Create the highlight overlay of `source` or bring it in line with `highlight`.
    fn sync_highlight(&mut self, highlight: &Highlight, source: &Artist);

    /// Every plot area the host knows about.
    fn all_axes(&self) -> Vec<AxesId>;

    /// Everything plotted in `axes`, in drawing order.
    fn plotted_artists(&self, axes: AxesId) -> Vec<Plottable>;
}
