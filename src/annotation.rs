use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;
use iced::{
    Color, Rectangle,
    alignment::{Horizontal, Vertical},
};

use crate::artist::{AxesId, FigureId};

/// Unique identifier for an annotation pop-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

impl AnnotationId {
    fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Connector drawn from the text box to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Base styling of annotation pop-ups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    /// Offset of the text box from the anchor, in display points. Positive y is up.
    pub offset: DVec2,
    /// Fill of the text box.
    pub background: Color,
    pub text_color: Color,
    /// Rounded corners on the text box.
    pub rounded: bool,
    /// Padding around the text, as a fraction of the font size.
    pub padding: f32,
    /// `None` draws no connector.
    pub arrow: Option<ArrowStyle>,
}

impl Default for AnnotationStyle {
    fn default() -> Self {
        Self {
            offset: DVec2::new(-15.0, 15.0),
            background: Color::from_rgba(1.0, 1.0, 0.0, 0.5),
            text_color: Color::BLACK,
            rounded: true,
            padding: 0.5,
            arrow: Some(ArrowStyle::default()),
        }
    }
}

/// Per-cursor overrides applied on top of an [`AnnotationStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnnotationStyleOverride {
    pub offset: Option<DVec2>,
    pub background: Option<Color>,
    pub text_color: Option<Color>,
    pub rounded: Option<bool>,
    pub padding: Option<f32>,
    pub arrow: Option<Option<ArrowStyle>>,
}

impl AnnotationStyle {
    /// A copy of `self` with every field set in `overrides` replaced.
    pub fn merged(&self, overrides: &AnnotationStyleOverride) -> Self {
        Self {
            offset: overrides.offset.unwrap_or(self.offset),
            background: overrides.background.unwrap_or(self.background),
            text_color: overrides.text_color.unwrap_or(self.text_color),
            rounded: overrides.rounded.unwrap_or(self.rounded),
            padding: overrides.padding.unwrap_or(self.padding),
            arrow: overrides.arrow.unwrap_or(self.arrow),
        }
    }
}

/// Text alignment that keeps the box on the side of the anchor given by `offset`.
pub fn alignment_for(offset: DVec2) -> (Horizontal, Vertical) {
    let horizontal = if offset.x > 0.0 {
        Horizontal::Left
    } else if offset.x < 0.0 {
        Horizontal::Right
    } else {
        Horizontal::Center
    };
    let vertical = if offset.y > 0.0 {
        Vertical::Bottom
    } else if offset.y < 0.0 {
        Vertical::Top
    } else {
        Vertical::Center
    };
    (horizontal, vertical)
}

/// A pop-up text box anchored at a data point.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    /// Plot area whose data coordinates `anchor` is in.
    pub axes: AxesId,
    pub figure: FigureId,
    pub anchor: DVec2,
    pub text: String,
    pub visible: bool,
    /// Offset of the box from the anchor, in display points. Positive y is up.
    pub offset: DVec2,
    pub horizontal_alignment: Horizontal,
    pub vertical_alignment: Vertical,
    pub draggable: bool,
    pub style: AnnotationStyle,
    has_been_shown: bool,
}

impl Annotation {
    /// A hidden, empty annotation for `axes`.
    pub(crate) fn new(
        axes: AxesId,
        figure: FigureId,
        style: AnnotationStyle,
        draggable: bool,
    ) -> Self {
        let (horizontal_alignment, vertical_alignment) = alignment_for(style.offset);
        Self {
            id: AnnotationId::new(),
            axes,
            figure,
            anchor: DVec2::ZERO,
            text: String::new(),
            visible: false,
            offset: style.offset,
            horizontal_alignment,
            vertical_alignment,
            draggable,
            style,
            has_been_shown: false,
        }
    }

    /// Whether this annotation has ever been displayed.
    pub fn has_been_shown(&self) -> bool {
        self.has_been_shown
    }

    pub(crate) fn show_at(&mut self, anchor: DVec2, text: String) {
        self.anchor = anchor;
        self.text = text;
        self.visible = true;
        self.has_been_shown = true;
    }

    /// Set the offset and re-derive the text alignment from it.
    pub fn set_offset(&mut self, offset: DVec2) {
        self.offset = offset;
        (self.horizontal_alignment, self.vertical_alignment) = alignment_for(offset);
    }

    /// Mirror the offset along each axis on which `extent` sticks out of `figure`.
    ///
    /// Both rectangles are in screen space. Returns whether the offset changed.
    pub fn keep_inside(&mut self, extent: Rectangle, figure: Rectangle) -> bool {
        let outside_x = extent.x < figure.x || extent.x + extent.width > figure.x + figure.width;
        let outside_y =
            extent.y < figure.y || extent.y + extent.height > figure.y + figure.height;

        let mut offset = self.offset;
        if outside_x {
            offset.x = -offset.x;
        }
        if outside_y {
            offset.y = -offset.y;
        }
        if offset == self.offset {
            return false;
        }
        tracing::trace!(annotation = ?self.id, ?offset, "mirroring annotation to stay inside figure");
        self.set_offset(offset);
        true
    }
}

#[cfg(test)]
mod tests {
    use iced::{Point, Size};

    use super::*;

    fn annotation() -> Annotation {
        Annotation::new(AxesId(0), FigureId(0), AnnotationStyle::default(), false)
    }

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_default_alignment_follows_offset() {
        let a = annotation();
        assert_eq!(a.offset, DVec2::new(-15.0, 15.0));
        assert_eq!(a.horizontal_alignment, Horizontal::Right);
        assert_eq!(a.vertical_alignment, Vertical::Bottom);
        assert!(!a.visible);
        assert!(!a.has_been_shown());
    }

    #[test]
    fn test_alignment_for_zero_offset_is_centered() {
        assert_eq!(
            alignment_for(DVec2::ZERO),
            (Horizontal::Center, Vertical::Center)
        );
        assert_eq!(
            alignment_for(DVec2::new(3.0, -2.0)),
            (Horizontal::Left, Vertical::Top)
        );
    }

    #[test]
    fn test_style_override_is_copy_then_override() {
        let base = AnnotationStyle::default();
        let merged = base.merged(&AnnotationStyleOverride {
            background: Some(Color::WHITE),
            arrow: Some(None),
            ..Default::default()
        });
        assert_eq!(merged.background, Color::WHITE);
        assert_eq!(merged.arrow, None);
        assert_eq!(merged.offset, base.offset);
        // The base is untouched.
        assert_eq!(base, AnnotationStyle::default());
    }

    #[test]
    fn test_keep_inside_mirrors_offending_axis_only() {
        let mut a = annotation();
        let figure = rect(0.0, 0.0, 100.0, 100.0);
        // Sticks out on the left only.
        assert!(a.keep_inside(rect(-5.0, 10.0, 20.0, 10.0), figure));
        assert_eq!(a.offset, DVec2::new(15.0, 15.0));
        assert_eq!(a.horizontal_alignment, Horizontal::Left);
        assert_eq!(a.vertical_alignment, Vertical::Bottom);
    }

    #[test]
    fn test_keep_inside_mirrors_both_axes() {
        let mut a = annotation();
        let figure = rect(0.0, 0.0, 100.0, 100.0);
        assert!(a.keep_inside(rect(-5.0, -5.0, 20.0, 10.0), figure));
        assert_eq!(a.offset, DVec2::new(15.0, -15.0));
        assert_eq!(a.vertical_alignment, Vertical::Top);
    }

    #[test]
    fn test_keep_inside_is_idempotent_once_inside() {
        let mut a = annotation();
        let figure = rect(0.0, 0.0, 100.0, 100.0);
        let inside = rect(10.0, 10.0, 20.0, 10.0);
        assert!(!a.keep_inside(inside, figure));
        assert!(!a.keep_inside(inside, figure));
        assert_eq!(a.offset, AnnotationStyle::default().offset);
    }
}
