#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    time::Duration,
};

use glam::{DMat4, DVec2};
use iced::{Point, Rectangle, Size, keyboard::Key, mouse};
use iced_datacursor::{
    Annotation, AnnotationId, Artist, ArtistId, ArtistKind, AxesId, AxisScale, CursorEvent,
    DataCursor, FigureId, Highlight, PlotHost, Plottable, Subscription, artist::LineStyle,
};
use indexmap::IndexMap;

pub const FIG: FigureId = FigureId(1);
pub const AX: AxesId = AxesId(1);
pub const AX2: AxesId = AxesId(2);

/// Data units to screen units in every plot area unless overridden.
pub const SCALE: f64 = 50.0;

/// A plotting host that records everything the cursor asks of it.
///
/// Screen coordinates are `data * SCALE + offset`, with the offset set per
/// plot area. Annotation boxes are laid out as `BOX` sized rectangles placed
/// on the side of the anchor their offset points to.
pub struct MockHost {
    pub axes_figures: HashMap<AxesId, FigureId>,
    pub axes_offsets: HashMap<AxesId, DVec2>,
    pub scales: HashMap<AxesId, (AxisScale, AxisScale)>,
    pub projections: HashMap<AxesId, DMat4>,
    pub figure_bounds: Option<Rectangle>,
    pub plotted: Vec<(AxesId, Vec<Plottable>)>,
    /// Hit-test results returned for an artist wherever the pointer is.
    pub forced_hits: HashMap<ArtistId, Vec<usize>>,

    pub subscriptions: HashSet<(FigureId, Subscription)>,
    pub pickable: HashMap<ArtistId, Option<f32>>,
    pub timers: Vec<(AxesId, Duration)>,
    pub redraws: Vec<FigureId>,
    pub overlays: IndexMap<AnnotationId, Annotation>,
    pub highlights: IndexMap<ArtistId, Highlight>,
}

pub const BOX: DVec2 = DVec2::new(40.0, 20.0);

impl MockHost {
    pub fn new() -> Self {
        Self {
            axes_figures: HashMap::new(),
            axes_offsets: HashMap::new(),
            scales: HashMap::new(),
            projections: HashMap::new(),
            figure_bounds: Some(Rectangle::new(Point::ORIGIN, Size::new(600.0, 600.0))),
            plotted: Vec::new(),
            forced_hits: HashMap::new(),
            subscriptions: HashSet::new(),
            pickable: HashMap::new(),
            timers: Vec::new(),
            redraws: Vec::new(),
            overlays: IndexMap::new(),
            highlights: IndexMap::new(),
        }
    }

    pub fn to_screen(&self, axes: AxesId, data: DVec2) -> DVec2 {
        data * SCALE + self.axes_offsets.get(&axes).copied().unwrap_or(DVec2::ZERO)
    }

    pub fn to_data(&self, axes: AxesId, screen: DVec2) -> DVec2 {
        (screen - self.axes_offsets.get(&axes).copied().unwrap_or(DVec2::ZERO)) / SCALE
    }

    fn near_points(&self, axes: AxesId, points: &[DVec2], screen: DVec2, tolerance: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, p)| self.to_screen(axes, **p).distance(screen) <= tolerance)
            .map(|(i, _)| i)
            .collect()
    }

    fn near_path(&self, axes: AxesId, path: &[DVec2], screen: DVec2, tolerance: f64) -> bool {
        let pts: Vec<DVec2> = path.iter().map(|p| self.to_screen(axes, *p)).collect();
        pts.iter().any(|p| p.distance(screen) <= tolerance)
            || pts
                .windows(2)
                .any(|w| segment_distance(w[0], w[1], screen) <= tolerance)
    }
}

fn segment_distance(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    let ab = b - a;
    let len2 = ab.length_squared();
    if len2 == 0.0 {
        return a.distance(p);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (a + ab * t).distance(p)
}

impl PlotHost for MockHost {
    fn figure_of(&self, axes: AxesId) -> FigureId {
        self.axes_figures.get(&axes).copied().unwrap_or(FIG)
    }

    fn subscribe(&mut self, figure: FigureId, subscription: Subscription) {
        self.subscriptions.insert((figure, subscription));
    }

    fn unsubscribe(&mut self, figure: FigureId, subscription: Subscription) {
        self.subscriptions.remove(&(figure, subscription));
    }

    fn set_pickable(&mut self, artist: ArtistId, tolerance: Option<f32>) {
        self.pickable.insert(artist, tolerance);
    }

    fn hit_test(&self, artist: &Artist, screen: DVec2, tolerance: f32) -> Option<Vec<usize>> {
        if let Some(indices) = self.forced_hits.get(&artist.id) {
            return Some(indices.clone());
        }
        let tolerance = f64::from(tolerance);
        let axes = artist.axes;
        match &artist.kind {
            ArtistKind::Line(line) => {
                let near = self.near_points(axes, &line.vertices, screen, tolerance);
                if !near.is_empty() {
                    return Some(near);
                }
                if line.line_style == LineStyle::None {
                    return None;
                }
                line.vertices
                    .windows(2)
                    .position(|w| self.near_path(axes, w, screen, tolerance))
                    .map(|i| vec![i])
            }
            ArtistKind::Image(image) => {
                let [x0, x1, y0, y1] = image.extent;
                let d = self.to_data(axes, screen);
                (d.x >= x0.min(x1) && d.x <= x0.max(x1) && d.y >= y0.min(y1) && d.y <= y0.max(y1))
                    .then(Vec::new)
            }
            ArtistKind::Rectangle(rect) => {
                let d = self.to_data(axes, screen);
                let (xa, xb) = (rect.anchor.x, rect.anchor.x + rect.width);
                let (ya, yb) = (rect.anchor.y, rect.anchor.y + rect.height);
                (d.x >= xa.min(xb) && d.x <= xa.max(xb) && d.y >= ya.min(yb) && d.y <= ya.max(yb))
                    .then(Vec::new)
            }
            ArtistKind::PathCollection(c)
            | ArtistKind::LineCollection(c)
            | ArtistKind::PatchCollection(c)
            | ArtistKind::PolyCollection(c)
            | ArtistKind::QuadMesh(c) => {
                let near = self.near_points(axes, &c.offsets, screen, tolerance);
                if !near.is_empty() {
                    return Some(near);
                }
                let near: Vec<usize> = c
                    .segments
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| self.near_path(axes, s, screen, tolerance))
                    .map(|(i, _)| i)
                    .collect();
                (!near.is_empty()).then_some(near)
            }
            ArtistKind::Surface3D(_) => Some(Vec::new()),
        }
    }

    fn screen_to_data(&self, axes: AxesId, screen: DVec2) -> Option<DVec2> {
        Some(self.to_data(axes, screen))
    }

    fn data_to_screen(&self, axes: AxesId, data: DVec2) -> Option<DVec2> {
        Some(self.to_screen(axes, data))
    }

    fn axis_scales(&self, axes: AxesId) -> (AxisScale, AxisScale) {
        self.scales.get(&axes).copied().unwrap_or_default()
    }

    fn projection(&self, axes: AxesId) -> Option<DMat4> {
        self.projections.get(&axes).copied()
    }

    fn sync_annotation(&mut self, annotation: &Annotation) {
        self.overlays.insert(annotation.id, annotation.clone());
    }

    fn annotation_extent(&self, id: AnnotationId) -> Option<Rectangle> {
        let a = self.overlays.get(&id)?;
        let corner = self.to_screen(a.axes, a.anchor) + a.offset;
        let place = |origin: f64, offset: f64, size: f64| {
            if offset > 0.0 {
                origin
            } else if offset < 0.0 {
                origin - size
            } else {
                origin - size / 2.0
            }
        };
        let x = place(corner.x, a.offset.x, BOX.x);
        let y = place(corner.y, a.offset.y, BOX.y);
        Some(Rectangle::new(
            Point::new(x as f32, y as f32),
            Size::new(BOX.x as f32, BOX.y as f32),
        ))
    }

    fn figure_extent(&self, _figure: FigureId) -> Option<Rectangle> {
        self.figure_bounds
    }

    fn start_timer(&mut self, axes: AxesId, interval: Duration) {
        self.timers.push((axes, interval));
    }

    fn redraw(&mut self, figure: FigureId) {
        self.redraws.push(figure);
    }

    fn sync_highlight(&mut self, highlight: &Highlight, source: &Artist) {
        assert_eq!(highlight.source, source.id);
        self.highlights.insert(source.id, highlight.clone());
    }

    fn all_axes(&self) -> Vec<AxesId> {
        self.plotted.iter().map(|(ax, _)| *ax).collect()
    }

    fn plotted_artists(&self, axes: AxesId) -> Vec<Plottable> {
        self.plotted
            .iter()
            .filter(|(ax, _)| *ax == axes)
            .flat_map(|(_, artists)| artists.clone())
            .collect()
    }
}

/// Press `button` at the screen position of data point `data` of `axes`.
pub fn press_at(cursor: &mut DataCursor<MockHost>, button: mouse::Button, axes: AxesId, data: DVec2) {
    let position = cursor.host().to_screen(axes, data);
    let figure = cursor.host().figure_of(axes);
    cursor.handle_event(CursorEvent::ButtonPressed {
        figure,
        button,
        position,
    });
}

/// Left-click the screen position of data point (`x`, `y`) of `axes`.
pub fn click(cursor: &mut DataCursor<MockHost>, axes: AxesId, x: f64, y: f64) {
    press_at(cursor, mouse::Button::Left, axes, DVec2::new(x, y));
}

pub fn move_to(cursor: &mut DataCursor<MockHost>, axes: AxesId, x: f64, y: f64) {
    let position = cursor.host().to_screen(axes, DVec2::new(x, y));
    let figure = cursor.host().figure_of(axes);
    cursor.handle_event(CursorEvent::CursorMoved { figure, position });
}

pub fn press_key(cursor: &mut DataCursor<MockHost>, key: Key) {
    cursor.handle_event(CursorEvent::KeyPressed { figure: FIG, key });
}

/// Let every debounce timer fire.
pub fn expire_timers(cursor: &mut DataCursor<MockHost>) {
    let axes: Vec<AxesId> = cursor.host().timers.iter().map(|(ax, _)| *ax).collect();
    for ax in axes {
        cursor.handle_event(CursorEvent::TimerFired(ax));
    }
}

pub fn visible_count(cursor: &DataCursor<MockHost>) -> usize {
    cursor.visible_annotations().count()
}
