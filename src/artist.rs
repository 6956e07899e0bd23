//! Plottable elements a data cursor can select, and the registry that tracks them.
use core::fmt;
use std::collections::HashMap;

use glam::{DVec2, DVec3};
use indexmap::IndexMap;

/// Unique identifier for a managed artist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtistId(pub(crate) u64);

impl ArtistId {
    /// Create a new unique artist ID (0, 1, 2, ...).
    pub(crate) fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Artist({})", self.0)
    }
}

/// Unique identifier for a grouping container (bar groups, error bars).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub(crate) u64);

impl ContainerId {
    pub(crate) fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Host-assigned identifier of a plot area (a set of data axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxesId(pub u64);

/// Host-assigned identifier of a figure (window/canvas).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FigureId(pub u64);

/// How the segments of a point series are stroked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    DashDot,
    Dotted,
    /// Markers only; no connecting line is drawn.
    None,
}

/// How consecutive vertices of a point series are joined.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DrawStyle {
    /// Straight segments between vertices.
    #[default]
    Default,
    /// Vertical step at the start of each interval.
    StepsPre,
    /// Vertical step halfway along each interval.
    StepsMid,
    /// Vertical step at the end of each interval.
    StepsPost,
    /// A style this crate does not know how to interpolate.
    Other(String),
}

impl From<&str> for DrawStyle {
    fn from(s: &str) -> Self {
        match s {
            "default" => Self::Default,
            "steps" | "steps-pre" => Self::StepsPre,
            "steps-mid" => Self::StepsMid,
            "steps-post" => Self::StepsPost,
            other => Self::Other(other.to_owned()),
        }
    }
}

/// Which corner of the plot area holds array element `[0, 0]` of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageOrigin {
    /// Row 0 is drawn at the top of the extent.
    #[default]
    Upper,
    /// Row 0 is drawn at the bottom of the extent.
    Lower,
}

/// Row-major raster values, with one or more bands per pixel.
///
/// Masked cells are stored as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub rows: usize,
    pub cols: usize,
    pub bands: usize,
    pub values: Vec<f64>,
}

impl Raster {
    /// Single-band raster. `values.len()` should equal `rows * cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Self {
        Self::with_bands(rows, cols, 1, values)
    }

    /// Multi-band raster (e.g. RGB). `values.len()` should equal `rows * cols * bands`.
    pub fn with_bands(rows: usize, cols: usize, bands: usize, values: Vec<f64>) -> Self {
        Self {
            rows,
            cols,
            bands: bands.max(1),
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// All bands of the pixel at (`row`, `col`).
    pub fn pixel(&self, row: usize, col: usize) -> Option<&[f64]> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let start = (row * self.cols + col) * self.bands;
        self.values.get(start..start + self.bands)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    pub vertices: Vec<DVec2>,
    pub line_style: LineStyle,
    pub draw_style: DrawStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// `[xmin, xmax, ymin, ymax]` in data coordinates.
    pub extent: [f64; 4],
    pub origin: ImageOrigin,
    pub raster: Raster,
}

/// Per-item data shared by every collection flavour.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionData {
    /// Plotted offset of each item (scatter positions). May be empty.
    pub offsets: Vec<DVec2>,
    /// Paths of each item (line-collection segments, error-bar whiskers).
    pub segments: Vec<Vec<DVec2>>,
    /// Per-item color-mapped values. A single entry means a constant color.
    pub values: Option<Vec<f64>>,
    /// Per-item marker sizes. A single entry means a constant size.
    pub sizes: Option<Vec<f64>>,
}

impl CollectionData {
    fn item_count(&self) -> usize {
        self.offsets
            .len()
            .max(self.segments.len())
            .max(self.values.as_ref().map_or(0, Vec::len))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleData {
    /// Lower-left corner in data coordinates.
    pub anchor: DVec2,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceData {
    /// Lower corner of the 3D axes bounding cuboid.
    pub bounds_min: DVec3,
    /// Upper corner of the 3D axes bounding cuboid.
    pub bounds_max: DVec3,
}

/// The category of an artist together with the data its extractors read.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtistKind {
    Line(LineData),
    Image(ImageData),
    PathCollection(CollectionData),
    LineCollection(CollectionData),
    PatchCollection(CollectionData),
    PolyCollection(CollectionData),
    QuadMesh(CollectionData),
    Rectangle(RectangleData),
    Surface3D(SurfaceData),
}

/// Category tag of an [`ArtistKind`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtistCategory {
    PointSeries,
    RasterImage,
    PathCollection,
    LineCollection,
    PatchCollection,
    PolygonCollection,
    QuadMesh,
    Rectangle,
    Surface3D,
}

impl ArtistKind {
    pub fn category(&self) -> ArtistCategory {
        match self {
            Self::Line(_) => ArtistCategory::PointSeries,
            Self::Image(_) => ArtistCategory::RasterImage,
            Self::PathCollection(_) => ArtistCategory::PathCollection,
            Self::LineCollection(_) => ArtistCategory::LineCollection,
            Self::PatchCollection(_) => ArtistCategory::PatchCollection,
            Self::PolyCollection(_) => ArtistCategory::PolygonCollection,
            Self::QuadMesh(_) => ArtistCategory::QuadMesh,
            Self::Rectangle(_) => ArtistCategory::Rectangle,
            Self::Surface3D(_) => ArtistCategory::Surface3D,
        }
    }

    pub(crate) fn collection(&self) -> Option<&CollectionData> {
        match self {
            Self::PathCollection(c)
            | Self::LineCollection(c)
            | Self::PatchCollection(c)
            | Self::PolyCollection(c)
            | Self::QuadMesh(c) => Some(c),
            _ => None,
        }
    }

    fn collection_mut(&mut self) -> Option<&mut CollectionData> {
        match self {
            Self::PathCollection(c)
            | Self::LineCollection(c)
            | Self::PatchCollection(c)
            | Self::PolyCollection(c)
            | Self::QuadMesh(c) => Some(c),
            _ => None,
        }
    }
}

/// A plotted element registered with a data cursor as selectable.
#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub id: ArtistId,
    /// Plot area the artist is drawn in.
    pub axes: AxesId,
    /// Legend label. Labels starting with `_` are "no legend" placeholders.
    pub label: Option<String>,
    pub kind: ArtistKind,
}

impl Artist {
    pub fn new(axes: AxesId, kind: ArtistKind) -> Self {
        Self {
            id: ArtistId::new(),
            axes,
            label: None,
            kind,
        }
    }

    /// A point series joined by solid straight segments.
    pub fn line(axes: AxesId, vertices: Vec<DVec2>) -> Self {
        Self::new(
            axes,
            ArtistKind::Line(LineData {
                vertices,
                line_style: LineStyle::Solid,
                draw_style: DrawStyle::Default,
            }),
        )
    }

    /// A scatter plot: a path collection with one offset per marker.
    pub fn scatter(axes: AxesId, offsets: Vec<DVec2>) -> Self {
        Self::new(
            axes,
            ArtistKind::PathCollection(CollectionData {
                offsets,
                ..CollectionData::default()
            }),
        )
    }

    pub fn line_collection(axes: AxesId, segments: Vec<Vec<DVec2>>) -> Self {
        Self::new(
            axes,
            ArtistKind::LineCollection(CollectionData {
                segments,
                ..CollectionData::default()
            }),
        )
    }

    pub fn patch_collection(axes: AxesId, data: CollectionData) -> Self {
        Self::new(axes, ArtistKind::PatchCollection(data))
    }

    pub fn poly_collection(axes: AxesId, data: CollectionData) -> Self {
        Self::new(axes, ArtistKind::PolyCollection(data))
    }

    pub fn quad_mesh(axes: AxesId, values: Vec<f64>) -> Self {
        Self::new(
            axes,
            ArtistKind::QuadMesh(CollectionData {
                values: Some(values),
                ..CollectionData::default()
            }),
        )
    }

    /// An image drawn over `extent = [xmin, xmax, ymin, ymax]`.
    pub fn image(axes: AxesId, extent: [f64; 4], raster: Raster) -> Self {
        Self::new(
            axes,
            ArtistKind::Image(ImageData {
                extent,
                origin: ImageOrigin::default(),
                raster,
            }),
        )
    }

    /// A rectangle (bar) with its lower-left corner at `(x, y)`.
    pub fn rectangle(axes: AxesId, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            axes,
            ArtistKind::Rectangle(RectangleData {
                anchor: DVec2::new(x, y),
                width,
                height,
            }),
        )
    }

    pub fn surface(axes: AxesId, bounds_min: DVec3, bounds_max: DVec3) -> Self {
        Self::new(
            axes,
            ArtistKind::Surface3D(SurfaceData {
                bounds_min,
                bounds_max,
            }),
        )
    }

    /// Set the legend label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let l = label.into();
        if !l.is_empty() {
            self.label = Some(l);
        }
        self
    }

    /// Set the line style of a point series. Ignored for other kinds.
    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        if let ArtistKind::Line(line) = &mut self.kind {
            line.line_style = style;
        }
        self
    }

    /// Set the draw style of a point series. Ignored for other kinds.
    pub fn with_draw_style(mut self, style: impl Into<DrawStyle>) -> Self {
        if let ArtistKind::Line(line) = &mut self.kind {
            line.draw_style = style.into();
        }
        self
    }

    /// Set the origin of an image. Ignored for other kinds.
    pub fn with_origin(mut self, origin: ImageOrigin) -> Self {
        if let ArtistKind::Image(image) = &mut self.kind {
            image.origin = origin;
        }
        self
    }

    /// Set per-item color values of a collection. Ignored for other kinds.
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        if let Some(c) = self.kind.collection_mut() {
            c.values = Some(values);
        }
        self
    }

    /// Set per-item sizes of a collection. Ignored for other kinds.
    pub fn with_sizes(mut self, sizes: Vec<f64>) -> Self {
        if let Some(c) = self.kind.collection_mut() {
            c.sizes = Some(sizes);
        }
        self
    }

    /// Set the item offsets of a collection. Ignored for other kinds.
    pub fn with_offsets(mut self, offsets: Vec<DVec2>) -> Self {
        if let Some(c) = self.kind.collection_mut() {
            c.offsets = offsets;
        }
        self
    }

    pub fn category(&self) -> ArtistCategory {
        self.kind.category()
    }

    /// The legend label, unless absent, empty, or a `_`-prefixed placeholder.
    pub fn legend_label(&self) -> Option<&str> {
        self.label.as_deref().filter(|l| is_legend_label(l))
    }

    /// Raw x/y samples, for artists that have them.
    pub fn samples(&self) -> Option<&[DVec2]> {
        match &self.kind {
            ArtistKind::Line(line) => Some(&line.vertices),
            ArtistKind::PathCollection(c) | ArtistKind::PolyCollection(c)
                if !c.offsets.is_empty() =>
            {
                Some(&c.offsets)
            }
            _ => None,
        }
    }

    /// Number of selectable sub-items, if the artist has any.
    pub fn item_count(&self) -> Option<usize> {
        match &self.kind {
            ArtistKind::Line(line) => Some(line.vertices.len()),
            kind => kind.collection().map(CollectionData::item_count),
        }
        .filter(|n| *n > 0)
    }

    /// Data position of sub-item `index`, for artists with raw samples.
    pub fn item_position(&self, index: usize) -> Option<DVec2> {
        self.samples()?.get(index).copied()
    }
}

/// Returns true for a label that should appear in a legend.
pub(crate) fn is_legend_label(label: &str) -> bool {
    !label.is_empty() && !label.starts_with('_')
}

/// A contour plot: one artist per level.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    pub levels: Vec<f64>,
    pub collections: Vec<Artist>,
}

impl ContourSet {
    /// Pairs `levels[i]` with `collections[i]`; extra entries on either side are ignored.
    pub fn new(levels: Vec<f64>, collections: Vec<Artist>) -> Self {
        Self {
            levels,
            collections,
        }
    }
}

/// What a container groups together.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerKind {
    /// A group of bars sharing a legend label.
    Bars(Vec<Artist>),
    /// A data line with optional whisker collections, one whisker per data point.
    ErrorBar {
        data_line: Artist,
        x_errors: Option<Artist>,
        y_errors: Option<Artist>,
    },
}

/// A host container grouping several artists under one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    pub label: Option<String>,
    pub kind: ContainerKind,
}

impl Container {
    pub fn bars(bars: Vec<Artist>) -> Self {
        Self {
            id: ContainerId::new(),
            label: None,
            kind: ContainerKind::Bars(bars),
        }
    }

    pub fn error_bar(data_line: Artist, x_errors: Option<Artist>, y_errors: Option<Artist>) -> Self {
        Self {
            id: ContainerId::new(),
            label: None,
            kind: ContainerKind::ErrorBar {
                data_line,
                x_errors,
                y_errors,
            },
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let l = label.into();
        if !l.is_empty() {
            self.label = Some(l);
        }
        self
    }
}

/// Anything that can be handed to a data cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum Plottable {
    Artist(Artist),
    Contour(ContourSet),
    Container(Container),
}

impl From<Artist> for Plottable {
    fn from(artist: Artist) -> Self {
        Self::Artist(artist)
    }
}

impl From<ContourSet> for Plottable {
    fn from(contour: ContourSet) -> Self {
        Self::Contour(contour)
    }
}

impl From<Container> for Plottable {
    fn from(container: Container) -> Self {
        Self::Container(container)
    }
}

/// Side-table facts about a registered artist.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ArtistMeta {
    pub(crate) parent: Option<ContainerId>,
    pub(crate) contour_level: Option<f64>,
}

/// The role a registered container plays for its children.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ContainerRole {
    Bars,
    ErrorBar {
        data_line: ArtistId,
        x_errors: Option<ArtistId>,
        y_errors: Option<ArtistId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContainerEntry {
    pub(crate) label: Option<String>,
    pub(crate) role: ContainerRole,
}

/// Flattened, registration-ordered set of managed artists plus their side tables.
#[derive(Debug, Clone, Default)]
pub struct ArtistRegistry {
    artists: IndexMap<ArtistId, Artist>,
    meta: HashMap<ArtistId, ArtistMeta>,
    containers: IndexMap<ContainerId, ContainerEntry>,
}

impl ArtistRegistry {
    /// Flatten contour sets and containers into their constituent artists.
    pub fn from_plottables(items: impl IntoIterator<Item = Plottable>) -> Self {
        let mut registry = Self::default();
        for item in items {
            match item {
                Plottable::Artist(artist) => registry.insert(artist, ArtistMeta::default()),
                Plottable::Contour(contour) => {
                    for (level, artist) in contour.levels.into_iter().zip(contour.collections) {
                        registry.insert(
                            artist,
                            ArtistMeta {
                                contour_level: Some(level),
                                ..ArtistMeta::default()
                            },
                        );
                    }
                }
                Plottable::Container(container) => registry.insert_container(container),
            }
        }
        registry
    }

    fn insert(&mut self, artist: Artist, meta: ArtistMeta) {
        self.meta.insert(artist.id, meta);
        self.artists.insert(artist.id, artist);
    }

    fn insert_container(&mut self, container: Container) {
        let parent = ArtistMeta {
            parent: Some(container.id),
            ..ArtistMeta::default()
        };
        let role = match container.kind {
            ContainerKind::Bars(bars) => {
                for bar in bars {
                    self.insert(bar, parent);
                }
                ContainerRole::Bars
            }
            ContainerKind::ErrorBar {
                data_line,
                x_errors,
                y_errors,
            } => {
                let role = ContainerRole::ErrorBar {
                    data_line: data_line.id,
                    x_errors: x_errors.as_ref().map(|a| a.id),
                    y_errors: y_errors.as_ref().map(|a| a.id),
                };
                for artist in std::iter::once(data_line).chain(x_errors).chain(y_errors) {
                    self.insert(artist, parent);
                }
                role
            }
        };
        self.containers.insert(
            container.id,
            ContainerEntry {
                label: container.label,
                role,
            },
        );
    }

    pub fn get(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(&id)
    }

    pub fn contains(&self, id: ArtistId) -> bool {
        self.artists.contains_key(&id)
    }

    /// Artists in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Artist> {
        self.artists.values()
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    /// Distinct plot areas touched by the managed artists, in first-seen order.
    pub fn axes(&self) -> Vec<AxesId> {
        let mut out: Vec<AxesId> = Vec::new();
        for artist in self.artists.values() {
            if !out.contains(&artist.axes) {
                out.push(artist.axes);
            }
        }
        out
    }

    pub fn contour_level(&self, id: ArtistId) -> Option<f64> {
        self.meta.get(&id)?.contour_level
    }

    pub(crate) fn parent(&self, id: ArtistId) -> Option<&ContainerEntry> {
        let parent = self.meta.get(&id)?.parent?;
        self.containers.get(&parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AX: AxesId = AxesId(0);

    #[test]
    fn test_contour_sets_are_flattened_with_levels() {
        let a = Artist::line_collection(AX, vec![]);
        let b = Artist::line_collection(AX, vec![]);
        let (ida, idb) = (a.id, b.id);
        let registry = ArtistRegistry::from_plottables([Plottable::from(ContourSet::new(
            vec![0.5, 1.5],
            vec![a, b],
        ))]);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.contour_level(ida), Some(0.5));
        assert_eq!(registry.contour_level(idb), Some(1.5));
    }

    #[test]
    fn test_container_children_know_their_parent() {
        let bar = Artist::rectangle(AX, 0.0, 0.0, 1.0, 2.0).with_label("_nolegend_");
        let id = bar.id;
        let registry = ArtistRegistry::from_plottables([Plottable::from(
            Container::bars(vec![bar]).with_label("apples"),
        )]);

        let parent = registry.parent(id).expect("bar has a parent");
        assert_eq!(parent.label.as_deref(), Some("apples"));
        assert_eq!(parent.role, ContainerRole::Bars);
    }

    #[test]
    fn test_axes_are_distinct_and_ordered() {
        let registry = ArtistRegistry::from_plottables([
            Plottable::from(Artist::line(AxesId(2), vec![DVec2::ZERO])),
            Plottable::from(Artist::line(AxesId(1), vec![DVec2::ZERO])),
            Plottable::from(Artist::line(AxesId(2), vec![DVec2::ZERO])),
        ]);
        assert_eq!(registry.axes(), vec![AxesId(2), AxesId(1)]);
    }

    #[test]
    fn test_legend_label_skips_placeholders() {
        assert_eq!(Artist::line(AX, vec![]).with_label("_line0").legend_label(), None);
        assert_eq!(Artist::line(AX, vec![]).with_label("data").legend_label(), Some("data"));
    }

    #[test]
    fn test_raster_pixel_lookup() {
        let raster = Raster::with_bands(2, 2, 3, (0..12).map(f64::from).collect());
        assert_eq!(raster.pixel(1, 0), Some(&[6.0, 7.0, 8.0][..]));
        assert_eq!(raster.pixel(2, 0), None);
    }

    #[test]
    fn test_draw_style_parsing() {
        assert_eq!(DrawStyle::from("steps"), DrawStyle::StepsPre);
        assert_eq!(DrawStyle::from("steps-mid"), DrawStyle::StepsMid);
        assert_eq!(DrawStyle::from("zigzag"), DrawStyle::Other("zigzag".into()));
    }
}
