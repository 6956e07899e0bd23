//! Per-artist-category extraction of the fields shown for a pick.
use std::collections::HashMap;

use glam::{DMat4, DVec2};
use indexmap::IndexMap;

use crate::{
    artist::{
        Artist, ArtistId, ArtistKind, ArtistRegistry, AxesId, CollectionData, ContainerRole,
        LineStyle, is_legend_label,
    },
    error::PickInfoError,
    format::format_sig,
    geometry,
};

/// A resolved selection of a managed artist.
#[derive(Debug, Clone, PartialEq)]
pub struct PickEvent {
    pub artist: ArtistId,
    pub axes: AxesId,
    /// Selected sub-items (points of a line, markers of a scatter, ...). May be empty.
    pub indices: Vec<usize>,
    /// Pointer position in the artist's data coordinates.
    pub position: DVec2,
    /// Pointer position in host screen coordinates.
    pub screen: DVec2,
    /// Serial number of the pointer event that produced this pick.
    pub serial: u64,
}

impl PickEvent {
    pub fn index(&self) -> Option<usize> {
        self.indices.first().copied()
    }
}

/// A single field value in a [`PickInfo`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    /// Explicitly "no value" (e.g. a constant color array); skipped when formatting.
    Absent,
    Number(f64),
    Index(usize),
    Text(String),
    Labels(Vec<String>),
}

impl PropValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Index(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Option<f64>> for PropValue {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Absent, Self::Number)
    }
}

impl From<usize> for PropValue {
    fn from(v: usize) -> Self {
        Self::Index(v)
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

/// Ordered field mapping describing a pick: `x`, `y`, `z`, `label`, ...
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickInfo {
    fields: IndexMap<String, PropValue>,
}

impl PickInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.fields.get(key)
    }

    /// Numeric value of `key`, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?.as_f64()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Overwrite fields of `self` with those of `other`.
    pub fn merge(&mut self, other: PickInfo) {
        self.fields.extend(other.fields);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The anchor point, if both `x` and `y` are numeric.
    pub fn anchor(&self) -> Option<DVec2> {
        Some(DVec2::new(self.number("x")?, self.number("y")?))
    }
}

/// Labels for the sub-items of artists.
#[derive(Debug, Clone, PartialEq)]
pub enum PointLabels {
    /// One sequence used for every artist.
    Shared(Vec<String>),
    /// A sequence per artist.
    PerArtist(HashMap<ArtistId, Vec<String>>),
}

impl PointLabels {
    /// Labels at `indices` for `artist`. Any miss means "no label available".
    pub fn lookup(&self, artist: ArtistId, indices: &[usize]) -> Option<Vec<String>> {
        if indices.is_empty() {
            return None;
        }
        let labels = match self {
            Self::Shared(labels) => labels,
            Self::PerArtist(map) => map.get(&artist)?,
        };
        indices.iter().map(|&i| labels.get(i).cloned()).collect()
    }
}

/// Everything an extractor may read about a pick.
pub(crate) struct PickContext<'a> {
    pub(crate) event: &'a PickEvent,
    pub(crate) artist: &'a Artist,
    pub(crate) registry: &'a ArtistRegistry,
    /// 3D projection of the artist's plot area, if the host has one.
    pub(crate) projection: Option<DMat4>,
    /// Interpolate along lines instead of snapping to the selected vertex.
    pub(crate) interpolate: bool,
}

pub(crate) type Extractor = fn(&PickContext<'_>) -> Result<PickInfo, PickInfoError>;

const LINE: &[(&str, Extractor)] = &[("line", line_props), ("errorbar", errorbar_props)];
const IMAGE: &[(&str, Extractor)] = &[("image", image_props)];
const PATH_COLLECTION: &[(&str, Extractor)] = &[
    ("collection", collection_props),
    ("scatter", scatter_props),
    ("contour", contour_props),
];
const LINE_COLLECTION: &[(&str, Extractor)] = &[
    ("collection", collection_props),
    ("contour", contour_props),
    ("errorbar", errorbar_props),
];
const PATCH_COLLECTION: &[(&str, Extractor)] =
    &[("collection", collection_props), ("contour", contour_props)];
const QUAD_MESH: &[(&str, Extractor)] = &[("collection", collection_props)];
const RECTANGLE: &[(&str, Extractor)] = &[("rectangle", rectangle_props)];
const SURFACE: &[(&str, Extractor)] = &[("surface", surface_props)];

/// Extractors for an artist kind, in merge order (later ones win).
pub(crate) fn extractors_for(kind: &ArtistKind) -> &'static [(&'static str, Extractor)] {
    match kind {
        ArtistKind::Line(_) => LINE,
        ArtistKind::Image(_) => IMAGE,
        // Poly collections are scatter-like too.
        ArtistKind::PathCollection(_) | ArtistKind::PolyCollection(_) => PATH_COLLECTION,
        ArtistKind::LineCollection(_) => LINE_COLLECTION,
        ArtistKind::PatchCollection(_) => PATCH_COLLECTION,
        ArtistKind::QuadMesh(_) => QUAD_MESH,
        ArtistKind::Rectangle(_) => RECTANGLE,
        ArtistKind::Surface3D(_) => SURFACE,
    }
}

/// Base fields plus the merged output of every extractor for the picked artist.
///
/// A failing extractor contributes nothing.
pub(crate) fn event_info(ctx: &PickContext<'_>) -> PickInfo {
    let mut info = PickInfo::new()
        .with("x", ctx.event.position.x)
        .with("y", ctx.event.position.y);
    info.insert(
        "label",
        ctx.artist
            .label
            .clone()
            .map_or(PropValue::Absent, PropValue::Text),
    );

    for (name, extract) in extractors_for(&ctx.artist.kind) {
        match extract(ctx) {
            Ok(props) => info.merge(props),
            Err(err) => {
                tracing::debug!(artist = %ctx.artist.id, extractor = name, "pick info skipped: {err}");
            }
        }
    }
    info
}

fn selected_index(ctx: &PickContext<'_>) -> Result<usize, PickInfoError> {
    ctx.event
        .index()
        .ok_or(PickInfoError::MissingIndex(ctx.artist.id))
}

fn line_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let ArtistKind::Line(line) = &ctx.artist.kind else {
        return Ok(PickInfo::new());
    };
    if line.vertices.is_empty() {
        return Err(PickInfoError::EmptyArtist(ctx.artist.id));
    }

    let snap = line.line_style == LineStyle::None
        || matches!(line.draw_style, crate::artist::DrawStyle::Other(_))
        || !ctx.interpolate;

    let point = if snap {
        let i = selected_index(ctx)?;
        *line
            .vertices
            .get(i)
            .ok_or(PickInfoError::IndexOutOfRange {
                index: i,
                len: line.vertices.len(),
            })?
    } else {
        geometry::nearest_point_on_steps(&line.vertices, &line.draw_style, ctx.event.position)
            .ok_or(PickInfoError::EmptyArtist(ctx.artist.id))?
            .point
    };

    Ok(PickInfo::new().with("x", point.x).with("y", point.y))
}

fn image_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let ArtistKind::Image(image) = &ctx.artist.kind else {
        return Ok(PickInfo::new());
    };
    let DVec2 { x, y } = ctx.event.position;
    let (row, col) =
        geometry::data_to_index(image.extent, image.origin, image.raster.shape(), x, y)
            .ok_or(PickInfoError::OutsideImage { x, y })?;
    let pixel = image
        .raster
        .pixel(row, col)
        .ok_or(PickInfoError::IndexOutOfRange {
            index: row * image.raster.cols + col,
            len: image.raster.values.len() / image.raster.bands.max(1),
        })?;

    let z = match pixel {
        [v] if v.is_nan() => PropValue::Text("--".into()),
        [v] => PropValue::Number(*v),
        bands => PropValue::Text(
            bands
                .iter()
                .map(|v| format_sig(*v, 3))
                .collect::<Vec<_>>()
                .join(", "),
        ),
    };

    Ok(PickInfo::new()
        .with("z", z)
        .with("row", row)
        .with("col", col))
}

/// Value of a per-item array at `index`; absent for missing or constant arrays.
fn per_item(values: Option<&Vec<f64>>, index: usize) -> Result<PropValue, PickInfoError> {
    match values {
        None => Ok(PropValue::Absent),
        Some(v) if v.len() <= 1 => Ok(PropValue::Absent),
        Some(v) => v
            .get(index)
            .map(|x| PropValue::Number(*x))
            .ok_or(PickInfoError::IndexOutOfRange {
                index,
                len: v.len(),
            }),
    }
}

fn collection_of<'a>(ctx: &PickContext<'a>) -> Option<&'a CollectionData> {
    ctx.artist.kind.collection()
}

fn collection_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let Some(collection) = collection_of(ctx) else {
        return Ok(PickInfo::new());
    };
    let z = per_item(collection.values.as_ref(), selected_index(ctx)?)?;
    Ok(PickInfo::new().with("z", z.clone()).with("color", z))
}

fn scatter_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let Some(collection) = collection_of(ctx) else {
        return Ok(PickInfo::new());
    };
    let i = selected_index(ctx)?;
    let size = per_item(collection.sizes.as_ref(), i)?;

    let mut info = PickInfo::new();
    // Snap to the plotted marker when offsets exist.
    if let Some(offset) = collection.offsets.get(i) {
        info.insert("x", offset.x);
        info.insert("y", offset.y);
    }
    info.insert("size", size);
    Ok(info)
}

fn contour_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    Ok(match ctx.registry.contour_level(ctx.artist.id) {
        Some(level) => PickInfo::new().with("z", level),
        None => PickInfo::new(),
    })
}

fn rectangle_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let ArtistKind::Rectangle(rect) = &ctx.artist.kind else {
        return Ok(PickInfo::new());
    };
    let (x0, x1) = (rect.anchor.x, rect.anchor.x + rect.width);
    let (y0, y1) = (rect.anchor.y, rect.anchor.y + rect.height);

    let label = ctx
        .artist
        .legend_label()
        .map(str::to_owned)
        .or_else(|| {
            ctx.registry
                .parent(ctx.artist.id)?
                .label
                .clone()
                .filter(|l| is_legend_label(l))
        })
        .map_or(PropValue::Absent, PropValue::Text);

    Ok(PickInfo::new()
        .with("width", rect.width)
        .with("height", rect.height)
        .with("left", x0.min(x1))
        .with("right", x0.max(x1))
        .with("bottom", y0.min(y1))
        .with("top", y0.max(y1))
        .with("xcenter", 0.5 * (x0 + x1))
        .with("ycenter", 0.5 * (y0 + y1))
        .with("label", label))
}

/// Half the span of whisker `index` of `whiskers` along `axis` (0 = x, 1 = y).
fn whisker_half_span(
    registry: &ArtistRegistry,
    whiskers: Option<ArtistId>,
    index: usize,
    axis: usize,
) -> PropValue {
    let segment = whiskers
        .and_then(|id| registry.get(id))
        .and_then(|a| a.kind.collection())
        .and_then(|c| c.segments.get(index));
    let Some(segment) = segment.filter(|s| !s.is_empty()) else {
        return PropValue::Absent;
    };
    let (lo, hi) = segment
        .iter()
        .map(|p| p[axis])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    PropValue::Number(0.5 * (hi - lo))
}

fn errorbar_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let Some(i) = ctx.event.index() else {
        return Ok(PickInfo::new());
    };
    let Some(parent) = ctx.registry.parent(ctx.artist.id) else {
        return Ok(PickInfo::new());
    };
    let ContainerRole::ErrorBar {
        data_line,
        x_errors,
        y_errors,
    } = &parent.role
    else {
        return Ok(PickInfo::new());
    };

    let mut info = PickInfo::new();
    if let Some(point) = ctx
        .registry
        .get(*data_line)
        .and_then(|line| line.item_position(i))
    {
        info.insert("x", point.x);
        info.insert("y", point.y);
    }
    info.insert("xerror", whisker_half_span(ctx.registry, *x_errors, i, 0));
    info.insert("yerror", whisker_half_span(ctx.registry, *y_errors, i, 1));
    if let Some(label) = parent.label.as_deref().filter(|l| is_legend_label(l)) {
        info.insert("label", label);
    }
    Ok(info)
}

fn surface_props(ctx: &PickContext<'_>) -> Result<PickInfo, PickInfoError> {
    let ArtistKind::Surface3D(surface) = &ctx.artist.kind else {
        return Ok(PickInfo::new());
    };
    let Some(projection) = ctx.projection else {
        tracing::debug!(artist = %ctx.artist.id, "no 3D projection yet");
        return Ok(PickInfo::new());
    };
    let edges = geometry::cuboid_edges(surface.bounds_min, surface.bounds_max);
    let Some(edges) = geometry::project_edges(&edges, &projection) else {
        return Ok(PickInfo::new());
    };
    Ok(
        match geometry::nearest_edge_projection(&edges, ctx.event.screen, Some(&projection)) {
            Some(p) => PickInfo::new().with("x", p.x).with("y", p.y).with("z", p.z),
            None => PickInfo::new(),
        },
    )
}
