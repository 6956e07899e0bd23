use std::{collections::HashMap, fmt, str::FromStr, time::Duration};

use glam::DVec2;
use iced::{keyboard::Key, mouse};
use indexmap::IndexMap;

use crate::{
    annotation::{Annotation, AnnotationStyle},
    artist::{Artist, ArtistRegistry, AxesId, FigureId},
    controls::{CursorControls, KeyAction},
    error::DataCursorError,
    format::{FormatContext, Formatter, PropsOverride},
    highlight::{Highlight, HighlightStyle, Highlighter},
    host::PlotHost,
    message::{CursorEvent, Subscription},
    pick_info::{PickContext, PickEvent, PickInfo, PointLabels, PropValue, event_info},
};

/// How many annotations a cursor may show at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplayMode {
    /// One annotation for the whole cursor.
    Single,
    /// One annotation per plot area, reused across selections.
    #[default]
    OnePerAxes,
    /// A new annotation for every selection. Earlier ones stay visible.
    Multiple,
}

impl DisplayMode {
    /// Accepted spellings, in declaration order.
    pub const VALID: [&'static str; 3] = ["single", "one-per-axes", "multiple"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => Self::VALID[0],
            Self::OnePerAxes => Self::VALID[1],
            Self::Multiple => Self::VALID[2],
        }
    }
}

impl FromStr for DisplayMode {
    type Err = DataCursorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "one-per-axes" => Ok(Self::OnePerAxes),
            "multiple" => Ok(Self::Multiple),
            other => Err(DataCursorError::InvalidDisplayMode(other.to_owned())),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which annotation a selection goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SlotKey {
    Global,
    Axes(AxesId),
    /// Serial number of the pointer event that produced the selection.
    Event(u64),
}

/// Resolved settings of a [`DataCursor`]. See [`crate::DataCursorBuilder`].
#[derive(Clone)]
pub(crate) struct CursorConfig {
    pub(crate) tolerance: f32,
    pub(crate) display: DisplayMode,
    pub(crate) draggable: bool,
    pub(crate) hover: bool,
    pub(crate) magnetic: bool,
    pub(crate) keep_inside: bool,
    pub(crate) interpolate: bool,
    /// `Duration::ZERO` disables debouncing.
    pub(crate) debounce: Duration,
    pub(crate) formatter: Formatter,
    pub(crate) props_override: Option<PropsOverride>,
    pub(crate) point_labels: Option<PointLabels>,
    pub(crate) controls: CursorControls,
    pub(crate) annotation_style: AnnotationStyle,
    pub(crate) date_format: String,
    pub(crate) highlight: Option<HighlightStyle>,
}

/// Interactive data cursor over a set of artists of a [`PlotHost`].
///
/// The cursor owns its host. Feed it every host notification through
/// [`DataCursor::handle_event`]; it answers by calling back into the host to
/// place, restyle and hide annotation pop-ups (and highlight overlays, if
/// highlighting was requested).
///
/// Built with [`crate::DataCursorBuilder`] or [`crate::datacursor`].
pub struct DataCursor<H: PlotHost> {
    host: H,
    registry: ArtistRegistry,
    config: CursorConfig,
    figures: Vec<FigureId>,
    annotations: IndexMap<SlotKey, Annotation>,
    /// Whether the debounce timer of each plot area has expired.
    timer_expired: HashMap<AxesId, bool>,
    highlighter: Option<Highlighter>,
    enabled: bool,
    hidden: bool,
    serial: u64,
    last: Option<(SlotKey, PickEvent)>,
}

impl<H: PlotHost> DataCursor<H> {
    pub(crate) fn new(host: H, registry: ArtistRegistry, config: CursorConfig) -> Self {
        let axes = registry.axes();
        let mut figures = Vec::new();
        for &ax in &axes {
            let figure = host.figure_of(ax);
            if !figures.contains(&figure) {
                figures.push(figure);
            }
        }

        let mut cursor = Self {
            highlighter: config.highlight.map(Highlighter::new),
            timer_expired: axes.iter().map(|&ax| (ax, true)).collect(),
            host,
            registry,
            config,
            figures,
            annotations: IndexMap::new(),
            enabled: false,
            hidden: false,
            serial: 0,
            last: None,
        };

        if cursor.config.display == DisplayMode::OnePerAxes {
            for ax in axes {
                let annotation = Annotation::new(
                    ax,
                    cursor.host.figure_of(ax),
                    cursor.config.annotation_style,
                    cursor.config.draggable,
                );
                cursor.host.sync_annotation(&annotation);
                cursor.annotations.insert(SlotKey::Axes(ax), annotation);
            }
        }

        // Key presses stay subscribed while disabled so `toggle` can re-enable.
        if cursor.config.controls.keys.is_some() {
            for &figure in &cursor.figures {
                cursor.host.subscribe(figure, Subscription::Keyboard);
            }
        }

        tracing::debug!(
            artists = cursor.registry.len(),
            figures = cursor.figures.len(),
            display = %cursor.config.display,
            "data cursor created"
        );
        cursor.enable();
        cursor
    }

    /// Subscribe to pointer events and make the managed artists pickable.
    ///
    /// No effect if already enabled.
    pub fn enable(&mut self) -> &mut Self {
        if !self.enabled {
            let subscription = Subscription::Pointer {
                hover: self.config.hover,
            };
            for &figure in &self.figures {
                self.host.subscribe(figure, subscription);
            }
            for artist in self.registry.iter() {
                self.host
                    .set_pickable(artist.id, Some(self.config.tolerance));
            }
            self.enabled = true;
        }
        self
    }

    /// Stop reacting to the pointer. Existing annotations stay as they are.
    ///
    /// No effect if already disabled.
    pub fn disable(&mut self) -> &mut Self {
        if self.enabled {
            let subscription = Subscription::Pointer {
                hover: self.config.hover,
            };
            for &figure in &self.figures {
                self.host.unsubscribe(figure, subscription);
            }
            self.enabled = false;
        }
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        if enabled { self.enable() } else { self.disable() }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Hide every annotation.
    pub fn hide(&mut self) -> &mut Self {
        for annotation in self.annotations.values_mut() {
            if annotation.visible {
                annotation.visible = false;
                self.host.sync_annotation(annotation);
            }
        }
        self.hidden = true;
        self.redraw_all();
        self
    }

    /// Bring back every annotation that has been displayed at least once.
    pub fn show(&mut self) -> &mut Self {
        for annotation in self.annotations.values_mut() {
            if annotation.has_been_shown() && !annotation.visible {
                annotation.visible = true;
                self.host.sync_annotation(annotation);
            }
        }
        self.hidden = false;
        self.redraw_all();
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.config.display
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The managed artists.
    pub fn registry(&self) -> &ArtistRegistry {
        &self.registry
    }

    /// Figures owning the managed artists.
    pub fn figures(&self) -> &[FigureId] {
        &self.figures
    }

    /// Every annotation created so far, visible or not.
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values()
    }

    pub fn visible_annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.values().filter(|a| a.visible)
    }

    /// Highlight overlays created so far. Empty unless highlighting is on.
    pub fn highlights(&self) -> impl Iterator<Item = &Highlight> {
        self.highlighter.iter().flat_map(Highlighter::overlays)
    }

    /// The most recently displayed selection.
    pub fn last_pick(&self) -> Option<&PickEvent> {
        self.last.as_ref().map(|(_, pick)| pick)
    }

    /// React to a host notification.
    pub fn handle_event(&mut self, event: CursorEvent) {
        match event {
            CursorEvent::TimerFired(axes) => {
                if let Some(expired) = self.timer_expired.get_mut(&axes) {
                    *expired = true;
                }
            }
            CursorEvent::KeyPressed { figure, key } => {
                if self.figures.contains(&figure) {
                    self.on_key(&key);
                }
            }
            CursorEvent::ButtonPressed {
                figure,
                button,
                position,
            } if self.enabled => self.on_press(figure, button, position),
            CursorEvent::CursorMoved { figure, position } if self.enabled && self.config.hover => {
                self.on_hover(figure, position)
            }
            _ => {}
        }
    }

    /// Merged pick fields for `pick`, after point labels and `props_override`.
    ///
    /// `None` if `pick` is not on a managed artist.
    pub fn pick_info(&self, pick: &PickEvent) -> Option<PickInfo> {
        let artist = self.registry.get(pick.artist)?;
        Some(self.extract(pick, artist))
    }

    /// Display `pick` in the annotation its display mode selects.
    ///
    /// Not debounced.
    pub fn update(&mut self, pick: PickEvent) {
        let key = self.slot_for(&pick);
        self.update_slot(key, pick);
    }

    fn on_key(&mut self, key: &Key) {
        let Some(action) = self
            .config
            .controls
            .keys
            .as_ref()
            .and_then(|keys| keys.action(key))
        else {
            return;
        };
        tracing::trace!(?action, "key action");
        match action {
            KeyAction::Toggle => {
                let enabled = !self.enabled;
                self.set_enabled(enabled);
            }
            _ if !self.enabled => {}
            KeyAction::Hide => {
                if self.hidden {
                    self.show();
                } else {
                    self.hide();
                }
            }
            KeyAction::Next => self.step(1),
            KeyAction::Previous => self.step(-1),
        }
    }

    fn on_press(&mut self, figure: FigureId, button: mouse::Button, position: DVec2) {
        self.serial += 1;
        let buttons = self.config.controls.buttons;

        let mut hid_any = false;
        for annotation in self.annotations.values_mut() {
            if !annotation.visible
                || annotation.figure != figure
                || !self.host.annotation_contains(annotation.id, position)
            {
                continue;
            }
            if buttons.hide == Some(button) {
                annotation.visible = false;
                self.host.sync_annotation(annotation);
                hid_any = true;
            } else if self.config.draggable {
                tracing::trace!(annotation = ?annotation.id, "press left to annotation drag");
                return;
            }
        }
        if hid_any {
            self.host.redraw(figure);
        }

        if button != buttons.display || self.config.hover {
            return;
        }
        if let Some(pick) = self.resolve_hit(figure, position) {
            self.dispatch(pick);
        }
    }

    fn on_hover(&mut self, figure: FigureId, position: DVec2) {
        self.serial += 1;
        match self.resolve_hit(figure, position) {
            Some(pick) => self.dispatch(pick),
            None if self.over_annotation(figure, position) => {}
            None => self.hide_in(figure),
        }
    }

    /// Whether `screen` lies on a visible annotation of `figure`.
    fn over_annotation(&self, figure: FigureId, screen: DVec2) -> bool {
        self.annotations.values().any(|a| {
            a.visible && a.figure == figure && self.host.annotation_contains(a.id, screen)
        })
    }

    /// First managed artist of `figure` hit at `screen`, in registration order.
    fn resolve_hit(&self, figure: FigureId, screen: DVec2) -> Option<PickEvent> {
        self.registry
            .iter()
            .filter(|artist| self.host.figure_of(artist.axes) == figure)
            .find_map(|artist| self.hit(artist, screen))
    }

    fn hit(&self, artist: &Artist, screen: DVec2) -> Option<PickEvent> {
        let mut indices = self
            .host
            .hit_test(artist, screen, self.config.tolerance)?;
        let mut position = self.host.screen_to_data(artist.axes, screen)?;
        let mut screen = screen;

        // The pointer decides whether the artist is hit; the sample decides what is shown.
        if let Some((index, sample)) = self
            .config
            .magnetic
            .then(|| magnetic_snap(artist, position))
            .flatten()
        {
            indices = vec![index];
            position = sample;
            if let Some(snapped) = self.host.data_to_screen(artist.axes, sample) {
                screen = snapped;
            }
        }
        tracing::trace!(artist = %artist.id, ?position, "artist hit");

        Some(PickEvent {
            artist: artist.id,
            axes: artist.axes,
            indices,
            position,
            screen,
            serial: self.serial,
        })
    }

    /// Accept `pick` unless its plot area is still inside a debounce window.
    fn dispatch(&mut self, pick: PickEvent) {
        if !self.config.debounce.is_zero() {
            let expired = self.timer_expired.entry(pick.axes).or_insert(true);
            if !*expired {
                tracing::trace!(axes = ?pick.axes, "pick debounced");
                return;
            }
            *expired = false;
            self.host.start_timer(pick.axes, self.config.debounce);
        }
        tracing::trace!(artist = %pick.artist, indices = ?pick.indices, "dispatching pick");
        self.update(pick);
    }

    fn slot_for(&self, pick: &PickEvent) -> SlotKey {
        match self.config.display {
            DisplayMode::Single => SlotKey::Global,
            DisplayMode::OnePerAxes => SlotKey::Axes(pick.axes),
            DisplayMode::Multiple => SlotKey::Event(pick.serial),
        }
    }

    fn extract(&self, pick: &PickEvent, artist: &Artist) -> PickInfo {
        let ctx = PickContext {
            event: pick,
            artist,
            registry: &self.registry,
            projection: self.host.projection(pick.axes),
            interpolate: self.config.interpolate && !self.config.magnetic,
        };
        let mut info = event_info(&ctx);

        if let Some(labels) = self
            .config
            .point_labels
            .as_ref()
            .and_then(|labels| labels.lookup(artist.id, &pick.indices))
        {
            info.insert("point_label", PropValue::Labels(labels));
        }

        if let Some(props_override) = &self.config.props_override {
            let overridden = props_override(info.clone());
            if overridden.anchor().is_some() {
                return overridden;
            }
            tracing::warn!(artist = %artist.id, "props_override result lacks numeric x and y; ignored");
        }
        info
    }

    fn update_slot(&mut self, key: SlotKey, pick: PickEvent) {
        let Some(artist) = self.registry.get(pick.artist) else {
            tracing::debug!(artist = %pick.artist, "pick on unmanaged artist ignored");
            return;
        };
        let figure = self.host.figure_of(pick.axes);

        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.hide_replaced(&mut self.host, &self.registry, self.config.display, pick.axes);
            highlighter.show(&mut self.host, artist);
        }

        let info = self.extract(&pick, artist);
        let Some(anchor) = info.anchor() else {
            tracing::debug!(artist = %pick.artist, "pick has no anchor; nothing to show");
            return;
        };
        let (x_scale, y_scale) = self.host.axis_scales(pick.axes);
        let text = (self.config.formatter)(FormatContext {
            info: &info,
            x_scale,
            y_scale,
            date_format: &self.config.date_format,
        });

        if self.config.display == DisplayMode::Single {
            for (other, annotation) in self.annotations.iter_mut() {
                if *other != key && annotation.visible {
                    annotation.visible = false;
                    self.host.sync_annotation(annotation);
                }
            }
        }

        let style = self.config.annotation_style;
        let draggable = self.config.draggable;
        let annotation = self
            .annotations
            .entry(key)
            .or_insert_with(|| Annotation::new(pick.axes, figure, style, draggable));
        annotation.axes = pick.axes;
        annotation.figure = figure;
        annotation.show_at(anchor, text);
        self.host.sync_annotation(annotation);

        if self.config.keep_inside && !draggable {
            Self::keep_inside(&mut self.host, annotation);
        }

        self.hidden = false;
        self.last = Some((key, pick));
        self.host.redraw(figure);
    }

    fn keep_inside(host: &mut H, annotation: &mut Annotation) {
        let (Some(extent), Some(bounds)) = (
            host.annotation_extent(annotation.id),
            host.figure_extent(annotation.figure),
        ) else {
            tracing::debug!(annotation = ?annotation.id, "no layout to check; keep-inside skipped");
            return;
        };
        if annotation.keep_inside(extent, bounds) {
            host.sync_annotation(annotation);
        }
    }

    /// Move the most recent annotation `delta` items along its artist, wrapping around.
    fn step(&mut self, delta: isize) {
        let Some((key, mut pick)) = self.last.clone() else {
            return;
        };
        let Some(artist) = self.registry.get(pick.artist) else {
            return;
        };
        let (Some(len), Some(current)) = (artist.item_count(), pick.index()) else {
            tracing::trace!(artist = %pick.artist, "nothing to step through");
            return;
        };
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        pick.indices = vec![next];
        if let Some(position) = artist.item_position(next) {
            pick.position = position;
            if let Some(screen) = self.host.data_to_screen(pick.axes, position) {
                pick.screen = screen;
            }
        }
        self.update_slot(key, pick);
    }

    /// Hide the annotations and highlights of `figure` after the pointer left everything.
    fn hide_in(&mut self, figure: FigureId) {
        let mut changed = false;
        for annotation in self
            .annotations
            .values_mut()
            .filter(|a| a.visible && a.figure == figure)
        {
            annotation.visible = false;
            self.host.sync_annotation(annotation);
            changed = true;
        }
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.hide_in_figure(&mut self.host, &self.registry, figure);
        }
        if changed {
            self.host.redraw(figure);
        }
    }

    fn redraw_all(&mut self) {
        for &figure in &self.figures {
            self.host.redraw(figure);
        }
    }
}

/// Index and position of the sample of `artist` nearest in x to `query`.
fn magnetic_snap(artist: &Artist, query: DVec2) -> Option<(usize, DVec2)> {
    artist
        .samples()?
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .min_by(|(_, a), (_, b)| (a.x - query.x).abs().total_cmp(&(b.x - query.x).abs()))
}
