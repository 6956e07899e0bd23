use iced::Color;
use indexmap::IndexMap;

use crate::{
    DisplayMode,
    artist::{Artist, ArtistId, ArtistRegistry, AxesId, FigureId},
    host::PlotHost,
};

/// Appearance of highlight overlays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    pub color: Color,
    /// Line and marker-edge width, in display points.
    pub width: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgb(1.0, 1.0, 0.0),
            width: 3.0,
        }
    }
}

/// A non-pickable, restyled copy of a selected artist.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    /// The artist this overlay duplicates.
    pub source: ArtistId,
    pub axes: AxesId,
    pub style: HighlightStyle,
    pub visible: bool,
}

/// Owns the highlight overlays of a cursor. Overlays are hidden, never removed.
#[derive(Debug, Clone, Default)]
pub(crate) struct Highlighter {
    style: HighlightStyle,
    overlays: IndexMap<ArtistId, Highlight>,
}

impl Highlighter {
    pub(crate) fn new(style: HighlightStyle) -> Self {
        Self {
            style,
            overlays: IndexMap::new(),
        }
    }

    pub(crate) fn overlays(&self) -> impl Iterator<Item = &Highlight> {
        self.overlays.values()
    }

    /// Hide the overlays a new selection in `axes` replaces under `mode`.
    pub(crate) fn hide_replaced<H: PlotHost>(
        &mut self,
        host: &mut H,
        registry: &ArtistRegistry,
        mode: DisplayMode,
        axes: AxesId,
    ) {
        self.hide_where(host, registry, |_, highlight| match mode {
            DisplayMode::Multiple => false,
            DisplayMode::OnePerAxes => highlight.axes == axes,
            DisplayMode::Single => true,
        });
    }

    /// Hide every overlay drawn in `figure`.
    pub(crate) fn hide_in_figure<H: PlotHost>(
        &mut self,
        host: &mut H,
        registry: &ArtistRegistry,
        figure: FigureId,
    ) {
        self.hide_where(host, registry, |host, highlight| {
            host.figure_of(highlight.axes) == figure
        });
    }

    fn hide_where<H: PlotHost>(
        &mut self,
        host: &mut H,
        registry: &ArtistRegistry,
        in_scope: impl Fn(&H, &Highlight) -> bool,
    ) {
        for highlight in self.overlays.values_mut() {
            if highlight.visible && in_scope(&*host, highlight) {
                highlight.visible = false;
                if let Some(source) = registry.get(highlight.source) {
                    host.sync_highlight(highlight, source);
                }
            }
        }
    }

    /// Show the overlay of `artist`, creating it on first use.
    pub(crate) fn show<H: PlotHost>(&mut self, host: &mut H, artist: &Artist) {
        let style = self.style;
        let highlight = self.overlays.entry(artist.id).or_insert_with(|| {
            tracing::trace!(artist = %artist.id, "creating highlight overlay");
            Highlight {
                source: artist.id,
                axes: artist.axes,
                style,
                visible: false,
            }
        });
        highlight.visible = true;
        host.sync_highlight(highlight, artist);
    }
}
