use crate::{
    artist::{AxesId, Plottable},
    datacursor::DataCursor,
    datacursor_builder::DataCursorBuilder,
    error::DataCursorError,
    host::PlotHost,
};

/// Create a data cursor with `builder`'s settings.
///
/// Manages `artists` when given. Otherwise every artist plotted in `axes` is
/// managed, and `axes` defaults to every plot area the host knows about.
pub fn datacursor<H: PlotHost>(
    host: H,
    artists: Option<Vec<Plottable>>,
    axes: Option<Vec<AxesId>>,
    builder: DataCursorBuilder,
) -> Result<DataCursor<H>, DataCursorError> {
    let artists = match artists {
        Some(artists) => artists,
        None => {
            let axes = axes.unwrap_or_else(|| host.all_axes());
            axes.into_iter()
                .flat_map(|ax| host.plotted_artists(ax))
                .collect()
        }
    };
    tracing::debug!(count = artists.len(), "collected artists for data cursor");
    builder.build(host, artists)
}
