use std::{sync::Arc, time::Duration};

use crate::{
    annotation::{AnnotationStyle, AnnotationStyleOverride},
    artist::{ArtistRegistry, Plottable},
    axis_scale::is_valid_date_format,
    controls::{ButtonBindings, CursorControls, KeyBindings},
    datacursor::{CursorConfig, DataCursor, DisplayMode},
    error::DataCursorError,
    format::{DEFAULT_DATE_FORMAT, FormatContext, PropsOverride, default_formatter},
    highlight::HighlightStyle,
    host::PlotHost,
    pick_info::{PickInfo, PointLabels},
};

/// Debounce window after an accepted click.
pub const CLICK_DEBOUNCE: Duration = Duration::from_millis(100);
/// Debounce window after an accepted hover.
pub const HOVER_DEBOUNCE: Duration = Duration::from_millis(300);
/// Hit-test radius, in display points.
pub const DEFAULT_TOLERANCE: f32 = 5.0;

/// Builder for configuring and constructing a [`DataCursor`].
///
/// All settings have sensible defaults: pop-ups on left click, one per plot
/// area, hidden with a right click on the pop-up, `d`/`t`/arrow-key shortcuts.
///
/// # Example
///
/// ```ignore
/// let cursor = DataCursorBuilder::new()
///     .with_display("single")
///     .with_tolerance(8.0)
///     .with_highlight(HighlightStyle::default())
///     .build(host, [line.into()])?;
/// ```
#[derive(Default)]
pub struct DataCursorBuilder {
    tolerance: Option<f32>,
    display: Option<String>,
    display_mode: Option<DisplayMode>,
    draggable: Option<bool>,
    hover: Option<bool>,
    magnetic: Option<bool>,
    keep_inside: Option<bool>,
    interpolate: Option<bool>,
    debounce: Option<Duration>,
    formatter: Option<crate::format::Formatter>,
    props_override: Option<PropsOverride>,
    point_labels: Option<PointLabels>,
    keys: Option<Option<KeyBindings>>,
    buttons: Option<ButtonBindings>,
    style: AnnotationStyleOverride,
    date_format: Option<String>,
    highlight: Option<HighlightStyle>,
}

impl DataCursorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hit-test radius around the pointer, in display points.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Display mode by name: `"single"`, `"one-per-axes"` or `"multiple"`.
    ///
    /// An unknown name makes [`Self::build`] fail.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self.display_mode = None;
        self
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = Some(mode);
        self.display = None;
        self
    }

    /// Let the user drag pop-ups around. Off by default.
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = Some(draggable);
        self
    }

    /// Follow the pointer instead of waiting for clicks.
    ///
    /// Forces a single, non-draggable pop-up.
    pub fn with_hover(mut self, hover: bool) -> Self {
        self.hover = Some(hover);
        self
    }

    /// Snap selections to the data sample nearest in x.
    pub fn with_magnetic(mut self, magnetic: bool) -> Self {
        self.magnetic = Some(magnetic);
        self
    }

    /// Mirror pop-ups that would stick out of their figure. On by default.
    pub fn with_keep_inside(mut self, keep_inside: bool) -> Self {
        self.keep_inside = Some(keep_inside);
        self
    }

    /// Interpolate along lines between vertices. On by default; when off,
    /// line selections snap to the hit vertex.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = Some(interpolate);
        self
    }

    /// Minimum time between two accepted selections in one plot area.
    /// `Duration::ZERO` disables debouncing.
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debounce = Some(window);
        self
    }

    /// Custom pop-up text.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(FormatContext<'_>) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Rewrite the pick fields before formatting, e.g. to move the anchor.
    pub fn with_props_override<F>(mut self, props_override: F) -> Self
    where
        F: Fn(PickInfo) -> PickInfo + Send + Sync + 'static,
    {
        self.props_override = Some(Arc::new(props_override));
        self
    }

    pub fn with_point_labels(mut self, labels: PointLabels) -> Self {
        self.point_labels = Some(labels);
        self
    }

    /// Keyboard shortcuts, or `None` to ignore the keyboard entirely.
    pub fn with_keybindings(mut self, keys: Option<KeyBindings>) -> Self {
        self.keys = Some(keys);
        self
    }

    pub fn with_buttons(mut self, buttons: ButtonBindings) -> Self {
        self.buttons = Some(buttons);
        self
    }

    /// Styling applied over [`AnnotationStyle::default`].
    pub fn with_annotation_style(mut self, style: AnnotationStyleOverride) -> Self {
        self.style = style;
        self
    }

    /// strftime pattern for values on date axes.
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }

    /// Also highlight the selected artist.
    pub fn with_highlight(mut self, style: HighlightStyle) -> Self {
        self.highlight = Some(style);
        self
    }

    /// Build a cursor over `artists`, taking ownership of `host`.
    pub fn build<H: PlotHost>(
        self,
        host: H,
        artists: impl IntoIterator<Item = Plottable>,
    ) -> Result<DataCursor<H>, DataCursorError> {
        let config = self.into_config()?;
        Ok(DataCursor::new(
            host,
            ArtistRegistry::from_plottables(artists),
            config,
        ))
    }

    fn into_config(self) -> Result<CursorConfig, DataCursorError> {
        let tolerance = self.tolerance.unwrap_or(DEFAULT_TOLERANCE);
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(DataCursorError::InvalidTolerance(tolerance));
        }

        let mut display = match (self.display, self.display_mode) {
            (Some(name), _) => name.parse()?,
            (None, Some(mode)) => mode,
            (None, None) => DisplayMode::default(),
        };
        let hover = self.hover.unwrap_or(false);
        let mut draggable = self.draggable.unwrap_or(false);
        if hover {
            display = DisplayMode::Single;
            draggable = false;
        }

        let default_debounce = if hover { HOVER_DEBOUNCE } else { CLICK_DEBOUNCE };

        let date_format = self
            .date_format
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_owned());
        if !is_valid_date_format(&date_format) {
            return Err(DataCursorError::InvalidDateFormat(date_format));
        }

        Ok(CursorConfig {
            tolerance,
            display,
            draggable,
            hover,
            magnetic: self.magnetic.unwrap_or(false),
            keep_inside: self.keep_inside.unwrap_or(true),
            interpolate: self.interpolate.unwrap_or(true),
            debounce: self.debounce.unwrap_or(default_debounce),
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(default_formatter)),
            props_override: self.props_override,
            point_labels: self.point_labels,
            controls: CursorControls {
                keys: self.keys.unwrap_or_else(|| Some(KeyBindings::default())),
                buttons: self.buttons.unwrap_or_default(),
            },
            annotation_style: AnnotationStyle::default().merged(&self.style),
            date_format,
            highlight: self.highlight,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DataCursorBuilder::new().into_config().unwrap();
        assert_eq!(config.display, DisplayMode::OnePerAxes);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.debounce, CLICK_DEBOUNCE);
        assert!(config.keep_inside);
        assert!(config.interpolate);
        assert!(!config.draggable);
        assert_eq!(config.controls, CursorControls::default());
        assert_eq!(config.date_format, "%x %X");
        assert_eq!(config.highlight, None);
    }

    #[test]
    fn test_hover_forces_single_and_not_draggable() {
        let config = DataCursorBuilder::new()
            .with_display("multiple")
            .with_draggable(true)
            .with_hover(true)
            .into_config()
            .unwrap();
        assert_eq!(config.display, DisplayMode::Single);
        assert!(!config.draggable);
        assert_eq!(config.debounce, HOVER_DEBOUNCE);
    }

    #[test]
    fn test_invalid_display_is_rejected() {
        let err = DataCursorBuilder::new()
            .with_display("every")
            .into_config()
            .err();
        assert_eq!(err, Some(DataCursorError::InvalidDisplayMode("every".into())));
    }

    #[test]
    fn test_negative_tolerance_is_rejected() {
        let err = DataCursorBuilder::new().with_tolerance(-1.0).into_config().err();
        assert_eq!(err, Some(DataCursorError::InvalidTolerance(-1.0)));
    }

    #[test]
    fn test_unknown_date_specifier_is_rejected() {
        let err = DataCursorBuilder::new().with_date_format("%Y %Q").into_config().err();
        assert_eq!(err, Some(DataCursorError::InvalidDateFormat("%Y %Q".into())));
    }

    #[test]
    fn test_later_display_setting_wins() {
        let config = DataCursorBuilder::new()
            .with_display("nonsense")
            .with_display_mode(DisplayMode::Multiple)
            .into_config()
            .unwrap();
        assert_eq!(config.display, DisplayMode::Multiple);
    }

    #[test]
    fn test_disabled_keybindings() {
        let config = DataCursorBuilder::new()
            .with_keybindings(None)
            .into_config()
            .unwrap();
        assert_eq!(config.controls.keys, None);
    }
}
