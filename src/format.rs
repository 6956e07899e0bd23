use std::sync::Arc;

use crate::{
    artist::is_legend_label,
    axis_scale::AxisScale,
    pick_info::{PickInfo, PropValue},
};

/// Everything a formatter gets to look at when rendering a pick.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// The merged pick fields.
    pub info: &'a PickInfo,
    /// Scale of the picked plot area's x axis.
    pub x_scale: AxisScale,
    /// Scale of the picked plot area's y axis.
    pub y_scale: AxisScale,
    /// strftime-style pattern used for date axes.
    pub date_format: &'a str,
}

/// A function which renders a pick into annotation text.
pub type Formatter = Arc<dyn Fn(FormatContext<'_>) -> String + Send + Sync>;

/// A function which rewrites the extracted pick fields before formatting.
///
/// If the result lacks numeric `x` or `y`, it is discarded.
pub type PropsOverride = Arc<dyn Fn(PickInfo) -> PickInfo + Send + Sync>;

/// strftime pattern for date axes: locale date and time.
pub const DEFAULT_DATE_FORMAT: &str = "%x %X";

/// Format `value` with `sig` significant digits, like C's `%g`.
///
/// Fixed notation is used for exponents in `-4..sig`, scientific otherwise.
/// Trailing zeros are stripped.
pub fn format_sig(value: f64, sig: usize) -> String {
    if value.is_nan() {
        return "nan".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.into();
    }
    if value == 0.0 {
        return "0".into();
    }

    let sig = sig.max(1);
    let sci = format!("{:.*e}", sig - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= sig as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exp.abs())
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{value:.decimals$}")).to_owned()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn render_value(value: &PropValue, scale: AxisScale, date_format: &str) -> Option<String> {
    match value {
        PropValue::Absent => None,
        PropValue::Number(v) => {
            Some(scale.format_date(*v, date_format).unwrap_or_else(|| format_sig(*v, 3)))
        }
        PropValue::Index(i) => Some(i.to_string()),
        PropValue::Text(s) => Some(s.clone()),
        PropValue::Labels(labels) => Some(labels.join(", ")),
    }
}

/// The default formatter.
///
/// One line per present `x`, `y`, `z` and `size` field, then the artist's
/// legend label and the point labels if available.
pub fn default_formatter(ctx: FormatContext<'_>) -> String {
    let mut lines = Vec::new();
    for key in ["x", "y", "z", "size"] {
        let scale = match key {
            "x" => ctx.x_scale,
            "y" => ctx.y_scale,
            _ => AxisScale::Linear,
        };
        if let Some(text) = ctx
            .info
            .get(key)
            .and_then(|v| render_value(v, scale, ctx.date_format))
        {
            lines.push(format!("{key}: {text}"));
        }
    }

    if let Some(label) = ctx.info.text("label").filter(|l| is_legend_label(l)) {
        lines.push(format!("Label: {label}"));
    }

    match ctx.info.get("point_label") {
        Some(PropValue::Labels(labels)) => lines.push(format!("Point: {}", labels.join(", "))),
        Some(PropValue::Text(label)) => lines.push(format!("Point: {label}")),
        _ => {}
    }

    lines.join("\n")
}
