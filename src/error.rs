use core::fmt;

use crate::artist::ArtistId;

/// Errors that can occur when constructing a data cursor.
#[derive(Debug, Clone, PartialEq)]
pub enum DataCursorError {
    /// The display mode string is not one of the supported modes.
    InvalidDisplayMode(String),
    /// The hit tolerance is negative or not finite.
    InvalidTolerance(f32),
    /// The date format contains a specifier chrono does not understand.
    InvalidDateFormat(String),
}

impl fmt::Display for DataCursorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDisplayMode(got) => write!(
                f,
                "\"display\" must be one of the following: {}; got \"{got}\"",
                crate::DisplayMode::VALID.join(", ")
            ),
            Self::InvalidTolerance(tolerance) => write!(
                f,
                "hit tolerance must be a finite, non-negative number of points; got {tolerance}"
            ),
            Self::InvalidDateFormat(format) => {
                write!(f, "invalid strftime pattern for date axes: \"{format}\"")
            }
        }
    }
}

impl std::error::Error for DataCursorError {}

/// Reasons a single pick-info extractor could not contribute to a pick.
///
/// These never reach the caller: the controller logs them and treats the
/// extractor as having returned nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum PickInfoError {
    /// The pick event did not carry the sub-item index the extractor needs.
    MissingIndex(ArtistId),
    /// The selected index is outside the artist's data.
    IndexOutOfRange { index: usize, len: usize },
    /// The pointer position does not map onto the artist's raster.
    OutsideImage { x: f64, y: f64 },
    /// The artist holds no data to extract from.
    EmptyArtist(ArtistId),
}

impl fmt::Display for PickInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIndex(id) => write!(f, "pick on {id} carries no item index"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "item index {index} out of range for {len} items")
            }
            Self::OutsideImage { x, y } => write!(f, "({x}, {y}) lies outside the image"),
            Self::EmptyArtist(id) => write!(f, "{id} holds no data"),
        }
    }
}

impl std::error::Error for PickInfoError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display_mode_names_valid_set() {
        let msg = DataCursorError::InvalidDisplayMode("many".into()).to_string();
        assert!(msg.contains("single"));
        assert!(msg.contains("one-per-axes"));
        assert!(msg.contains("multiple"));
        assert!(msg.contains("\"many\""));
    }
}
