use glam::DVec2;
use iced::{keyboard::Key, mouse};

use crate::artist::{AxesId, FigureId};

/// Host notifications a [`crate::DataCursor`] reacts to.
///
/// Positions are in the host's screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorEvent {
    /// A mouse button was pressed over `figure`.
    ButtonPressed {
        figure: FigureId,
        button: mouse::Button,
        position: DVec2,
    },
    /// The pointer moved over `figure`.
    CursorMoved { figure: FigureId, position: DVec2 },
    /// A key was pressed while `figure` had focus.
    KeyPressed { figure: FigureId, key: Key },
    /// The debounce timer of a plot area fired.
    TimerFired(AxesId),
}

/// Kinds of host notifications a cursor subscribes to per figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscription {
    /// Button presses, or pointer motion in hover mode.
    Pointer { hover: bool },
    Keyboard,
}
