//! Keyboard and mouse bindings for a [`crate::DataCursor`].
use iced::{
    keyboard::{Key, key::Named},
    mouse,
};

/// Configures user interaction with a data cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorControls {
    /// Keys for the cursor-wide actions. `None` disables keyboard handling.
    pub keys: Option<KeyBindings>,

    /// Mouse buttons that show and hide pop-ups.
    pub buttons: ButtonBindings,
}

/// Maps the logical keyboard actions onto keys. A `None` entry disables that action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    /// Hide every annotation, or bring back the ones shown before.
    pub hide: Option<Key>,

    /// Enable or disable the cursor.
    pub toggle: Option<Key>,

    /// Move the most recent annotation to the next item of its artist.
    pub next: Option<Key>,

    /// Move the most recent annotation to the previous item of its artist.
    pub previous: Option<Key>,
}

/// A keyboard action the cursor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Hide,
    Toggle,
    Next,
    Previous,
}

impl KeyBindings {
    /// The action bound to `key`, if any.
    pub fn action(&self, key: &Key) -> Option<KeyAction> {
        [
            (&self.hide, KeyAction::Hide),
            (&self.toggle, KeyAction::Toggle),
            (&self.next, KeyAction::Next),
            (&self.previous, KeyAction::Previous),
        ]
        .into_iter()
        .find_map(|(bound, action)| (bound.as_ref() == Some(key)).then_some(action))
    }
}

/// Configures which mouse buttons drive the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBindings {
    /// Button that creates or updates a pop-up.
    pub display: mouse::Button,

    /// Button that hides a clicked pop-up. `None` disables hiding by click.
    pub hide: Option<mouse::Button>,
}

impl Default for CursorControls {
    fn default() -> Self {
        Self {
            keys: Some(KeyBindings::default()),
            buttons: ButtonBindings::default(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            hide: Some(Key::Character("d".into())),
            toggle: Some(Key::Character("t".into())),
            next: Some(Key::Named(Named::ArrowRight)),
            previous: Some(Key::Named(Named::ArrowLeft)),
        }
    }
}

impl Default for ButtonBindings {
    fn default() -> Self {
        Self {
            display: mouse::Button::Left,
            hide: Some(mouse::Button::Right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_actions() {
        let keys = KeyBindings::default();
        assert_eq!(keys.action(&Key::Character("d".into())), Some(KeyAction::Hide));
        assert_eq!(keys.action(&Key::Character("t".into())), Some(KeyAction::Toggle));
        assert_eq!(
            keys.action(&Key::Named(Named::ArrowLeft)),
            Some(KeyAction::Previous)
        );
        assert_eq!(keys.action(&Key::Character("x".into())), None);
    }

    #[test]
    fn test_unbound_action_never_matches() {
        let keys = KeyBindings {
            hide: None,
            ..KeyBindings::default()
        };
        assert_eq!(keys.action(&Key::Character("d".into())), None);
    }
}
