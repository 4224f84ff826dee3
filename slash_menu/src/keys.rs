use std::{convert::Infallible, str::FromStr};

/// Key identity, named after DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Control,
    Alt,
    Shift,
    CapsLock,
    Meta,
    Character(char),
    Named(String),
}

impl FromStr for Key {
    type Err = Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let key = match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Control" => Key::Control,
            "Alt" => Key::Alt,
            "Shift" => Key::Shift,
            "CapsLock" => Key::CapsLock,
            "Meta" => Key::Meta,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Named(other.to_string()),
                }
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// What a key means to an open menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Prev,
    Next,
    Commit,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn ctrl(c: char) -> Self {
        Self::with_modifiers(Key::Character(c), Modifiers::CTRL)
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Character(c))
    }

    pub fn menu_key(&self) -> Option<MenuKey> {
        match (&self.key, self.modifiers.ctrl) {
            (Key::ArrowUp, _) | (Key::Character('p'), true) => Some(MenuKey::Prev),
            (Key::ArrowDown, _) | (Key::Character('n'), true) => Some(MenuKey::Next),
            (Key::Enter, _) => Some(MenuKey::Commit),
            _ => None,
        }
    }

    /// Keys that leave an open menu alone. Shift is not one of them.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self.key,
            Key::Control | Key::Alt | Key::CapsLock | Key::Meta
        ) || self.modifiers.meta
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::new(key)
    }
}
