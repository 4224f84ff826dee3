//! Slash command menu for text editors.
//!
//! Typing the trigger (`/` by default) opens a popup anchored at the caret,
//! arrow keys or Ctrl+P/Ctrl+N move the highlight and Enter inserts the text
//! prepared for the highlighted item. The editor itself stays behind the
//! [`DocumentModel`] and [`CaretGeometry`] traits.

pub mod byte_span;
pub mod config;
pub mod document;
pub mod error;
pub mod insertion;
pub mod keys;
pub mod menu;
pub mod session;
pub mod text_change;
pub mod trigger;

pub use byte_span::{ByteSpan, UnOrderedByteSpan};
pub use config::{ConfigError, DEFAULT_MENU_CONFIG, MenuConfig};
pub use document::{DocumentModel, TextDocument};
pub use error::MenuError;
pub use insertion::{InsertionSink, ReplacementTable};
pub use keys::{Key, KeyEvent, Modifiers};
pub use menu::{CaretAnchor, MenuController, MenuItem, MenuView};
pub use session::{MenuEvent, Outcome, SlashMenuSession};
pub use trigger::{CaretGeometry, CaretRect, TriggerDetector};
