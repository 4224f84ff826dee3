use std::sync::Arc;

use eframe::{
    egui::{Event, Id, text::CCursor},
    epaint::Galley,
};
use slash_menu::{CaretGeometry, CaretRect, MenuConfig, MenuError, SlashMenuSession, TextDocument};

use crate::{app_actions::AppAction, theme::AppTheme};

pub const INITIAL_NOTE: &str = "\n# h1\n## h2\n- item1\n- item2\n- item3";

pub fn editor_text_id() -> Id {
    Id::new("slashnote_editor")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Caret of the editor as laid out in the last frame.
///
/// Rectangles are relative to the galley, the popup adds the galley position
/// of the frame it is drawn in.
#[derive(Default, Clone)]
pub struct CaretSnapshot {
    galley: Option<Arc<Galley>>,
    ccursor: Option<CCursor>,
}

impl CaretSnapshot {
    pub fn new(galley: Arc<Galley>, ccursor: Option<CCursor>) -> Self {
        Self {
            galley: Some(galley),
            ccursor,
        }
    }
}

impl CaretGeometry for CaretSnapshot {
    fn caret_rect(&self) -> Option<CaretRect> {
        let (galley, ccursor) = (self.galley.as_ref()?, self.ccursor?);
        let rect = galley.pos_from_ccursor(ccursor);

        Some(CaretRect {
            left: rect.left(),
            top: rect.top(),
            right: rect.right(),
            bottom: rect.bottom(),
        })
    }
}

pub struct AppState {
    pub doc: TextDocument,
    pub session: SlashMenuSession,
    pub caret: CaretSnapshot,
    /// Keyboard input held back until the editor caught up with earlier events.
    pub pending_input: Vec<Event>,

    pub theme: AppTheme,
    pub status: Option<StatusMessage>,
    pub prev_focused: bool,
    pub deferred_to_post_render: Vec<AppAction>,
}

pub struct AppInitData {
    pub theme: AppTheme,
    pub note: String,
    pub menu_config: MenuConfig,
    pub status: Option<StatusMessage>,
}

impl AppState {
    pub fn new(init_data: AppInitData) -> Result<Self, MenuError> {
        let AppInitData {
            theme,
            note,
            menu_config,
            status,
        } = init_data;

        Ok(Self {
            doc: TextDocument::new(note),
            session: SlashMenuSession::new(menu_config)?,
            caret: CaretSnapshot::default(),
            pending_input: Vec::new(),
            theme,
            status,
            prev_focused: true,
            deferred_to_post_render: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_caret_without_layout_is_unavailable() {
        assert_eq!(CaretSnapshot::default().caret_rect(), None);
    }

    #[test]
    pub fn test_state_starts_with_closed_menu_and_caret_at_end() {
        let state = AppState::new(AppInitData {
            theme: AppTheme::default(),
            note: INITIAL_NOTE.to_string(),
            menu_config: MenuConfig::default(),
            status: None,
        })
        .unwrap();

        assert!(!state.session.is_open());
        assert_eq!(state.doc.text(), INITIAL_NOTE);
        assert_eq!(state.doc.cursor().start, INITIAL_NOTE.len());
    }
}
