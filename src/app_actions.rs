use eframe::egui::Context;
use slash_menu::{ConfigError, MenuConfig, SlashMenuSession};
use smallvec::SmallVec;
use tracing::{error, info};

use crate::app_state::{AppState, StatusKind, StatusMessage, editor_text_id};

#[derive(Debug, Clone, PartialEq)]
pub enum SlashMenuAction {
    Highlight(usize),
    Select(usize),
    Dismiss,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    SlashMenu(SlashMenuAction),
    ShowStatus(StatusMessage),
    ClearStatus,
    FocusEditor,
    ReloadMenuConfig,
}

pub trait AppIO {
    /// Built-in configuration when there is no config file.
    fn load_menu_config(&self) -> Result<MenuConfig, ConfigError>;
}

pub fn process_app_action(
    action: AppAction,
    ctx: &Context,
    state: &mut AppState,
    app_io: &impl AppIO,
) -> SmallVec<[AppAction; 1]> {
    match action {
        AppAction::SlashMenu(SlashMenuAction::Highlight(index)) => {
            if state.session.highlight(index) {
                ctx.request_repaint();
            }
            SmallVec::new()
        }

        AppAction::SlashMenu(SlashMenuAction::Select(index)) => {
            let mut actions = SmallVec::new();
            match state.session.select(index, &mut state.doc) {
                Ok(item) => info!(code = %item.code, "menu item picked with pointer"),
                Err(err) => actions.push(AppAction::ShowStatus(StatusMessage::error(
                    err.to_string(),
                ))),
            }
            // clicking on the popup takes the focus away from the editor
            actions.push(AppAction::FocusEditor);
            actions
        }

        AppAction::SlashMenu(SlashMenuAction::Dismiss) => {
            if state.session.dismiss() {
                ctx.request_repaint();
            }
            SmallVec::new()
        }

        AppAction::ShowStatus(status) => {
            match status.kind {
                StatusKind::Info => info!("{}", status.text),
                StatusKind::Error => error!("{}", status.text),
            }
            state.status = Some(status);
            SmallVec::new()
        }

        AppAction::ClearStatus => {
            state.status = None;
            SmallVec::new()
        }

        AppAction::FocusEditor => {
            ctx.memory_mut(|mem| mem.request_focus(editor_text_id()));
            SmallVec::new()
        }

        AppAction::ReloadMenuConfig => {
            let status = match app_io.load_menu_config() {
                Ok(config) => match SlashMenuSession::new(config) {
                    Ok(session) => {
                        let count = session.view().items.len();
                        state.session = session;
                        StatusMessage::info(format!("Slash menu reloaded, {count} items"))
                    }
                    Err(err) => StatusMessage::error(err.to_string()),
                },
                Err(err) => {
                    let text = err.to_string();
                    error!("{:?}", miette::Report::new(err));
                    StatusMessage::error(text)
                }
            };
            [AppAction::ShowStatus(status)].into()
        }
    }
}
