use eframe::egui::{self, Event, ImeEvent};
use slash_menu::{
    CaretGeometry, DocumentModel, Key, KeyEvent, MenuEvent, Modifiers, Outcome, SlashMenuSession,
};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::app_actions::AppAction;
use crate::app_state::{AppState, StatusMessage};

/// egui sets `mac_cmd` only on macOS, the Super/Windows key is not reported
/// elsewhere, so there a Super combination dismisses the menu like a plain key.
pub fn translate_key(key: egui::Key, modifiers: egui::Modifiers) -> KeyEvent {
    let key = match key {
        egui::Key::ArrowUp => Key::ArrowUp,
        egui::Key::ArrowDown => Key::ArrowDown,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::Enter => Key::Enter,
        egui::Key::Escape => Key::Escape,
        egui::Key::Tab => Key::Tab,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::Delete => Key::Delete,
        other => match other
            .symbol_or_name()
            .parse::<Key>()
            .unwrap_or_else(|never| match never {})
        {
            // egui names letter keys in upper case
            Key::Character(c) if !modifiers.shift => Key::Character(c.to_ascii_lowercase()),
            key => key,
        },
    };

    KeyEvent::with_modifiers(
        key,
        Modifiers {
            ctrl: modifiers.ctrl,
            alt: modifiers.alt,
            shift: modifiers.shift,
            meta: modifiers.mac_cmd,
        },
    )
}

/// One frame of input after the menu saw it.
#[derive(Debug, Default)]
pub struct RoutedInput {
    /// Events the editor widget still gets this frame.
    pub passed: Vec<Event>,
    /// Keyboard input to route again next frame, once the editor applied `passed`.
    pub deferred: Vec<Event>,
    pub actions: SmallVec<[AppAction; 2]>,
}

/// Feeds the events to the menu in arrival order.
///
/// The editor applies passed events only after routing, so once one of them
/// may have edited the text or moved the caret the rest of the keyboard input
/// waits for the next frame.
pub fn route_events<D, G>(
    events: Vec<Event>,
    session: &mut SlashMenuSession,
    doc: &mut D,
    caret: &G,
) -> RoutedInput
where
    D: DocumentModel,
    G: CaretGeometry + ?Sized,
{
    let mut routed = RoutedInput::default();
    let mut editor_behind = false;
    let mut events = events.into_iter().peekable();

    while let Some(event) = events.next() {
        if editor_behind && is_keyboard_input(&event) {
            routed.deferred.push(event);
            continue;
        }

        let handled = match &event {
            Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                // the key that types the trigger again leaves an open menu as it is
                let retrigger = session.is_open()
                    && matches!(events.peek(), Some(Event::Text(text)) if session.completes_trigger(text, &*doc));

                if retrigger {
                    false
                } else {
                    match session.handle_key(&translate_key(*key, *modifiers), doc) {
                        Ok(outcome) => report(outcome, &mut routed.actions),
                        Err(err) => {
                            // menu is closed already, the key was meant for it
                            routed
                                .actions
                                .push(AppAction::ShowStatus(StatusMessage::error(err.to_string())));
                            true
                        }
                    }
                }
            }

            Event::Text(text) | Event::Ime(ImeEvent::Commit(text)) => {
                report(session.handle_text_input(text, doc, caret), &mut routed.actions)
            }

            _ => false,
        };

        if !handled {
            editor_behind |= moves_editor_caret(&event);
            routed.passed.push(event);
        }
    }

    routed
}

fn is_keyboard_input(event: &Event) -> bool {
    matches!(
        event,
        Event::Key { .. }
            | Event::Text(_)
            | Event::Ime(_)
            | Event::Paste(_)
            | Event::Cut
            | Event::Copy
    )
}

fn moves_editor_caret(event: &Event) -> bool {
    match event {
        Event::Text(_) | Event::Paste(_) | Event::Cut | Event::Ime(ImeEvent::Commit(_)) => true,
        Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => {
            modifiers.ctrl
                || modifiers.command
                || matches!(
                    key,
                    egui::Key::ArrowUp
                        | egui::Key::ArrowDown
                        | egui::Key::ArrowLeft
                        | egui::Key::ArrowRight
                        | egui::Key::Home
                        | egui::Key::End
                        | egui::Key::PageUp
                        | egui::Key::PageDown
                        | egui::Key::Backspace
                        | egui::Key::Delete
                        | egui::Key::Enter
                        | egui::Key::Tab
                )
        }
        Event::PointerButton { pressed: true, .. } => true,
        _ => false,
    }
}

/// Runs before the editor widget, so that it never sees the consumed events.
pub fn route_editor_input(ctx: &egui::Context, state: &mut AppState) -> SmallVec<[AppAction; 2]> {
    let mut events = std::mem::take(&mut state.pending_input);
    events.extend(ctx.input_mut(|input| std::mem::take(&mut input.events)));
    if events.is_empty() {
        return SmallVec::new();
    }

    let RoutedInput {
        passed,
        deferred,
        actions,
    } = route_events(events, &mut state.session, &mut state.doc, &state.caret);

    if !deferred.is_empty() {
        ctx.request_repaint();
    }
    state.pending_input = deferred;
    ctx.input_mut(|input| input.events = passed);
    actions
}

fn report(outcome: Outcome, actions: &mut SmallVec<[AppAction; 2]>) -> bool {
    match outcome.event {
        Some(MenuEvent::Opened(anchor)) => {
            debug!(?anchor, "slash menu opened");
            actions.push(AppAction::ClearStatus);
        }
        Some(MenuEvent::Selected(item)) => info!(code = %item.code, "menu item inserted"),
        Some(MenuEvent::OpenFailed(err)) => {
            actions.push(AppAction::ShowStatus(StatusMessage::error(err.to_string())));
        }
        Some(MenuEvent::Moved(_) | MenuEvent::Dismissed) | None => {}
    }
    outcome.handled
}
