use app_actions::{AppAction, SlashMenuAction, process_app_action};
use app_io::{AppSettings, RealAppIO};
use app_state::{AppInitData, AppState, StatusMessage, editor_text_id};
use app_ui::{AppRenderData, RenderAppResult, render_app};
use eframe::{
    CreationContext,
    egui::{self, ViewportBuilder},
    epaint::vec2,
};
use input_routing::route_editor_input;
use slash_menu::{MenuConfig, MenuError};
use smallvec::SmallVec;
use theme::{AppTheme, configure_styles, get_font_definitions};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::app_actions::AppIO;

mod app_actions;
mod app_io;
mod app_state;
mod app_ui;
mod input_routing;
mod theme;

pub struct SlashnoteApp<IO: AppIO> {
    state: AppState,
    app_io: IO,
}

impl SlashnoteApp<RealAppIO> {
    pub fn new(
        cc: &CreationContext,
        app_io: RealAppIO,
        settings: AppSettings,
    ) -> Result<Self, MenuError> {
        let theme = AppTheme::default();
        configure_styles(&cc.egui_ctx, &theme);
        cc.egui_ctx
            .set_fonts(get_font_definitions(app_io.read_font(&settings)));

        let (menu_config, status) = match app_io.load_menu_config() {
            Ok(config) => (config, None),
            Err(err) => {
                let status = StatusMessage::error(format!("{err}, using the built-in menu"));
                error!("{:?}", miette::Report::new(err));
                (MenuConfig::default(), Some(status))
            }
        };

        let state = AppState::new(AppInitData {
            theme,
            note: app_io.read_note(&settings),
            menu_config,
            status,
        })?;

        cc.egui_ctx
            .memory_mut(|mem| mem.request_focus(editor_text_id()));

        Ok(Self { state, app_io })
    }
}

impl<IO: AppIO> SlashnoteApp<IO> {
    fn process_actions(&mut self, ctx: &egui::Context, actions: impl IntoIterator<Item = AppAction>) {
        for action in actions {
            debug!(?action, "processing action");
            let mut action_buffer: SmallVec<[AppAction; 4]> = SmallVec::from_iter([action]);

            while let Some(to_process) = action_buffer.pop() {
                let new_actions = process_app_action(to_process, ctx, &mut self.state, &self.app_io);
                action_buffer.extend(new_actions);
            }
        }
    }
}

impl<IO: AppIO> eframe::App for SlashnoteApp<IO> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let text_edit_id = editor_text_id();

        let mut action_list: SmallVec<[AppAction; 4]> =
            self.state.deferred_to_post_render.drain(..).collect();

        // the menu sees keys and text before the editor widget does
        if ctx.memory(|m| m.has_focus(text_edit_id)) {
            action_list.extend(route_editor_input(ctx, &mut self.state));
        }

        let is_frame_focused = ctx.input(|i| i.viewport().focused.unwrap_or(true));
        if self.state.prev_focused && !is_frame_focused {
            debug!("lost focus");
            self.state.pending_input.clear();
            action_list.push(AppAction::SlashMenu(SlashMenuAction::Dismiss));
        }
        self.state.prev_focused = is_frame_focused;

        self.process_actions(ctx, action_list);

        let AppState {
            doc,
            session,
            theme,
            status,
            ..
        } = &mut self.state;

        let render_data = AppRenderData {
            text_edit_id,
            byte_cursor: doc.cursor(),
            menu: session.view(),
            trigger: session.trigger(),
            status: status.as_ref(),
        };

        let RenderAppResult {
            requested_actions,
            latest_cursor,
            caret,
        } = render_app(doc.text_mut(), render_data, theme, ctx);

        if let Some(cursor) = latest_cursor {
            self.state.doc.set_cursor(cursor);
        }
        self.state.caret = caret;

        if self.state.doc.take_render_request() {
            ctx.request_repaint();
        }

        // post render processing
        self.process_actions(ctx, requested_actions);
    }
}

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_io = RealAppIO::new();
    let settings = app_io.load_settings().unwrap_or_else(|err| {
        error!("{:?}", miette::Report::new(err));
        AppSettings::default()
    });

    let (width, height) = settings.window_size.unwrap_or((480., 560.));
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_resizable(true)
            .with_min_inner_size(vec2(320.0, 240.0))
            .with_inner_size(vec2(width, height)),
        ..Default::default()
    };

    eframe::run_native(
        "Slashnote",
        options,
        Box::new(
            |cc: &CreationContext<'_>| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                Ok(Box::new(SlashnoteApp::new(cc, app_io, settings)?))
            },
        ),
    )
}
