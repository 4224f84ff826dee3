use eframe::{
    egui::{
        self, Align, Area, CentralPanel, Context, CursorIcon, Frame, Id, Label, Layout, Margin,
        Order, RichText, ScrollArea, Sense, TextBuffer, TextEdit, TextStyle, TextWrapMode,
        TopBottomPanel, Ui, Vec2,
        text::{CCursor, CCursorRange},
        text_edit::TextEditOutput,
    },
    epaint::{Color32, FontId, Pos2, Stroke, vec2},
};
use itertools::Itertools;
use slash_menu::{MenuItem, MenuView, UnOrderedByteSpan};
use smallvec::SmallVec;

use crate::{
    app_actions::{AppAction, SlashMenuAction},
    app_state::{CaretSnapshot, StatusKind, StatusMessage},
    theme::{AppIcon, AppTheme},
};

pub struct AppRenderData<'a> {
    pub text_edit_id: Id,
    pub byte_cursor: UnOrderedByteSpan,
    pub menu: MenuView<'a>,
    pub trigger: &'a str,
    pub status: Option<&'a StatusMessage>,
}

pub struct RenderAppResult {
    pub requested_actions: SmallVec<[AppAction; 4]>,
    pub latest_cursor: Option<UnOrderedByteSpan>,
    pub caret: CaretSnapshot,
}

pub fn render_app(
    editor_text: &mut String,
    render_data: AppRenderData,
    theme: &AppTheme,
    ctx: &Context,
) -> RenderAppResult {
    let AppRenderData {
        text_edit_id,
        byte_cursor,
        menu,
        trigger,
        status,
    } = render_data;

    let mut requested_actions = SmallVec::new();

    requested_actions.extend(render_footer_panel(status, trigger, theme, ctx));

    restore_cursor_from_doc(editor_text, byte_cursor, ctx, text_edit_id);

    // derived from the menu state every frame, nothing to reset on close
    let frame_stroke = match menu.is_open {
        true => Stroke::new(1.0, theme.colors.menu_open_accent),
        false => Stroke::NONE,
    };

    let editor = CentralPanel::default()
        .frame(
            Frame::central_panel(&ctx.style())
                .inner_margin(Margin::ZERO)
                .stroke(frame_stroke),
        )
        .show(ctx, |ui| {
            ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| render_editor(ui, editor_text, text_edit_id, theme))
                .inner
        })
        .inner;

    let EditorOutput {
        latest_cursor,
        caret,
        galley_pos,
    } = editor;

    if let (true, Some(anchor)) = (menu.is_open, menu.anchor) {
        let popup_pos = galley_pos + vec2(anchor.x, anchor.y + theme.sizes.xs);
        requested_actions.extend(render_slash_menu(&menu, popup_pos, theme, ctx));
    }

    RenderAppResult {
        requested_actions,
        latest_cursor,
        caret,
    }
}

struct EditorOutput {
    latest_cursor: Option<UnOrderedByteSpan>,
    caret: CaretSnapshot,
    galley_pos: Pos2,
}

fn render_editor(
    ui: &mut Ui,
    editor_text: &mut String,
    text_edit_id: Id,
    theme: &AppTheme,
) -> EditorOutput {
    let margin = theme.sizes.l as i8;

    let TextEditOutput {
        response,
        galley,
        galley_pos,
        cursor_range,
        ..
    } = TextEdit::multiline(editor_text)
        .font(TextStyle::Monospace)
        .id(text_edit_id)
        .lock_focus(true)
        .desired_width(f32::INFINITY)
        .frame(false)
        .margin(Margin::same(margin))
        .show(ui);

    let latest_cursor = cursor_range.map(|range| {
        let [start, end] = [range.secondary, range.primary]
            .map(|c| editor_text.byte_index_from_char_index(c.ccursor.index));

        UnOrderedByteSpan::new(start, end)
    });

    // without focus there is no caret to anchor the menu at
    let primary = cursor_range
        .filter(|_| response.has_focus())
        .map(|range| range.primary.ccursor);

    EditorOutput {
        latest_cursor,
        caret: CaretSnapshot::new(galley, primary),
        galley_pos,
    }
}

fn render_slash_menu(
    menu: &MenuView,
    pos: Pos2,
    theme: &AppTheme,
    ctx: &Context,
) -> SmallVec<[AppAction; 2]> {
    let mut resulting_actions = SmallVec::new();

    Area::new(Id::new("slash_menu"))
        .order(Order::Foreground)
        .fixed_pos(pos)
        .show(ctx, |ui| {
            Frame::popup(ui.style())
                .fill(theme.colors.menu_bg)
                .inner_margin(theme.sizes.s)
                .show(ui, |ui| {
                    ui.set_width(theme.sizes.menu_width);

                    ScrollArea::vertical()
                        .max_height(theme.sizes.menu_max_height)
                        .id_salt("slash_menu_scroll")
                        .show(ui, |ui| {
                            for row in Itertools::intersperse(
                                menu.items.iter().enumerate().map(Some),
                                None,
                            ) {
                                let Some((i, item)) = row else {
                                    ui.separator();
                                    continue;
                                };

                                let selected = i == menu.selected_index;
                                let resp = render_menu_item(ui, theme, item, selected)
                                    .interact(Sense::click())
                                    .on_hover_cursor(CursorIcon::PointingHand);

                                if selected && !ui.is_rect_visible(resp.rect) {
                                    resp.scroll_to_me(Some(Align::Center));
                                }

                                if resp.clicked() {
                                    resulting_actions
                                        .push(AppAction::SlashMenu(SlashMenuAction::Select(i)));
                                }

                                // only a moving pointer highlights, otherwise a resting pointer
                                // would fight with the arrow keys
                                let pointer_moved = ui.input(|input| {
                                    input.pointer.is_moving() || input.smooth_scroll_delta != Vec2::ZERO
                                });
                                if pointer_moved && resp.contains_pointer() && !selected {
                                    resulting_actions
                                        .push(AppAction::SlashMenu(SlashMenuAction::Highlight(i)));
                                }
                            }
                        });
                });
        });

    resulting_actions
}

fn render_menu_item(ui: &mut Ui, theme: &AppTheme, item: &MenuItem, selected: bool) -> egui::Response {
    let fill = match selected {
        true => theme.colors.menu_selected_bg,
        false => Color32::TRANSPARENT,
    };

    Frame::new()
        .fill(fill)
        .corner_radius(theme.colors.rounding_controls)
        .inner_margin(theme.sizes.xs)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());

            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = theme.sizes.s;

                let icon = match &item.icon {
                    Some(icon) => RichText::new(icon).size(theme.fonts.size.h4),
                    None => AppIcon::MenuItem.render(theme.fonts.size.h4, theme.colors.subtle_text_color),
                };
                ui.add(Label::new(icon).selectable(false));

                ui.add(
                    Label::new(
                        RichText::new(&item.label)
                            .font(FontId::new(theme.fonts.size.normal, theme.fonts.normal.clone()))
                            .color(theme.colors.menu_label),
                    )
                    .selectable(false)
                    .wrap_mode(TextWrapMode::Truncate),
                );
            });

            if let Some(description) = &item.description {
                ui.add(
                    Label::new(
                        RichText::new(description)
                            .size(theme.fonts.size.small)
                            .color(theme.colors.subtle_text_color),
                    )
                    .selectable(false),
                );
            }
        })
        .response
}

fn render_footer_panel(
    status: Option<&StatusMessage>,
    trigger: &str,
    theme: &AppTheme,
    ctx: &Context,
) -> SmallVec<[AppAction; 1]> {
    let mut resulting_actions = SmallVec::new();

    TopBottomPanel::bottom("footer")
        .exact_height(theme.sizes.header_footer)
        .frame(Frame::side_top_panel(&ctx.style()).inner_margin(Margin::symmetric(theme.sizes.s as i8, 0)))
        .show(ctx, |ui| {
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let reload = ui
                    .add(egui::Button::new(
                        AppIcon::Reload.render(theme.sizes.toolbar_icon, theme.colors.button_fg),
                    ).frame(false))
                    .on_hover_text("Reload slash menu config");

                if reload.clicked() {
                    resulting_actions.push(AppAction::ReloadMenuConfig);
                    resulting_actions.push(AppAction::FocusEditor);
                }

                ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
                    let (icon, text, color) = match status {
                        Some(StatusMessage {
                            kind: StatusKind::Error,
                            text,
                        }) => (AppIcon::Error, text.as_str(), theme.colors.error_fg_color),
                        Some(StatusMessage {
                            kind: StatusKind::Info,
                            text,
                        }) => (AppIcon::Info, text.as_str(), theme.colors.normal_text_color),
                        None => (AppIcon::Info, "", theme.colors.subtle_text_color),
                    };

                    ui.label(icon.render(theme.fonts.size.normal, color));
                    let label = match text.is_empty() {
                        true => RichText::new(format!("Type {trigger} for commands")),
                        false => RichText::new(text),
                    };
                    ui.add(Label::new(label.color(color)).truncate());
                });
            });
        });

    resulting_actions
}

fn restore_cursor_from_doc(
    text: &str,
    byte_cursor: UnOrderedByteSpan,
    ctx: &Context,
    text_state_id: Id,
) {
    if let Some(mut text_edit_state) = TextEdit::load_state(ctx, text_state_id) {
        let ccursor_range = Some(CCursorRange::two(
            CCursor::new(char_index_from_byte_index(text, byte_cursor.start)),
            CCursor::new(char_index_from_byte_index(text, byte_cursor.end)),
        ));

        if ccursor_range != text_edit_state.cursor.char_range() {
            text_edit_state.cursor.set_char_range(ccursor_range);
            text_edit_state.store(ctx, text_state_id);
        }
    }
}

pub fn char_index_from_byte_index(s: &str, byte_index: usize) -> usize {
    for (ci, (bi, _)) in s.char_indices().enumerate() {
        if bi == byte_index {
            return ci;
        }
    }

    s.chars().count()
}
