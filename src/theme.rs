use std::{collections::BTreeMap, sync::Arc};

use eframe::{
    egui::{
        self, FontData, FontDefinitions, RichText, TextStyle, Visuals,
        style::{Selection, WidgetVisuals},
    },
    epaint::{Color32, CornerRadius, FontFamily, FontId, Stroke},
};

pub struct Nord;

impl Nord {
    pub const NORD0: Color32 = Color32::from_rgb(0x2E, 0x34, 0x40);
    pub const NORD1: Color32 = Color32::from_rgb(0x3B, 0x42, 0x52);
    pub const NORD2: Color32 = Color32::from_rgb(0x43, 0x4C, 0x5E);
    pub const NORD3: Color32 = Color32::from_rgb(0x4C, 0x56, 0x6A);
    pub const NORD4: Color32 = Color32::from_rgb(0xD8, 0xDE, 0xE9);
    pub const NORD6: Color32 = Color32::from_rgb(0xEC, 0xEF, 0xF4);
    pub const NORD8: Color32 = Color32::from_rgb(0x88, 0xC0, 0xD0);
    pub const NORD11: Color32 = Color32::from_rgb(0xBF, 0x61, 0x6A);
    pub const NORD12: Color32 = Color32::from_rgb(0xD0, 0x87, 0x70);
    pub const NORD13: Color32 = Color32::from_rgb(0xEB, 0xCB, 0x8B);
}

pub enum AppIcon {
    MenuItem,
    Reload,
    Error,
    Info,
}

impl AppIcon {
    pub fn glyph(&self) -> &'static str {
        use egui_phosphor::light as P;
        match self {
            AppIcon::MenuItem => P::TEXT_T,
            AppIcon::Reload => P::ARROW_CLOCKWISE,
            AppIcon::Error => P::WARNING_CIRCLE,
            AppIcon::Info => P::INFO,
        }
    }

    pub fn render(&self, size: f32, color: Color32) -> RichText {
        RichText::new(self.glyph())
            .family(FontFamily::Proportional)
            .color(color)
            .size(size)
    }
}

pub struct Sizes {
    pub xs: f32,
    pub s: f32,
    pub l: f32,

    // semantic
    pub header_footer: f32,
    pub toolbar_icon: f32,
    pub menu_width: f32,
    pub menu_max_height: f32,
}

impl Sizes {
    pub fn new() -> Self {
        let xs = 4.0;
        let s = 8.0;
        let l = 16.0;
        let xl = 24.0;

        Self {
            xs,
            s,
            l,
            header_footer: xl + xs,
            toolbar_icon: l + xs / 2.,
            menu_width: 260.,
            menu_max_height: 220.,
        }
    }
}

pub struct FontSizes {
    pub h1: f32,
    pub h4: f32,
    pub normal: f32,
    pub small: f32,
}

impl FontSizes {
    pub fn new() -> Self {
        Self {
            h1: 24.,
            h4: 16.,
            normal: 14.,
            small: 11.,
        }
    }
}

pub struct FontTheme {
    pub size: FontSizes,
    pub normal: FontFamily,
    pub code: FontFamily,
}

impl Default for FontTheme {
    fn default() -> Self {
        Self {
            size: FontSizes::new(),
            normal: FontFamily::Proportional,
            code: FontFamily::Monospace,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub rounding_controls: CornerRadius,
    pub rounding_window: CornerRadius,

    pub button_bg: Color32,
    pub button_fg: Color32,
    pub button_hover_bg: Color32,
    pub button_hover_bg_stroke: Color32,
    pub button_hover_fg: Color32,
    pub button_pressed_bg: Color32,
    pub button_pressed_fg: Color32,

    pub main_bg: Color32,
    pub outline_fg: Color32,
    pub selection_bg: Color32,
    pub selection_stroke: Color32,
    pub normal_text_color: Color32,
    pub subtle_text_color: Color32,

    pub menu_bg: Color32,
    pub menu_selected_bg: Color32,
    pub menu_label: Color32,
    // editor frame while the slash menu is open
    pub menu_open_accent: Color32,

    pub extreme_bg_color: Color32,
    pub code_bg_color: Color32,
    pub warn_fg_color: Color32,
    pub error_fg_color: Color32,
}

impl ColorTheme {
    pub fn nord() -> Self {
        Self {
            rounding_controls: CornerRadius::same(6),
            rounding_window: CornerRadius::same(6),

            button_bg: Nord::NORD1,
            button_fg: Nord::NORD8,
            button_hover_bg: Nord::NORD1.shade(0.95),
            button_hover_bg_stroke: Nord::NORD8.shade(0.8),
            button_hover_fg: Nord::NORD8.shade(1.1),
            button_pressed_bg: Nord::NORD1.shade(0.9),
            button_pressed_fg: Nord::NORD8.shade(1.2),

            main_bg: Nord::NORD0.shade(0.8),
            outline_fg: Nord::NORD1,
            selection_bg: Nord::NORD2,
            selection_stroke: Nord::NORD6,
            normal_text_color: Nord::NORD4,
            subtle_text_color: Nord::NORD4.shade(0.5),

            menu_bg: Nord::NORD0.shade(0.6),
            menu_selected_bg: Nord::NORD3,
            menu_label: Nord::NORD13,
            menu_open_accent: Nord::NORD8.shade(0.7),

            extreme_bg_color: Nord::NORD0.shade(0.6),
            code_bg_color: Nord::NORD0.shade(0.6),
            warn_fg_color: Nord::NORD12,
            error_fg_color: Nord::NORD11,
        }
    }
}

pub struct AppTheme {
    pub fonts: FontTheme,
    pub colors: ColorTheme,
    pub sizes: Sizes,
}

impl AppTheme {
    pub fn nord() -> Self {
        Self {
            fonts: FontTheme::default(),
            colors: ColorTheme::nord(),
            sizes: Sizes::new(),
        }
    }
}

impl Default for AppTheme {
    fn default() -> Self {
        Self::nord()
    }
}

pub fn configure_styles(ctx: &egui::Context, theme: &AppTheme) {
    let mut style = (*ctx.style()).clone();

    style.text_styles = text_styles(&theme.fonts);
    style.visuals = visuals(&theme.colors);
    ctx.set_style(style);
}

/// Phosphor icons, plus a user supplied font (e.g. with CJK glyphs) as a fallback.
pub fn get_font_definitions(user_font: Option<Vec<u8>>) -> FontDefinitions {
    let mut fonts = FontDefinitions::default();

    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Light);

    if let Some(bytes) = user_font {
        fonts
            .font_data
            .insert("user".to_owned(), Arc::new(FontData::from_owned(bytes)));

        for family in [FontFamily::Proportional, FontFamily::Monospace] {
            fonts
                .families
                .entry(family)
                .or_default()
                .push("user".to_owned());
        }
    }

    fonts
}

fn text_styles(fonts: &FontTheme) -> BTreeMap<TextStyle, FontId> {
    let FontTheme { size, normal, code } = fonts;
    [
        (TextStyle::Heading, FontId::new(size.h1, normal.clone())),
        (TextStyle::Body, FontId::new(size.normal, normal.clone())),
        (TextStyle::Monospace, FontId::new(size.normal, code.clone())),
        (TextStyle::Button, FontId::new(size.normal, normal.clone())),
        (TextStyle::Small, FontId::new(size.small, normal.clone())),
    ]
    .into()
}

pub trait ColorManipulation {
    fn shade(self, by: f32) -> Self;
}

impl ColorManipulation for Color32 {
    fn shade(self, by: f32) -> Self {
        let [r, g, b, a] = self.to_array();

        Color32::from_rgba_premultiplied(
            (r as f32 * by) as u8,
            (g as f32 * by) as u8,
            (b as f32 * by) as u8,
            a,
        )
    }
}

fn visuals(colors: &ColorTheme) -> Visuals {
    let ColorTheme {
        rounding_controls,
        rounding_window,
        button_bg,
        button_fg,
        button_hover_bg,
        button_hover_bg_stroke,
        button_hover_fg,
        button_pressed_bg,
        button_pressed_fg,
        main_bg,
        outline_fg,
        selection_bg,
        selection_stroke,
        normal_text_color,
        extreme_bg_color,
        code_bg_color,
        warn_fg_color,
        error_fg_color,
        ..
    } = colors.clone();

    let mut visuals = Visuals::dark();

    visuals.selection = Selection {
        bg_fill: selection_bg,
        stroke: Stroke::new(1.0, selection_stroke),
    };
    visuals.extreme_bg_color = extreme_bg_color;
    visuals.code_bg_color = code_bg_color;
    visuals.warn_fg_color = warn_fg_color;
    visuals.error_fg_color = error_fg_color;
    visuals.window_fill = main_bg;
    visuals.panel_fill = main_bg;
    visuals.window_stroke = Stroke::new(0.5, outline_fg);
    visuals.window_corner_radius = rounding_window;
    visuals.menu_corner_radius = rounding_window;
    visuals.text_cursor.stroke = Stroke::new(2.0, normal_text_color);
    visuals.interact_cursor = Some(egui::CursorIcon::PointingHand);

    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, normal_text_color);
    visuals.widgets.inactive = WidgetVisuals {
        weak_bg_fill: button_bg,
        bg_fill: button_bg,
        bg_stroke: Stroke::NONE,
        fg_stroke: Stroke::new(1.0, button_fg),
        corner_radius: rounding_controls,
        expansion: 0.0,
    };
    visuals.widgets.hovered = WidgetVisuals {
        weak_bg_fill: button_hover_bg,
        bg_fill: button_hover_bg,
        bg_stroke: Stroke::new(1.0, button_hover_bg_stroke),
        fg_stroke: Stroke::new(1.5, button_hover_fg),
        corner_radius: rounding_controls,
        expansion: 1.0,
    };
    visuals.widgets.active = WidgetVisuals {
        weak_bg_fill: button_pressed_bg,
        bg_fill: button_pressed_bg,
        bg_stroke: Stroke::new(1.0, button_hover_bg_stroke),
        fg_stroke: Stroke::new(2.0, button_pressed_fg),
        corner_radius: rounding_controls,
        expansion: 1.0,
    };

    visuals
}
