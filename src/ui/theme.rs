//! Colors and spacing for the desktop UI

use crate::notices::NoticeLevel;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Vec2, Visuals};

#[derive(Clone, Debug)]
pub struct Theme {
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,
    /// Red of the record button and its pulse
    pub recording: Color32,

    /// Window background
    pub panel: Color32,
    /// Cards, banners and the editor background
    pub surface: Color32,
    /// Inputs and inactive controls
    pub raised: Color32,

    pub ink: Color32,
    pub ink_soft: Color32,
    pub ink_faint: Color32,

    pub control_rounding: Rounding,
    pub card_rounding: Rounding,
    pub gap: f32,
    pub gap_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Warm dark palette, easy on the eyes for long writing sessions
    pub fn dark() -> Self {
        Self {
            accent: Color32::from_rgb(217, 164, 65),
            success: Color32::from_rgb(111, 191, 115),
            warning: Color32::from_rgb(230, 170, 60),
            error: Color32::from_rgb(224, 92, 80),
            recording: Color32::from_rgb(224, 72, 64),

            panel: Color32::from_rgb(28, 26, 24),
            surface: Color32::from_rgb(40, 37, 34),
            raised: Color32::from_rgb(58, 54, 50),

            ink: Color32::from_rgb(240, 234, 224),
            ink_soft: Color32::from_rgb(205, 198, 186),
            ink_faint: Color32::from_rgb(150, 143, 133),

            control_rounding: Rounding::same(4.0),
            card_rounding: Rounding::same(8.0),
            gap: 14.0,
            gap_sm: 6.0,
        }
    }

    pub fn notice_color(&self, level: NoticeLevel) -> Color32 {
        match level {
            NoticeLevel::Info => self.accent,
            NoticeLevel::Warning => self.warning,
            NoticeLevel::Error => self.error,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = self.panel;
        visuals.window_fill = self.surface;
        visuals.extreme_bg_color = self.raised;
        visuals.override_text_color = Some(self.ink_soft);

        let widgets = &mut visuals.widgets;
        widgets.inactive.bg_fill = self.raised;
        widgets.inactive.weak_bg_fill = self.raised;
        widgets.hovered.bg_fill = self.accent.gamma_multiply(0.7);
        widgets.active.bg_fill = self.accent;
        widgets.active.fg_stroke = Stroke::new(1.0, self.ink);

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.35);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);
        ctx.set_visuals(visuals);

        ctx.style_mut(|style| {
            style.spacing.item_spacing = Vec2::splat(self.gap_sm);
            // Prose reads better a little larger than egui's default
            style
                .text_styles
                .insert(TextStyle::Body, FontId::new(16.0, FontFamily::Proportional));
            style
                .text_styles
                .insert(TextStyle::Heading, FontId::new(21.0, FontFamily::Proportional));
        });
    }
}
