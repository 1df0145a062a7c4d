//! Dismissible notices

use crate::notices::Notices;
use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Number of notices shown at once, newest first
const VISIBLE_NOTICES: usize = 3;

pub struct NoticeBar<'a> {
    notices: &'a Notices,
    theme: &'a Theme,
}

impl<'a> NoticeBar<'a> {
    pub fn new(notices: &'a Notices, theme: &'a Theme) -> Self {
        Self { notices, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        let all = self.notices.all();
        for notice in all.iter().rev().take(VISIBLE_NOTICES) {
            let color = self.theme.notice_color(notice.level);
            egui::Frame::none()
                .fill(color.gamma_multiply(0.15))
                .rounding(self.theme.control_rounding)
                .inner_margin(egui::Margin::symmetric(self.theme.gap_sm, 4.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let label = ui.label(RichText::new(&notice.message).color(color));
                        label.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("Notice: {}", notice.message),
                            )
                        });

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✖").on_hover_text("Dismiss").clicked() {
                                self.notices.dismiss(notice.id);
                            }
                        });
                    });
                });
        }
    }
}
