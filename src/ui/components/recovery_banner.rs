//! Prompt offering a draft left over from a previous session

use crate::ui::state::{DraftForm, RecoveryChoice};
use crate::ui::theme::Theme;
use chrono::{DateTime, Local, Utc};
use egui::{self, RichText};

pub struct RecoveryBanner<'a> {
    theme: &'a Theme,
    form: DraftForm,
    saved_at: DateTime<Utc>,
}

impl<'a> RecoveryBanner<'a> {
    pub fn new(theme: &'a Theme, form: DraftForm, saved_at: DateTime<Utc>) -> Self {
        Self { theme, form, saved_at }
    }

    fn form_name(&self) -> &'static str {
        match self.form {
            DraftForm::Writing => "writing",
            DraftForm::Speech => "speech",
        }
    }

    /// Render the banner and return the user's answer, if given this frame
    pub fn show(self, ui: &mut egui::Ui) -> Option<RecoveryChoice> {
        let mut choice = None;
        let name = self.form_name();

        egui::Frame::none()
            .fill(self.theme.warning.gamma_multiply(0.15))
            .stroke(egui::Stroke::new(1.0, self.theme.warning))
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.gap_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let saved = self.saved_at.with_timezone(&Local).format("%b %-d, %H:%M");
                    ui.label(
                        RichText::new(format!("Unsaved {} from {} was recovered.", name, saved))
                            .color(self.theme.ink),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let discard = ui.button("Discard");
                        discard.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Button,
                                true,
                                format!("Discard {} draft", name),
                            )
                        });
                        if discard.clicked() {
                            choice = Some(RecoveryChoice::Discard);
                        }

                        let keep = ui.button("Keep draft");
                        keep.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, format!("Keep {} draft", name))
                        });
                        if keep.clicked() {
                            choice = Some(RecoveryChoice::Keep);
                        }
                    });
                });
            });

        choice
    }
}
