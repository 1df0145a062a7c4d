//! Writing editor with autosave status

use crate::drafts::types::{MAX_AUTHOR_CHARS, MAX_CONTENT_CHARS, MAX_TITLE_CHARS};
use crate::drafts::{AutoSave, DraftPayload};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use chrono::Local;
use egui::{self, RichText};

/// Short save status for a tracked form, if there is anything to say
pub fn draft_status<T: DraftPayload>(autosave: &AutoSave<T>) -> Option<String> {
    if autosave.is_saving() {
        return Some("Saving…".to_string());
    }
    if autosave.has_unsaved_changes() {
        return Some(if autosave.failed_saves() > 0 {
            "Not saved locally".to_string()
        } else {
            "Unsaved changes".to_string()
        });
    }
    autosave
        .last_saved()
        .map(|at| format!("Saved at {}", at.with_timezone(&Local).format("%H:%M:%S")))
}

pub struct Editor<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Editor<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.surface)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.gap)
            .show(ui, |ui| {
                ui.label(RichText::new("Writing").strong().size(18.0).color(self.theme.ink));
                ui.add_space(self.theme.gap_sm);

                let draft = self.state.writing.value_mut();

                let title = ui.add(
                    egui::TextEdit::singleline(&mut draft.title)
                        .hint_text("Title")
                        .char_limit(MAX_TITLE_CHARS)
                        .desired_width(f32::INFINITY)
                        .id(egui::Id::new("writing_title")),
                );
                title.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Title input"));

                let author = ui.add(
                    egui::TextEdit::singleline(&mut draft.author)
                        .hint_text("Author")
                        .char_limit(MAX_AUTHOR_CHARS)
                        .desired_width(f32::INFINITY)
                        .id(egui::Id::new("writing_author")),
                );
                author.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Author input"));

                egui::ScrollArea::vertical()
                    .id_salt("writing_content")
                    .max_height((ui.available_height() - 48.0).max(120.0))
                    .show(ui, |ui| {
                        let content = ui.add(
                            egui::TextEdit::multiline(&mut draft.content)
                                .hint_text("Start writing...")
                                .char_limit(MAX_CONTENT_CHARS)
                                .desired_rows(14)
                                .desired_width(f32::INFINITY)
                                .id(egui::Id::new("writing_content_input")),
                        );
                        content.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Content input")
                        });
                    });

                ui.add_space(self.theme.gap_sm);
                ui.horizontal(|ui| {
                    let status = draft_status(&self.state.writing).unwrap_or_default();
                    let status_label = ui.label(RichText::new(&status).size(12.0).color(self.theme.ink_faint));
                    status_label.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Label, true, format!("Draft status: {}", status))
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let enabled = self.state.writing.value().has_content();
                        let save = ui.add_enabled(
                            enabled,
                            egui::Button::new("Save").rounding(self.theme.control_rounding),
                        );
                        save.widget_info(|| {
                            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, "Save writing")
                        });
                        if save.on_hover_text("Save as a Markdown file").clicked() {
                            self.state.save_writing();
                        }
                    });
                });
            });
    }
}
