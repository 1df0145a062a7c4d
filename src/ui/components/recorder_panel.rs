//! Topic, notes, record button and the list of recordings

use super::editor::draft_status;
use super::format_time;
use crate::capture::CaptureState;
use crate::drafts::types::{MAX_CONTENT_CHARS, MAX_TOPIC_CHARS};
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use chrono::{DateTime, Local, Utc};
use egui::{self, Rect, RichText, Sense, Vec2};
use uuid::Uuid;

/// What the user asked for in the session list this frame
#[derive(Debug, Clone, Copy)]
enum SessionAction {
    Play(Uuid),
    Share(Uuid),
    Export(Uuid),
    Delete(Uuid),
}

struct SessionRow {
    id: Uuid,
    label: String,
    duration_secs: f64,
    created_at: DateTime<Utc>,
    playing: bool,
}

pub struct RecorderPanel<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> RecorderPanel<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Speech").strong().size(18.0).color(self.theme.ink));
        ui.add_space(self.theme.gap_sm);

        self.show_prompt(ui);
        ui.add_space(self.theme.gap_sm);
        self.show_record_controls(ui);

        ui.separator();
        self.show_sessions(ui);
    }

    fn show_prompt(&mut self, ui: &mut egui::Ui) {
        let recording = self.state.recorder.is_active();
        let speech = self.state.speech.value_mut();

        let topic = ui.add_enabled(
            !recording,
            egui::TextEdit::singleline(&mut speech.topic)
                .hint_text("Topic")
                .char_limit(MAX_TOPIC_CHARS)
                .desired_width(f32::INFINITY)
                .id(egui::Id::new("speech_topic")),
        );
        topic.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, !recording, "Topic input"));

        let notes = ui.add(
            egui::TextEdit::multiline(&mut speech.content)
                .hint_text("Notes")
                .char_limit(MAX_CONTENT_CHARS)
                .desired_rows(5)
                .desired_width(f32::INFINITY)
                .id(egui::Id::new("speech_notes")),
        );
        notes.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, true, "Notes input"));

        if let Some(status) = draft_status(&self.state.speech) {
            ui.label(RichText::new(status).size(12.0).color(self.theme.ink_faint));
        }
    }

    fn show_record_controls(&mut self, ui: &mut egui::Ui) {
        let state = self.state.recorder.state().clone();

        let (icon, label, color) = match state {
            CaptureState::Idle => ("🎤", "Start recording", self.theme.ink_soft),
            CaptureState::Requesting => ("⏳", "Cancel request", self.theme.warning),
            CaptureState::Recording { .. } => ("⏹", "Stop recording", self.theme.recording),
            CaptureState::Finalizing => ("⏳", "Saving recording", self.theme.warning),
        };
        let enabled = state != CaptureState::Finalizing;
        let recording = matches!(state, CaptureState::Recording { .. });

        ui.horizontal(|ui| {
            let button = egui::Button::new(RichText::new(icon).size(20.0).color(color))
                .min_size(Vec2::splat(44.0))
                .rounding(self.theme.control_rounding);
            let button = if recording {
                button.fill(self.theme.recording.gamma_multiply(0.2))
            } else {
                button
            };

            let response = ui.add_enabled(enabled, button);
            let button_rect = response.rect;
            response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, label));
            if response.on_hover_text(label).clicked() {
                self.state.toggle_recording();
            }

            if recording {
                ui.label(
                    RichText::new(format_time(self.state.recorder.elapsed_secs()))
                        .family(egui::FontFamily::Monospace)
                        .color(self.theme.recording),
                );
                self.show_level_meter(ui, self.state.recorder.level());

                // Pulsing ring around the button
                let t = ui.ctx().input(|i| i.time);
                let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
                let radius = button_rect.width() / 2.0 + 2.0 + pulse * 3.0;
                ui.painter().circle_stroke(
                    button_rect.center(),
                    radius,
                    egui::Stroke::new(2.0 * pulse, self.theme.recording.gamma_multiply(1.0 - pulse * 0.5)),
                );
                ui.ctx().request_repaint();
            }
        });
    }

    fn show_level_meter(&self, ui: &mut egui::Ui, level: f32) {
        let (rect, _) = ui.allocate_exact_size(Vec2::new(80.0, 6.0), Sense::hover());
        let painter = ui.painter();
        painter.rect_filled(rect, 3.0, self.theme.raised);
        let fill = Rect::from_min_size(rect.min, Vec2::new(rect.width() * level.clamp(0.0, 1.0), rect.height()));
        painter.rect_filled(fill, 3.0, self.theme.success);
    }

    fn show_sessions(&mut self, ui: &mut egui::Ui) {
        let library = self.state.recorder.library();
        let loaded = self.state.player.asset().map(|asset| asset.id());
        let playing = self.state.player.is_playing();

        let rows: Vec<SessionRow> = library
            .iter()
            .map(|session| SessionRow {
                id: session.id,
                label: session.source_label.clone(),
                duration_secs: session.duration_secs,
                created_at: session.created_at,
                playing: playing && loaded == Some(session.asset.id()),
            })
            .collect();

        ui.label(
            RichText::new(format!("Recordings ({}/{})", rows.len(), library.limit()))
                .size(12.0)
                .color(self.theme.ink_faint),
        );

        if rows.is_empty() {
            ui.label(RichText::new("No recordings yet").color(self.theme.ink_faint));
            return;
        }

        let mut action = None;
        egui::ScrollArea::vertical().id_salt("recordings").show(ui, |ui| {
            for row in &rows {
                if let Some(chosen) = self.show_session_row(ui, row) {
                    action = Some(chosen);
                }
            }
        });

        match action {
            Some(SessionAction::Play(id)) => self.state.play_session(id),
            Some(SessionAction::Share(id)) => {
                self.state.share_session(id);
            }
            Some(SessionAction::Export(id)) => {
                self.state.export_session(id);
            }
            Some(SessionAction::Delete(id)) => {
                self.state.delete_session(id);
            }
            None => {}
        }
    }

    fn show_session_row(&self, ui: &mut egui::Ui, row: &SessionRow) -> Option<SessionAction> {
        let mut action = None;

        egui::Frame::none()
            .fill(self.theme.surface)
            .rounding(self.theme.control_rounding)
            .inner_margin(self.theme.gap_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let icon = if row.playing { "⏸" } else { "▶" };
                    let play = ui.button(icon);
                    play.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, true, format!("Play {}", row.label))
                    });
                    if play.clicked() {
                        action = Some(SessionAction::Play(row.id));
                    }

                    ui.vertical(|ui| {
                        ui.label(RichText::new(&row.label).color(self.theme.ink));
                        ui.label(
                            RichText::new(format!(
                                "{} · {}",
                                format_time(row.duration_secs),
                                row.created_at.with_timezone(&Local).format("%b %-d %H:%M")
                            ))
                            .size(11.0)
                            .color(self.theme.ink_faint),
                        );
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                            action = Some(SessionAction::Delete(row.id));
                        }
                        if ui.small_button("💾").on_hover_text("Export WAV").clicked() {
                            action = Some(SessionAction::Export(row.id));
                        }
                        if ui.small_button("🔗").on_hover_text("Share").clicked() {
                            action = Some(SessionAction::Share(row.id));
                        }
                    });
                });
            });

        action
    }
}
