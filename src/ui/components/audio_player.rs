//! Audio player controls component
//!
//! Play/pause, a seekable progress bar, time display and volume.

use super::format_time;
use crate::ui::state::AppState;
use crate::ui::theme::Theme;
use egui::{self, Rect, RichText, Sense, Vec2};

pub struct AudioPlayer<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> AudioPlayer<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Label of the loaded recording
    fn title(&self) -> Option<String> {
        let id = self.state.player.asset()?.id();
        let label = self
            .state
            .recorder
            .library()
            .iter()
            .find(|session| session.asset.id() == id)
            .map(|session| session.source_label.clone());
        Some(label.unwrap_or_else(|| "Recording".to_string()))
    }

    pub fn show(mut self, ui: &mut egui::Ui) {
        let title = self.title();
        let has_audio = title.is_some();
        let playback = self.state.player.state();

        egui::Frame::none()
            .fill(self.theme.surface)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.gap_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let (icon, tooltip) = if playback.is_playing { ("⏸", "Pause") } else { ("▶", "Play") };
                    let play_btn = ui.add_enabled(
                        has_audio,
                        egui::Button::new(RichText::new(icon).size(20.0)).min_size(Vec2::splat(36.0)),
                    );
                    play_btn.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Button, has_audio, tooltip));
                    if play_btn.on_hover_text(tooltip).clicked() {
                        self.state.player.toggle();
                    }

                    ui.vertical(|ui| {
                        ui.set_width(140.0);
                        match &title {
                            Some(title) => {
                                ui.label(RichText::new(title).strong().color(self.theme.ink));
                            }
                            None => {
                                ui.label(RichText::new("No audio").color(self.theme.ink_faint));
                            }
                        }
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        self.show_volume_control(ui);

                        ui.add_space(self.theme.gap_sm);

                        let time = ui.label(
                            RichText::new(format!(
                                "{} / {}",
                                format_time(playback.position_secs),
                                format_time(playback.duration_secs)
                            ))
                            .size(12.0)
                            .color(self.theme.ink_faint)
                            .family(egui::FontFamily::Monospace),
                        );
                        time.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("Playback position {:.1}", playback.position_secs),
                            )
                        });

                        ui.add_space(self.theme.gap_sm);
                        self.show_progress_bar(ui, playback.progress(), playback.duration_secs, has_audio);
                    });
                });
            });
    }

    fn show_progress_bar(&mut self, ui: &mut egui::Ui, progress: f32, duration_secs: f64, interactive: bool) {
        let width = ui.available_width().max(60.0);
        let (rect, response) = ui.allocate_exact_size(Vec2::new(width, 8.0), Sense::click_and_drag());

        let painter = ui.painter();
        painter.rect_filled(rect, 4.0, self.theme.raised);
        let fill_rect = Rect::from_min_size(rect.min, Vec2::new(rect.width() * progress, rect.height()));
        painter.rect_filled(fill_rect, 4.0, self.theme.accent);

        if !interactive {
            return;
        }

        if response.clicked() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                let fraction = ((pos.x - rect.left()) / rect.width()).clamp(0.0, 1.0);
                self.state.player.seek_fraction(fraction as f64);
            }
        }

        if response.hovered() {
            painter.rect_stroke(rect, 4.0, egui::Stroke::new(1.0, self.theme.accent));

            if let Some(pos) = ui.ctx().pointer_hover_pos() {
                if rect.contains(pos) {
                    let hover_fraction = ((pos.x - rect.left()) / rect.width()) as f64;
                    egui::show_tooltip(ui.ctx(), response.layer_id, egui::Id::new("seek_tooltip"), |ui| {
                        ui.label(format_time(hover_fraction * duration_secs));
                    });
                }
            }
        }
    }

    fn show_volume_control(&mut self, ui: &mut egui::Ui) {
        let mut volume = self.state.player.volume();

        let slider = egui::Slider::new(&mut volume, 0.0..=1.0)
            .show_value(false)
            .clamping(egui::SliderClamping::Always);
        let response = ui.add_sized(Vec2::new(70.0, 20.0), slider);
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Slider, true, "Volume"));
        if response.changed() {
            self.state.player.set_volume(volume);
        }

        let icon = if volume == 0.0 {
            "🔇"
        } else if volume < 0.5 {
            "🔉"
        } else {
            "🔊"
        };
        if ui.button(icon).on_hover_text("Mute").clicked() {
            self.state.player.toggle_mute();
        }
    }
}
