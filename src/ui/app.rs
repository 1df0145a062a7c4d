//! Main application struct and eframe integration

use crate::context::AppContext;
use crate::playback::TransportKey;
use crate::ui::components::{AudioPlayer, Editor, NoticeBar, RecorderPanel, RecoveryBanner};
use crate::ui::state::{AppState, DraftForm, Platform};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, SidePanel, TopBottomPanel};
use std::time::Duration;
use tracing::info;

/// Repaint interval while idle, so autosave timers keep running
const IDLE_REPAINT: Duration = Duration::from_millis(500);

pub struct ProsePauseApp {
    state: AppState,
    theme: Theme,
}

impl ProsePauseApp {
    pub fn new(cc: &eframe::CreationContext<'_>, context: AppContext) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let platform = Platform::native(&context, &cc.egui_ctx);
        Self {
            state: AppState::new(context, platform),
            theme,
        }
    }

    /// Feed focus changes and transport shortcuts to the state
    fn handle_input(&mut self, ctx: &egui::Context) {
        let focused = ctx.input(|i| i.viewport().focused).unwrap_or(true);
        self.state.window_focus_changed(focused);

        let text_input_focused = ctx.wants_keyboard_input();
        let keys: Vec<TransportKey> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => TransportKey::from_egui(*key),
                    _ => None,
                })
                .collect()
        });

        for key in keys {
            self.state.handle_key(key, text_input_focused);
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(self.theme.surface).inner_margin(12.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Prose & Pause").size(20.0).strong().color(self.theme.ink));
                    ui.label(RichText::new("Write, then speak").size(14.0).color(self.theme.ink_faint));
                });
            });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("footer")
            .frame(egui::Frame::none().fill(self.theme.panel).inner_margin(self.theme.gap_sm))
            .show(ctx, |ui| {
                NoticeBar::new(&self.state.context.notices, &self.theme).show(ui);
                AudioPlayer::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_recorder(&mut self, ctx: &egui::Context) {
        SidePanel::right("recorder")
            .resizable(true)
            .default_width(320.0)
            .min_width(260.0)
            .frame(egui::Frame::none().fill(self.theme.panel).inner_margin(self.theme.gap))
            .show(ctx, |ui| {
                if let Some(saved_at) = self.state.recovered_speech.as_ref().map(|draft| draft.saved_at) {
                    let banner = RecoveryBanner::new(&self.theme, DraftForm::Speech, saved_at);
                    if let Some(choice) = banner.show(ui) {
                        self.state.resolve_recovery(DraftForm::Speech, choice);
                    }
                }
                RecorderPanel::new(&mut self.state, &self.theme).show(ui);
            });
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.panel).inner_margin(self.theme.gap))
            .show(ctx, |ui| {
                if let Some(saved_at) = self.state.recovered_writing.as_ref().map(|draft| draft.saved_at) {
                    let banner = RecoveryBanner::new(&self.theme, DraftForm::Writing, saved_at);
                    if let Some(choice) = banner.show(ui) {
                        self.state.resolve_recovery(DraftForm::Writing, choice);
                    }
                    ui.add_space(self.theme.gap_sm);
                }
                Editor::new(&mut self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for ProsePauseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.state.poll();

        self.show_header(ctx);
        self.show_footer(ctx);
        self.show_recorder(ctx);
        self.show_editor(ctx);

        if self.state.recorder.is_active() || self.state.player.is_playing() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Window closing");
        self.state.shutdown();
    }
}
