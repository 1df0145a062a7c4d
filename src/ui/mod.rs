//! Desktop user interface with egui/eframe

mod app;
pub mod components;
mod platform;
mod state;
mod theme;

pub use app::ProsePauseApp;
pub use platform::EguiClipboard;
pub use state::{AppState, DraftForm, Platform, RecoveryChoice};
pub use theme::Theme;

use crate::context::AppContext;

/// Run the desktop application
pub fn run(context: AppContext) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("Prose & Pause"),
        ..Default::default()
    };

    eframe::run_native(
        "Prose & Pause",
        options,
        Box::new(move |cc| Ok(Box::new(ProsePauseApp::new(cc, context)))),
    )
}
