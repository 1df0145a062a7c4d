//! UI components
//!
//! Each component borrows the state for one frame and renders into a `Ui`.

mod audio_player;
mod editor;
mod notice_bar;
mod recorder_panel;
mod recovery_banner;

pub use audio_player::AudioPlayer;
pub use editor::{draft_status, Editor};
pub use notice_bar::NoticeBar;
pub use recorder_panel::RecorderPanel;
pub use recovery_banner::RecoveryBanner;

/// Format time in MM:SS format
pub(crate) fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
