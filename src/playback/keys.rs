/// Keyboard shortcuts understood by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKey {
    /// Toggle play/pause
    Space,
    /// Step back
    ArrowLeft,
    /// Step forward
    ArrowRight,
}

impl TransportKey {
    /// Map an egui key to a transport shortcut
    pub fn from_egui(key: egui::Key) -> Option<Self> {
        match key {
            egui::Key::Space => Some(TransportKey::Space),
            egui::Key::ArrowLeft => Some(TransportKey::ArrowLeft),
            egui::Key::ArrowRight => Some(TransportKey::ArrowRight),
            _ => None,
        }
    }
}
