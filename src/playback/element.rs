use crate::assets::AssetHandle;
use crate::utils::Completion;
use crate::Result;
use crossbeam_channel::Receiver;
use uuid::Uuid;

/// Callbacks a media element reports while an asset is loaded
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration became known
    LoadedMetadata { duration_secs: f64 },
    /// Playback progressed
    TimeUpdate { position_secs: f64 },
    /// Reached the end of the asset
    Ended,
    /// Playback broke down
    Error(String),
}

/// A media event and the asset it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct ElementEvent {
    pub asset_id: Uuid,
    pub event: MediaEvent,
}

impl ElementEvent {
    pub fn new(asset_id: Uuid, event: MediaEvent) -> Self {
        Self { asset_id, event }
    }
}

/// Answer to a play request; it may be rejected later (autoplay rules, device loss)
pub type PlayRequest = Completion<()>;

/// Platform audio element
pub trait MediaElement {
    /// Load an asset. The player always unloads the previous one first.
    fn load(&mut self, asset: &AssetHandle) -> Result<()>;

    /// Stop and drop the loaded source
    fn unload(&mut self);

    fn play(&mut self) -> PlayRequest;

    fn pause(&mut self);

    fn set_current_time(&mut self, position_secs: f64);

    fn set_volume(&mut self, volume: f32);

    /// Events in the order they happened
    fn events(&self) -> &Receiver<ElementEvent>;

    /// Give the element a chance to emit progress; called every frame
    fn tick(&mut self) {}
}
