//! Audio playback
//!
//! [`Player`] owns the transport state for one loaded asset and turns
//! callbacks from a [`MediaElement`] into explicit transitions:
//! `Empty → Paused ⇄ Playing → Empty`.

#[cfg(feature = "audio-io")]
pub mod cpal_element;
pub mod element;
pub mod keys;
pub mod player;
pub mod timeline;

#[cfg(feature = "audio-io")]
pub use cpal_element::CpalElement;
pub use element::{ElementEvent, MediaElement, MediaEvent, PlayRequest};
pub use keys::TransportKey;
pub use player::{PlaybackState, Player, Transport};
pub use timeline::TimelineElement;
