pub mod channels;
pub mod clock;

pub use channels::{completion, poll_completion, resolved, Completion, CompletionState};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
