mod control;
mod device;
mod ids;
mod playback_state;
mod track;

pub use control::ControlRequest;
pub use device::Device;
pub use ids::ProviderName;
pub use playback_state::{clamp_progress, PlaybackState};
pub use track::{Album, Artist, Track};
