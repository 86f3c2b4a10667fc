//! Named alarm sounds and their on-disk catalog.

mod registry;
mod store;

pub use registry::{SoundEntry, SoundRegistry, SUPPORTED_EXTENSIONS};
pub use store::SoundStore;
