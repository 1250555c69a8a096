//! Sound emission and propagation to zombie hearing

pub mod kinds;
pub mod propagation;

pub use kinds::SoundKind;
pub use propagation::{SoundEvent, SoundListener, SoundPropagation};
