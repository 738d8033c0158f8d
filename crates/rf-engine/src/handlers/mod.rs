//! One handler per operation type.

mod bleep;
mod concat;
mod overlay;
mod pitch;
mod preview;
mod random_chop;
mod stutter;

pub use bleep::BleepHandler;
pub use concat::ConcatHandler;
pub use overlay::OverlayHandler;
pub use pitch::PitchHandler;
pub use preview::PreviewHandler;
pub use random_chop::RandomChopHandler;
pub use stutter::StutterHandler;
