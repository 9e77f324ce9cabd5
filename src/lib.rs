pub mod error;
pub mod loader;
pub mod sink;
pub mod synth;
pub mod trace;

pub use error::Error;
pub use loader::MmlSource;
pub use synth::SynthEngine;
