mod audio;
mod params;
mod result;

pub use audio::{AudioBuffer, AudioFormat, SampleRate};
pub use params::{CompressorParams, OutputFormat, ProcessingRequest, TargetLoudness};
pub use result::{ProcessingResult, ProcessingStatus};
