//! Loudness Normalizer Batch
//!
//! Ties decoding, dynamics, measurement and encoding together.
//!
//! This crate provides:
//! - [`LoudnessPipeline`]: one file in, one normalized file in the cache out
//! - [`BatchProcessor`]: the pipeline over an [`UploadSet`], in order
//! - [`save_to_disk`]: copies finished outputs next to the uploads
//! - [`PresetStore`]: named compressor/limiter presets as JSON files
//! - [`Paths`]: the cache and preset directories
//!
//! # Example
//!
//! ```rust,no_run
//! use loudnorm_audio::EncoderSettings;
//! use loudnorm_batch::{BatchProcessor, LoudnessPipeline, Paths, UploadSet};
//! use loudnorm_core::ProcessingRequest;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> loudnorm_core::Result<()> {
//! let paths = Paths::under(Path::new("/tmp/loudnorm"));
//! paths.prepare()?;
//! let pipeline = LoudnessPipeline::new(paths, EncoderSettings::default());
//!
//! let uploads = UploadSet::new(vec![PathBuf::from("/music/a.mp3")]);
//! let processor = BatchProcessor::new(&pipeline);
//! let entries = processor.survey(&uploads);
//! let done = processor.run(&entries, &uploads, &ProcessingRequest::default());
//! for entry in &done {
//!     println!("{}: {}", entry.file_name, entry.status);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

mod batch;
mod paths;
mod pipeline;
mod presets;

pub use batch::{
    save_to_disk, BatchEntry, BatchProcessor, BatchProgress, ProgressCallback, SaveReport,
    UploadSet, SAVE_FOLDER_NAME,
};
pub use paths::{Paths, PROCESSED_SUFFIX};
pub use pipeline::LoudnessPipeline;
pub use presets::{Preset, PresetStore};
