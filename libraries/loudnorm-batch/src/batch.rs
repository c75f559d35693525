//! Batch processing over a set of uploaded files

use crate::paths::{claim_unique, PROCESSED_SUFFIX};
use crate::pipeline::LoudnessPipeline;
use loudnorm_core::{
    NormalizerError, ProcessingRequest, ProcessingResult, ProcessingStatus, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the folder processed files are saved into, next to the uploads
pub const SAVE_FOLDER_NAME: &str = "Normalized Loudness";

/// The files handed in for processing, in upload order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSet {
    files: Vec<PathBuf>,
}

impl UploadSet {
    /// Create an upload set
    pub fn new(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: files.into_iter().collect(),
        }
    }

    /// Uploaded paths in order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Number of uploads
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing was uploaded
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find an upload by file name
    ///
    /// Comparison ignores case and surrounding whitespace.
    ///
    /// # Errors
    /// `FileNotFound` when no upload has that name
    pub fn find(&self, name: &str) -> Result<&Path> {
        let wanted = name.trim().to_lowercase();
        self.files
            .iter()
            .find(|path| file_name(path).trim().to_lowercase() == wanted)
            .map(PathBuf::as_path)
            .ok_or_else(|| NormalizerError::file_not_found(name.trim()))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One row of the batch table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// File name of the upload
    pub file_name: String,
    /// Full path of the upload; rows without one are resolved by name
    pub source_path: Option<PathBuf>,
    /// Current status
    pub status: ProcessingStatus,
    /// Loudness of the upload before processing
    pub original_loudness_lufs: Option<f64>,
    /// Loudness of the processed output
    pub processed_loudness_lufs: Option<f64>,
    /// Processed file in the cache
    pub output_path: Option<PathBuf>,
    /// Why the original loudness is missing, if it is
    pub measurement_error: Option<String>,
}

impl BatchEntry {
    /// A row waiting to be processed
    pub fn waiting(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            source_path: None,
            status: ProcessingStatus::Waiting,
            original_loudness_lufs: None,
            processed_loudness_lufs: None,
            output_path: None,
            measurement_error: None,
        }
    }

    /// A waiting row bound to one uploaded path
    pub fn for_upload(path: &Path) -> Self {
        Self {
            source_path: Some(path.to_path_buf()),
            ..Self::waiting(file_name(path))
        }
    }

    /// Fold a pipeline result into this row
    ///
    /// The survey figure is kept when the run could not measure the original.
    fn apply(&mut self, result: ProcessingResult) {
        self.status = result.status;
        if result.original_loudness_lufs.is_some() {
            self.original_loudness_lufs = result.original_loudness_lufs;
        }
        self.processed_loudness_lufs = result.processed_loudness_lufs;
        self.output_path = result.output_path;
    }
}

/// Progress of a running batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchProgress {
    /// Files in the batch
    pub total: usize,
    /// Files finished so far
    pub processed: usize,
    /// Files that ended `Completed`
    pub completed: usize,
    /// Files that ended `Failed`
    pub failed: usize,
    /// File that just finished
    pub current_file: Option<String>,
}

/// Callback for batch progress updates
pub type ProgressCallback = Box<dyn Fn(&BatchProgress) + Send + Sync>;

/// Runs the pipeline over every upload, in order
pub struct BatchProcessor<'a> {
    pipeline: &'a LoudnessPipeline,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> BatchProcessor<'a> {
    /// Create a batch processor
    pub fn new(pipeline: &'a LoudnessPipeline) -> Self {
        Self {
            pipeline,
            progress_callback: None,
        }
    }

    /// Set progress callback, called once per finished file
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Measure every upload and list it as waiting
    pub fn survey(&self, uploads: &UploadSet) -> Vec<BatchEntry> {
        uploads
            .files()
            .iter()
            .map(|path| {
                let mut entry = BatchEntry::for_upload(path);
                match self.pipeline.measure_file(path) {
                    Ok(lufs) => entry.original_loudness_lufs = Some(lufs),
                    Err(e) => {
                        tracing::warn!(file = %entry.file_name, "could not measure upload: {}", e);
                        entry.measurement_error = Some(e.to_string());
                    }
                }
                entry
            })
            .collect()
    }

    /// Process every entry, returning one updated entry per input
    ///
    /// Entries carry their upload path from [`BatchProcessor::survey`];
    /// entries without one are looked up in `uploads` by name. Two uploads
    /// whose outputs would share a cache name get distinct files. A failing
    /// file is marked `Failed` and the batch carries on.
    pub fn run(
        &self,
        entries: &[BatchEntry],
        uploads: &UploadSet,
        request: &ProcessingRequest,
    ) -> Vec<BatchEntry> {
        tracing::info!(
            files = entries.len(),
            target = %request.target,
            format = %request.output_format,
            "starting batch"
        );

        let mut progress = BatchProgress {
            total: entries.len(),
            ..BatchProgress::default()
        };

        let mut claimed = HashSet::new();

        let updated: Vec<BatchEntry> = entries
            .iter()
            .map(|entry| {
                let mut entry = entry.clone();
                let source = match &entry.source_path {
                    Some(path) => Ok(path.as_path()),
                    None => uploads.find(&entry.file_name),
                };
                let result = match source {
                    Ok(path) => {
                        let output = claim_unique(
                            self.pipeline
                                .paths()
                                .cache_output_path(path, request.output_format),
                            &mut claimed,
                        );
                        self.pipeline.process_to(path, request, &output)
                    }
                    Err(e) => {
                        tracing::warn!(file = %entry.file_name, "{}", e);
                        ProcessingResult::failed(e.to_string(), None)
                    }
                };
                entry.apply(result);

                progress.processed += 1;
                if entry.status.is_completed() {
                    progress.completed += 1;
                } else {
                    progress.failed += 1;
                }
                progress.current_file = Some(entry.file_name.clone());
                if let Some(callback) = &self.progress_callback {
                    callback(&progress);
                }

                entry
            })
            .collect();

        tracing::info!(
            completed = progress.completed,
            failed = progress.failed,
            "batch finished"
        );
        updated
    }

    /// Process every upload without a prior survey
    pub fn run_uploads(&self, uploads: &UploadSet, request: &ProcessingRequest) -> Vec<BatchEntry> {
        let entries: Vec<BatchEntry> = uploads
            .files()
            .iter()
            .map(|path| BatchEntry::for_upload(path))
            .collect();
        self.run(&entries, uploads, request)
    }
}

/// Outcome of saving processed files to disk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Folder the files were copied into
    pub output_dir: PathBuf,
    /// Copied files
    pub saved: Vec<PathBuf>,
    /// Files that could not be copied, with the reason
    pub failed: Vec<(String, String)>,
    /// Entries without a completed output
    pub skipped: Vec<String>,
}

impl SaveReport {
    /// True when at least one file was saved
    pub fn has_saved(&self) -> bool {
        !self.saved.is_empty()
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_saved() {
            write!(f, "Processed files saved to: {}", self.output_dir.display())
        } else {
            f.write_str("No processed files available to save.")
        }
    }
}

/// Copy every completed output next to the uploads
///
/// Files go to `<folder of first upload>/Normalized Loudness/` as
/// `<upload stem>_processed.<output ext>`, replacing copies from earlier
/// saves. Entries of this call that map to the same name get a counter.
///
/// # Errors
/// `Validation` when there are no uploads; `Io` when the folder cannot be
/// created. Per-file copy failures are collected in the report instead.
pub fn save_to_disk(entries: &[BatchEntry], uploads: &UploadSet) -> Result<SaveReport> {
    let first = uploads.files().first().ok_or_else(|| {
        NormalizerError::validation("no files uploaded, unable to determine save path")
    })?;

    let upload_dir = first.parent().unwrap_or_else(|| Path::new("."));
    let output_dir = upload_dir.join(SAVE_FOLDER_NAME);
    fs::create_dir_all(&output_dir)?;

    let mut report = SaveReport {
        output_dir,
        ..SaveReport::default()
    };
    let mut claimed = HashSet::new();

    for entry in entries {
        let source = match (&entry.status, &entry.output_path) {
            (ProcessingStatus::Completed, Some(path)) => path,
            _ => {
                tracing::debug!(file = %entry.file_name, "not processed, skipping save");
                report.skipped.push(entry.file_name.clone());
                continue;
            }
        };

        let stem = Path::new(&entry.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.file_name.clone());
        let extension = source
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let destination = claim_unique(
            report
                .output_dir
                .join(format!("{stem}{PROCESSED_SUFFIX}{extension}")),
            &mut claimed,
        );

        match fs::copy(source, &destination) {
            Ok(_) => {
                tracing::info!(file = %entry.file_name, destination = %destination.display(), "saved");
                report.saved.push(destination);
            }
            Err(e) => {
                tracing::warn!(file = %entry.file_name, "failed to save: {}", e);
                report.failed.push((entry.file_name.clone(), e.to_string()));
            }
        }
    }

    Ok(report)
}
