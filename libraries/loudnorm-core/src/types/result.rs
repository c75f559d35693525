/// Per-file processing outcome
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Status of one file in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingStatus {
    /// Uploaded but not yet processed
    Waiting,
    /// Processed and written to the cache
    Completed,
    /// Processing failed; the reason is shown to the user
    Failed(String),
}

impl ProcessingStatus {
    /// True for `Completed`
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => f.write_str("Waiting to process"),
            Self::Completed => f.write_str("Completed"),
            Self::Failed(reason) => write!(f, "Processing failed: {reason}"),
        }
    }
}

/// Result of running the pipeline on one input file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Final status
    pub status: ProcessingStatus,
    /// Integrated loudness of the decoded input, before compression
    pub original_loudness_lufs: Option<f64>,
    /// Integrated loudness of the written output, re-decoded from disk
    pub processed_loudness_lufs: Option<f64>,
    /// Location of the written output
    pub output_path: Option<PathBuf>,
}

impl ProcessingResult {
    /// A successful run
    pub fn completed(
        original_loudness_lufs: Option<f64>,
        processed_loudness_lufs: Option<f64>,
        output_path: PathBuf,
    ) -> Self {
        Self {
            status: ProcessingStatus::Completed,
            original_loudness_lufs,
            processed_loudness_lufs,
            output_path: Some(output_path),
        }
    }

    /// A failed run
    pub fn failed(reason: impl Into<String>, original_loudness_lufs: Option<f64>) -> Self {
        Self {
            status: ProcessingStatus::Failed(reason.into()),
            original_loudness_lufs,
            processed_loudness_lufs: None,
            output_path: None,
        }
    }

    /// True when the output was written
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings() {
        assert_eq!(ProcessingStatus::Waiting.to_string(), "Waiting to process");
        assert_eq!(ProcessingStatus::Completed.to_string(), "Completed");
        assert_eq!(
            ProcessingStatus::Failed("bad header".into()).to_string(),
            "Processing failed: bad header"
        );
    }

    #[test]
    fn failed_result_has_no_output() {
        let result = ProcessingResult::failed("boom", Some(-20.0));
        assert!(!result.is_completed());
        assert_eq!(result.output_path, None);
        assert_eq!(result.processed_loudness_lufs, None);
        assert_eq!(result.original_loudness_lufs, Some(-20.0));
    }
}
