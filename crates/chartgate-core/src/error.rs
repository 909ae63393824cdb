#![forbid(unsafe_code)]

//! Error taxonomy for the chart lifecycle.
//!
//! | Error | Class | Behavior |
//! |-------|-------|----------|
//! | [`LifecycleError::LibraryUnavailable`] | terminal | panels show a static fallback |
//! | [`LifecycleError::DomNotReady`] | transient | bounded retry, then silent skip |
//! | [`LifecycleError::ConstructionFailure`] | transient | logged, controller stays retryable |
//! | [`LifecycleError::StaleHandleDestroy`] | ignorable | logged at debug level |
//!
//! None of these ever propagate past the controller that hit them.

use core::fmt;

/// Failures observed by a lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The rendering library never became available within the poll cap.
    LibraryUnavailable { attempts: u32 },
    /// The canvas was not in the document after the bounded frame retries.
    DomNotReady { canvas_id: String, frames: u32 },
    /// The spec was rejected or the library threw while building a handle.
    ConstructionFailure { canvas_id: String, reason: String },
    /// A handle was released after its node had already left the document.
    StaleHandleDestroy { canvas_id: String },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryUnavailable { attempts } => {
                write!(f, "rendering library unavailable after {attempts} poll attempts")
            }
            Self::DomNotReady { canvas_id, frames } => {
                write!(f, "canvas `{canvas_id}` not found after {frames} frames")
            }
            Self::ConstructionFailure { canvas_id, reason } => {
                write!(f, "failed to construct chart on `{canvas_id}`: {reason}")
            }
            Self::StaleHandleDestroy { canvas_id } => {
                write!(f, "released handle for detached canvas `{canvas_id}`")
            }
        }
    }
}

impl std::error::Error for LifecycleError {}

/// Errors raised across the rendering library boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// The global constructor is not present.
    NotLoaded,
    /// The canvas has no usable 2d context.
    NoContext(String),
    /// The library threw while constructing an instance.
    Construct(String),
    /// The library threw while destroying an instance.
    Destroy(String),
    /// The handle was already destroyed.
    AlreadyDestroyed,
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "rendering library not loaded"),
            Self::NoContext(id) => write!(f, "canvas `{id}` has no 2d context"),
            Self::Construct(msg) => write!(f, "construct failed: {msg}"),
            Self::Destroy(msg) => write!(f, "destroy failed: {msg}"),
            Self::AlreadyDestroyed => write!(f, "handle already destroyed"),
        }
    }
}

impl std::error::Error for LibraryError {}

/// Rejections from [`ChartSpec::validate`](crate::chart_spec::ChartSpec::validate).
#[derive(Debug, Clone, PartialEq)]
pub enum SpecError {
    /// The spec has no datasets.
    NoDatasets,
    /// A dataset's value count differs from the label count.
    LengthMismatch {
        dataset: String,
        expected: usize,
        actual: usize,
    },
    /// A per-point colour list differs from the value count.
    ColorCountMismatch {
        dataset: String,
        expected: usize,
        actual: usize,
    },
    /// A dataset contains NaN or an infinity.
    NonFiniteValue { dataset: String, index: usize },
    /// A dataset refers to an axis id that has no scale.
    UnknownAxis { dataset: String, axis: String },
    /// Point data was given to a label-indexed chart kind, or the reverse.
    DataShape { dataset: String },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDatasets => write!(f, "chart has no datasets"),
            Self::LengthMismatch {
                dataset,
                expected,
                actual,
            } => write!(
                f,
                "dataset `{dataset}` has {actual} values for {expected} labels"
            ),
            Self::ColorCountMismatch {
                dataset,
                expected,
                actual,
            } => write!(
                f,
                "dataset `{dataset}` has {actual} colours for {expected} values"
            ),
            Self::NonFiniteValue { dataset, index } => {
                write!(f, "dataset `{dataset}` has a non-finite value at {index}")
            }
            Self::UnknownAxis { dataset, axis } => {
                write!(f, "dataset `{dataset}` references unknown axis `{axis}`")
            }
            Self::DataShape { dataset } => {
                write!(f, "dataset `{dataset}` data shape does not fit the chart kind")
            }
        }
    }
}

impl std::error::Error for SpecError {}

/// Invalid configuration input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric value was zero or otherwise out of range.
    OutOfRange { field: &'static str, value: u64 },
    /// An environment variable was not a number.
    InvalidEnv { var: &'static str, value: String },
    /// JSON configuration failed to parse.
    Json(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
            Self::InvalidEnv { var, value } => write!(f, "invalid value for {var}: {value:?}"),
            Self::Json(msg) => write!(f, "invalid config json: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_errors_render_canvas_ids() {
        let err = LifecycleError::DomNotReady {
            canvas_id: "coverageChart".into(),
            frames: 30,
        };
        assert_eq!(err.to_string(), "canvas `coverageChart` not found after 30 frames");
    }

    #[test]
    fn spec_length_mismatch_names_dataset() {
        let err = SpecError::LengthMismatch {
            dataset: "Municípios".into(),
            expected: 12,
            actual: 11,
        };
        assert!(err.to_string().contains("11 values for 12 labels"));
    }
}
