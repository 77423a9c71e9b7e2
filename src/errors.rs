use std::fmt;

pub type Result<T> = std::result::Result<T, DashboardError>;

/// Express whether the error seems to be the fault of the caller's input, the
/// data we were handed, the configuration, or the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorLayer {
    /// The request itself has structural issues, like a dataset with no
    /// `id`/`from_id`/`to_id` column or an incorrectly constructed pipeline.
    ///
    /// The rendering layer is expected to catch these and show an error panel
    /// instead of the visualization.  This should not be used for individual
    /// malformed rows; those are skipped and reported alongside the result.
    BadInput,
    /// The data couldn't be decoded, for example a tabular result file that is
    /// not valid JSON.
    DataLayer,
    /// The dashboard config file is malformed or names unknown fields.
    ConfigLayer,
    /// We couldn't read something from disk.
    IoLayer,
}

/// Error payload describing what went wrong.  The message is the stringified
/// version of any lower level error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardError {
    pub layer: ErrorLayer,
    pub message: String,
}

impl DashboardError {
    pub fn new(layer: ErrorLayer, message: impl Into<String>) -> Self {
        DashboardError {
            layer,
            message: message.into(),
        }
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::new(ErrorLayer::BadInput, message)
    }

    pub fn is_bad_input(&self) -> bool {
        self.layer == ErrorLayer::BadInput
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.layer, self.message)
    }
}

impl std::error::Error for DashboardError {}

// JSON parse errors are data problems.
impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> DashboardError {
        DashboardError::new(ErrorLayer::DataLayer, err.to_string())
    }
}

impl From<toml::de::Error> for DashboardError {
    fn from(err: toml::de::Error) -> DashboardError {
        DashboardError::new(ErrorLayer::ConfigLayer, err.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> DashboardError {
        DashboardError::new(ErrorLayer::IoLayer, err.to_string())
    }
}
