use thiserror::Error;

/// All errors produced by the Township Dashboard.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The bulk read of the external table failed.
    #[error("Failed to load {source_name}: {reason}")]
    Load { source_name: String, reason: String },

    /// The bulk overwrite of the external table failed.
    #[error("Failed to persist to {source_name}: {reason}")]
    Persist { source_name: String, reason: String },

    /// The source cannot be written to.
    #[error("Source is read-only: {0}")]
    ReadOnlySource(String),

    /// The source was modified by someone else since it was last loaded.
    #[error("Source {source_name} changed since it was loaded (expected version {expected}, found {found})")]
    SourceChanged {
        source_name: String,
        expected: String,
        found: String,
    },

    /// An edit targeted a field outside the editable allow-list.
    #[error("Field is not editable: {0}")]
    UneditableField(String),

    /// The submitted value kind does not match the field's column type.
    #[error("Field {field} expects a {expected} value, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// User input could not be parsed for the target field.
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue { field: String, value: String },

    /// No record matches the `(township, plot_no)` key.
    #[error("No plot {plot_no} in township {township}")]
    PlotNotFound { township: String, plot_no: String },

    /// More than one record matches the key and the policy forbids it.
    #[error("{count} plots share plot number {plot_no} in township {township}")]
    DuplicatePlots {
        township: String,
        plot_no: String,
        count: usize,
    },

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DashboardError {
    /// `true` for errors raised while validating an edit, before any mutation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DashboardError::UneditableField(_)
                | DashboardError::TypeMismatch { .. }
                | DashboardError::InvalidValue { .. }
                | DashboardError::PlotNotFound { .. }
                | DashboardError::DuplicatePlots { .. }
        )
    }

    /// `true` for errors raised by the bulk write to the source.
    pub fn is_persist_failure(&self) -> bool {
        matches!(
            self,
            DashboardError::Persist { .. }
                | DashboardError::ReadOnlySource(_)
                | DashboardError::SourceChanged { .. }
        )
    }
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_load() {
        let err = DashboardError::Load {
            source_name: "plots.csv".to_string(),
            reason: "no such file".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to load plots.csv: no such file");
    }

    #[test]
    fn test_error_display_source_changed() {
        let err = DashboardError::SourceChanged {
            source_name: "plots.csv".to_string(),
            expected: "abc".to_string(),
            found: "def".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("changed since it was loaded"));
        assert!(msg.contains("abc"));
        assert!(msg.contains("def"));
    }

    #[test]
    fn test_error_display_uneditable_field() {
        let err = DashboardError::UneditableField("township_name".to_string());
        assert_eq!(err.to_string(), "Field is not editable: township_name");
    }

    #[test]
    fn test_error_display_type_mismatch() {
        let err = DashboardError::TypeMismatch {
            field: "rate".to_string(),
            expected: "numeric".to_string(),
            actual: "text".to_string(),
        };
        assert_eq!(err.to_string(), "Field rate expects a numeric value, got text");
    }

    #[test]
    fn test_error_display_duplicate_plots() {
        let err = DashboardError::DuplicatePlots {
            township: "Alpha".to_string(),
            plot_no: "A-12".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "2 plots share plot number A-12 in township Alpha"
        );
    }

    #[test]
    fn test_validation_classification() {
        assert!(DashboardError::UneditableField("x".into()).is_validation());
        assert!(DashboardError::PlotNotFound {
            township: "Alpha".into(),
            plot_no: "1".into()
        }
        .is_validation());
        assert!(!DashboardError::ReadOnlySource("x".into()).is_validation());
    }

    #[test]
    fn test_persist_classification() {
        assert!(DashboardError::ReadOnlySource("sheet".into()).is_persist_failure());
        assert!(DashboardError::Persist {
            source_name: "sheet".into(),
            reason: "timeout".into()
        }
        .is_persist_failure());
        assert!(!DashboardError::Config("bad".into()).is_persist_failure());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DashboardError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
