use thiserror::Error;

/// Errors raised by the IO and configuration surfaces.
///
/// The slot-search engine itself never fails: malformed dates, hours or
/// missing rule fields make predicates return false instead.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing column `{column}` in {source_name} header")]
    MissingColumn { column: String, source_name: String },

    #[error("invalid configuration value for {key}: {message}")]
    Config { key: String, message: String },
}

/// Invalid moves in the slot-selection state machine.
///
/// The web layer answers these directly with a 409 or 400 status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {action} while the selection is {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("candidate index {index} out of range ({available} candidates)")]
    SelectionOutOfRange { index: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, TimetableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_errors_read_as_sentences() {
        let err = WorkflowError::InvalidTransition {
            action: "pick a slot",
            state: "closed".to_string(),
        };
        assert_eq!(err.to_string(), "cannot pick a slot while the selection is closed");

        let err = WorkflowError::SelectionOutOfRange { index: 7, available: 3 };
        assert_eq!(err.to_string(), "candidate index 7 out of range (3 candidates)");
    }

    #[test]
    fn io_errors_convert() {
        let err: TimetableError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, TimetableError::Io(_)));
        assert_eq!(err.to_string(), "I/O error: gone");
    }
}
