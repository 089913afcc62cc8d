use thiserror::Error;

/// Errors raised by the course format core.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The storage layer failed; the surrounding transaction is rolled back.
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("course not found: {0}")]
    CourseNotFound(i64),

    #[error("section {section} not found in course {course_id}")]
    SectionNotFound { course_id: i64, section: i64 },

    /// A value could not be coerced to the option's parameter type.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl FormatError {
    /// Stable IPC error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            FormatError::Storage(_) => "db_query_failed",
            FormatError::CourseNotFound(_) | FormatError::SectionNotFound { .. } => "not_found",
            FormatError::InvalidValue { .. } => "bad_params",
        }
    }
}

pub type FormatResult<T> = Result<T, FormatError>;
