use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type TableResult<T> = Result<T, TableError>;

pub const MISSING_INPUT_TABLE: &str = "IO.MISSING_INPUT_TABLE";
pub const MALFORMED_INPUT_TABLE: &str = "INPUT.MALFORMED_TABLE";
pub const REFERENCE_PERMISSION: &str = "IO.REFERENCE_PERMISSION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableErrorCategory {
    Success,
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl TableErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableError {
    category: TableErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl TableError {
    pub fn new(
        category: TableErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            TableErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(TableErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(TableErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(TableErrorCategory::InternalError, placeholder, message)
    }

    /// A required raw table is absent or unreadable.
    pub fn missing_input_table(path: &Path, detail: impl Display) -> Self {
        Self::io_system(
            MISSING_INPUT_TABLE,
            format!("failed to read input table '{}': {}", path.display(), detail),
        )
    }

    /// A raw table exists but its header or numeric body cannot be used.
    pub fn malformed_input_table(path: &Path, detail: impl Display) -> Self {
        Self::input_validation(
            MALFORMED_INPUT_TABLE,
            format!("malformed input table '{}': {}", path.display(), detail),
        )
    }

    /// The bundled calibration asset cannot be accessed. Fatal for the whole run.
    pub fn reference_permission(path: &Path, detail: impl Display) -> Self {
        Self::io_system(
            REFERENCE_PERMISSION,
            format!(
                "insufficient permissions to read reference data '{}' (run with elevated rights): {}",
                path.display(),
                detail
            ),
        )
    }

    pub const fn category(&self) -> TableErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn aborts_run(&self) -> bool {
        self.placeholder == REFERENCE_PERMISSION
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for TableError {}
