//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(e.into())
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::from(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use crate::exitcode;
        match self {
            CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::Domain(
                    DomainError::NodeNotFound(_) | DomainError::EdgeNotFound { .. },
                ) => exitcode::NOINPUT,
                ApplicationError::Domain(_) => exitcode::DATAERR,
                ApplicationError::CorruptDocument { .. } => exitcode::DATAERR,
                ApplicationError::Storage { .. } => exitcode::IOERR,
                ApplicationError::Export { .. } => exitcode::SOFTWARE,
                ApplicationError::Config { .. } => exitcode::CONFIG,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeId, ValidationError};

    #[test]
    fn given_domain_errors_when_mapping_exit_code_then_distinguishes_missing_from_invalid() {
        let missing: CliError = DomainError::NodeNotFound(NodeId::from("x")).into();
        let invalid: CliError = DomainError::from(ValidationError::EmptyName).into();

        assert_eq!(missing.exit_code(), crate::exitcode::NOINPUT);
        assert_eq!(invalid.exit_code(), crate::exitcode::DATAERR);
    }
}
