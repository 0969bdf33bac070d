use thiserror::Error;

/// Exit status for any failure without a reserved code.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status reserved for the `--outdir` without `--gen` rule.
pub const EXIT_CONFIGURATION: i32 = 3;

/// Options that parse individually but are invalid in combination. Raised
/// before any file is opened.
#[derive(Debug, Error)]
#[error("can only use --outdir with --gen")]
pub struct ConfigurationError;

#[derive(Debug, Error)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct SemanticError(pub String);

/// Maps a failure to the process exit status. Usage errors never reach here
/// (clap reports those itself and exits 2).
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.is::<ConfigurationError>() {
        EXIT_CONFIGURATION
    } else {
        EXIT_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_gets_the_reserved_code() {
        let err = anyhow::Error::from(ConfigurationError);
        assert_eq!(exit_code(&err), EXIT_CONFIGURATION);
    }

    #[test]
    fn other_failures_exit_one() {
        let err = anyhow::Error::from(SemanticError("unresolved".into()));
        assert_eq!(exit_code(&err), EXIT_FAILURE);
        assert_eq!(exit_code(&anyhow::anyhow!("io trouble")), EXIT_FAILURE);
    }

    #[test]
    fn syntax_error_reports_position() {
        let err = SyntaxError {
            line: 3,
            column: 7,
            message: "expected ::=".into(),
        };
        assert_eq!(err.to_string(), "syntax error at line 3, column 7: expected ::=");
    }
}
