use std::process::ExitCode;

/// Exit status for CLI commands.
///
/// - `Success` (0): Command completed, no error-severity issues
/// - `Failure` (1): Command completed but reported error-severity issues
/// - `Error` (2): Command failed due to internal error (config error, I/O, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    pub fn from_error_count(error_count: usize) -> Self {
        if error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_values() {
        assert_eq!(ExitCode::from(ExitStatus::Success), ExitCode::from(0));
        assert_eq!(ExitCode::from(ExitStatus::Failure), ExitCode::from(1));
        assert_eq!(ExitCode::from(ExitStatus::Error), ExitCode::from(2));
    }

    #[test]
    fn from_error_count() {
        assert_eq!(ExitStatus::from_error_count(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from_error_count(3), ExitStatus::Failure);
    }
}
