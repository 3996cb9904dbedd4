//! Built-in go subcommand adapters.
//!
//! Each adapter is just the subcommand name, its fixed flags, and
//! whether captured stdout should be printed even in quiet mode. The
//! per-command business logic stays inside the go tool itself.

/// A go subcommand to drive through the supervisor.
#[derive(Debug, Clone)]
pub struct GoCommand {
    /// Subcommand name passed as the first argument.
    pub name: String,
    /// Flags inserted right after the subcommand name.
    pub flags: Vec<String>,
    /// Arguments appended after the caller's tail arguments, at the
    /// very end of the command line.
    pub extra_tail_args: Vec<String>,
    /// Print captured stdout even when verbose logging is off.
    pub enforce_output: bool,
}

impl GoCommand {
    /// Arbitrary subcommand with the given flags.
    #[must_use]
    pub fn new(name: impl Into<String>, flags: Vec<String>) -> Self {
        Self {
            name: name.into(),
            flags,
            extra_tail_args: Vec::new(),
            enforce_output: false,
        }
    }

    /// Append arguments after the caller's tail arguments.
    #[must_use]
    pub fn with_extra_tail_args(mut self, args: Vec<String>) -> Self {
        self.extra_tail_args = args;
        self
    }

    /// `go install`
    #[must_use]
    pub fn install() -> Self {
        Self {
            enforce_output: true,
            ..Self::new("install", Vec::new())
        }
    }

    /// `go build`
    #[must_use]
    pub fn build() -> Self {
        Self::new("build", Vec::new())
    }

    /// `go test`
    #[must_use]
    pub fn test() -> Self {
        Self {
            enforce_output: true,
            ..Self::new("test", Vec::new())
        }
    }

    /// `go clean`
    #[must_use]
    pub fn clean() -> Self {
        Self::new("clean", Vec::new())
    }

    /// `go fmt`
    #[must_use]
    pub fn fmt() -> Self {
        Self::new("fmt", Vec::new())
    }

    /// `go vet`
    #[must_use]
    pub fn vet() -> Self {
        Self::new("vet", Vec::new())
    }

    /// `go get`
    #[must_use]
    pub fn get() -> Self {
        Self::new("get", Vec::new())
    }

    /// `go generate`
    #[must_use]
    pub fn generate() -> Self {
        Self::new("generate", Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_test_enforce_output() {
        assert!(GoCommand::install().enforce_output);
        assert!(GoCommand::test().enforce_output);
        assert!(!GoCommand::build().enforce_output);
        assert!(!GoCommand::clean().enforce_output);
    }

    #[test]
    fn custom_command_keeps_its_flags() {
        let cmd = GoCommand::new("tool", vec!["cover".to_string()]);
        assert_eq!(cmd.name, "tool");
        assert_eq!(cmd.flags, vec!["cover".to_string()]);
        assert!(cmd.extra_tail_args.is_empty());
        assert!(!cmd.enforce_output);
    }

    #[test]
    fn extra_tail_args_can_be_attached() {
        let cmd = GoCommand::build().with_extra_tail_args(vec!["./...".to_string()]);
        assert_eq!(cmd.extra_tail_args, vec!["./...".to_string()]);
    }
}
