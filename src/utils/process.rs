use {
    anyhow::{anyhow, Context, Result},
    std::{fmt, process::Command},
};

/// One external command in a release plan.
///
/// The program and its arguments are kept as an argument vector and passed to
/// the OS directly, so version and branch strings embedded in a step are
/// never re-interpreted by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    program: String,
    args: Vec<String>,
}

impl Step {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn git(args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new("git", args)
    }

    pub fn cargo(args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new("cargo", args)
    }

    /// Runs the step to completion, forwarding its captured output to stdout
    /// (stderr lines prefixed with `stderr: `). A non-zero exit status is an
    /// error naming the step and the code.
    pub fn run(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("failed to spawn `{self}`"))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.is_empty() {
            print!("{stdout}");
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            println!("stderr: {line}");
        }

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "<signal>".to_string(), |code| code.to_string());
            return Err(anyhow!("`{self}` exited with code {code}"));
        }

        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}
