use {
    anyhow::{anyhow, Result},
    std::{path::PathBuf, process::Command},
};

pub fn get_git_root_path() -> Result<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| anyhow!("failed to get git root path, error: {e}"))?;
    let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(PathBuf::from(root))
}

/// Returns the currently checked-out branch, taken from the `* `-marked line
/// of `git branch`.
pub fn get_current_branch() -> Result<String> {
    let output = Command::new("git")
        .args(["branch"])
        .output()
        .map_err(|e| anyhow!("failed to list branches, error: {e}"))?;
    if !output.status.success() {
        return Err(anyhow!(
            "`git branch` failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("* "))
        .map(|branch| branch.trim().to_string())
        .ok_or_else(|| anyhow!("no branch is currently checked out"))
}
