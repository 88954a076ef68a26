use {
    anyhow::{anyhow, Context, Result},
    std::fs,
    toml_edit::DocumentMut,
};

/// Reads the current version from the Cargo.toml at the git root, preferring
/// `package.version` and falling back to `workspace.package.version`.
pub fn get_current_version() -> Result<String> {
    let git_root = super::git::get_git_root_path()?;
    let cargo_toml = git_root.join("Cargo.toml");
    let content = fs::read_to_string(&cargo_toml)
        .with_context(|| format!("failed to read {}", cargo_toml.display()))?;
    let doc = content
        .parse::<DocumentMut>()
        .with_context(|| format!("failed to parse {}", cargo_toml.display()))?;

    let package_version = doc
        .get("package")
        .and_then(|package| package.get("version"))
        .and_then(|version| version.as_str());
    let workspace_version = doc
        .get("workspace")
        .and_then(|workspace| workspace.get("package"))
        .and_then(|package| package.get("version"))
        .and_then(|version| version.as_str());

    let Some(version) = package_version.or(workspace_version) else {
        return Err(anyhow!(
            "failed to get version from {}",
            cargo_toml.display()
        ));
    };
    Ok(version.to_string())
}
