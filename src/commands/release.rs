use {
    crate::utils::process::Step,
    anyhow::{anyhow, Context, Result},
    clap::{Args, ValueEnum},
    log::info,
    semver::Version,
};

#[derive(Args)]
pub struct CommandArgs {
    #[arg(value_enum, default_value = "patch")]
    pub level: ReleaseLevel,

    #[arg(long, help = "Print the command plan without executing it")]
    pub output_only: bool,

    #[arg(
        long,
        default_value = "origin",
        help = "Remote the release tag and branches are pushed to"
    )]
    pub remote: String,

    #[arg(
        long,
        default_value = "master",
        help = "Trunk branch that major releases are cut from"
    )]
    pub trunk: String,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum ReleaseLevel {
    #[value(help = "Release x.y.z from the trunk branch, then work on x+1.0.0")]
    Major,
    #[value(help = "Release x.y+1.0 from a major line branch, then work on x.y+1.1")]
    Minor,
    #[value(help = "Release x.y.z from a major line branch, then work on x.y.z+1")]
    Patch,
}

/// The full plan for one release: the version strings involved and the
/// ordered commands that perform it.
#[derive(Debug)]
pub struct ReleasePlan {
    pub release: String,
    pub working_on: String,
    pub release_branch: String,
    pub target_branch: String,
    pub major_line: Option<String>,
    pub steps: Vec<Step>,
}

pub fn run(args: CommandArgs) -> Result<()> {
    let current_version_str = crate::utils::cargo::get_current_version()
        .context("failed to get the current version")?;
    let current_version = Version::parse(&current_version_str)
        .with_context(|| format!("invalid version \"{current_version_str}\" in Cargo.toml"))?;

    let branch =
        crate::utils::git::get_current_branch().context("failed to get the current branch")?;

    let plan = plan_release(&args.level, &current_version, &branch, &args.trunk, &args.remote)?;

    if args.output_only {
        for step in &plan.steps {
            println!("{step}");
        }
        return Ok(());
    }

    info!("building release {} from {branch}", plan.release);
    execute(&plan.steps)?;
    info!(
        "release {} complete, now working on {}",
        plan.release, plan.working_on
    );

    Ok(())
}

/// Returns true for "major line" branches, the long-lived `vN.x` branch each
/// major version is maintained on.
pub fn is_major_line(branch: &str) -> bool {
    branch
        .strip_prefix('v')
        .and_then(|rest| rest.strip_suffix(".x"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

/// Checks that `level` may be cut from `branch`: major releases only from the
/// trunk branch, minor and patch releases only from a major line branch.
pub fn validate_branch(level: &ReleaseLevel, branch: &str, trunk: &str) -> Result<()> {
    match level {
        ReleaseLevel::Major if branch != trunk => Err(anyhow!(
            "major releases must be cut from {trunk}, not {branch}"
        )),
        ReleaseLevel::Minor if !is_major_line(branch) => Err(anyhow!(
            "minor releases must be cut from a major line branch (vN.x), not {branch}"
        )),
        ReleaseLevel::Patch if !is_major_line(branch) => Err(anyhow!(
            "patch releases must be cut from a major line branch (vN.x), not {branch}"
        )),
        _ => Ok(()),
    }
}

/// Builds the release plan for `level` given the current version and branch.
///
/// Validates the branch first; a plan is only returned when the release may
/// actually be cut from `branch`.
pub fn plan_release(
    level: &ReleaseLevel,
    current: &Version,
    branch: &str,
    trunk: &str,
    remote: &str,
) -> Result<ReleasePlan> {
    validate_branch(level, branch, trunk)?;

    let plan = match level {
        ReleaseLevel::Major => {
            // A major release tags the version already on trunk and opens a
            // new vN.x line for it; development on trunk moves to the next
            // major.
            let release = format!("v{current}");
            let working_on = format!("v{}.0.0", current.major.saturating_add(1));
            let line = format!("v{}.x", current.major);
            let release_branch = format!("release-{release}");
            let release_msg = format!("release {release}");
            let working_msg = format!("working on {working_on}");

            let steps = vec![
                Step::git(["checkout", "-b", release_branch.as_str()]),
                Step::new("git-cliff", ["--tag", release.as_str(), "-o", "CHANGELOG.md"]),
                Step::cargo(["fetch"]),
                Step::git(["commit", "-a", "-m", release_msg.as_str()]),
                Step::git(["checkout", trunk]),
                Step::git(["merge", release_branch.as_str()]),
                Step::git(["tag", release.as_str()]),
                Step::git(["branch", line.as_str()]),
                Step::git(["push", remote, release.as_str(), line.as_str()]),
                Step::cargo(["publish"]),
                Step::cargo(["set-version", "--bump", "major"]),
                Step::git(["commit", "-a", "-m", working_msg.as_str()]),
            ];

            ReleasePlan {
                release,
                working_on,
                release_branch,
                target_branch: trunk.to_string(),
                major_line: Some(line),
                steps,
            }
        }
        ReleaseLevel::Minor => {
            let minor = current.minor.saturating_add(1);
            let release = format!("v{}.{minor}.0", current.major);
            let working_on = format!("v{}.{minor}.1", current.major);
            let release_branch = format!("release-{release}");
            let release_msg = format!("release {release}");
            let working_msg = format!("working on {working_on}");

            let steps = vec![
                Step::git(["checkout", "-b", release_branch.as_str()]),
                // The release version does not exist in Cargo.toml yet, so
                // the minor path bumps before committing anything.
                Step::cargo(["set-version", "--bump", "minor"]),
                Step::new("git-cliff", ["--tag", release.as_str(), "-o", "CHANGELOG.md"]),
                Step::cargo(["fetch"]),
                Step::cargo(["test"]),
                Step::cargo(["llvm-cov"]),
                Step::cargo(["doc", "--no-deps"]),
                Step::git(["commit", "-a", "-m", release_msg.as_str()]),
                Step::git(["checkout", branch]),
                Step::git(["merge", release_branch.as_str()]),
                Step::git(["tag", release.as_str()]),
                Step::git(["push", remote, release.as_str(), branch]),
                Step::cargo(["publish"]),
                Step::cargo(["set-version", "--bump", "patch"]),
                Step::git(["commit", "-a", "-m", working_msg.as_str()]),
            ];

            ReleasePlan {
                release,
                working_on,
                release_branch,
                target_branch: branch.to_string(),
                major_line: None,
                steps,
            }
        }
        ReleaseLevel::Patch => {
            let release = format!("v{current}");
            let working_on = format!(
                "v{}.{}.{}",
                current.major,
                current.minor,
                current.patch.saturating_add(1)
            );
            let release_branch = format!("release-{release}");
            let release_msg = format!("release {release}");
            let working_msg = format!("working on {working_on}");

            let steps = vec![
                Step::git(["checkout", "-b", release_branch.as_str()]),
                Step::new("git-cliff", ["--tag", release.as_str(), "-o", "CHANGELOG.md"]),
                Step::cargo(["fetch"]),
                Step::cargo(["test"]),
                Step::cargo(["llvm-cov"]),
                Step::cargo(["doc", "--no-deps"]),
                Step::git(["commit", "-a", "-m", release_msg.as_str()]),
                Step::git(["checkout", branch]),
                Step::git(["merge", release_branch.as_str()]),
                Step::git(["tag", release.as_str()]),
                Step::git(["push", remote, release.as_str(), branch]),
                Step::cargo(["publish"]),
                Step::cargo(["set-version", "--bump", "patch"]),
                Step::git(["commit", "-a", "-m", working_msg.as_str()]),
            ];

            ReleasePlan {
                release,
                working_on,
                release_branch,
                target_branch: branch.to_string(),
                major_line: None,
                steps,
            }
        }
    };

    Ok(plan)
}

// Runs steps in order, stopping at the first failure. Already-executed steps
// are not rolled back; repository state is left for manual recovery.
fn execute(steps: &[Step]) -> Result<()> {
    for step in steps {
        info!("running `{step}`");
        step.run()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    fn rendered(plan: &ReleasePlan) -> Vec<String> {
        plan.steps.iter().map(|step| step.to_string()).collect()
    }

    #[test]
    fn test_patch_versions() {
        let plan = plan_release(
            &ReleaseLevel::Patch,
            &Version::parse("1.2.3").unwrap(),
            "v1.x",
            "master",
            "origin",
        )
        .unwrap();
        assert_eq!(plan.release, "v1.2.3");
        assert_eq!(plan.working_on, "v1.2.4");

        let plan = plan_release(
            &ReleaseLevel::Patch,
            &Version::parse("0.4.0").unwrap(),
            "v0.x",
            "master",
            "origin",
        )
        .unwrap();
        assert_eq!(plan.release, "v0.4.0");
        assert_eq!(plan.working_on, "v0.4.1");
    }

    #[test]
    fn test_minor_versions() {
        let plan = plan_release(
            &ReleaseLevel::Minor,
            &Version::parse("1.2.3").unwrap(),
            "v1.x",
            "master",
            "origin",
        )
        .unwrap();
        assert_eq!(plan.release, "v1.3.0");
        assert_eq!(plan.working_on, "v1.3.1");

        let plan = plan_release(
            &ReleaseLevel::Minor,
            &Version::parse("2.0.0").unwrap(),
            "v2.x",
            "master",
            "origin",
        )
        .unwrap();
        assert_eq!(plan.release, "v2.1.0");
        assert_eq!(plan.working_on, "v2.1.1");
    }

    #[test]
    fn test_major_versions() {
        let plan = plan_release(
            &ReleaseLevel::Major,
            &Version::parse("1.2.3").unwrap(),
            "master",
            "master",
            "origin",
        )
        .unwrap();
        assert_eq!(plan.release, "v1.2.3");
        assert_eq!(plan.working_on, "v2.0.0");
        assert_eq!(plan.major_line.as_deref(), Some("v1.x"));
    }

    #[test]
    fn test_is_major_line() {
        assert!(is_major_line("v1.x"));
        assert!(is_major_line("v2.x"));
        assert!(is_major_line("v10.x"));
        assert!(is_major_line("v0.x"));

        assert!(!is_major_line("master"));
        assert!(!is_major_line("feature-x"));
        assert!(!is_major_line("v.x"));
        assert!(!is_major_line("vN.x"));
        assert!(!is_major_line("v1.x.x"));
        assert!(!is_major_line("v1x"));
        assert!(!is_major_line("1.x"));
        assert!(!is_major_line(""));
    }

    #[test]
    fn test_validate_branch() {
        assert!(validate_branch(&ReleaseLevel::Major, "master", "master").is_ok());
        assert!(validate_branch(&ReleaseLevel::Minor, "v2.x", "master").is_ok());
        assert!(validate_branch(&ReleaseLevel::Patch, "v2.x", "master").is_ok());

        assert_eq!(
            validate_branch(&ReleaseLevel::Minor, "master", "master")
                .unwrap_err()
                .to_string(),
            "minor releases must be cut from a major line branch (vN.x), not master"
        );
        assert_eq!(
            validate_branch(&ReleaseLevel::Major, "v1.x", "master")
                .unwrap_err()
                .to_string(),
            "major releases must be cut from master, not v1.x"
        );
        assert_eq!(
            validate_branch(&ReleaseLevel::Patch, "feature-x", "master")
                .unwrap_err()
                .to_string(),
            "patch releases must be cut from a major line branch (vN.x), not feature-x"
        );
    }

    #[test]
    fn test_validate_branch_custom_trunk() {
        assert!(validate_branch(&ReleaseLevel::Major, "main", "main").is_ok());
        assert!(validate_branch(&ReleaseLevel::Major, "master", "main").is_err());
    }

    #[test]
    fn test_patch_plan_steps() {
        let plan = plan_release(
            &ReleaseLevel::Patch,
            &Version::parse("1.2.3").unwrap(),
            "v1.x",
            "master",
            "origin",
        )
        .unwrap();

        assert_eq!(
            rendered(&plan),
            vec![
                "git checkout -b release-v1.2.3",
                "git-cliff --tag v1.2.3 -o CHANGELOG.md",
                "cargo fetch",
                "cargo test",
                "cargo llvm-cov",
                "cargo doc --no-deps",
                "git commit -a -m \"release v1.2.3\"",
                "git checkout v1.x",
                "git merge release-v1.2.3",
                "git tag v1.2.3",
                "git push origin v1.2.3 v1.x",
                "cargo publish",
                "cargo set-version --bump patch",
                "git commit -a -m \"working on v1.2.4\"",
            ]
        );
    }

    #[test]
    fn test_minor_plan_steps() {
        let plan = plan_release(
            &ReleaseLevel::Minor,
            &Version::parse("1.2.3").unwrap(),
            "v1.x",
            "master",
            "upstream",
        )
        .unwrap();

        assert_eq!(
            rendered(&plan),
            vec![
                "git checkout -b release-v1.3.0",
                "cargo set-version --bump minor",
                "git-cliff --tag v1.3.0 -o CHANGELOG.md",
                "cargo fetch",
                "cargo test",
                "cargo llvm-cov",
                "cargo doc --no-deps",
                "git commit -a -m \"release v1.3.0\"",
                "git checkout v1.x",
                "git merge release-v1.3.0",
                "git tag v1.3.0",
                "git push upstream v1.3.0 v1.x",
                "cargo publish",
                "cargo set-version --bump patch",
                "git commit -a -m \"working on v1.3.1\"",
            ]
        );
    }

    #[test]
    fn test_major_plan_steps() {
        let plan = plan_release(
            &ReleaseLevel::Major,
            &Version::parse("2.1.7").unwrap(),
            "master",
            "master",
            "origin",
        )
        .unwrap();

        assert_eq!(
            rendered(&plan),
            vec![
                "git checkout -b release-v2.1.7",
                "git-cliff --tag v2.1.7 -o CHANGELOG.md",
                "cargo fetch",
                "git commit -a -m \"release v2.1.7\"",
                "git checkout master",
                "git merge release-v2.1.7",
                "git tag v2.1.7",
                "git branch v2.x",
                "git push origin v2.1.7 v2.x",
                "cargo publish",
                "cargo set-version --bump major",
                "git commit -a -m \"working on v3.0.0\"",
            ]
        );
    }

    #[test]
    fn test_plan_rejects_wrong_branch() {
        let current = Version::parse("1.2.3").unwrap();
        assert!(plan_release(&ReleaseLevel::Major, &current, "v1.x", "master", "origin").is_err());
        assert!(plan_release(&ReleaseLevel::Minor, &current, "master", "master", "origin").is_err());
        assert!(
            plan_release(&ReleaseLevel::Patch, &current, "feature-x", "master", "origin").is_err()
        );
    }

    #[test]
    fn test_execute_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let before = dir.path().join("before");
        let after = dir.path().join("after");

        let steps = vec![
            Step::new("touch", [before.to_str().unwrap()]),
            Step::new("false", Vec::<&str>::new()),
            Step::new("touch", [after.to_str().unwrap()]),
        ];

        let err = execute(&steps).unwrap_err();
        assert!(err.to_string().contains("`false` exited with code 1"));

        // The first step ran, the one after the failure did not.
        assert!(before.exists());
        assert!(!after.exists());
    }
}
