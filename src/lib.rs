//! cut-release - release-cutting automation
//!
//! This library backs the `cut-release` binary: it validates that the
//! requested release type may be cut from the current branch, computes the
//! release and next-working version strings, and builds the ordered list of
//! git/cargo commands that perform the release.
//!
//! # Examples
//!
//! ## Planning a patch release
//!
//! ```
//! use cut_release::release::{plan_release, ReleaseLevel};
//! use semver::Version;
//!
//! let current = Version::parse("1.2.3").unwrap();
//! let plan = plan_release(&ReleaseLevel::Patch, &current, "v1.x", "master", "origin").unwrap();
//!
//! assert_eq!(plan.release, "v1.2.3");
//! assert_eq!(plan.working_on, "v1.2.4");
//! for step in &plan.steps {
//!     println!("{step}");
//! }
//! ```

pub mod commands;
pub mod utils;

pub use commands::release;

pub use semver::Version;

pub type Result<T> = anyhow::Result<T>;
