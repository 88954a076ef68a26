pub mod cargo;
pub mod git;
pub mod process;

pub use cargo::get_current_version;
pub use git::{get_current_branch, get_git_root_path};
pub use process::Step;
