//! cli::commands::series
//!
//! Print the release series of a version string or branch name.

use anyhow::Result;

use crate::core::version::{series_from_branch, series_from_version};

/// Run the series command.
pub fn series(value: &str, branch: bool) -> Result<()> {
    let series = if branch {
        series_from_branch(value)?
    } else {
        series_from_version(value)?
    };
    println!("{}", series);
    Ok(())
}
