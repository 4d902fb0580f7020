//! core::version
//!
//! Addon version strings and release series.
//!
//! An addon version is `SERIES.MAJOR.MINOR.PATCH` where `SERIES` is itself
//! two numbers (`16.0`). The series ties an addon to a release line and is
//! never changed by a bump. Canonical release branches are named exactly
//! after their series.
//!
//! # Example
//!
//! ```
//! use addon_steward::core::version::{bump_version, series_from_branch, Series};
//!
//! assert_eq!(bump_version("16.0.1.2.3", "minor").unwrap(), "16.0.1.3.0");
//! assert_eq!(series_from_branch("16.0").unwrap(), Series::new(16, 0));
//! assert!(series_from_branch("16.0-fix").is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from version parsing and bumping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The string is not `SERIES.MAJOR.MINOR.PATCH`.
    #[error("{0} does not match the expected version pattern")]
    InvalidVersion(String),

    /// The bump mode is not one of major, minor, patch.
    #[error("unexpected bump mode '{0}', must be one of: major, minor, patch")]
    InvalidBumpMode(String),

    /// No release series could be extracted.
    #[error("no release series detected in '{0}'")]
    SeriesNotDetected(String),
}

fn version_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<series>\d+\.\d+)\.(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)$")
            .expect("version pattern is valid")
    })
}

fn branch_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<series>\d+\.\d+)$").expect("branch pattern is valid"))
}

/// A two-part release series such as `16.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Series {
    pub major: u32,
    pub minor: u32,
}

impl Series {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parse the `D+.D+` text captured by one of the series patterns.
    fn from_captured(text: &str, origin: &str) -> Result<Self, VersionError> {
        let not_detected = || VersionError::SeriesNotDetected(origin.to_string());
        let (major, minor) = text.split_once('.').ok_or_else(not_detected)?;
        Ok(Self {
            major: major.parse().map_err(|_| not_detected())?,
            minor: minor.parse().map_err(|_| not_detected())?,
        })
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// How a version is incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpMode {
    /// Increment MAJOR, reset MINOR and PATCH.
    Major,
    /// Increment MINOR, reset PATCH.
    Minor,
    /// Increment PATCH.
    Patch,
}

impl FromStr for BumpMode {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "major" => Ok(BumpMode::Major),
            "minor" => Ok(BumpMode::Minor),
            "patch" => Ok(BumpMode::Patch),
            other => Err(VersionError::InvalidBumpMode(other.to_string())),
        }
    }
}

impl fmt::Display for BumpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpMode::Major => write!(f, "major"),
            BumpMode::Minor => write!(f, "minor"),
            BumpMode::Patch => write!(f, "patch"),
        }
    }
}

/// A parsed addon version.
///
/// Every component is kept as written, so a bump reproduces the series and
/// any component it does not touch byte for byte. Components are digit
/// strings of any length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    series_text: String,
    series: Series,
    major: String,
    minor: String,
    patch: String,
}

impl Version {
    /// The release series this version belongs to.
    pub fn series(&self) -> Series {
        self.series
    }

    pub fn major(&self) -> &str {
        &self.major
    }

    pub fn minor(&self) -> &str {
        &self.minor
    }

    pub fn patch(&self) -> &str {
        &self.patch
    }

    /// Return the next version for `mode`. The series is left untouched.
    pub fn bump(&self, mode: BumpMode) -> Version {
        let zero = || "0".to_string();
        let (major, minor, patch) = match mode {
            BumpMode::Major => (increment(&self.major), zero(), zero()),
            BumpMode::Minor => (self.major.clone(), increment(&self.minor), zero()),
            BumpMode::Patch => (self.major.clone(), self.minor.clone(), increment(&self.patch)),
        };
        Version {
            series_text: self.series_text.clone(),
            series: self.series,
            major,
            minor,
            patch,
        }
    }
}

/// Add one to a decimal digit string. Leading zeros are dropped, the
/// way an integer would print.
fn increment(digits: &str) -> String {
    let trimmed = digits.trim_start_matches('0');
    let mut out: Vec<u8> = trimmed.bytes().collect();
    let mut carry = true;
    for digit in out.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            carry = false;
            break;
        }
    }
    if carry {
        out.insert(0, b'1');
    }
    // only ASCII digits were pushed
    String::from_utf8_lossy(&out).into_owned()
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::InvalidVersion(s.to_string());
        let caps = version_re().captures(s).ok_or_else(invalid)?;
        let series_text = caps["series"].to_string();
        let series = Series::from_captured(&series_text, s).map_err(|_| invalid())?;
        Ok(Version {
            series,
            series_text,
            major: caps["major"].to_string(),
            minor: caps["minor"].to_string(),
            patch: caps["patch"].to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.series_text, self.major, self.minor, self.patch
        )
    }
}

/// Bump a version string.
///
/// # Errors
///
/// - [`VersionError::InvalidVersion`] if `version` is malformed
/// - [`VersionError::InvalidBumpMode`] if `mode` is not major/minor/patch
pub fn bump_version(version: &str, mode: &str) -> Result<String, VersionError> {
    let parsed: Version = version.parse()?;
    let mode: BumpMode = mode.parse()?;
    Ok(parsed.bump(mode).to_string())
}

/// Extract the release series from a full addon version.
pub fn series_from_version(version: &str) -> Result<Series, VersionError> {
    let caps = version_re()
        .captures(version)
        .ok_or_else(|| VersionError::SeriesNotDetected(version.to_string()))?;
    Series::from_captured(&caps["series"], version)
}

/// Extract the release series from a branch name.
///
/// Only canonical release branches qualify: the whole name must be
/// `D+.D+`, so `16.0-fix` or `16` are rejected.
pub fn series_from_branch(branch: &str) -> Result<Series, VersionError> {
    let caps = branch_re()
        .captures(branch)
        .ok_or_else(|| VersionError::SeriesNotDetected(branch.to_string()))?;
    Series::from_captured(&caps["series"], branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod bump {
        use super::*;

        #[test]
        fn major_resets_minor_and_patch() {
            assert_eq!(bump_version("16.0.1.2.3", "major").unwrap(), "16.0.2.0.0");
        }

        #[test]
        fn minor_resets_patch() {
            assert_eq!(bump_version("16.0.1.2.3", "minor").unwrap(), "16.0.1.3.0");
        }

        #[test]
        fn patch_only_touches_patch() {
            assert_eq!(bump_version("14.0.1.2.3", "patch").unwrap(), "14.0.1.2.4");
        }

        #[test]
        fn series_text_preserved() {
            assert_eq!(bump_version("8.0.1.0.0", "patch").unwrap(), "8.0.1.0.1");
        }

        #[test]
        fn untouched_components_keep_their_text() {
            assert_eq!(bump_version("16.0.01.02.3", "patch").unwrap(), "16.0.01.02.4");
            assert_eq!(bump_version("16.0.01.02.3", "minor").unwrap(), "16.0.01.3.0");
            assert_eq!(bump_version("16.0.01.02.3", "major").unwrap(), "16.0.2.0.0");
        }

        #[test]
        fn components_beyond_machine_integers() {
            assert_eq!(
                bump_version("16.0.18446744073709551615.0.0", "major").unwrap(),
                "16.0.18446744073709551616.0.0"
            );
            assert_eq!(
                bump_version("16.0.1.0.99999999999999999999", "patch").unwrap(),
                "16.0.1.0.100000000000000000000"
            );
        }

        #[test]
        fn increment_carries() {
            assert_eq!(increment("0"), "1");
            assert_eq!(increment("000"), "1");
            assert_eq!(increment("9"), "10");
            assert_eq!(increment("0199"), "200");
        }

        #[test]
        fn invalid_version_rejected() {
            assert_eq!(
                bump_version("abc", "patch"),
                Err(VersionError::InvalidVersion("abc".to_string()))
            );
            assert!(bump_version("16.0.1.0", "patch").is_err());
            assert!(bump_version("16.0.1.0.0.0", "patch").is_err());
            assert!(bump_version("16.0.1.0.x", "patch").is_err());
        }

        #[test]
        fn invalid_mode_rejected() {
            assert_eq!(
                bump_version("16.0.1.0.0", "huge"),
                Err(VersionError::InvalidBumpMode("huge".to_string()))
            );
        }

        #[test]
        fn mode_display_matches_parse() {
            for mode in [BumpMode::Major, BumpMode::Minor, BumpMode::Patch] {
                assert_eq!(mode.to_string().parse::<BumpMode>().unwrap(), mode);
            }
        }
    }

    mod series {
        use super::*;

        #[test]
        fn from_version() {
            assert_eq!(series_from_version("16.0.1.0.0").unwrap(), Series::new(16, 0));
            assert_eq!(series_from_version("8.0.2.1.0").unwrap(), Series::new(8, 0));
        }

        #[test]
        fn from_malformed_version() {
            assert!(matches!(
                series_from_version("abc"),
                Err(VersionError::SeriesNotDetected(_))
            ));
        }

        #[test]
        fn from_branch() {
            assert_eq!(series_from_branch("16.0").unwrap(), Series::new(16, 0));
            assert_eq!(series_from_branch("12.1").unwrap(), Series::new(12, 1));
        }

        #[test]
        fn from_non_canonical_branch() {
            for branch in ["16.0-fix", "16", "main", "v16.0", "16.0.1"] {
                assert!(
                    matches!(
                        series_from_branch(branch),
                        Err(VersionError::SeriesNotDetected(_))
                    ),
                    "{branch} should not carry a series"
                );
            }
        }

        #[test]
        fn ordering_and_display() {
            assert!(Series::new(11, 0) > Series::new(8, 0));
            assert!(Series::new(16, 0) < Series::new(16, 1));
            assert_eq!(Series::new(16, 0).to_string(), "16.0");
        }
    }

    proptest! {
        #[test]
        fn bump_algebra(s1 in 0u32..100, s2 in 0u32..10, j in 0u64..1000, n in 0u64..1000, p in 0u64..1000) {
            let v = format!("{s1}.{s2}.{j}.{n}.{p}");
            prop_assert_eq!(bump_version(&v, "major").unwrap(), format!("{s1}.{s2}.{}.0.0", j + 1));
            prop_assert_eq!(bump_version(&v, "minor").unwrap(), format!("{s1}.{s2}.{j}.{}.0", n + 1));
            prop_assert_eq!(bump_version(&v, "patch").unwrap(), format!("{s1}.{s2}.{j}.{n}.{}", p + 1));
            prop_assert_eq!(series_from_version(&v).unwrap(), Series::new(s1, s2));
        }
    }
}
