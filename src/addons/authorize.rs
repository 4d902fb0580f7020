//! addons::authorize
//!
//! May a user merge the change on the checked-out branch?
//!
//! A user may if the forge grants them push rights. Failing that, they
//! may if the change touches only addons, at least one, and they are a
//! declared maintainer of every one of them. Maintainers are read on the
//! target branch and on the configured extra release branches.
//!
//! The forge is asked first: it is cheap and decisive when it says yes,
//! and it keeps administrators from paying for a merge simulation.

use tracing::info;

use super::maintainers::{is_maintainer, resolve_maintainers};
use super::scope::modified_addon_dirs;
use super::AddonError;
use crate::core::types::BranchName;
use crate::forge::Forge;
use crate::git::Git;

/// Why a user was, or was not, authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The forge grants push rights.
    PushRights,
    /// The user maintains every modified addon.
    Maintainer,
    /// The change touches files outside any addon.
    OtherChanges,
    /// The change touches no addon.
    NoAddons,
    /// Some modified addon does not list the user.
    NotMaintainer,
}

impl Decision {
    pub fn is_authorized(self) -> bool {
        matches!(self, Decision::PushRights | Decision::Maintainer)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Decision::PushRights => "has push rights",
            Decision::Maintainer => "maintains all modified addons",
            Decision::OtherChanges => "change touches files outside addons",
            Decision::NoAddons => "change touches no addon",
            Decision::NotMaintainer => "does not maintain all modified addons",
        };
        f.write_str(text)
    }
}

/// Branches whose maintainer declarations count: the target first, then
/// `extra` without repeats.
pub fn maintainer_branches(target: &str, extra: &[BranchName]) -> Result<Vec<BranchName>, AddonError> {
    let mut branches = vec![BranchName::new(target)?];
    for branch in extra {
        if !branches.contains(branch) {
            branches.push(branch.clone());
        }
    }
    Ok(branches)
}

/// Decide whether `username` may merge the checked-out branch into `target`.
///
/// Unless the forge grants push rights, `target` must be a branch name;
/// a revision such as `HEAD~1` is rejected before HEAD moves.
pub async fn authorize(
    forge: &dyn Forge,
    git: &Git,
    username: &str,
    target: &str,
    extra_series: &[BranchName],
) -> Result<Decision, AddonError> {
    if forge.user_can_push(username).await? {
        info!(username, "authorized by push rights");
        return Ok(Decision::PushRights);
    }

    // maintainers are read on the target, so it must name a branch
    let branches = maintainer_branches(target, extra_series)?;
    let (addon_dirs, scope) = modified_addon_dirs(git, target)?;
    let decision = if scope.other_changes {
        Decision::OtherChanges
    } else if addon_dirs.is_empty() {
        Decision::NoAddons
    } else {
        let maintainers = resolve_maintainers(git, &addon_dirs, &branches)?;
        if is_maintainer(username, &maintainers) {
            Decision::Maintainer
        } else {
            Decision::NotMaintainer
        }
    };

    info!(username, target, decision = %decision, "authorization decided");
    Ok(decision)
}

/// [`authorize`], reduced to yes or no.
pub async fn user_can_push(
    forge: &dyn Forge,
    git: &Git,
    username: &str,
    target: &str,
    extra_series: &[BranchName],
) -> Result<bool, AddonError> {
    Ok(authorize(forge, git, username, target, extra_series)
        .await?
        .is_authorized())
}
