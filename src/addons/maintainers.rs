//! addons::maintainers
//!
//! Maintainer sets declared by addons, unioned across branches.
//!
//! An addon may be maintained by different people on different release
//! lines. [`resolve_maintainers`] checks out each branch in turn, reads
//! the descriptors of the requested addons, and unions the results per
//! addon. A descriptor missing on some branch contributes nobody.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::manifest::{addon_name, find_manifest};
use super::AddonError;
use crate::core::types::{AddonName, BranchName};
use crate::git::{BranchRestore, Git};

/// Addon name to the logins maintaining it.
pub type MaintainerMap = BTreeMap<AddonName, BTreeSet<String>>;

/// Maintainers of `addon_dirs` as declared in the current work tree.
///
/// Relative directories are resolved against `work_dir`.
pub fn maintainers_current_branch(work_dir: &Path, addon_dirs: &[PathBuf]) -> Result<MaintainerMap, AddonError> {
    let mut map = MaintainerMap::new();
    for dir in addon_dirs {
        let dir = work_dir.join(dir);
        let name = addon_name(&dir).ok_or_else(|| AddonError::UnattributablePath(dir.display().to_string()))?;
        let maintainers = find_manifest(&dir)?
            .map(|m| m.maintainers)
            .unwrap_or_default();
        map.insert(name, maintainers);
    }
    Ok(map)
}

/// Union of maintainers declared on each of `branches`.
///
/// With no branches, only the checked-out branch is read. The original
/// branch is checked out again afterwards, also when reading a branch
/// fails. Every requested addon appears in the result, possibly with an
/// empty set.
pub fn resolve_maintainers(
    git: &Git,
    addon_dirs: &[PathBuf],
    branches: &[BranchName],
) -> Result<MaintainerMap, AddonError> {
    let work_dir = git.work_dir()?;
    if branches.is_empty() {
        return maintainers_current_branch(work_dir, addon_dirs);
    }

    let mut result = MaintainerMap::new();
    for branch in branches {
        let guard = BranchRestore::capture(git)?;
        git.checkout(branch.as_str())?;
        let on_branch = maintainers_current_branch(work_dir, addon_dirs)?;
        guard.restore()?;

        debug!(branch = %branch, addons = on_branch.len(), "read maintainers");
        for (addon, maintainers) in on_branch {
            result.entry(addon).or_default().extend(maintainers);
        }
    }

    info!(
        addons = result.len(),
        branches = branches.len(),
        "resolved maintainers"
    );
    Ok(result)
}

/// Is `user` a maintainer of every addon in `map`?
///
/// Vacuously true for an empty map; callers decide whether an empty
/// scope should count.
pub fn is_maintainer(user: &str, map: &MaintainerMap) -> bool {
    map.values().all(|maintainers| maintainers.contains(user))
}

/// Every login appearing in `map`, once.
pub fn all_maintainers(map: &MaintainerMap) -> BTreeSet<String> {
    map.values().flatten().cloned().collect()
}
