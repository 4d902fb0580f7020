//! Integration tests for change scoping by merge simulation.

mod support;

use addon_steward::addons::scope::{modified_addon_dirs, modified_addons, SCRATCH_BRANCH};
use addon_steward::addons::AddonError;
use addon_steward::git::GitError;

use support::TestRepo;

/// `16.0` with addon1 and addon2, plus a `feature` branch checked out.
fn repo_with_feature() -> TestRepo {
    let repo = TestRepo::new("16.0");
    repo.addon("addon1", "16.0.1.0.0", &["themaintainer"]);
    repo.addon("addon2", "16.0.1.0.0", &[]);
    repo.commit_all("Add addons");
    repo.branch("feature");
    repo
}

fn names(scope: &addon_steward::addons::ChangeScope) -> Vec<String> {
    scope.addons.iter().map(|a| a.to_string()).collect()
}

#[test]
fn change_inside_one_addon() {
    let repo = repo_with_feature();
    repo.write("addon1/models/partner.py", "x = 1\n");
    repo.commit_all("Change addon1");

    let scope = modified_addons(&repo.git(), "16.0").unwrap();

    assert_eq!(names(&scope), vec!["addon1"]);
    assert!(!scope.other_changes);
    assert_eq!(repo.current_branch(), "feature");
    assert!(repo.status().is_empty());
}

#[test]
fn root_file_sets_other_changes() {
    let repo = repo_with_feature();
    repo.write("addon1/x.py", "\n");
    repo.write("setup.cfg", "[metadata]\n");
    repo.commit_all("Change addon1 and root");

    let scope = modified_addons(&repo.git(), "16.0").unwrap();

    assert_eq!(names(&scope), vec!["addon1"]);
    assert!(scope.other_changes);
}

#[test]
fn target_progress_is_not_reported() {
    let repo = repo_with_feature();
    repo.write("addon1/x.py", "\n");
    repo.commit_all("Change addon1");

    repo.checkout("16.0");
    repo.write("addon2/y.py", "\n");
    repo.write("README.md", "# Changed upstream\n");
    repo.commit_all("Upstream work");
    repo.checkout("feature");

    let scope = modified_addons(&repo.git(), "16.0").unwrap();

    assert_eq!(names(&scope), vec!["addon1"]);
    assert!(!scope.other_changes);
    assert_eq!(repo.current_branch(), "feature");
}

#[test]
fn deleted_addon_is_not_affected() {
    let repo = repo_with_feature();
    std::fs::remove_dir_all(repo.path().join("addon2")).unwrap();
    repo.commit_all("Remove addon2");

    let scope = modified_addons(&repo.git(), "16.0").unwrap();

    assert!(scope.addons.is_empty());
    assert!(scope.other_changes);
}

#[test]
fn scoping_is_idempotent() {
    let repo = repo_with_feature();
    repo.write("addon2/z.py", "\n");
    repo.commit_all("Change addon2");
    let git = repo.git();

    let first = modified_addons(&git, "16.0").unwrap();
    let second = modified_addons(&git, "16.0").unwrap();

    assert_eq!(first, second);
    assert_eq!(names(&first), vec!["addon2"]);
}

#[test]
fn packaged_setup_layout() {
    let repo = TestRepo::new("16.0");
    repo.addon("addon1", "16.0.1.0.0", &[]);
    repo.addon("setup/addon1/odoo/addons/addon1", "16.0.1.0.0", &[]);
    repo.write("setup/addon1/setup.py", "setup()\n");
    repo.commit_all("Add addon1 with packaging");
    repo.branch("feature");

    repo.write("setup/addon1/setup.py", "setup(name='addon1')\n");
    repo.write("setup/_metapackage/setup.py", "setup()\n");
    repo.commit_all("Touch packaging");

    let scope = modified_addons(&repo.git(), "16.0").unwrap();

    assert_eq!(names(&scope), vec!["addon1"]);
    assert!(scope.other_changes);
}

#[test]
fn conflict_restores_original_branch() {
    let repo = repo_with_feature();
    repo.write("addon1/x.py", "feature\n");
    repo.commit_all("Feature side");
    repo.checkout("16.0");
    repo.write("addon1/x.py", "target\n");
    repo.commit_all("Target side");
    repo.checkout("feature");

    let result = modified_addons(&repo.git(), "16.0");

    assert!(matches!(
        result,
        Err(AddonError::Git(GitError::MergeConflict { .. }))
    ));
    assert_eq!(repo.current_branch(), "feature");
    assert!(repo.status().is_empty());
}

#[test]
fn unknown_target_restores_original_branch() {
    let repo = repo_with_feature();

    let result = modified_addons(&repo.git(), "17.0");

    assert!(matches!(
        result,
        Err(AddonError::Git(GitError::RefNotFound { .. }))
    ));
    assert_eq!(repo.current_branch(), "feature");
}

#[test]
fn scratch_branch_is_reused() {
    let repo = repo_with_feature();
    repo.write("addon1/x.py", "\n");
    repo.commit_all("Change addon1");
    let git = repo.git();

    modified_addons(&git, "16.0").unwrap();
    assert!(repo
        .output(&["branch", "--list", SCRATCH_BRANCH])
        .contains(SCRATCH_BRANCH));

    repo.write("addon2/y.py", "\n");
    repo.commit_all("Change addon2");
    let scope = modified_addons(&git, "16.0").unwrap();
    assert_eq!(names(&scope), vec!["addon1", "addon2"]);
}

#[test]
fn addon_dirs_are_absolute() {
    let repo = repo_with_feature();
    repo.write("addon1/x.py", "\n");
    repo.commit_all("Change addon1");

    let (dirs, scope) = modified_addon_dirs(&repo.git(), "16.0").unwrap();

    assert_eq!(dirs.len(), 1);
    assert!(dirs[0].is_absolute());
    assert!(dirs[0].ends_with("addon1"));
    assert_eq!(names(&scope), vec!["addon1"]);
}

#[test]
fn remote_only_target_is_tracked() {
    let upstream = TestRepo::new("14.0");
    upstream.addon("addon1", "14.0.1.0.0", &[]);
    upstream.commit_all("addon1 on 14.0");
    upstream.branch("16.0");
    upstream.write("README.md", "# 16.0\n");
    upstream.commit_all("Open 16.0");

    let clone = TestRepo::clone_of(&upstream);
    clone.branch("feature");
    clone.write("addon1/x.py", "\n");
    clone.commit_all("Change addon1");

    let scope = modified_addons(&clone.git(), "14.0").unwrap();

    assert_eq!(names(&scope), vec!["addon1"]);
    assert!(scope.other_changes);
    assert_eq!(clone.current_branch(), "feature");
}
