//! addons::mention
//!
//! Let maintainers know a pull request modifies their addons.
//!
//! Maintainers are read on the PR's target branch (and the extra release
//! branches) so that somebody adding themselves as maintainer in the PR
//! is not pinged about their own change. Only installable addons count.

use std::path::PathBuf;

use tracing::{debug, info};

use super::maintainers::{all_maintainers, resolve_maintainers, MaintainerMap};
use super::manifest::is_addon_dir;
use super::scope::modified_addon_dirs;
use super::authorize::maintainer_branches;
use super::AddonError;
use crate::core::types::BranchName;
use crate::forge::Forge;
use crate::git::Git;

/// Placeholder replaced with the PR opener's login in the adoption text.
pub const PR_OPENER_PLACEHOLDER: &str = "{pr_opener}";

/// What to say on a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionPlan {
    /// Nothing to post.
    Skip,
    /// Nobody maintains the modified addons; invite the opener to adopt.
    Adopt(String),
    /// Ping these maintainers, sorted, each once.
    Mention(Vec<String>),
}

impl MentionPlan {
    /// Comment text, `None` for [`MentionPlan::Skip`].
    pub fn comment(&self) -> Option<String> {
        match self {
            MentionPlan::Skip => None,
            MentionPlan::Adopt(text) => Some(text.clone()),
            MentionPlan::Mention(logins) => {
                let handles: Vec<String> = logins.iter().map(|l| format!("@{}", l)).collect();
                Some(format!(
                    "Hi {},\nsome modules you are maintaining are being modified, check this out!",
                    handles.join(", ")
                ))
            }
        }
    }
}

/// Decide what to post given the maintainers known before the change.
pub fn plan_mention(opener: &str, maintainers: &MaintainerMap, adopt_template: Option<&str>) -> MentionPlan {
    let everyone = all_maintainers(maintainers);

    if everyone.contains(opener) {
        return MentionPlan::Skip;
    }
    if everyone.is_empty() {
        return match adopt_template {
            Some(template) => MentionPlan::Adopt(template.replace(PR_OPENER_PLACEHOLDER, opener)),
            None => MentionPlan::Skip,
        };
    }
    MentionPlan::Mention(everyone.into_iter().collect())
}

/// Plan and post the maintainer mention for pull request `number`.
///
/// The clone must have the PR head checked out. Returns the plan that
/// was carried out.
pub async fn mention_maintainers(
    forge: &dyn Forge,
    git: &Git,
    number: u64,
    extra_series: &[BranchName],
    adopt_template: Option<&str>,
) -> Result<MentionPlan, AddonError> {
    let pr = forge.get_pull_request(number).await?;
    debug!(number, base = %pr.base, author = %pr.author, "pull request");

    let (dirs, _) = modified_addon_dirs(git, &pr.base)?;
    let mut installable: Vec<PathBuf> = Vec::new();
    for dir in dirs {
        if is_addon_dir(&dir, true)? {
            installable.push(dir);
        }
    }
    if installable.is_empty() {
        info!(number, "no installable addon modified");
        return Ok(MentionPlan::Skip);
    }

    let branches = maintainer_branches(&pr.base, extra_series)?;
    let maintainers = resolve_maintainers(git, &installable, &branches)?;
    let plan = plan_mention(&pr.author, &maintainers, adopt_template);

    if let Some(body) = plan.comment() {
        forge.post_comment(number, &body).await?;
        info!(number, "posted maintainer mention");
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AddonName;
    use std::collections::BTreeSet;

    fn map(entries: &[(&str, &[&str])]) -> MaintainerMap {
        entries
            .iter()
            .map(|(addon, logins)| {
                (
                    AddonName::new(*addon).unwrap(),
                    logins.iter().map(|l| l.to_string()).collect::<BTreeSet<_>>(),
                )
            })
            .collect()
    }

    #[test]
    fn each_maintainer_mentioned_once() {
        let maintainers = map(&[("addon1", &["themaintainer"]), ("addon2", &["themaintainer"])]);
        let plan = plan_mention("contributor", &maintainers, None);

        assert_eq!(plan, MentionPlan::Mention(vec!["themaintainer".to_string()]));
        let comment = plan.comment().unwrap();
        assert_eq!(comment.matches("themaintainer").count(), 1);
    }

    #[test]
    fn mentions_are_sorted() {
        let maintainers = map(&[("a", &["zed", "amy"]), ("b", &["mia"])]);
        let comment = plan_mention("x", &maintainers, None).comment().unwrap();
        assert_eq!(
            comment,
            "Hi @amy, @mia, @zed,\nsome modules you are maintaining are being modified, check this out!"
        );
    }

    #[test]
    fn opener_is_maintainer() {
        let maintainers = map(&[("a", &["themaintainer"]), ("b", &["other"])]);
        assert_eq!(plan_mention("themaintainer", &maintainers, None), MentionPlan::Skip);
    }

    #[test]
    fn adoption_when_unmaintained() {
        let maintainers = map(&[("a", &[])]);
        let plan = plan_mention("newbie", &maintainers, Some("Hi {pr_opener}, would you like to adopt?"));
        assert_eq!(
            plan.comment().as_deref(),
            Some("Hi newbie, would you like to adopt?")
        );

        assert_eq!(plan_mention("newbie", &maintainers, None), MentionPlan::Skip);
    }
}
