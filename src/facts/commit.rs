use super::time_math::{age_in_days, days_since};
use super::{FactPairs, ToFactPairs};
use crate::keys::fact_keys;
use chrono::{DateTime, Utc};

const SHORT_SHA_LEN: usize = 7;

fact_keys! {
    /// Keys emitted by [`Commit`].
    pub enum CommitKey in "COMMIT" {
        Sha => "COMMIT_SHA", "Full object id of the commit";
        ShortSha => "COMMIT_SHORT_SHA", "First seven characters of the object id";
        Message => "COMMIT_MESSAGE", "Full commit message";
        Headline => "COMMIT_HEADLINE", "First line of the commit message";
        AuthorName => "COMMIT_AUTHOR_NAME", "Name recorded as the commit author";
        AuthorEmail => "COMMIT_AUTHOR_EMAIL", "E-mail recorded as the commit author";
        AuthorLogin => "COMMIT_AUTHOR_LOGIN", "Hosting-site login of the author, empty when unlinked";
        CommitterName => "COMMIT_COMMITTER_NAME", "Name recorded as the committer";
        AuthoredAt => "COMMIT_AUTHORED_AT", "Authoring timestamp";
        CommittedAt => "COMMIT_COMMITTED_AT", "Commit timestamp";
        Additions => "COMMIT_ADDITIONS", "Lines added";
        Deletions => "COMMIT_DELETIONS", "Lines deleted";
        ChangedFiles => "COMMIT_CHANGED_FILES", "Number of files changed";
        ParentsCount => "COMMIT_PARENTS_COUNT", "Number of parent commits";
        IsVerified => "COMMIT_IS_VERIFIED", "Whether the signature was verified";
        Url => "COMMIT_URL", "Web URL of the commit";
        Repository => "COMMIT_REPOSITORY", "owner/name of the repository holding the commit";
        NetChanges => "COMMIT_NET_CHANGES", "Additions minus deletions";
        TotalChanges => "COMMIT_TOTAL_CHANGES", "Additions plus deletions";
        IsMergeCommit => "COMMIT_IS_MERGE_COMMIT", "Whether the commit has more than one parent";
        AgeDays => "COMMIT_AGE_DAYS", "Days since the commit was authored";
    }
}

/// A commit of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub(crate) sha: String,
    pub(crate) message: String,
    pub(crate) author_name: String,
    pub(crate) author_email: String,
    pub(crate) author_login: Option<String>,
    pub(crate) committer_name: String,
    pub(crate) authored_at: DateTime<Utc>,
    pub(crate) committed_at: DateTime<Utc>,
    pub(crate) additions: u64,
    pub(crate) deletions: u64,
    pub(crate) changed_files: u64,
    pub(crate) parents_count: u64,
    pub(crate) is_verified: bool,
    pub(crate) url: String,
    pub(crate) repository: String,
}

impl Commit {
    #[must_use]
    pub fn sha(&self) -> &str {
        &self.sha
    }

    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha.get(..SHORT_SHA_LEN).unwrap_or(&self.sha)
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message.
    #[must_use]
    pub fn headline(&self) -> &str {
        self.message.lines().next().unwrap_or_default().trim_end()
    }

    #[must_use]
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    #[must_use]
    pub fn author_login(&self) -> Option<&str> {
        self.author_login.as_deref()
    }

    #[must_use]
    pub const fn authored_at(&self) -> DateTime<Utc> {
        self.authored_at
    }

    #[must_use]
    pub const fn committed_at(&self) -> DateTime<Utc> {
        self.committed_at
    }

    #[must_use]
    pub const fn parents_count(&self) -> u64 {
        self.parents_count
    }

    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    #[must_use]
    #[expect(clippy::cast_possible_wrap, reason = "line counts are far below i64::MAX")]
    pub const fn net_changes(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }

    #[must_use]
    pub const fn total_changes(&self) -> u64 {
        self.additions.saturating_add(self.deletions)
    }

    #[must_use]
    pub const fn is_merge_commit(&self) -> bool {
        self.parents_count > 1
    }

    #[must_use]
    pub fn age_in_days(&self, now: DateTime<Utc>) -> u64 {
        age_in_days(now, self.authored_at)
    }

    #[must_use]
    pub fn days_since_commit(&self, now: DateTime<Utc>) -> u64 {
        days_since(now, self.committed_at)
    }
}

impl ToFactPairs for Commit {
    fn to_fact_pairs(&self, now: DateTime<Utc>) -> FactPairs {
        let mut pairs = FactPairs::new();

        pairs.push(CommitKey::Sha, &self.sha);
        pairs.push(CommitKey::ShortSha, self.short_sha());
        pairs.push(CommitKey::Message, &self.message);
        pairs.push(CommitKey::Headline, self.headline());
        pairs.push(CommitKey::AuthorName, &self.author_name);
        pairs.push(CommitKey::AuthorEmail, &self.author_email);
        pairs.push(CommitKey::AuthorLogin, &self.author_login);
        pairs.push(CommitKey::CommitterName, &self.committer_name);
        pairs.push(CommitKey::AuthoredAt, self.authored_at);
        pairs.push(CommitKey::CommittedAt, self.committed_at);
        pairs.push(CommitKey::Additions, self.additions);
        pairs.push(CommitKey::Deletions, self.deletions);
        pairs.push(CommitKey::ChangedFiles, self.changed_files);
        pairs.push(CommitKey::ParentsCount, self.parents_count);
        pairs.push(CommitKey::IsVerified, self.is_verified);
        pairs.push(CommitKey::Url, &self.url);
        pairs.push(CommitKey::Repository, &self.repository);

        pairs.push(CommitKey::NetChanges, self.net_changes());
        pairs.push(CommitKey::TotalChanges, self.total_changes());
        pairs.push(CommitKey::IsMergeCommit, self.is_merge_commit());
        pairs.push(CommitKey::AgeDays, self.age_in_days(now));

        pairs
    }
}
