use std::collections::BTreeSet;
use std::fmt::Display;
use std::sync::OnceLock;

use regex::Regex;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

use crate::{AppError, AppResult};

/// A hash-like token lifted out of an input line.
///
/// Only the character class and length are checked; abbreviated hashes are
/// never expanded, so `abc1234` and `abc12345` are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl From<&str> for CommitId {
    fn from(value: &str) -> Self {
        CommitId(value.to_owned())
    }
}

fn commit_hash_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Lowercase hex only; uppercase runs are never matched.
    RE.get_or_init(|| Regex::new(r"[a-f0-9]{7,40}").expect("commit hash pattern is valid"))
}

/// Find the first hash-like run in `line`, ignoring any later candidates.
pub fn extract_commit_id(line: &str) -> Option<CommitId> {
    commit_hash_regex()
        .find(line.trim())
        .map(|m| CommitId(m.as_str().to_owned()))
}

/// Drain `reader` line by line and collect the distinct commit identifiers.
///
/// Fails with [`AppError::NoInput`] when not a single line carried a hash.
#[tracing::instrument(name = "Reading commit hashes", level = "info", skip_all)]
pub async fn read_commit_ids<R: AsyncBufRead + Unpin>(
    reader: R,
) -> AppResult<BTreeSet<CommitId>> {
    let mut commits = BTreeSet::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match extract_commit_id(&line) {
            Some(id) => {
                trace!("Found commit {} in {:?}", id, line);
                commits.insert(id);
            }
            None => trace!("No commit hash in {:?}", line),
        }
    }
    if commits.is_empty() {
        return Err(AppError::NoInput);
    }
    debug!("Collected {} distinct commit hashes", commits.len());
    Ok(commits)
}
