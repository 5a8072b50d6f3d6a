use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::AppResult;
use crate::git::GitQuery;
use crate::input::CommitId;

/// Every touched path mapped to the input commits that touched it.
///
/// Entries are only ever added. Keys iterate in byte order, which is the
/// order the report is printed in.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileCommitMap {
    files: BTreeMap<String, BTreeSet<CommitId>>,
}

impl FileCommitMap {
    pub fn insert(&mut self, path: String, commit: CommitId) {
        self.files.entry(path).or_default().insert(commit);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths in byte order, each with the input commits that touched it.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<CommitId>)> {
        self.files
            .iter()
            .map(|(path, commits)| (path.as_str(), commits))
    }

    /// Sorted, deduplicated list of touched paths.
    pub fn sorted_paths(&self) -> Vec<String> {
        self.files.keys().cloned().collect()
    }
}

/// Ask `git` for the files of every commit, one call per commit, and merge
/// the answers. The first failing call aborts the whole collection.
#[tracing::instrument(name = "Collecting touched files", level = "info", skip_all)]
pub async fn collect_touched_files<Q: GitQuery + ?Sized>(
    git: &Q,
    commits: &BTreeSet<CommitId>,
) -> AppResult<FileCommitMap> {
    let mut map = FileCommitMap::default();
    for commit in commits {
        let files = git.files_changed_by(commit).await?;
        trace!("{} touched {} files", commit, files.len());
        for file in files {
            map.insert(file, commit.clone());
        }
    }
    debug!(
        "{} commits touched {} distinct files",
        commits.len(),
        map.len()
    );
    Ok(map)
}
