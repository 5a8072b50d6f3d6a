/// Subprocess-backed access to the `git` command line.
pub(crate) mod command;

pub(crate) use command::GitCli;

use std::collections::BTreeSet;

use futures::future::BoxFuture;

use crate::AppResult;
use crate::input::CommitId;

/// Pretty format used for history mode output.
///
/// `[ <short hash> ] <iso date> | <author email, 20 cols> | <subject>`
pub const LOG_FORMAT: &str = "[ %h ] %ad | %<(20,trunc)%ae | %s";

/// The two history queries the report is built from.
pub trait GitQuery: Send + Sync {
    /// Paths touched by a single commit, without any diff body.
    fn files_changed_by<'a>(
        &'a self,
        commit: &'a CommitId,
    ) -> BoxFuture<'a, AppResult<BTreeSet<String>>>;

    /// One formatted log line per commit touching any of `files`.
    /// `log_flags` are passed through to `git log` untouched.
    fn history_of_files<'a>(
        &'a self,
        files: &'a [String],
        log_flags: &'a [String],
    ) -> BoxFuture<'a, AppResult<Vec<String>>>;
}

/// `git show --name-only --format= <commit>`
pub fn show_args(commit: &CommitId) -> Vec<String> {
    vec![
        "show".to_owned(),
        "--name-only".to_owned(),
        "--format=".to_owned(),
        commit.as_str().to_owned(),
    ]
}

/// `git log --pretty=format:<LOG_FORMAT> --date=iso <flags...> -- <files...>`
pub fn log_args(files: &[String], log_flags: &[String]) -> Vec<String> {
    let mut args = Vec::with_capacity(files.len() + log_flags.len() + 4);
    args.push("log".to_owned());
    args.push(format!("--pretty=format:{LOG_FORMAT}"));
    args.push("--date=iso".to_owned());
    args.extend(log_flags.iter().cloned());
    args.push("--".to_owned());
    args.extend(files.iter().cloned());
    args
}

/// Split `show --name-only` output into a set of paths.
pub fn parse_name_only(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
