use std::io::Write;

use tokio::io::AsyncBufRead;
use tracing::{debug, trace, warn};

use crate::AppResult;
use crate::aggregate::{FileCommitMap, collect_touched_files};
use crate::git::GitQuery;
use crate::input::read_commit_ids;

/// What gets printed once the touched files are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportMode {
    /// The sorted list of touched paths.
    Files,
    /// `git log` output for the touched paths, with extra `git log` flags.
    History { log_flags: Vec<String> },
}

/// Turn the collected map into report lines.
///
/// History mode re-queries `git` for the paths, so it may list commits that
/// were never part of the input.
#[tracing::instrument(name = "Building report", level = "info", skip(git, map))]
pub async fn build_report<Q: GitQuery + ?Sized>(
    git: &Q,
    map: &FileCommitMap,
    mode: &ReportMode,
) -> AppResult<Vec<String>> {
    match mode {
        ReportMode::Files => {
            for (path, commits) in map.iter() {
                trace!("{} <- {:?}", path, commits);
            }
            Ok(map.sorted_paths())
        }
        ReportMode::History { log_flags } => {
            if map.is_empty() {
                warn!("No files were touched; git log will run without a path filter");
            }
            let files = map.sorted_paths();
            let lines = git.history_of_files(&files, log_flags).await?;
            debug!("git log returned {} entries", lines.len());
            Ok(lines)
        }
    }
}

/// Read commit hashes from `input` and produce the full report.
///
/// Nothing is returned until every query has succeeded.
pub async fn generate_report<Q, R>(
    git: &Q,
    input: R,
    mode: &ReportMode,
) -> AppResult<Vec<String>>
where
    Q: GitQuery + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let commits = read_commit_ids(input).await?;
    let map = collect_touched_files(git, &commits).await?;
    build_report(git, &map, mode).await
}

/// Write one report line per output line.
pub fn write_report<W: Write>(out: &mut W, lines: &[String]) -> AppResult<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;
    use crate::AppError;
    use crate::aggregate::tests::FakeGit;

    async fn report(git: &FakeGit, input: &str, mode: ReportMode) -> AppResult<Vec<String>> {
        generate_report(git, BufReader::new(input.as_bytes()), &mode).await
    }

    fn history(flags: &[&str]) -> ReportMode {
        ReportMode::History {
            log_flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn files_mode_prints_sorted_union() {
        let git = FakeGit::default()
            .commit("abc1234", &["src/lib.rs", "README.md"])
            .commit("deadbe0", &["src/lib.rs", "Cargo.toml"]);
        let lines = report(
            &git,
            "abc1234 fix bug\ndeadbe0 cleanup\nabc1234 fix bug\n",
            ReportMode::Files,
        )
        .await
        .unwrap();

        assert_eq!(lines, vec!["Cargo.toml", "README.md", "src/lib.rs"]);
        assert_eq!(git.calls(), vec!["show abc1234", "show deadbe0"]);
    }

    #[tokio::test]
    async fn no_hashes_means_no_queries() {
        let git = FakeGit::default();
        let err = report(&git, "no hashes here\n", ReportMode::Files)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoInput));
        assert!(git.calls().is_empty());
    }

    #[tokio::test]
    async fn history_mode_passes_sorted_files_and_flags() {
        let git = FakeGit {
            history: vec![
                "[ abc1234 ] 2024-03-01 09:15:02 +0100 | alice@example.com    | Fix parser",
                "[ 0ff1ce0 ] 2024-02-11 17:40:55 +0100 | bob@example.com      | Unrelated",
            ],
            ..FakeGit::default()
                .commit("abc1234", &["b.py"])
                .commit("bcd2345", &["a.py", "b.py"])
        };
        let lines = report(&git, "abc1234\nbcd2345\n", history(&["--author=alice"]))
            .await
            .unwrap();

        // Output is whatever git log printed, including commits outside the input.
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("[ 0ff1ce0 ]"));
        assert_eq!(
            git.calls().last().map(String::as_str),
            Some("log --author=alice -- a.py b.py")
        );
    }

    #[tokio::test]
    async fn history_mode_without_flags() {
        let git = FakeGit::default().commit("abc1234", &["x"]);
        let lines = report(&git, "abc1234\n", history(&[])).await.unwrap();
        assert!(lines.is_empty());
        assert_eq!(git.calls(), vec!["show abc1234", "log  -- x"]);
    }

    #[tokio::test]
    async fn failing_commit_yields_no_report() {
        let git = FakeGit {
            failing: Some("bcd2345"),
            ..FakeGit::default().commit("abc1234", &["a.py"])
        };
        let result = report(&git, "abc1234\nbcd2345\n", history(&[])).await;
        assert!(result.is_err());
        assert!(!git.calls().iter().any(|call| call.starts_with("log")));
    }

    #[test]
    fn writes_one_line_per_entry() {
        let mut out = Vec::new();
        write_report(&mut out, &["a.py".to_owned(), "b.py".to_owned()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a.py\nb.py\n");

        let mut out = Vec::new();
        write_report(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
