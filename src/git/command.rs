use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Stdio;

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::git::{GitQuery, log_args, parse_name_only, show_args};
use crate::input::CommitId;
use crate::{AppError, AppResult};

/// Runs `git` (or a stand-in program) as a child process, one call at a time.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    repo: Option<PathBuf>,
}

impl GitCli {
    pub fn new(program: impl Into<String>, repo: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            repo,
        }
    }

    fn render(&self, args: &[String]) -> String {
        let mut rendered = self.program.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    /// Run the program with `args` and return its stdout with trailing
    /// whitespace removed. A non-zero exit is an [`AppError::ExternalCommand`].
    #[tracing::instrument(
        name = "Running git",
        level = "info",
        skip_all,
        fields(subcommand = args.first().map(String::as_str).unwrap_or_default())
    )]
    pub async fn run(&self, args: &[String]) -> AppResult<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(repo) = &self.repo {
            cmd.current_dir(repo);
        }
        debug!("Running {}", self.render(args));

        let output = cmd.output().await.map_err(|source| AppError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        trace!("{} exited with {}", self.program, output.status);

        if !output.status.success() {
            return Err(AppError::ExternalCommand {
                command: self.render(args),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            });
        }

        let mut stdout = String::from_utf8(output.stdout)?;
        stdout.truncate(stdout.trim_end().len());
        Ok(stdout)
    }
}

impl GitQuery for GitCli {
    fn files_changed_by<'a>(
        &'a self,
        commit: &'a CommitId,
    ) -> BoxFuture<'a, AppResult<BTreeSet<String>>> {
        Box::pin(async move {
            let output = self.run(&show_args(commit)).await?;
            Ok(parse_name_only(&output))
        })
    }

    fn history_of_files<'a>(
        &'a self,
        files: &'a [String],
        log_flags: &'a [String],
    ) -> BoxFuture<'a, AppResult<Vec<String>>> {
        Box::pin(async move {
            let output = self.run(&log_args(files, log_flags)).await?;
            Ok(output.lines().map(str::to_owned).collect())
        })
    }
}
