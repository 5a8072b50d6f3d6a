use std::fmt::Display;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Args, ColorChoice, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::aot::{Generator, Shell, generate};
use clap_complete_nushell::Nushell;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tokio::io::BufReader;
use tracing::info;

use crate::AppResult;
use crate::git::GitCli;
use crate::report::{ReportMode, generate_report, write_report};

const STYLES: Styles = Styles::styled()
    .header(Style::new().bold())
    .usage(Style::new().bold())
    .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))))
    .literal(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Green))),
    )
    .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))))
    .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
    .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightRed))))
    .context(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Magenta))))
    .context_value(
        Style::new()
            .bold()
            .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
    );

/// Long-form CLI description shown in `--help`.
const LONG_ABOUT: &str = "git-touched - list the files a set of commits touched

Commit hashes are read from standard input, one per line. Any line containing
a lowercase hex run of 7 to 40 characters contributes that run; other lines
are ignored, so the output of `git log --oneline` can be piped in directly.

By default the sorted list of touched files is printed. With `--commits`, the
history of those files is printed instead, one line per commit:

    [ <short hash> ] <date> | <author email> | <subject>";

/// List the files touched by a set of commits, or the history of those files.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    propagate_version = true,
    about,
    long_about = Some(LONG_ABOUT),
    styles = STYLES,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    /// Color choice for diagnostics
    #[arg(long, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Optional subcommand; without one the report is produced
    #[command(subcommand)]
    pub cmd: Option<Cmd>,
}

/// Options for the touched-files report.
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// List the commits that touched the files instead of the files themselves
    ///
    /// Every argument after this flag is handed to `git log` unchanged, so it
    /// must come last. Example: `--commits --since=2.weeks --no-merges`
    #[arg(
        long,
        value_name = "GIT_LOG_FLAGS",
        num_args = 0..,
        allow_hyphen_values = true
    )]
    pub commits: Option<Vec<String>>,

    /// Run git inside this directory instead of the current one
    #[arg(short = 'C', long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// The git executable to invoke
    #[arg(long, value_name = "PROGRAM", default_value = "git")]
    pub git: String,
}

/// Top-level commands supported by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Cmd {
    /// Generate shell completion for a given shell
    Completion {
        /// Output file to write the completion script to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The shell to generate the completion for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

/// Supported completion targets for shell auto-completion.
#[derive(ValueEnum, Clone, Debug)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
    Nushell,
}

impl Display for CompletionShell {
    /// Render the canonical shell name string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CompletionShell::Bash => "bash",
            CompletionShell::Zsh => "zsh",
            CompletionShell::Fish => "fish",
            CompletionShell::PowerShell => "powershell",
            CompletionShell::Elvish => "elvish",
            CompletionShell::Nushell => "nushell",
        };
        write!(f, "{}", s)
    }
}

impl Generator for &CompletionShell {
    fn generate(&self, cmd: &clap::builder::Command, buf: &mut dyn Write) {
        match self {
            CompletionShell::Bash => Shell::Bash.generate(cmd, buf),
            CompletionShell::Zsh => Shell::Zsh.generate(cmd, buf),
            CompletionShell::Fish => Shell::Fish.generate(cmd, buf),
            CompletionShell::PowerShell => Shell::PowerShell.generate(cmd, buf),
            CompletionShell::Elvish => Shell::Elvish.generate(cmd, buf),
            CompletionShell::Nushell => Nushell.generate(cmd, buf),
        }
    }

    fn file_name(&self, name: &str) -> String {
        match self {
            CompletionShell::Bash => Shell::Bash.file_name(name),
            CompletionShell::Zsh => Shell::Zsh.file_name(name),
            CompletionShell::Fish => Shell::Fish.file_name(name),
            CompletionShell::PowerShell => Shell::PowerShell.file_name(name),
            CompletionShell::Elvish => Shell::Elvish.file_name(name),
            CompletionShell::Nushell => Nushell.file_name(name),
        }
    }
}

impl Cli {
    /// Whether diagnostics on stderr should carry ANSI colors.
    pub fn use_ansi(&self) -> bool {
        match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::stderr().is_terminal(),
        }
    }

    /// Execute the chosen command.
    #[tracing::instrument(name = "Running command", level = "info", skip(self))]
    pub async fn run(&self) -> AppResult<()> {
        match &self.cmd {
            Some(Cmd::Completion { shell, output }) => write_completion(shell, output.as_deref()),
            None => self.report.run().await,
        }
    }
}

impl ReportArgs {
    pub fn mode(&self) -> ReportMode {
        match &self.commits {
            Some(log_flags) => ReportMode::History {
                log_flags: log_flags.clone(),
            },
            None => ReportMode::Files,
        }
    }

    pub fn git_cli(&self) -> GitCli {
        GitCli::new(self.git.clone(), self.repo.clone())
    }

    /// Read hashes from stdin and print the report to stdout.
    async fn run(&self) -> AppResult<()> {
        let git = self.git_cli();
        let input = BufReader::new(tokio::io::stdin());
        let lines = generate_report(&git, input, &self.mode()).await?;
        tracing_indicatif::suspend_tracing_indicatif(|| {
            write_report(&mut std::io::stdout().lock(), &lines)
        })
    }
}

fn write_completion(shell: &CompletionShell, output: Option<&Path>) -> AppResult<()> {
    let mut cmd = Cli::command();
    if let Some(output_path) = output {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(output_path)?;
        // Write completion script to the requested file.
        generate(shell, &mut cmd, "git-touched", &mut file);
        info!(
            "Generated completion script for {} at {}",
            shell,
            output_path.display()
        );
    } else {
        generate(shell, &mut cmd, "git-touched", &mut std::io::stdout());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("git-touched").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plain_invocation_lists_files() {
        let cli = parse(&[]);
        assert!(cli.cmd.is_none());
        assert_eq!(cli.report.mode(), ReportMode::Files);
        assert_eq!(cli.report.git, "git");
        assert!(cli.report.repo.is_none());
    }

    #[test]
    fn commits_without_flags() {
        let cli = parse(&["--commits"]);
        assert_eq!(
            cli.report.mode(),
            ReportMode::History { log_flags: vec![] }
        );
    }

    #[test]
    fn commits_captures_remaining_arguments_verbatim() {
        let cli = parse(&[
            "-C",
            "/tmp/repo",
            "--commits",
            "--author=alice",
            "--since",
            "2 weeks",
            "-n",
            "5",
        ]);
        assert_eq!(cli.report.repo, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(
            cli.report.mode(),
            ReportMode::History {
                log_flags: ["--author=alice", "--since", "2 weeks", "-n", "5"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }
        );
    }

    #[test]
    fn custom_git_program() {
        let cli = parse(&["--git", "/usr/local/bin/git"]);
        assert_eq!(cli.report.git, "/usr/local/bin/git");
    }

    #[test]
    fn completion_subcommand() {
        let cli = parse(&["completion", "zsh"]);
        match cli.cmd {
            Some(Cmd::Completion { shell, output }) => {
                assert_eq!(shell.to_string(), "zsh");
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn completion_script_mentions_binary() {
        let mut cmd = Cli::command();
        let mut buf = Vec::new();
        generate(&CompletionShell::Bash, &mut cmd, "git-touched", &mut buf);
        assert!(String::from_utf8(buf).unwrap().contains("git-touched"));
    }
}
