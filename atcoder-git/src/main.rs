use anyhow::Context;
use atcoder_git::configuration::{Settings, get_configuration};
use atcoder_git::data_processing::AtCoderProblemsClient;
use atcoder_git::detail::{DetailSource, DetailSourceKind, EmbeddedDetailSource, HtmlDetailSource};
use atcoder_git::repository::{GitRepository, GitUser, UtcOffset};
use atcoder_git::sync::SyncDriver;
use atcoder_git::telemetry::{get_subscriber, init_subscriber};
use clap::Parser;
use reqwest::blocking::Client;
use std::path::PathBuf;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build a git repository from a user's accepted AtCoder submissions,
/// one commit per submission, dated at the time it was submitted.
///
/// Safe to re-run: submissions already in the history are skipped.
#[derive(Parser)]
#[command(name = "atcoder-git", version)]
struct Cli {
    /// Commit as this author and committer instead of the repository's configured identity
    #[arg(long, num_args = 2, value_names = ["NAME", "EMAIL"])]
    identity: Option<Vec<String>>,

    /// UTC offset recorded with commit dates
    #[arg(long, default_value = "+0900", allow_hyphen_values = true)]
    utc_offset: UtcOffset,

    /// Log every request and skipped submission
    #[arg(short, long)]
    verbose: bool,

    /// An existing git work tree to commit into
    repo_dir: PathBuf,

    /// The AtCoder user whose submissions are mirrored
    username: String,
}

impl Cli {
    fn git_user(&self) -> Option<GitUser> {
        match self.identity.as_deref() {
            Some([name, email]) => Some(GitUser {
                name: name.clone(),
                email: email.clone(),
            }),
            _ => None,
        }
    }
}

fn detail_source(settings: &Settings, client: Client) -> Box<dyn DetailSource> {
    match settings.detail.source {
        DetailSourceKind::Html => Box::new(HtmlDetailSource::new(
            client,
            settings.api.atcoder_base_url.clone(),
            settings.api.atcoder_interval(),
        )),
        DetailSourceKind::Embedded => {
            Box::new(EmbeddedDetailSource::new(settings.api.atcoder_base_url.clone()))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "info,atcoder_git=debug" } else { "info" };
    init_subscriber(get_subscriber(default_filter.into(), std::io::stderr))
        .context("Failed to set up logging")?;

    let settings = get_configuration().context("Failed to read configuration")?;

    let repository = GitRepository::open_with_program(
        &settings.git.program,
        &cli.repo_dir,
        cli.git_user(),
        cli.utc_offset,
    )
    .with_context(|| format!("Cannot use {:?} as the target repository", cli.repo_dir))?;

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build the HTTP client")?;
    let source = AtCoderProblemsClient::new(
        client.clone(),
        settings.api.problems_base_url.clone(),
        settings.api.problems_interval(),
    );
    let details = detail_source(&settings, client);

    SyncDriver::new(source, details)
        .sync(&repository, &cli.username)
        .with_context(|| format!("Failed to sync the submissions of {}", cli.username))?;
    Ok(())
}
