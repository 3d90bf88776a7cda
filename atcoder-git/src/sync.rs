use crate::data_processing::{Submission, SubmissionSource};
use crate::detail::DetailSource;
use crate::error::Result;
use crate::path_resolver::PathResolver;
use crate::repository::Repository;
use chrono::DateTime;

/// What a sync run did with each submission it saw.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub committed: usize,
    pub already_recorded: usize,
    pub not_accepted: usize,
}

fn utc_date(epoch_second: u64) -> String {
    i64::try_from(epoch_second)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|date| date.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_second.to_string())
}

/// Mirrors a user's accepted submissions into a repository, one commit each.
pub struct SyncDriver<S, D> {
    source: S,
    details: D,
}

impl<S: SubmissionSource, D: DetailSource> SyncDriver<S, D> {
    pub fn new(source: S, details: D) -> Self {
        Self { source, details }
    }

    /// Commits every accepted submission of `username` that the repository doesn't record yet,
    /// oldest first, so the commit order follows the submission times. Running it again with
    /// nothing new on the remote side commits nothing.
    #[tracing::instrument(skip(self, repository))]
    pub fn sync(&self, repository: &impl Repository, username: &str) -> Result<SyncReport> {
        let mut submissions = self.source.list_all_submissions(username)?;
        submissions.sort_by_key(|sub| sub.epoch_second);
        tracing::info!("Found {} submissions by {}", submissions.len(), username);

        let resolver = PathResolver::from_source(&self.source)?;
        let mut report = SyncReport::default();
        for submission in &submissions {
            if !submission.is_accepted() {
                tracing::debug!("Skipping submission {} ({})", submission.id, submission.result);
                report.not_accepted += 1;
                continue;
            }
            let path = resolver.resolve(submission)?;
            if repository.has_update(&path, submission.epoch_second)? {
                tracing::debug!("Submission {} is already recorded at {}", submission.id, path);
                report.already_recorded += 1;
                continue;
            }
            self.record(repository, submission, &path)?;
            report.committed += 1;
        }

        tracing::info!(
            "Committed {} submissions; {} were already recorded and {} were not accepted",
            report.committed,
            report.already_recorded,
            report.not_accepted,
        );
        Ok(report)
    }

    fn record(&self, repository: &impl Repository, submission: &Submission, path: &str) -> Result<()> {
        let detail = self.details.get_detail(submission)?;
        let message = format!("Update {}\n\n{}", path, detail.url);
        repository.update_file(path, submission.epoch_second, &detail.source_code, &message)?;
        tracing::info!(
            "Recorded submission {} ({}) at {}",
            submission.id,
            utc_date(submission.epoch_second),
            path
        );
        Ok(())
    }
}
