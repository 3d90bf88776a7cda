mod problems_api;

pub use problems_api::{AtCoderProblemsClient, DEFAULT_PROBLEMS_BASE_URL};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A single judged submission, as reported by AtCoder Problems.
/// Schema: https://github.com/kenkoooo/AtCoderProblems/blob/master/doc/api.md
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    /// The number of seconds from the Unix Epoch to the moment of submission.
    pub epoch_second: u64,
    pub problem_id: String,
    pub contest_id: String,
    pub user_id: String,
    /// Free-text language label, e.g. "C++14 (GCC 9.2.1)".
    pub language: String,
    pub point: f64,
    pub length: u64,
    /// The verdict, e.g. "AC" or "WA".
    pub result: String,
    pub execution_time: Option<u64>,
    /// The submitted code, when the data source embeds it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_code: Option<String>,
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        self.result == "AC"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub id: String,
    pub contest_id: String,
    pub problem_index: String,
    pub name: String,
    pub title: String,
}

/// Associates a problem with one contest it appeared in. A problem may appear in several.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestProblem {
    pub contest_id: String,
    pub problem_id: String,
    /// The alphabet label of the problem within the contest, e.g. "A" or "Ex".
    pub problem_index: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub start_epoch_second: u64,
    pub duration_second: u64,
    pub title: String,
    /// Which ratings the contest changes, e.g. " ~ 1999" or "All"; "-" when unrated.
    pub rate_change: String,
}

impl Contest {
    pub fn is_rated(&self) -> bool {
        self.rate_change != "-"
    }

    pub fn end_epoch_second(&self) -> u64 {
        self.start_epoch_second.saturating_add(self.duration_second)
    }
}

/// A read-only view of a user's submission history plus the reference tables
/// needed to place submissions in the repository.
pub trait SubmissionSource {
    /// One page of `user`'s submissions made at or after `from_second`,
    /// in non-decreasing order of `epoch_second`. An empty page means there are no more.
    fn list_submissions_from(&self, user: &str, from_second: u64) -> Result<Vec<Submission>>;

    fn list_problems(&self) -> Result<Vec<Problem>>;

    fn list_contest_problems(&self) -> Result<Vec<ContestProblem>>;

    fn list_contests(&self) -> Result<Vec<Contest>>;

    /// Every submission of `user`, following pages until an empty one comes back.
    /// Each page resumes one second after the latest timestamp seen, so no submission
    /// is received twice as long as the source honours `from_second`.
    fn list_all_submissions(&self, user: &str) -> Result<Vec<Submission>> {
        let mut result = vec![];
        let mut from_second = 0;
        loop {
            let page = self.list_submissions_from(user, from_second)?;
            let Some(latest) = page.iter().map(|sub| sub.epoch_second).max() else {
                return Ok(result);
            };
            tracing::debug!(
                "Fetched {} submissions of {} from second {}",
                page.len(),
                user,
                from_second
            );
            from_second = latest + 1;
            result.extend(page);
        }
    }
}

impl<S: SubmissionSource + ?Sized> SubmissionSource for &S {
    fn list_submissions_from(&self, user: &str, from_second: u64) -> Result<Vec<Submission>> {
        (**self).list_submissions_from(user, from_second)
    }

    fn list_problems(&self) -> Result<Vec<Problem>> {
        (**self).list_problems()
    }

    fn list_contest_problems(&self) -> Result<Vec<ContestProblem>> {
        (**self).list_contest_problems()
    }

    fn list_contests(&self) -> Result<Vec<Contest>> {
        (**self).list_contests()
    }
}
