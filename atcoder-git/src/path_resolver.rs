use crate::data_processing::{Contest, ContestProblem, Submission, SubmissionSource};
use crate::error::{Error, Result};
use crate::language::extension_for_language;
use std::collections::HashMap;

/// Orders the contests a problem appeared in: rated before unrated, then the earliest
/// to end, then by id. Contests missing from the contest table come last.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct ContestRank<'a> {
    tier: u8,
    end_epoch_second: u64,
    contest_id: &'a str,
}

/// Maps submissions to repository paths of the form `{contest}/{problem index}/Main{ext}`.
///
/// Built once per run from a snapshot of the reference tables.
pub struct PathResolver {
    contest_problems: HashMap<String, Vec<ContestProblem>>,
    contests: HashMap<String, Contest>,
}

impl PathResolver {
    pub fn new(contests: Vec<Contest>, contest_problems: Vec<ContestProblem>) -> Self {
        let mut by_problem: HashMap<String, Vec<ContestProblem>> = HashMap::new();
        for contest_problem in contest_problems {
            by_problem
                .entry(contest_problem.problem_id.clone())
                .or_default()
                .push(contest_problem);
        }
        let contests = contests
            .into_iter()
            .map(|contest| (contest.id.clone(), contest))
            .collect();
        Self {
            contest_problems: by_problem,
            contests,
        }
    }

    pub fn from_source(source: &impl SubmissionSource) -> Result<Self> {
        Ok(Self::new(
            source.list_contests()?,
            source.list_contest_problems()?,
        ))
    }

    fn rank<'a>(&'a self, contest_id: &'a str) -> ContestRank<'a> {
        match self.contests.get(contest_id) {
            Some(contest) => ContestRank {
                tier: if contest.is_rated() { 0 } else { 1 },
                end_epoch_second: contest.end_epoch_second(),
                contest_id,
            },
            None => ContestRank {
                tier: 2,
                end_epoch_second: u64::MAX,
                contest_id,
            },
        }
    }

    /// The primary contest appearance of a problem.
    pub fn lookup_contest_problem(&self, problem_id: &str) -> Result<&ContestProblem> {
        self.contest_problems
            .get(problem_id)
            .and_then(|candidates| {
                candidates
                    .iter()
                    .min_by_key(|&cprob| self.rank(&cprob.contest_id))
            })
            .ok_or_else(|| Error::UnknownProblem(problem_id.to_owned()))
    }

    pub fn resolve(&self, submission: &Submission) -> Result<String> {
        let contest_problem = self.lookup_contest_problem(&submission.problem_id)?;
        let ext = extension_for_language(&submission.language)
            .ok_or_else(|| Error::UnknownLanguage(submission.language.clone()))?;
        Ok(format!(
            "{}/{}/Main{}",
            contest_problem.contest_id, contest_problem.problem_index, ext
        ))
    }
}
