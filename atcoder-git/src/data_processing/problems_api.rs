use super::{Contest, ContestProblem, Problem, Submission, SubmissionSource};
use crate::error::Result;
use crate::rate_limit::RateLimiter;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::cell::OnceCell;
use std::time::Duration;

pub const DEFAULT_PROBLEMS_BASE_URL: &str = "https://kenkoooo.com/atcoder";

/// Client for the AtCoder Problems API.
/// Documentation: https://github.com/kenkoooo/AtCoderProblems/blob/master/doc/api.md
///
/// All endpoints share one rate limiter, as the API's usage policy asks
/// for at least a second between any two requests.
pub struct AtCoderProblemsClient {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
    problems: OnceCell<Vec<Problem>>,
    contest_problems: OnceCell<Vec<ContestProblem>>,
    contests: OnceCell<Vec<Contest>>,
}

impl AtCoderProblemsClient {
    pub fn new(client: Client, base_url: impl Into<String>, interval: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            client,
            base_url,
            limiter: RateLimiter::new(interval),
            problems: OnceCell::new(),
            contest_problems: OnceCell::new(),
            contests: OnceCell::new(),
        }
    }

    fn submissions_url(&self) -> String {
        format!("{}/atcoder-api/v3/user/submissions", self.base_url)
    }

    fn resource_url(&self, resource: &str) -> String {
        format!("{}/resources/{}", self.base_url, resource)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.limiter.call(|| -> Result<T> {
            tracing::debug!("GET {} {:?}", url, query);
            let response = self
                .client
                .get(url)
                .query(query)
                .send()?
                .error_for_status()?;
            Ok(response.json()?)
        })
    }

    /// The reference tables never change during a run, so each is fetched at most once.
    fn get_resource<T: Clone + DeserializeOwned>(
        &self,
        cell: &OnceCell<Vec<T>>,
        resource: &str,
    ) -> Result<Vec<T>> {
        if let Some(cached) = cell.get() {
            return Ok(cached.clone());
        }
        let fetched: Vec<T> = self.get_json(&self.resource_url(resource), &[])?;
        tracing::info!("Fetched {} entries of {}", fetched.len(), resource);
        Ok(cell.get_or_init(|| fetched).clone())
    }
}

impl SubmissionSource for AtCoderProblemsClient {
    fn list_submissions_from(&self, user: &str, from_second: u64) -> Result<Vec<Submission>> {
        let query = [
            ("user", user.to_owned()),
            ("from_second", from_second.to_string()),
        ];
        self.get_json(&self.submissions_url(), &query)
    }

    fn list_problems(&self) -> Result<Vec<Problem>> {
        self.get_resource(&self.problems, "problems.json")
    }

    fn list_contest_problems(&self) -> Result<Vec<ContestProblem>> {
        self.get_resource(&self.contest_problems, "contest-problem.json")
    }

    fn list_contests(&self) -> Result<Vec<Contest>> {
        self.get_resource(&self.contests, "contests.json")
    }
}
