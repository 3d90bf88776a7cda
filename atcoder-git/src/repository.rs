use crate::error::Result;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::str::FromStr;

/// A version-controlled file tree whose history doubles as the record of what was synced.
pub trait Repository {
    /// Whether some commit touching `path` was authored at exactly `timestamp`.
    fn has_update(&self, path: &str, timestamp: u64) -> Result<bool>;

    /// Writes `content` to `path` and commits it with both dates set to `timestamp`.
    /// The commit is made even if the content did not change.
    fn update_file(&self, path: &str, timestamp: u64, content: &[u8], message: &str) -> Result<()>;
}

impl<R: Repository + ?Sized> Repository for &R {
    fn has_update(&self, path: &str, timestamp: u64) -> Result<bool> {
        (**self).has_update(path, timestamp)
    }

    fn update_file(&self, path: &str, timestamp: u64, content: &[u8], message: &str) -> Result<()> {
        (**self).update_file(path, timestamp, content, message)
    }
}

/// The identity recorded as both author and committer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GitUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid UTC offset {0:?}, expected [+-]HHMM")]
pub struct ParseUtcOffsetError(String);

/// A fixed UTC offset in git's `+HHMM` notation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UtcOffset {
    /// Minutes east of UTC.
    minutes: i32,
}

impl UtcOffset {
    pub const UTC: Self = Self { minutes: 0 };

    /// `timestamp` in git's raw date format, e.g. "1560046356 +0900".
    pub fn raw_date(self, timestamp: u64) -> String {
        format!("{} {}", timestamp, self)
    }
}

impl FromStr for UtcOffset {
    type Err = ParseUtcOffsetError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || ParseUtcOffsetError(s.to_owned());
        let (sign, digits) = match s.split_at_checked(1) {
            Some(("+", digits)) => (1, digits),
            Some(("-", digits)) => (-1, digits),
            _ => return Err(invalid()),
        };
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
        if hours > 23 || minutes > 59 {
            return Err(invalid());
        }
        Ok(Self {
            minutes: sign * (hours * 60 + minutes),
        })
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.minutes < 0 { '-' } else { '+' };
        let minutes = self.minutes.abs();
        write!(f, "{}{:02}{:02}", sign, minutes / 60, minutes % 60)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("Not inside a git work tree: {0:?}")]
    NotAWorkTree(PathBuf),

    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Unexpected line in `git log` output: {0:?}")]
    UnparsableLog(String),

    #[error("Not a relative path inside the repository: {0:?}")]
    InvalidPath(String),
}

/// A local git work tree, driven through the `git` command line.
#[derive(Debug)]
pub struct GitRepository {
    program: OsString,
    path: PathBuf,
    user: Option<GitUser>,
    utc_offset: UtcOffset,
}

impl GitRepository {
    /// Opens the work tree containing `path`, failing if there is none.
    /// Without a `user`, commits use the identity git is configured with.
    pub fn open(
        path: impl Into<PathBuf>,
        user: Option<GitUser>,
        utc_offset: UtcOffset,
    ) -> std::result::Result<Self, GitError> {
        Self::open_with_program("git", path, user, utc_offset)
    }

    pub fn open_with_program(
        program: impl Into<OsString>,
        path: impl Into<PathBuf>,
        user: Option<GitUser>,
        utc_offset: UtcOffset,
    ) -> std::result::Result<Self, GitError> {
        let repository = Self {
            program: program.into(),
            path: path.into(),
            user,
            utc_offset,
        };
        if !repository.is_inside_work_tree()? {
            return Err(GitError::NotAWorkTree(repository.path));
        }
        Ok(repository)
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null());
        command
    }

    fn describe(args: &[&str]) -> String {
        format!("git {}", args.first().copied().unwrap_or_default())
    }

    fn status(&self, args: &[&str]) -> std::result::Result<ExitStatus, GitError> {
        self.command(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| GitError::Spawn {
                command: Self::describe(args),
                source,
            })
    }

    /// Runs git to completion and returns its standard output, treating a non-zero exit as an error.
    fn run(
        &self,
        args: &[&str],
        envs: &[(&str, &str)],
    ) -> std::result::Result<Vec<u8>, GitError> {
        let command = Self::describe(args);
        let output = self
            .command(args)
            .envs(envs.iter().copied())
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(GitError::Failed {
                command,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        tracing::trace!("{}: {}", command, String::from_utf8_lossy(&output.stdout).trim());
        Ok(output.stdout)
    }

    fn is_inside_work_tree(&self) -> std::result::Result<bool, GitError> {
        // git refuses to start in a directory that doesn't exist, which also means "no"
        if !self.path.is_dir() {
            return Ok(false);
        }
        let args = ["rev-parse", "--is-inside-work-tree"];
        let output = self
            .command(&args)
            .stderr(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                command: Self::describe(&args),
                source,
            })?;
        // Inside the .git directory itself, git answers "false" and still exits with 0
        Ok(output.status.success() && output.stdout.trim_ascii() == b"true")
    }

    /// Whether the current branch has any commit yet; `git log` fails on an unborn branch.
    fn has_head(&self) -> std::result::Result<bool, GitError> {
        Ok(self
            .status(&["rev-parse", "--verify", "--quiet", "HEAD"])?
            .success())
    }

    fn add(&self, path: &str) -> std::result::Result<(), GitError> {
        self.run(&["add", "--", path], &[]).map(drop)
    }

    fn commit(&self, message: &str, timestamp: u64) -> std::result::Result<(), GitError> {
        let date = self.utc_offset.raw_date(timestamp);
        let mut envs = vec![
            ("GIT_AUTHOR_DATE", date.as_str()),
            ("GIT_COMMITTER_DATE", date.as_str()),
        ];
        if let Some(user) = &self.user {
            envs.extend([
                ("GIT_AUTHOR_NAME", user.name.as_str()),
                ("GIT_COMMITTER_NAME", user.name.as_str()),
                ("GIT_AUTHOR_EMAIL", user.email.as_str()),
                ("GIT_COMMITTER_EMAIL", user.email.as_str()),
            ]);
        }
        self.run(&["commit", "--allow-empty", "-m", message], &envs)
            .map(drop)
    }
}

fn check_relative(path: &str) -> std::result::Result<(), GitError> {
    let is_plain = !path.is_empty()
        && Path::new(path)
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if is_plain {
        Ok(())
    } else {
        Err(GitError::InvalidPath(path.to_owned()))
    }
}

impl Repository for GitRepository {
    #[tracing::instrument(skip(self))]
    fn has_update(&self, path: &str, timestamp: u64) -> Result<bool> {
        check_relative(path)?;
        if !self.has_head()? {
            return Ok(false);
        }
        let log = self.run(
            &["log", "--pretty=format:%ad", "--date=raw", "--", path],
            &[],
        )?;
        for line in String::from_utf8_lossy(&log).lines() {
            let epoch: u64 = line
                .split_whitespace()
                .next()
                .and_then(|field| field.parse().ok())
                .ok_or_else(|| GitError::UnparsableLog(line.to_owned()))?;
            if epoch == timestamp {
                return Ok(true);
            }
        }
        Ok(false)
    }

    #[tracing::instrument(skip(self, content, message), fields(bytes = content.len()))]
    fn update_file(&self, path: &str, timestamp: u64, content: &[u8], message: &str) -> Result<()> {
        check_relative(path)?;
        let actual_path = self.path.join(path);
        if let Some(parent) = actual_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&actual_path, content)?;

        self.add(path)?;
        self.commit(message, timestamp)?;
        Ok(())
    }
}
