use crate::data_processing::Submission;
use crate::error::{Error, Result};
use crate::rate_limit::RateLimiter;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use reqwest::blocking::Client;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_ATCODER_BASE_URL: &str = "https://atcoder.jp";

/// The `id` of the `<pre>` element holding the code on a submission page.
const SUBMISSION_CODE_ID: &str = "submission-code";

/// Everything needed to record one submission; fetched on demand and never cached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionDetail {
    /// The human-readable submission page.
    pub url: String,
    pub source_code: Vec<u8>,
}

pub fn submission_url(base_url: &str, contest_id: &str, submission_id: u64) -> String {
    format!(
        "{}/contests/{}/submissions/{}",
        base_url.trim_end_matches('/'),
        contest_id,
        submission_id
    )
}

/// Retrieves the source code of a submission.
pub trait DetailSource {
    fn get_detail(&self, submission: &Submission) -> Result<SubmissionDetail>;
}

impl<D: DetailSource + ?Sized> DetailSource for &D {
    fn get_detail(&self, submission: &Submission) -> Result<SubmissionDetail> {
        (**self).get_detail(submission)
    }
}

impl<D: DetailSource + ?Sized> DetailSource for Box<D> {
    fn get_detail(&self, submission: &Submission) -> Result<SubmissionDetail> {
        (**self).get_detail(submission)
    }
}

/// Which `DetailSource` to use, chosen once from configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailSourceKind {
    /// Scrape the submission page on atcoder.jp.
    #[default]
    Html,
    /// Use the code already carried by the submission record.
    Embedded,
}

/// Reads the code off the submission's page on atcoder.jp.
pub struct HtmlDetailSource {
    client: Client,
    base_url: String,
    limiter: RateLimiter,
}

impl HtmlDetailSource {
    pub fn new(client: Client, base_url: impl Into<String>, interval: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            limiter: RateLimiter::new(interval),
        }
    }
}

impl DetailSource for HtmlDetailSource {
    fn get_detail(&self, submission: &Submission) -> Result<SubmissionDetail> {
        let url = submission_url(&self.base_url, &submission.contest_id, submission.id);
        let page = self.limiter.call(|| -> Result<Vec<u8>> {
            tracing::debug!("GET {}", url);
            let response = self.client.get(&url).send()?.error_for_status()?;
            Ok(response.bytes()?.to_vec())
        })?;
        // Pages are UTF-8 whatever the response headers claim
        let page_text = std::str::from_utf8(&page)?;
        let source_code = extract_submitted_code(page_text)?.into_bytes();
        Ok(SubmissionDetail { url, source_code })
    }
}

/// Takes the code from the submission record itself, for data sources that embed it.
pub struct EmbeddedDetailSource {
    base_url: String,
}

impl EmbeddedDetailSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl DetailSource for EmbeddedDetailSource {
    fn get_detail(&self, submission: &Submission) -> Result<SubmissionDetail> {
        let source_code = submission
            .source_code
            .as_ref()
            .ok_or(Error::MissingSourceCode(submission.id))?;
        Ok(SubmissionDetail {
            url: submission_url(&self.base_url, &submission.contest_id, submission.id),
            source_code: source_code.clone().into_bytes(),
        })
    }
}

/// Ways a submission page can fail to look like we expect.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("no <pre id=\"submission-code\"> block found")]
    NeverOpened,
    #[error("code block was never closed")]
    NotClosed,
    #[error("a second code block opened inside the first")]
    NestedBlock,
    #[error("more than one code block on the page")]
    DuplicateBlock,
    #[error("unexpected tag {0} inside the code block")]
    UnexpectedTag(String),
    #[error("bad character reference in the code block: {0}")]
    BadReference(String),
}

type ExtractResult<T> = std::result::Result<T, ExtractError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExtractState {
    Before,
    Inside,
    After,
}

/// Collects the text of the single `<pre id="submission-code">` block from a stream of
/// tags and raw text. The block must hold nothing but text.
pub struct CodeBlockExtractor {
    state: ExtractState,
    code: String,
}

impl Default for CodeBlockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeBlockExtractor {
    pub fn new() -> Self {
        Self {
            state: ExtractState::Before,
            code: String::new(),
        }
    }

    pub fn start_tag(&mut self, name: &str, id: Option<&str>) -> ExtractResult<()> {
        let opens_block = name == "pre" && id == Some(SUBMISSION_CODE_ID);
        match self.state {
            ExtractState::Inside if opens_block => Err(ExtractError::NestedBlock),
            ExtractState::Inside => Err(ExtractError::UnexpectedTag(format!("<{}>", name))),
            ExtractState::After if opens_block => Err(ExtractError::DuplicateBlock),
            ExtractState::Before if opens_block => {
                self.state = ExtractState::Inside;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn end_tag(&mut self, name: &str) -> ExtractResult<()> {
        if self.state == ExtractState::Inside {
            if name != "pre" {
                return Err(ExtractError::UnexpectedTag(format!("</{}>", name)));
            }
            self.state = ExtractState::After;
        }
        Ok(())
    }

    /// Takes text as it appears in the page. Inside the block, character references
    /// are decoded and everything else is kept byte for byte.
    pub fn text(&mut self, raw: &str) -> ExtractResult<()> {
        if self.state == ExtractState::Inside {
            let decoded = unescape_with(raw, resolve_html5_entity)
                .map_err(|err| ExtractError::BadReference(err.to_string()))?;
            self.code.push_str(&decoded);
        }
        Ok(())
    }

    /// The collected code, available only once the block has been closed.
    pub fn finish(self) -> ExtractResult<String> {
        match self.state {
            ExtractState::Before => Err(ExtractError::NeverOpened),
            ExtractState::Inside => Err(ExtractError::NotClosed),
            ExtractState::After => Ok(self.code),
        }
    }
}

/// Comments, declarations, end tags and start tags. Quoted attribute values may contain `>`.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<[!?][^>]*>|</([A-Za-z][^\s/>]*)[^>]*>|<([A-Za-z][^\s/>]*)((?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("markup pattern is valid")
});

static ID_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s/])(?i:id)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("id attribute pattern is valid")
});

static RAW_TEXT_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(script|style)[^>]*>").expect("raw text end pattern is valid")
});

/// A lexical piece of an HTML page. Text is exactly as written: no newline
/// normalization and no character references decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Token<'a> {
    StartTag { name: String, id: Option<&'a str> },
    EndTag { name: String },
    Text(&'a str),
}

fn id_attribute(attributes: &str) -> Option<&str> {
    let caps = ID_ATTRIBUTE.captures(attributes)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|value| value.as_str())
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = vec![];
    let mut pos = 0;
    while let Some(caps) = MARKUP.captures_at(html, pos) {
        let Some(markup) = caps.get(0) else { break };
        if markup.start() > pos {
            tokens.push(Token::Text(&html[pos..markup.start()]));
        }
        pos = markup.end();

        if let Some(name) = caps.get(1) {
            tokens.push(Token::EndTag {
                name: name.as_str().to_ascii_lowercase(),
            });
        } else if let Some(name) = caps.get(2) {
            let name = name.as_str().to_ascii_lowercase();
            let id = caps.get(3).and_then(|attributes| id_attribute(attributes.as_str()));
            let is_raw_text = matches!(name.as_str(), "script" | "style");
            tokens.push(Token::StartTag {
                name: name.clone(),
                id,
            });
            if is_raw_text {
                // Script and style bodies are text up to the matching end tag, whatever they contain
                let end = RAW_TEXT_END
                    .captures_iter(&html[pos..])
                    .find(|end| end[1].eq_ignore_ascii_case(&name))
                    .and_then(|end| end.get(0));
                let body_end = end.map_or(html.len(), |end| pos + end.start());
                if body_end > pos {
                    tokens.push(Token::Text(&html[pos..body_end]));
                }
                match end {
                    Some(end) => {
                        tokens.push(Token::EndTag { name });
                        pos += end.end();
                    }
                    None => pos = html.len(),
                }
            }
        }
    }
    if pos < html.len() {
        tokens.push(Token::Text(&html[pos..]));
    }
    tokens
}

/// Extracts the submitted code from a submission page exactly as submitted,
/// with only character references decoded.
pub fn extract_submitted_code(html: &str) -> ExtractResult<String> {
    let mut extractor = CodeBlockExtractor::new();
    for token in tokenize(html) {
        match token {
            Token::StartTag { name, id } => extractor.start_tag(&name, id)?,
            Token::EndTag { name } => extractor.end_tag(&name)?,
            Token::Text(raw) => extractor.text(raw)?,
        }
    }
    extractor.finish()
}
