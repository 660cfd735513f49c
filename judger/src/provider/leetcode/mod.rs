//! Backend talking to leetcode.com (or anything speaking the same API).
//!
//! Fetching problems needs no login. Running tests and submitting need the
//! browser session cookie and CSRF token, see [`LeetCodeProvider::auth_help`].

mod content;
mod model;

pub use self::content::{html_to_text, parse_content, ParsedContent};
pub use self::model::parse_meta_data;

use self::model::*;
use super::{
    Authenticator, JudgeError, JudgeResult, Poll, PollPolicy, ProblemDescriptor, Provider,
    SubmitOutcome, Submitter, TestOutcome, Tester,
};
use crate::{config::ClientConfig, judge::normalize::CheckResponse};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{borrow::Cow, collections::HashMap, fmt, time::Duration};

pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Session cookie and CSRF token. Both or neither.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    session: String,
    csrf_token: String,
}

impl Credentials {
    /// `None` unless both parts are non-empty.
    pub fn new(session: impl Into<String>, csrf_token: impl Into<String>) -> Option<Credentials> {
        let session = session.into();
        let csrf_token = csrf_token.into();
        if session.is_empty() || csrf_token.is_empty() {
            None
        } else {
            Some(Credentials {
                session,
                csrf_token,
            })
        }
    }

    pub fn cookie(&self) -> String {
        format!(
            "LEETCODE_SESSION={}; csrftoken={}",
            self.session, self.csrf_token
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").finish_non_exhaustive()
    }
}

pub struct LeetCodeProvider {
    client: reqwest::Client,
    base_url: String,
    session_env: String,
    csrf_env: String,
    /// Credentials written in the config file, used when the environment has none.
    configured: Option<Credentials>,
    credentials: Option<Credentials>,
    poll_interval: Duration,
    poll_timeout: Duration,
    /// Slug to numeric question id.
    question_ids: HashMap<String, String>,
}

impl LeetCodeProvider {
    pub const NAME: &'static str = "leetcode";

    pub fn new(cfg: &ClientConfig) -> JudgeResult<LeetCodeProvider> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(cfg.request_timeout())
            .build()?;
        Ok(LeetCodeProvider {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_owned(),
            session_env: cfg.session_env.clone(),
            csrf_env: cfg.csrf_env.clone(),
            configured: Credentials::new(
                cfg.session.clone().unwrap_or_default(),
                cfg.csrf_token.clone().unwrap_or_default(),
            ),
            credentials: None,
            poll_interval: cfg.poll_interval(),
            poll_timeout: cfg.poll_timeout(),
            question_ids: HashMap::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn graphql_endpoint(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn interpret_endpoint(&self, slug: &str) -> String {
        format!("{}/problems/{}/interpret_solution/", self.base_url, slug)
    }

    pub fn submit_endpoint(&self, slug: &str) -> String {
        format!("{}/problems/{}/submit/", self.base_url, slug)
    }

    pub fn check_endpoint(&self, handle: &str) -> String {
        format!("{}/submissions/detail/{}/check/", self.base_url, handle)
    }

    /// The cached numeric id for `slug`, if any.
    pub fn cached_question_id(&self, slug: &str) -> Option<&str> {
        self.question_ids.get(slug).map(|s| s.as_str())
    }

    /// Load credentials through `lookup`, which maps a variable name to its
    /// value. Falls back to the config file when either variable is unset.
    pub fn authenticate_from<F>(&mut self, lookup: F) -> JudgeResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = Credentials::new(
            lookup(&self.session_env).unwrap_or_default(),
            lookup(&self.csrf_env).unwrap_or_default(),
        );
        self.credentials = from_env.or_else(|| self.configured.clone());
        if self.credentials.is_some() {
            tracing::info!("Authenticated with LeetCode credentials");
            Ok(())
        } else {
            Err(JudgeError::MissingCredentials(format!(
                "set {} and {} env vars",
                self.session_env, self.csrf_env
            )))
        }
    }

    fn require_auth(&self) -> JudgeResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or_else(|| JudgeError::NotAuthenticated(self.auth_help()))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    fn authed_request(&self, method: Method, url: &str) -> JudgeResult<RequestBuilder> {
        let creds = self.require_auth()?;
        Ok(self
            .request(method, url)
            .header("Cookie", creds.cookie())
            .header("X-CSRFToken", &creds.csrf_token)
            .header("Referer", &self.base_url))
    }

    async fn send<R: DeserializeOwned>(&self, req: RequestBuilder) -> JudgeResult<R> {
        let res = req.send().await?;
        let status = res.status();
        let endpoint = res.url().path().to_owned();
        let body = res.text().await?;
        if !status.is_success() {
            tracing::warn!("{} returned {}", endpoint, status);
            return Err(JudgeError::Http {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Numeric question id for `slug`, from the cache if possible.
    pub async fn question_id(&mut self, slug: &str) -> JudgeResult<String> {
        if let Some(id) = self.question_ids.get(slug) {
            tracing::debug!("Question id of {} is cached: {}", slug, id);
            return Ok(id.clone());
        }

        let query = GraphqlRequest::by_slug(QUESTION_ID_QUERY, None, slug);
        let res: GraphqlResponse = self
            .send(self.request(Method::POST, &self.graphql_endpoint()).json(&query))
            .await?;
        let id = res
            .data
            .question
            .map(|q| q.question_id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| JudgeError::NotFound(format!("question {:?}", slug)))?;

        self.question_ids.insert(slug.to_owned(), id.clone());
        Ok(id)
    }

    async fn check(&self, handle: &str) -> JudgeResult<Option<CheckResponse>> {
        let req = self.authed_request(Method::GET, &self.check_endpoint(handle))?;
        let res: CheckResponse = self.send(req).await?;
        if res.is_pending() {
            tracing::debug!("{} is still {}", handle, res.state);
            Ok(None)
        } else {
            Ok(Some(res))
        }
    }
}

/// Map common language names to LeetCode's `langSlug`. Unknown names are
/// passed through lower-cased.
pub fn normalize_lang_slug(lang: &str) -> String {
    let lang = lang.to_lowercase();
    let slug = match lang.as_str() {
        "go" | "golang" => "golang",
        "py" | "python" | "python3" => "python3",
        "java" => "java",
        "cpp" | "c++" => "cpp",
        "c" => "c",
        "js" | "javascript" => "javascript",
        "ts" | "typescript" => "typescript",
        "rs" | "rust" => "rust",
        other => other,
    };
    slug.to_owned()
}

#[async_trait]
impl Provider for LeetCodeProvider {
    fn name(&self) -> Cow<'static, str> {
        Self::NAME.into()
    }

    async fn fetch_problem(&mut self, id: &str, lang: &str) -> JudgeResult<ProblemDescriptor> {
        tracing::info!("Fetching {} from {}", id, self.base_url);
        let query = GraphqlRequest::by_slug(QUESTION_DATA_QUERY, Some("questionData"), id);
        let res: GraphqlResponse = self
            .send(self.request(Method::POST, &self.graphql_endpoint()).json(&query))
            .await?;
        let q = match res.data.question {
            Some(q) if !q.title_slug.is_empty() => q,
            _ => return Err(JudgeError::NotFound(format!("problem {:?} on LeetCode", id))),
        };

        let lang_slug = normalize_lang_slug(lang);
        let code_snippet = q
            .code_snippets
            .iter()
            .find(|s| s.lang_slug == lang_slug)
            .map(|s| s.code.clone())
            .unwrap_or_default();
        let content = parse_content(&q.content);

        if !q.question_id.is_empty() {
            self.question_ids
                .insert(q.title_slug.clone(), q.question_id.clone());
        }

        let test_input = if q.example_testcases.is_empty() {
            q.sample_test_case
        } else {
            q.example_testcases
        };
        Ok(ProblemDescriptor {
            id: q.title_slug,
            title: q.title,
            description: content.description,
            examples: content.example,
            constraints: content.constraints,
            difficulty: q.difficulty,
            tags: q.topic_tags.into_iter().map(|t| t.name).collect(),
            code_snippet,
            test_input,
            meta: parse_meta_data(&q.meta_data),
        })
    }

    fn as_authenticator(&mut self) -> Option<&mut dyn Authenticator> {
        Some(self)
    }

    fn as_tester(&mut self) -> Option<&mut dyn Tester> {
        Some(self)
    }

    fn as_submitter(&mut self) -> Option<&mut dyn Submitter> {
        Some(self)
    }

    fn as_poll_policy(&self) -> Option<&dyn PollPolicy> {
        Some(self)
    }
}

impl Authenticator for LeetCodeProvider {
    fn authenticate(&mut self) -> JudgeResult<()> {
        self.authenticate_from(|name| std::env::var(name).ok())
    }

    fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    fn auth_help(&self) -> String {
        format!(
            "LeetCode authentication required for test/submit.

1. Log in to leetcode.com in your browser
2. Open DevTools > Application > Cookies > leetcode.com
3. Copy these two cookie values:
   - LEETCODE_SESSION  (the long one)
   - csrftoken

4. Set them as environment variables:
   export {}=\"<value>\"
   export {}=\"<value>\"

   Or put them in the config file as `session` and `csrf_token`.
",
            self.session_env, self.csrf_env
        )
    }
}

#[async_trait]
impl Tester for LeetCodeProvider {
    async fn run_tests(
        &mut self,
        id: &str,
        lang: &str,
        code: &str,
        input: &str,
    ) -> JudgeResult<String> {
        self.require_auth()?;
        let question_id = self.question_id(id).await?;
        let lang = normalize_lang_slug(lang);
        let body = RunRequest {
            lang: &lang,
            question_id: &question_id,
            typed_code: code,
            data_input: Some(input),
        };

        let req = self
            .authed_request(Method::POST, &self.interpret_endpoint(id))?
            .json(&body);
        let res: InterpretResponse = self.send(req).await?;
        if res.interpret_id.is_empty() {
            return Err(JudgeError::AuthExpired {
                problem: id.to_owned(),
                field: "interpret_id",
            });
        }
        Ok(res.interpret_id)
    }

    async fn check_test_result(&self, handle: &str) -> JudgeResult<Poll<TestOutcome>> {
        Ok(match self.check(handle).await? {
            Some(res) => Poll::Done(res.to_test_outcome()),
            None => Poll::Pending,
        })
    }
}

#[async_trait]
impl Submitter for LeetCodeProvider {
    async fn submit(&mut self, id: &str, lang: &str, code: &str) -> JudgeResult<String> {
        self.require_auth()?;
        let question_id = self.question_id(id).await?;
        let lang = normalize_lang_slug(lang);
        let body = RunRequest {
            lang: &lang,
            question_id: &question_id,
            typed_code: code,
            data_input: None,
        };

        let req = self
            .authed_request(Method::POST, &self.submit_endpoint(id))?
            .json(&body);
        let res: SubmitResponse = self.send(req).await?;
        if res.submission_id.is_empty() || res.submission_id == "0" {
            return Err(JudgeError::AuthExpired {
                problem: id.to_owned(),
                field: "submission_id",
            });
        }
        Ok(res.submission_id)
    }

    async fn check_submission(&self, handle: &str) -> JudgeResult<Poll<SubmitOutcome>> {
        Ok(match self.check(handle).await? {
            Some(res) => Poll::Done(res.to_submit_outcome()),
            None => Poll::Pending,
        })
    }
}

impl PollPolicy for LeetCodeProvider {
    fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}
