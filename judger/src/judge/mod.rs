//! Driving a backend from "here is some code" to a finished [`Outcome`].

pub mod files;
pub mod normalize;
pub mod poll;

pub use poll::{poll_until, PollSettings};

use crate::provider::{
    JudgeError, JudgeResult, Outcome, ProblemDescriptor, Provider, SubmitOutcome, Submitter,
    TestOutcome, Tester,
};
use async_trait::async_trait;
use std::{borrow::Cow, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::info_span;
use tracing_futures::Instrument;

/// Where user code and saved test input come from.
#[async_trait]
pub trait CodeSource: Send + Sync {
    async fn extract_user_code(&self, id: &str) -> JudgeResult<String>;

    /// Saved input for ad-hoc runs, `None` if the user has none.
    async fn read_test_input(&self, id: &str) -> JudgeResult<Option<String>>;
}

/// Receives every judged outcome, e.g. to schedule the next review.
pub trait OutcomeRecorder: Send + Sync {
    fn record_outcome(&self, id: &str, outcome: &Outcome);
}

fn unsupported(provider: Cow<'static, str>, capability: &'static str) -> JudgeError {
    JudgeError::UnsupportedCapability {
        provider: provider.into_owned(),
        capability,
    }
}

/// Start a test run and wait for its result.
pub async fn run_tests_and_wait(
    provider: &mut dyn Provider,
    id: &str,
    lang: &str,
    code: &str,
    input: &str,
) -> JudgeResult<TestOutcome> {
    let settings = PollSettings::from_policy(provider.as_poll_policy());
    let name = provider.name();
    let tester = provider
        .as_tester()
        .ok_or_else(|| unsupported(name, "running tests"))?;

    let handle = tester.run_tests(id, lang, code, input).await?;
    tracing::info!("Test run started, handle {}", handle);

    let tester: &dyn Tester = tester;
    let handle = handle.as_str();
    poll_until(settings, move || tester.check_test_result(handle))
        .instrument(info_span!("poll_test", %handle))
        .await
}

/// Submit code and wait for it to be graded.
pub async fn submit_and_wait(
    provider: &mut dyn Provider,
    id: &str,
    lang: &str,
    code: &str,
) -> JudgeResult<SubmitOutcome> {
    let settings = PollSettings::from_policy(provider.as_poll_policy());
    let name = provider.name();
    let submitter = provider
        .as_submitter()
        .ok_or_else(|| unsupported(name, "submissions"))?;

    let handle = submitter.submit(id, lang, code).await?;
    tracing::info!("Submitted, handle {}", handle);

    let submitter: &dyn Submitter = submitter;
    let handle = handle.as_str();
    poll_until(settings, move || submitter.check_submission(handle))
        .instrument(info_span!("poll_submission", %handle))
        .await
}

/// One backend plus the collaborators needed to judge a user's solutions.
pub struct JudgeSession {
    provider: Box<dyn Provider>,
    code: Box<dyn CodeSource>,
    recorder: Option<Box<dyn OutcomeRecorder>>,
    lang: String,
}

pub type SharedSession = Arc<Mutex<JudgeSession>>;

impl JudgeSession {
    pub fn new(
        provider: Box<dyn Provider>,
        code: Box<dyn CodeSource>,
        lang: impl Into<String>,
    ) -> JudgeSession {
        JudgeSession {
            provider,
            code,
            recorder: None,
            lang: lang.into(),
        }
    }

    pub fn with_recorder(mut self, recorder: Box<dyn OutcomeRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    pub fn provider_mut(&mut self) -> &mut dyn Provider {
        self.provider.as_mut()
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Authenticate if the backend supports it. Backends that need no login
    /// succeed trivially.
    pub fn authenticate(&mut self) -> JudgeResult<()> {
        match self.provider.as_authenticator() {
            Some(auth) => auth.authenticate().map_err(|e| {
                JudgeError::NotAuthenticated(format!("{}\n\n{}", e, auth.auth_help()))
            }),
            None => Ok(()),
        }
    }

    /// Setup instructions, if the backend has any.
    pub fn auth_help(&mut self) -> Option<String> {
        self.provider.as_authenticator().map(|a| a.auth_help())
    }

    pub async fn fetch(&mut self, id: &str) -> JudgeResult<ProblemDescriptor> {
        self.provider.fetch_problem(id, &self.lang).await
    }

    /// Run the user's solution for `id` against their saved input. Without
    /// saved input, the problem's default input is used.
    pub async fn test(&mut self, id: &str) -> JudgeResult<Outcome> {
        let code = self.code.extract_user_code(id).await?;
        let input = match self.code.read_test_input(id).await? {
            Some(input) => input,
            None => {
                tracing::debug!("No saved input for {}, using the problem's default", id);
                self.fetch(id).await?.test_input
            }
        };
        let res = run_tests_and_wait(self.provider.as_mut(), id, &self.lang, &code, &input)
            .await
            .map_err(|e| self.explain(e))?;
        Ok(self.record(id, res.into()))
    }

    pub async fn submit(&mut self, id: &str) -> JudgeResult<Outcome> {
        let code = self.code.extract_user_code(id).await?;
        let res = submit_and_wait(self.provider.as_mut(), id, &self.lang, &code)
            .await
            .map_err(|e| self.explain(e))?;
        Ok(self.record(id, res.into()))
    }

    fn record(&self, id: &str, outcome: Outcome) -> Outcome {
        tracing::info!("{}: {:?}", id, outcome.verdict());
        if let Some(r) = &self.recorder {
            r.record_outcome(id, &outcome);
        }
        outcome
    }

    /// Attach setup instructions to auth failures found after the request
    /// went out. Errors raised before that already carry them.
    fn explain(&mut self, e: JudgeError) -> JudgeError {
        match e {
            JudgeError::AuthExpired { .. } | JudgeError::Http { .. } if e.is_auth_failure() => {
                match self.auth_help() {
                    Some(help) => JudgeError::NotAuthenticated(format!("{}\n\n{}", e, help)),
                    None => e,
                }
            }
            e => e,
        }
    }
}

/// Run [`JudgeSession::test`] as a background task.
pub fn spawn_test(session: SharedSession, id: String) -> JoinHandle<JudgeResult<Outcome>> {
    let span = info_span!("test", %id);
    tokio::spawn(
        async move {
            let mut session = session.lock().await;
            session.test(&id).await
        }
        .instrument(span),
    )
}

/// Run [`JudgeSession::submit`] as a background task.
pub fn spawn_submit(session: SharedSession, id: String) -> JoinHandle<JudgeResult<Outcome>> {
    let span = info_span!("submit", %id);
    tokio::spawn(
        async move {
            let mut session = session.lock().await;
            session.submit(&id).await
        }
        .instrument(span),
    )
}
