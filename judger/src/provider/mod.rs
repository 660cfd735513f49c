//! Judge backends and the capabilities they may offer.
//!
//! Every backend implements [`Provider`], which only knows how to fetch a
//! problem. Running tests, grading submissions, logging in and custom poll
//! timing are separate capabilities; a backend exposes the ones it supports
//! through the `as_*` accessors and leaves the rest returning `None`.

mod err;
pub mod leetcode;
pub mod mock;
pub mod model;
pub mod registry;

pub use self::{err::*, model::*, registry::ProviderRegistry};

use async_trait::async_trait;
use std::{borrow::Cow, time::Duration};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);

/// Answer to "is it done yet".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    Pending,
    Done(T),
}

/// A judge backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Identifier used in the registry, like `leetcode`.
    fn name(&self) -> Cow<'static, str>;

    /// Fetch a single problem. `lang` selects the starter code snippet.
    async fn fetch_problem(&mut self, id: &str, lang: &str) -> JudgeResult<ProblemDescriptor>;

    fn as_authenticator(&mut self) -> Option<&mut dyn Authenticator> {
        None
    }

    fn as_tester(&mut self) -> Option<&mut dyn Tester> {
        None
    }

    fn as_submitter(&mut self) -> Option<&mut dyn Submitter> {
        None
    }

    fn as_poll_policy(&self) -> Option<&dyn PollPolicy> {
        None
    }
}

/// Backends that need credentials for some operations.
pub trait Authenticator: Send + Sync {
    /// Load credentials. On failure no credential is kept at all.
    fn authenticate(&mut self) -> JudgeResult<()>;

    fn is_authenticated(&self) -> bool;

    /// Instructions for setting up credentials.
    fn auth_help(&self) -> String;
}

/// Backends that can run code against ad-hoc input.
#[async_trait]
pub trait Tester: Send + Sync {
    /// Start a test run and return the handle to poll with.
    async fn run_tests(
        &mut self,
        id: &str,
        lang: &str,
        code: &str,
        input: &str,
    ) -> JudgeResult<String>;

    async fn check_test_result(&self, handle: &str) -> JudgeResult<Poll<TestOutcome>>;
}

/// Backends that can grade a submission.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submit code and return the handle to poll with.
    async fn submit(&mut self, id: &str, lang: &str, code: &str) -> JudgeResult<String>;

    async fn check_submission(&self, handle: &str) -> JudgeResult<Poll<SubmitOutcome>>;
}

/// Backends that want non-default poll timing.
pub trait PollPolicy: Send + Sync {
    fn poll_interval(&self) -> Duration;
    fn poll_timeout(&self) -> Duration;
}
