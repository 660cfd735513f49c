use serde::{Deserialize, Serialize};

/// A problem as returned by any provider. Every fetch hands out an owned
/// value, so mutating one never affects another caller's copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDescriptor {
    /// Provider-specific identifier, e.g. `two-sum`.
    pub id: String,
    pub title: String,
    /// Plain text, HTML already stripped.
    pub description: String,
    pub examples: String,
    pub constraints: String,
    /// `Easy`, `Medium` or `Hard`.
    pub difficulty: String,
    pub tags: Vec<String>,
    /// Starter code in the requested language. Empty if the provider has none.
    pub code_snippet: String,
    /// Default input for ad-hoc test runs.
    pub test_input: String,
    pub meta: Option<FunctionSignature>,
}

/// Function signature of a problem, used to generate local test harnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<ParamMeta>,
    /// `None` for in-place problems.
    pub ret: Option<ParamMeta>,
    /// Constructor-style design problems with no flat input/output shape.
    pub system_design: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMeta {
    pub name: String,
    /// Judge type string, like `integer[]` or `TreeNode`.
    pub ty: String,
}

/// Outcome of an ad-hoc test run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestOutcome {
    pub passed: bool,
    pub input: String,
    pub expected: String,
    pub actual: String,
    pub runtime_ms: u64,
    pub compile_error: Option<String>,
    pub runtime_error: Option<String>,
    /// Human-readable report for display.
    pub report: String,
}

/// Outcome of a graded submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub accepted: bool,
    /// e.g. `Accepted`, `Wrong Answer`, `Time Limit Exceeded`.
    pub status_msg: String,
    pub runtime_ms: u64,
    /// e.g. `faster than 95.2%`.
    pub runtime_percentile: Option<String>,
    /// e.g. `less than 80.1%`.
    pub memory_percentile: Option<String>,
    pub passed_cases: u32,
    pub total_cases: u32,
    pub compile_error: Option<String>,
    pub runtime_error: Option<String>,
    pub report: String,
}

/// Coarse classification handed to the review scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accepted,
    Wrong,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Test(TestOutcome),
    Submit(SubmitOutcome),
}

impl Outcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            Outcome::Test(t) => {
                if t.passed {
                    Verdict::Accepted
                } else if t.compile_error.is_some()
                    || t.runtime_error.is_some()
                    || mentions_limit(&t.report)
                {
                    Verdict::Error
                } else {
                    Verdict::Wrong
                }
            }
            Outcome::Submit(s) => {
                if s.accepted {
                    Verdict::Accepted
                } else if s.compile_error.is_some()
                    || s.runtime_error.is_some()
                    || mentions_limit(&s.status_msg)
                {
                    Verdict::Error
                } else {
                    Verdict::Wrong
                }
            }
        }
    }

    pub fn report(&self) -> &str {
        match self {
            Outcome::Test(t) => &t.report,
            Outcome::Submit(s) => &s.report,
        }
    }

    pub fn is_success(&self) -> bool {
        self.verdict() == Verdict::Accepted
    }
}

fn mentions_limit(text: &str) -> bool {
    text.to_lowercase().contains("limit exceeded")
}

impl From<TestOutcome> for Outcome {
    fn from(t: TestOutcome) -> Self {
        Outcome::Test(t)
    }
}

impl From<SubmitOutcome> for Outcome {
    fn from(s: SubmitOutcome) -> Self {
        Outcome::Submit(s)
    }
}
