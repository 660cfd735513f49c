//! Turning a judge's check response into a [`TestOutcome`] or [`SubmitOutcome`].
//!
//! The check endpoint answers both test runs and submissions with the same
//! loosely-typed JSON. Decoding is lenient: fields that are sometimes a
//! string and sometimes a list, percentiles that are sometimes numbers and
//! sometimes strings, and `null`s everywhere all decode without error.

use crate::provider::{SubmitOutcome, TestOutcome};
use crate::util::{null_as_default, number_or_string, string_or_seq};
use itertools::{EitherOrBoth, Itertools};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Judge status codes.
pub mod status {
    /// For test runs this only means "ran to completion", not "correct".
    pub const ACCEPTED: i32 = 10;
    pub const WRONG_ANSWER: i32 = 11;
    pub const MEMORY_LIMIT_EXCEEDED: i32 = 12;
    pub const OUTPUT_LIMIT_EXCEEDED: i32 = 13;
    pub const TIME_LIMIT_EXCEEDED: i32 = 14;
    pub const RUNTIME_ERROR: i32 = 15;
    pub const COMPILE_ERROR: i32 = 20;

    pub fn describe(code: i32) -> &'static str {
        match code {
            ACCEPTED => "Accepted",
            WRONG_ANSWER => "Wrong Answer",
            MEMORY_LIMIT_EXCEEDED => "Memory Limit Exceeded",
            OUTPUT_LIMIT_EXCEEDED => "Output Limit Exceeded",
            TIME_LIMIT_EXCEEDED => "Time Limit Exceeded",
            RUNTIME_ERROR => "Runtime Error",
            COMPILE_ERROR => "Compile Error",
            _ => "Unknown Status",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CheckResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status_code: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub status_msg: String,
    /// e.g. `5 ms`
    #[serde(deserialize_with = "null_as_default")]
    pub status_runtime: String,
    /// e.g. `3.2 MB`
    #[serde(deserialize_with = "null_as_default")]
    pub status_memory: String,
    #[serde(deserialize_with = "number_or_string")]
    pub runtime_percentile: Option<f64>,
    #[serde(deserialize_with = "number_or_string")]
    pub memory_percentile: Option<f64>,
    /// Actual outputs of a test run, one per case.
    #[serde(deserialize_with = "string_or_seq")]
    pub code_answer: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    pub expected_code_answer: Vec<String>,
    #[serde(deserialize_with = "string_or_seq")]
    pub code_output: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub std_output: String,
    pub total_correct: Option<u32>,
    pub total_testcases: Option<u32>,
    #[serde(deserialize_with = "null_as_default")]
    pub compile_error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_compile_error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub runtime_error: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_runtime_error: String,
    /// Input of the failing case.
    #[serde(deserialize_with = "null_as_default")]
    pub last_testcase: String,
    #[serde(deserialize_with = "null_as_default")]
    pub expected_output: String,
    #[serde(deserialize_with = "null_as_default")]
    pub input_formatted: String,
    #[serde(deserialize_with = "null_as_default")]
    pub input: String,
}

impl CheckResponse {
    pub fn is_pending(&self) -> bool {
        matches!(self.state.as_str(), "PENDING" | "STARTED")
    }

    fn compile_error(&self) -> Option<String> {
        first_non_empty(&[&self.full_compile_error, &self.compile_error]).map(str::to_owned)
    }

    fn runtime_error(&self) -> Option<String> {
        first_non_empty(&[&self.full_runtime_error, &self.runtime_error]).map(str::to_owned)
    }

    /// `status_msg`, or the name of `status_code` when the judge sent none.
    fn status_message(&self) -> String {
        if self.status_msg.is_empty() {
            status::describe(self.status_code).to_owned()
        } else {
            self.status_msg.clone()
        }
    }

    /// Input of the failing case, in whichever field the judge put it.
    fn failing_input(&self) -> &str {
        [&self.last_testcase, &self.input_formatted, &self.input]
            .into_iter()
            .find(|s| !s.is_empty())
            .map_or("", |s| s.as_str())
    }

    /// Normalize the result of an ad-hoc test run.
    ///
    /// A status of [`status::ACCEPTED`] only says the code ran; whether it is
    /// correct is decided by comparing actual and expected answers.
    pub fn to_test_outcome(&self) -> TestOutcome {
        let mut res = TestOutcome {
            runtime_ms: parse_runtime_ms(&self.status_runtime),
            compile_error: self.compile_error(),
            runtime_error: self.runtime_error(),
            ..Default::default()
        };

        let mut out = String::new();
        if let Some(e) = &res.compile_error {
            out.push_str("Compile Error:\n");
            out.push_str(e);
        } else if let Some(e) = &res.runtime_error {
            out.push_str("Runtime Error:\n");
            out.push_str(e);
        } else if self.status_code != status::ACCEPTED {
            let _ = writeln!(out, "{}", self.status_message());
            let input = self.failing_input();
            if !input.is_empty() {
                res.input = input.to_owned();
                let _ = writeln!(out, "Input:    {}", res.input);
            }
        } else {
            let answers = trim_trailing_empty(&self.code_answer);
            let expected = trim_trailing_empty(&self.expected_code_answer);
            res.actual = answers.join("\n");
            res.expected = expected.join("\n");
            res.input = self.last_testcase.clone();
            res.passed = answers == expected;

            if res.passed {
                let _ = writeln!(out, "Accepted ({})", self.status_runtime);
            } else {
                out.push_str("Wrong Answer\n");
            }

            if answers.len() > 1 || expected.len() > 1 {
                for (i, pair) in answers.iter().zip_longest(expected.iter()).enumerate() {
                    let (actual, exp) = match pair {
                        EitherOrBoth::Both(a, e) => (a.as_str(), e.as_str()),
                        EitherOrBoth::Left(a) => (a.as_str(), ""),
                        EitherOrBoth::Right(e) => ("", e.as_str()),
                    };
                    let mark = if actual == exp { "PASS" } else { "FAIL" };
                    let _ = writeln!(
                        out,
                        "  Case {}: {}  output={}  expected={}",
                        i + 1,
                        mark,
                        actual,
                        exp
                    );
                }
            } else {
                let _ = writeln!(out, "Output:   {}", res.actual);
                let _ = writeln!(out, "Expected: {}", res.expected);
            }
        }

        if !self.std_output.is_empty() {
            let _ = write!(out, "\nStdout:\n{}", self.std_output);
        }
        res.report = out;
        res
    }

    /// Normalize the result of a graded submission.
    pub fn to_submit_outcome(&self) -> SubmitOutcome {
        let mut res = SubmitOutcome {
            status_msg: self.status_message(),
            runtime_ms: parse_runtime_ms(&self.status_runtime),
            compile_error: self.compile_error(),
            runtime_error: self.runtime_error(),
            passed_cases: self.total_correct.unwrap_or(0),
            total_cases: self.total_testcases.unwrap_or(0),
            runtime_percentile: self
                .runtime_percentile
                .filter(|&p| p > 0.0)
                .map(|p| format!("faster than {:.1}%", p)),
            memory_percentile: self
                .memory_percentile
                .filter(|&p| p > 0.0)
                .map(|p| format!("less than {:.1}%", p)),
            ..Default::default()
        };
        res.accepted = self.status_code == status::ACCEPTED
            && res.compile_error.is_none()
            && res.runtime_error.is_none();

        let mut out = String::new();
        if let Some(e) = &res.compile_error {
            out.push_str("Compile Error:\n");
            out.push_str(e);
        } else if let Some(e) = &res.runtime_error {
            out.push_str("Runtime Error:\n");
            out.push_str(e);
        } else if res.accepted {
            out.push_str("Accepted\n");
            let _ = writeln!(
                out,
                "Runtime: {}{}",
                self.status_runtime,
                parenthesized(&res.runtime_percentile)
            );
            let _ = writeln!(
                out,
                "Memory:  {}{}",
                self.status_memory,
                parenthesized(&res.memory_percentile)
            );
            let _ = writeln!(
                out,
                "Cases:   {}/{} passed",
                res.passed_cases, res.total_cases
            );
        } else {
            let _ = writeln!(out, "{}", res.status_msg);
            let _ = writeln!(out, "Cases: {}/{} passed", res.passed_cases, res.total_cases);
            let input = self.failing_input();
            if !input.is_empty() {
                let _ = writeln!(out, "Failing input:\n{}", input);
            }
            let output = trim_trailing_empty(&self.code_output);
            if !output.is_empty() {
                let _ = writeln!(out, "Output:   {}", output.join("\n"));
            }
            if !self.expected_output.is_empty() {
                let _ = writeln!(out, "Expected: {}", self.expected_output);
            }
        }
        res.report = out;
        res
    }
}

fn parenthesized(s: &Option<String>) -> String {
    match s {
        Some(s) => format!(" ({})", s),
        None => String::new(),
    }
}

/// Drop trailing empty entries; upstream sometimes pads answer lists with one.
pub fn trim_trailing_empty(items: &[String]) -> &[String] {
    let end = items
        .iter()
        .rposition(|s| !s.is_empty())
        .map_or(0, |i| i + 1);
    &items[..end]
}

/// `"5 ms"` is 5. Anything unparseable is 0.
pub fn parse_runtime_ms(s: &str) -> u64 {
    let s = s.trim();
    let s = s.strip_suffix("ms").unwrap_or(s).trim_end();
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

pub fn first_non_empty<'a, S: AsRef<str>>(items: &'a [S]) -> Option<&'a str> {
    items.iter().map(AsRef::<str>::as_ref).find(|s| !s.is_empty())
}
