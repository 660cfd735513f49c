//! A provider with a fixed set of problems, for working without network access.

use super::{FunctionSignature, JudgeError, JudgeResult, ParamMeta, ProblemDescriptor, Provider};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::{borrow::Cow, collections::HashMap};

/// Only fetches; it cannot run, grade or log in.
#[derive(Debug, Default)]
pub struct MockProvider {}

impl MockProvider {
    pub const NAME: &'static str = "mock";

    pub fn new() -> MockProvider {
        MockProvider {}
    }

    /// Ids of every problem this provider knows about, sorted.
    pub fn problem_ids() -> Vec<&'static str> {
        let mut ids: Vec<_> = MOCK_PROBLEMS.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> Cow<'static, str> {
        Self::NAME.into()
    }

    async fn fetch_problem(&mut self, id: &str, _lang: &str) -> JudgeResult<ProblemDescriptor> {
        MOCK_PROBLEMS
            .get(id)
            .cloned()
            .ok_or_else(|| JudgeError::NotFound(format!("mock provider: problem {:?}", id)))
    }
}

fn param(name: &str, ty: &str) -> ParamMeta {
    ParamMeta {
        name: name.into(),
        ty: ty.into(),
    }
}

fn tags(t: &[&str]) -> Vec<String> {
    t.iter().map(|&s| s.into()).collect()
}

static MOCK_PROBLEMS: Lazy<HashMap<&'static str, ProblemDescriptor>> = Lazy::new(|| {
    let problems = vec![
        ProblemDescriptor {
            id: "fizz-buzz".into(),
            title: "Fizz Buzz".into(),
            description: "Given an integer n, return a string array answer (1-indexed) where:\n\
                answer[i] == \"FizzBuzz\" if i is divisible by 3 and 5.\n\
                answer[i] == \"Fizz\" if i is divisible by 3.\n\
                answer[i] == \"Buzz\" if i is divisible by 5.\n\
                answer[i] == i (as a string) if none of the above conditions are true."
                .into(),
            examples: "Input: n = 3\nOutput: [\"1\",\"2\",\"Fizz\"]".into(),
            constraints: "1 <= n <= 10^4".into(),
            difficulty: "Easy".into(),
            tags: tags(&["Math", "String", "Simulation"]),
            code_snippet: "func fizzBuzz(n int) []string {\n    \n}".into(),
            test_input: "3".into(),
            meta: Some(FunctionSignature {
                name: "fizzBuzz".into(),
                params: vec![param("n", "integer")],
                ret: Some(param("", "string[]")),
                system_design: false,
            }),
        },
        ProblemDescriptor {
            id: "reverse-string".into(),
            title: "Reverse String".into(),
            description: "Write a function that reverses a string.\n\
                The input string is given as an array of characters s.\n\
                You must do this by modifying the input array in-place with O(1) extra memory."
                .into(),
            examples: "Input: s = [\"h\",\"e\",\"l\",\"l\",\"o\"]\n\
                Output: [\"o\",\"l\",\"l\",\"e\",\"h\"]"
                .into(),
            constraints: "1 <= s.length <= 10^5".into(),
            difficulty: "Easy".into(),
            tags: tags(&["Two Pointers", "String"]),
            code_snippet: "func reverseString(s []byte) {\n    \n}".into(),
            test_input: r#"["h","e","l","l","o"]"#.into(),
            meta: Some(FunctionSignature {
                name: "reverseString".into(),
                params: vec![param("s", "character[]")],
                ret: None,
                system_design: false,
            }),
        },
        ProblemDescriptor {
            id: "valid-palindrome".into(),
            title: "Valid Palindrome".into(),
            description: "A phrase is a palindrome if, after converting all uppercase letters\n\
                into lowercase letters and removing all non-alphanumeric characters, it reads\n\
                the same forward and backward. Alphanumeric characters include letters and numbers.\n\
                Given a string s, return true if it is a palindrome, or false otherwise."
                .into(),
            examples: "Input: s = \"A man, a plan, a canal: Panama\"\n\
                Output: true\n\
                Explanation: \"amanaplanacanalpanama\" is a palindrome."
                .into(),
            constraints: "1 <= s.length <= 2 * 10^5".into(),
            difficulty: "Easy".into(),
            tags: tags(&["Two Pointers", "String"]),
            code_snippet: "func isPalindrome(s string) bool {\n    \n}".into(),
            test_input: r#""A man, a plan, a canal: Panama""#.into(),
            meta: Some(FunctionSignature {
                name: "isPalindrome".into(),
                params: vec![param("s", "string")],
                ret: Some(param("", "boolean")),
                system_design: false,
            }),
        },
        ProblemDescriptor {
            id: "binary-search".into(),
            title: "Binary Search".into(),
            description: "Given an array of integers nums which is sorted in ascending order,\n\
                and an integer target, write a function to search target in nums. If target\n\
                exists, then return its index. Otherwise, return -1.\n\
                You must write an algorithm with O(log n) runtime complexity."
                .into(),
            examples: "Input: nums = [-1,0,3,5,9,12], target = 9\n\
                Output: 4\n\
                Explanation: 9 exists in nums and its index is 4."
                .into(),
            constraints: "1 <= nums.length <= 10^4".into(),
            difficulty: "Easy".into(),
            tags: tags(&["Array", "Binary Search"]),
            code_snippet: "func search(nums []int, target int) int {\n    \n}".into(),
            test_input: "[-1,0,3,5,9,12]\n9".into(),
            meta: Some(FunctionSignature {
                name: "search".into(),
                params: vec![param("nums", "integer[]"), param("target", "integer")],
                ret: Some(param("", "integer")),
                system_design: false,
            }),
        },
        ProblemDescriptor {
            id: "merge-sort".into(),
            title: "Merge Sort Implementation".into(),
            description: "Implement the merge sort algorithm. Given an array of integers,\n\
                sort them in ascending order using the divide-and-conquer merge sort approach."
                .into(),
            examples: "Input: nums = [5,2,3,1]\nOutput: [1,2,3,5]".into(),
            constraints: "1 <= nums.length <= 5 * 10^4".into(),
            difficulty: "Medium".into(),
            tags: tags(&["Array", "Sorting", "Divide and Conquer"]),
            code_snippet: "func sortArray(nums []int) []int {\n    \n}".into(),
            test_input: "[5,2,3,1]".into(),
            meta: Some(FunctionSignature {
                name: "sortArray".into(),
                params: vec![param("nums", "integer[]")],
                ret: Some(param("", "integer[]")),
                system_design: false,
            }),
        },
    ];
    problems
        .into_iter()
        .map(|p| {
            // ids above are literals, so leaking them is bounded
            let id: &'static str = Box::leak(p.id.clone().into_boxed_str());
            (id, p)
        })
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_env_log::test;

    #[test(tokio::test)]
    async fn fetch_known() {
        let mut p = MockProvider::new();
        let problem = p.fetch_problem("binary-search", "go").await.unwrap();
        assert_eq!(problem.id, "binary-search");
        assert_eq!(problem.difficulty, "Easy");
        assert_eq!(problem.test_input, "[-1,0,3,5,9,12]\n9");
        let meta = problem.meta.unwrap();
        assert_eq!(meta.name, "search");
        assert_eq!(meta.params.len(), 2);
        assert_eq!(meta.ret.map(|r| r.ty), Some("integer".to_owned()));
    }

    #[test(tokio::test)]
    async fn fetch_unknown() {
        let mut p = MockProvider::new();
        let err = p.fetch_problem("nope", "go").await.unwrap_err();
        assert!(matches!(err, JudgeError::NotFound(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[test(tokio::test)]
    async fn returns_independent_copies() {
        let mut p = MockProvider::new();
        let mut first = p.fetch_problem("fizz-buzz", "go").await.unwrap();
        first.title = "changed".into();
        first.tags.push("Mutated".into());
        if let Some(meta) = first.meta.as_mut() {
            meta.params[0].name = "mutated".into();
            meta.ret = None;
        }

        let second = p.fetch_problem("fizz-buzz", "go").await.unwrap();
        assert_eq!(second.title, "Fizz Buzz");
        assert_eq!(second.tags, vec!["Math", "String", "Simulation"]);
        let meta = second.meta.unwrap();
        assert_eq!(meta.params[0].name, "n");
        assert!(meta.ret.is_some());
    }

    #[test]
    fn exposes_no_extra_capabilities() {
        let mut p = MockProvider::new();
        assert!(p.as_tester().is_none());
        assert!(p.as_submitter().is_none());
        assert!(p.as_authenticator().is_none());
        assert!(p.as_poll_policy().is_none());
        assert_eq!(MockProvider::problem_ids().len(), 5);
    }
}
