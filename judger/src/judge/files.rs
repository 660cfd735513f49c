//! Reading solutions and saved test input from the local workspace.
//!
//! Layout, one directory per problem:
//!
//! ```text
//! <root>/<provider>/<problem-id>/
//!   solution.<ext>
//!   testcases.txt
//! ```

use super::CodeSource;
use crate::provider::{JudgeError, JudgeResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub const CODE_BEGIN_MARKER: &str = "@lc code=begin";
pub const CODE_END_MARKER: &str = "@lc code=end";

#[derive(Debug, Clone)]
pub struct SolutionFiles {
    root: PathBuf,
    provider: String,
    /// Overrides the solution file lookup.
    code_file: Option<PathBuf>,
    /// Overrides `testcases.txt`.
    input_file: Option<PathBuf>,
}

impl SolutionFiles {
    pub fn new(root: impl Into<PathBuf>, provider: impl Into<String>) -> SolutionFiles {
        SolutionFiles {
            root: root.into(),
            provider: provider.into(),
            code_file: None,
            input_file: None,
        }
    }

    pub fn with_code_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.code_file = Some(path.into());
        self
    }

    pub fn with_input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    pub fn problem_dir(&self, id: &str) -> PathBuf {
        self.root.join(&self.provider).join(id)
    }

    /// First file named `solution.*` in the problem directory.
    async fn find_solution(&self, id: &str) -> JudgeResult<PathBuf> {
        let dir = self.problem_dir(id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(JudgeError::NotFound(format!(
                    "solution directory {}",
                    dir.display()
                )))
            }
            Err(e) => return Err(reading(e, &dir)),
        };
        let mut found = vec![];
        while let Some(entry) = entries.next_entry().await.map_err(|e| reading(e, &dir))? {
            let path = entry.path();
            if path.file_stem().map_or(false, |s| s == "solution") && path.is_file() {
                found.push(path);
            }
        }
        found.sort();
        found.into_iter().next().ok_or_else(|| {
            JudgeError::NotFound(format!("solution file in {}", dir.display()))
        })
    }
}

async fn read_file(path: &Path) -> JudgeResult<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(JudgeError::NotFound(path.display().to_string()))
        }
        Err(e) => Err(reading(e, path)),
    }
}

pub(crate) fn reading(e: std::io::Error, path: &Path) -> JudgeError {
    anyhow::Error::new(e)
        .context(format!("reading {}", path.display()))
        .into()
}

#[async_trait]
impl CodeSource for SolutionFiles {
    async fn extract_user_code(&self, id: &str) -> JudgeResult<String> {
        let path = match &self.code_file {
            Some(p) => p.clone(),
            None => self.find_solution(id).await?,
        };
        tracing::debug!("Reading solution from {}", path.display());
        Ok(extract_code(&read_file(&path).await?))
    }

    async fn read_test_input(&self, id: &str) -> JudgeResult<Option<String>> {
        let path = match &self.input_file {
            Some(p) => p.clone(),
            None => self.problem_dir(id).join("testcases.txt"),
        };
        match read_file(&path).await {
            Ok(content) => {
                // an explicitly given file is used as-is
                let input = if self.input_file.is_some() && !content.contains("input:") {
                    content.trim().to_owned()
                } else {
                    parse_test_input(&content)
                };
                Ok(Some(input).filter(|s| !s.is_empty()))
            }
            Err(JudgeError::NotFound(_)) if self.input_file.is_none() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Code between the `@lc code=begin` and `@lc code=end` lines, or the whole
/// file if the markers are missing or out of order.
pub fn extract_code(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let begin = lines.iter().position(|l| l.contains(CODE_BEGIN_MARKER));
    let end = lines.iter().position(|l| l.contains(CODE_END_MARKER));
    match (begin, end) {
        (Some(b), Some(e)) if b < e => lines[b + 1..e].join("\n").trim().to_owned(),
        _ => content.to_owned(),
    }
}

/// The lines between `input:` and `output:` of a `testcases.txt`.
pub fn parse_test_input(content: &str) -> String {
    content
        .lines()
        .skip_while(|l| l.trim() != "input:")
        .skip(1)
        .take_while(|l| l.trim() != "output:")
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn code_between_markers() {
        let src = "package main\n\n// @lc code=begin\nfunc twoSum() {}\n// @lc code=end\n\nfunc main() {}\n";
        assert_eq!(extract_code(src), "func twoSum() {}");
    }

    #[test]
    fn no_markers_is_whole_file() {
        let src = "print(1)\n";
        assert_eq!(extract_code(src), src);
        let reversed = "# @lc code=end\nx = 1\n# @lc code=begin\n";
        assert_eq!(extract_code(reversed), reversed);
    }

    #[test]
    fn test_input_section() {
        assert_eq!(
            parse_test_input("input:\n[2,7,11,15]\n9\noutput:\n[0,1]\n"),
            "[2,7,11,15]\n9"
        );
        assert_eq!(parse_test_input("output:\n1\n"), "");
        assert_eq!(parse_test_input("input:\n\noutput:\n"), "");
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kata-files-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn reads_workspace_layout() {
        let root = scratch_dir("layout");
        let dir = root.join("leetcode").join("two-sum");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("solution.go"),
            "// @lc code=begin\nfunc twoSum() {}\n// @lc code=end\n",
        )
        .unwrap();
        std::fs::write(dir.join("testcases.txt"), "input:\n[3,3]\n6\noutput:\n[0,1]\n").unwrap();

        let files = SolutionFiles::new(&root, "leetcode");
        assert_eq!(files.extract_user_code("two-sum").await.unwrap(), "func twoSum() {}");
        assert_eq!(
            files.read_test_input("two-sum").await.unwrap().as_deref(),
            Some("[3,3]\n6")
        );

        let err = files.extract_user_code("three-sum").await.unwrap_err();
        assert!(matches!(err, JudgeError::NotFound(_)));
        assert_eq!(files.read_test_input("three-sum").await.unwrap(), None);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn explicit_files_win() {
        let root = scratch_dir("explicit");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("mine.py"), "class Solution: pass\n").unwrap();
        std::fs::write(root.join("in.txt"), "[1,2]\n").unwrap();

        let files = SolutionFiles::new(&root, "leetcode")
            .with_code_file(root.join("mine.py"))
            .with_input_file(root.join("in.txt"));
        assert_eq!(
            files.extract_user_code("anything").await.unwrap(),
            "class Solution: pass\n"
        );
        assert_eq!(
            files.read_test_input("anything").await.unwrap().as_deref(),
            Some("[1,2]")
        );

        let missing = SolutionFiles::new(&root, "leetcode").with_input_file(root.join("nope.txt"));
        assert!(missing.read_test_input("anything").await.is_err());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[tokio::test]
    async fn unreadable_paths_are_named() {
        let root = scratch_dir("unreadable");
        std::fs::create_dir_all(root.join("leetcode")).unwrap();
        // a file where the problem directory should be
        std::fs::write(root.join("leetcode").join("two-sum"), "").unwrap();

        let files = SolutionFiles::new(&root, "leetcode");
        let err = files.extract_user_code("two-sum").await.unwrap_err();
        assert!(!matches!(err, JudgeError::NotFound(_)));
        let msg = err.to_string();
        assert!(msg.contains("two-sum"), "{}", msg);
        assert!(msg.starts_with("reading "), "{}", msg);

        let files = files.with_code_file(root.join("leetcode"));
        let msg = files.extract_user_code("two-sum").await.unwrap_err().to_string();
        assert!(msg.contains(&root.join("leetcode").display().to_string()), "{}", msg);

        std::fs::remove_dir_all(&root).unwrap();
    }
}
