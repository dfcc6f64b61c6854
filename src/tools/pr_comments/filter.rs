//! Regex-driven cleanup of comment bodies, e.g. bot boilerplate.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static RE_MANY_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterConfig {
    /// Content from the first match onward is dropped.
    #[serde(default)]
    pub cut_patterns: Vec<String>,
    /// Every match is removed.
    #[serde(default)]
    pub scrub_patterns: Vec<String>,
    /// Restricts filtering to matching authors. Empty matches everyone.
    #[serde(default)]
    pub author_patterns: Vec<String>,
}

impl FilterConfig {
    pub fn compile(&self) -> Result<CompiledFilter, regex::Error> {
        Ok(CompiledFilter {
            cut_patterns: compile_all(&self.cut_patterns)?,
            scrub_patterns: compile_all(&self.scrub_patterns)?,
            author_patterns: compile_all(&self.author_patterns)?,
        })
    }
}

fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, regex::Error> {
    patterns.iter().map(|p| Regex::new(p)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    cut_patterns: Vec<Regex>,
    scrub_patterns: Vec<Regex>,
    author_patterns: Vec<Regex>,
}

impl CompiledFilter {
    pub fn should_filter(&self, author: &str) -> bool {
        self.author_patterns.is_empty() || self.author_patterns.iter().any(|re| re.is_match(author))
    }

    pub fn apply(&self, text: &str) -> String {
        let mut result = text;
        for re in &self.cut_patterns {
            if let Some(m) = re.find(result) {
                result = &result[..m.start()];
                break;
            }
        }

        let mut result = result.to_string();
        for re in &self.scrub_patterns {
            result = re.replace_all(&result, "").into_owned();
        }

        RE_MANY_NEWLINES
            .replace_all(&result, "\n\n")
            .trim()
            .to_string()
    }
}
