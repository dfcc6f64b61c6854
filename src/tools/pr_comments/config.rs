use super::filter::FilterConfig;
use crate::output::projection::{OutputConfig, OutputField};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "ado-pr-comments.json";

/// Contents of `ado-pr-comments.json`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrCommentsConfig {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub output: OutputConfig<PrField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Statuses shown when none are requested. Empty shows all.
    #[serde(default)]
    pub include: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrField {
    FilePath,
    LineStart,
    LineEnd,
    Status,
    Author,
    Published,
    Updated,
    Type,
    Content,
}

impl OutputField for PrField {
    const ALL: &'static [Self] = &[
        PrField::FilePath,
        PrField::LineStart,
        PrField::LineEnd,
        PrField::Status,
        PrField::Author,
        PrField::Published,
        PrField::Updated,
        PrField::Type,
        PrField::Content,
    ];

    fn key(self) -> &'static str {
        match self {
            PrField::FilePath => "filePath",
            PrField::LineStart => "lineStart",
            PrField::LineEnd => "lineEnd",
            PrField::Status => "status",
            PrField::Author => "author",
            PrField::Published => "published",
            PrField::Updated => "updated",
            PrField::Type => "type",
            PrField::Content => "content",
        }
    }
}
