use super::config::PrField;
use super::filter::CompiledFilter;
use crate::azure::models::Thread;
use crate::output::normalize::normalize_content;
use crate::output::projection::OutputConfig;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedThread {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_start: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_end: Option<u32>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    pub comments: Vec<SimplifiedComment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimplifiedComment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub published: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub updated: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub comment_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// Flattens raw threads. Comment content is normalised, then run through
/// `filter` when one is given and the author matches it.
pub fn simplify_threads(threads: &[Thread], filter: Option<&CompiledFilter>) -> Vec<SimplifiedThread> {
    threads.iter().map(|thread| simplify_thread(thread, filter)).collect()
}

fn simplify_thread(thread: &Thread, filter: Option<&CompiledFilter>) -> SimplifiedThread {
    let context = thread.thread_context.as_ref();

    let file_path = match context.filter(|c| !c.file_path.is_empty()) {
        Some(c) => c.file_path.clone(),
        None => thread
            .properties
            .as_ref()
            .and_then(|p| p.file_path.as_ref())
            .map(|p| p.value.clone())
            .unwrap_or_default(),
    };

    let comments = thread
        .comments
        .iter()
        .map(|comment| {
            let author = comment
                .author
                .as_ref()
                .map(|a| a.display_name.clone())
                .unwrap_or_default();
            let mut content = normalize_content(&comment.content);
            if let Some(filter) = filter.filter(|f| f.should_filter(&author)) {
                content = filter.apply(&content);
            }
            SimplifiedComment {
                author,
                published: comment.published_date.clone(),
                updated: comment.last_updated_date.clone(),
                comment_type: comment.comment_type.clone(),
                content,
            }
        })
        .collect();

    SimplifiedThread {
        file_path,
        line_start: context.and_then(|c| c.right_file_start).map(|p| p.line),
        line_end: context.and_then(|c| c.right_file_end).map(|p| p.line),
        status: thread.status.clone(),
        comments,
    }
}

/// Projects one thread for compact output. `comments` is always present.
pub fn thread_to_map(thread: &SimplifiedThread, config: &OutputConfig<PrField>) -> Map<String, Value> {
    let comments: Vec<Value> = thread
        .comments
        .iter()
        .map(|comment| Value::Object(comment_to_map(comment, config)))
        .collect();

    config
        .project()
        .text(PrField::FilePath, &thread.file_path)
        .field(PrField::LineStart, thread.line_start.is_some(), thread.line_start)
        .field(PrField::LineEnd, thread.line_end.is_some(), thread.line_end)
        .text(PrField::Status, &thread.status)
        .always("comments", comments)
        .finish()
}

fn comment_to_map(comment: &SimplifiedComment, config: &OutputConfig<PrField>) -> Map<String, Value> {
    config
        .project()
        .text(PrField::Author, &comment.author)
        .text(PrField::Published, &comment.published)
        .text(PrField::Updated, &comment.updated)
        .text(PrField::Type, &comment.comment_type)
        .text(PrField::Content, &comment.content)
        .finish()
}

pub fn threads_to_maps(threads: &[SimplifiedThread], config: &OutputConfig<PrField>) -> Vec<Value> {
    threads
        .iter()
        .map(|thread| Value::Object(thread_to_map(thread, config)))
        .collect()
}
