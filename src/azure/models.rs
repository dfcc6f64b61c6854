use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Azure DevOps sends `null` for some absent strings; read those as empty.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ThreadListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: Vec<Thread>,
}

/// A comment thread on a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default)]
    pub thread_context: Option<ThreadContext>,
    #[serde(default)]
    pub properties: Option<ThreadProperties>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<ThreadComment>,
}

/// File location of a thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadContext {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file_path: String,
    #[serde(default)]
    pub right_file_start: Option<FilePosition>,
    #[serde(default)]
    pub right_file_end: Option<FilePosition>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FilePosition {
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadProperties {
    #[serde(rename = "FilePath", default)]
    pub file_path: Option<PropertyValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyValue {
    #[serde(rename = "$value", default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadComment {
    #[serde(default)]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_updated_date: String,
    #[serde(default)]
    pub author: Option<IdentityRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
}

/// The slice of a pull request needed to resolve its repository id.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PullRequest {
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RepositoryRef {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: u32,
    #[serde(default)]
    pub rev: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: HashMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relations: Vec<WorkItemRelation>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkItemRelation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rel: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<WorkItemComment>,
    #[serde(default)]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItemComment {
    #[serde(default)]
    pub id: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_date: String,
    #[serde(default)]
    pub created_by: Option<IdentityRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modified_date: String,
}
