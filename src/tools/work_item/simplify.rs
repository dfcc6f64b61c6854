use super::config::WorkItemField;
use crate::azure::models::{WorkItem, WorkItemComment, WorkItemRelation};
use crate::azure::reference::WorkItemRef;
use crate::output::normalize::normalize_content;
use crate::output::projection::OutputConfig;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const CHILD_RELATION: &str = "System.LinkTypes.Hierarchy-Forward";
const ATTACHMENT_RELATION: &str = "AttachedFile";
const ATTACHMENT_API_VERSION: &str = "7.1-preview.3";

fn is_zero(value: &u32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedWorkItem {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ui_url: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub rev: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub work_item_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub assigned_to: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub discussion: Vec<SimplifiedComment>,
    pub children: Vec<ChildLink>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimplifiedComment {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildLink {
    #[serde(skip_serializing_if = "is_zero")]
    pub id: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ui_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub download_url: String,
}

pub fn simplify_work_item(
    base_url: &str,
    work_item_ref: &WorkItemRef,
    item: &WorkItem,
    comments: &[WorkItemComment],
) -> SimplifiedWorkItem {
    let org = &work_item_ref.organization;
    let project = &work_item_ref.project;

    SimplifiedWorkItem {
        id: item.id,
        url: item.url.clone(),
        ui_url: ui_work_item_url(base_url, org, project, item.id),
        rev: item.rev,
        title: string_field(&item.fields, "System.Title"),
        work_item_type: string_field(&item.fields, "System.WorkItemType"),
        state: string_field(&item.fields, "System.State"),
        assigned_to: identity_display_name(&item.fields, "System.AssignedTo"),
        description: normalize_content(&string_field(&item.fields, "System.Description")),
        discussion: comments.iter().map(simplify_comment).collect(),
        children: extract_children(base_url, org, project, &item.relations),
        attachments: extract_attachments(base_url, org, project, &item.relations),
    }
}

fn simplify_comment(comment: &WorkItemComment) -> SimplifiedComment {
    SimplifiedComment {
        id: comment.id,
        author: comment
            .created_by
            .as_ref()
            .map(|identity| identity.display_name.clone())
            .unwrap_or_default(),
        created: comment.created_date.clone(),
        modified: comment.modified_date.clone(),
        text: normalize_content(&comment.text),
    }
}

fn string_field(fields: &HashMap<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn identity_display_name(fields: &HashMap<String, Value>, key: &str) -> String {
    fields
        .get(key)
        .and_then(|identity| identity.get("displayName"))
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

pub fn ui_work_item_url(base_url: &str, org: &str, project: &str, id: u32) -> String {
    format!(
        "{}/{}/{}/_workitems/edit/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(org),
        urlencoding::encode(project),
        id
    )
}

pub fn extract_children(base_url: &str, org: &str, project: &str, relations: &[WorkItemRelation]) -> Vec<ChildLink> {
    relations
        .iter()
        .filter(|relation| relation.rel == CHILD_RELATION)
        .filter_map(|relation| {
            let id = work_item_id_from_relation_url(&relation.url);
            (id != 0).then(|| ChildLink {
                id,
                url: relation.url.clone(),
                ui_url: ui_work_item_url(base_url, org, project, id),
            })
        })
        .collect()
}

pub fn extract_attachments(
    base_url: &str,
    org: &str,
    project: &str,
    relations: &[WorkItemRelation],
) -> Vec<Attachment> {
    relations
        .iter()
        .filter(|relation| relation.rel == ATTACHMENT_RELATION)
        .map(|relation| {
            let name = relation
                .attributes
                .get("name")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            let download_url = attachment_download_url(base_url, org, project, &relation.url, &name);
            Attachment {
                name,
                url: relation.url.clone(),
                download_url,
            }
        })
        .collect()
}

/// Work item id from a relation URL; 0 when none can be found.
///
/// Accepts `vstfs:///WorkItemTracking/WorkItem/{id}` and REST URLs such as
/// `https://dev.azure.com/org/_apis/wit/workItems/{id}`.
pub fn work_item_id_from_relation_url(relation_url: &str) -> u32 {
    if relation_url.is_empty() {
        return 0;
    }

    if relation_url.starts_with("vstfs:///") {
        return relation_url
            .rsplit('/')
            .next()
            .and_then(|last| last.parse().ok())
            .unwrap_or(0);
    }

    let Ok(parsed) = url::Url::parse(relation_url) else {
        return 0;
    };
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    for (i, segment) in segments.iter().enumerate().rev() {
        if segment.eq_ignore_ascii_case("workitems") {
            return segments
                .get(i + 1)
                .and_then(|id| id.parse().ok())
                .unwrap_or(0);
        }
    }

    segments
        .last()
        .and_then(|last| last.parse().ok())
        .unwrap_or(0)
}

/// REST download link for a `vstfs:///WorkItemTracking/Attachment/{guid}`
/// relation. Other URL shapes have no download link.
pub fn attachment_download_url(base_url: &str, org: &str, project: &str, relation_url: &str, name: &str) -> String {
    if !relation_url.contains("/Attachment/") {
        return String::new();
    }
    let guid = relation_url.rsplit('/').next().unwrap_or_default();
    if guid.is_empty() {
        return String::new();
    }

    let mut download = format!(
        "{}/{}/{}/_apis/wit/attachments/{}?",
        base_url.trim_end_matches('/'),
        urlencoding::encode(org),
        urlencoding::encode(project),
        urlencoding::encode(guid)
    );
    if !name.is_empty() {
        let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
        download.push_str(&format!("fileName={}&", encoded));
    }
    download.push_str(&format!("api-version={}", ATTACHMENT_API_VERSION));
    download
}

/// Projects a work item for compact output. The section lists are emitted as
/// lists whenever their mode lets them through.
pub fn work_item_to_map(item: &SimplifiedWorkItem, config: &OutputConfig<WorkItemField>) -> Map<String, Value> {
    let discussion: Vec<Value> = item
        .discussion
        .iter()
        .map(|comment| {
            Value::Object(
                config
                    .project()
                    .number(WorkItemField::CommentId, comment.id)
                    .text(WorkItemField::CommentAuthor, &comment.author)
                    .text(WorkItemField::CommentCreated, &comment.created)
                    .text(WorkItemField::CommentModified, &comment.modified)
                    .text(WorkItemField::CommentText, &comment.text)
                    .finish(),
            )
        })
        .collect();

    let children: Vec<Value> = item
        .children
        .iter()
        .map(|child| {
            Value::Object(
                config
                    .project()
                    .number(WorkItemField::ChildId, child.id)
                    .text(WorkItemField::ChildUrl, &child.url)
                    .text(WorkItemField::ChildUiUrl, &child.ui_url)
                    .finish(),
            )
        })
        .collect();

    let attachments: Vec<Value> = item
        .attachments
        .iter()
        .map(|attachment| {
            Value::Object(
                config
                    .project()
                    .text(WorkItemField::AttachmentName, &attachment.name)
                    .text(WorkItemField::AttachmentUrl, &attachment.url)
                    .text(WorkItemField::AttachmentDownloadUrl, &attachment.download_url)
                    .finish(),
            )
        })
        .collect();

    config
        .project()
        .number(WorkItemField::Id, item.id)
        .text(WorkItemField::Url, &item.url)
        .text(WorkItemField::UiUrl, &item.ui_url)
        .number(WorkItemField::Rev, item.rev)
        .text(WorkItemField::Title, &item.title)
        .text(WorkItemField::Type, &item.work_item_type)
        .text(WorkItemField::State, &item.state)
        .text(WorkItemField::AssignedTo, &item.assigned_to)
        .text(WorkItemField::Description, &item.description)
        .field(WorkItemField::Discussion, !discussion.is_empty(), discussion)
        .field(WorkItemField::Children, !children.is_empty(), children)
        .field(WorkItemField::Attachments, !attachments.is_empty(), attachments)
        .finish()
}
