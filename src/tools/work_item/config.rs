use crate::output::projection::{FieldMode, OutputConfig, OutputField};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "ado-work-item.json";

/// Contents of `ado-work-item.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemConfig {
    #[serde(default)]
    pub output: OutputConfig<WorkItemField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkItemField {
    Id,
    Url,
    UiUrl,
    Rev,
    Title,
    Type,
    State,
    AssignedTo,
    Description,
    Discussion,
    Children,
    Attachments,
    CommentId,
    CommentAuthor,
    CommentCreated,
    CommentModified,
    CommentText,
    ChildId,
    ChildUrl,
    ChildUiUrl,
    AttachmentName,
    AttachmentUrl,
    AttachmentDownloadUrl,
}

impl OutputField for WorkItemField {
    const ALL: &'static [Self] = &[
        WorkItemField::Id,
        WorkItemField::Url,
        WorkItemField::UiUrl,
        WorkItemField::Rev,
        WorkItemField::Title,
        WorkItemField::Type,
        WorkItemField::State,
        WorkItemField::AssignedTo,
        WorkItemField::Description,
        WorkItemField::Discussion,
        WorkItemField::Children,
        WorkItemField::Attachments,
        WorkItemField::CommentId,
        WorkItemField::CommentAuthor,
        WorkItemField::CommentCreated,
        WorkItemField::CommentModified,
        WorkItemField::CommentText,
        WorkItemField::ChildId,
        WorkItemField::ChildUrl,
        WorkItemField::ChildUiUrl,
        WorkItemField::AttachmentName,
        WorkItemField::AttachmentUrl,
        WorkItemField::AttachmentDownloadUrl,
    ];

    fn key(self) -> &'static str {
        match self {
            WorkItemField::Id => "id",
            WorkItemField::Url => "url",
            WorkItemField::UiUrl => "uiUrl",
            WorkItemField::Rev => "rev",
            WorkItemField::Title => "title",
            WorkItemField::Type => "type",
            WorkItemField::State => "state",
            WorkItemField::AssignedTo => "assignedTo",
            WorkItemField::Description => "description",
            WorkItemField::Discussion => "discussion",
            WorkItemField::Children => "children",
            WorkItemField::Attachments => "attachments",
            WorkItemField::CommentId => "commentId",
            WorkItemField::CommentAuthor => "commentAuthor",
            WorkItemField::CommentCreated => "commentCreated",
            WorkItemField::CommentModified => "commentModified",
            WorkItemField::CommentText => "commentText",
            WorkItemField::ChildId => "childId",
            WorkItemField::ChildUrl => "childUrl",
            WorkItemField::ChildUiUrl => "childUiUrl",
            WorkItemField::AttachmentName => "attachmentName",
            WorkItemField::AttachmentUrl => "attachmentUrl",
            WorkItemField::AttachmentDownloadUrl => "attachmentDownloadUrl",
        }
    }

    fn default_mode(self) -> FieldMode {
        match self {
            WorkItemField::Description
            | WorkItemField::Discussion
            | WorkItemField::Children
            | WorkItemField::Attachments => FieldMode::Always,
            _ => FieldMode::NotEmpty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_default_to_always() {
        let config = WorkItemConfig::default();
        assert_eq!(config.output.mode_of(WorkItemField::Discussion), FieldMode::Always);
        assert_eq!(config.output.mode_of(WorkItemField::Title), FieldMode::NotEmpty);
    }

    #[test]
    fn keys_round_trip() {
        for field in WorkItemField::ALL {
            assert_eq!(WorkItemField::from_key(field.key()), Some(*field));
        }
    }

    #[test]
    fn file_overrides_defaults() {
        let config: WorkItemConfig =
            serde_json::from_str(r#"{"output": {"children": "notEmpty", "url": "never"}}"#).unwrap();
        assert_eq!(config.output.mode_of(WorkItemField::Children), FieldMode::NotEmpty);
        assert_eq!(config.output.mode_of(WorkItemField::Url), FieldMode::Never);
        assert_eq!(config.output.mode_of(WorkItemField::Attachments), FieldMode::Always);
    }
}
