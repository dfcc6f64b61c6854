//! `ado-work-item`: a work item with its discussion, children and attachments.

pub mod config;
pub mod simplify;

use crate::azure::api::DevOpsApi;
use crate::azure::auth::CredentialResolver;
use crate::azure::client::AzureDevOpsClient;
use crate::azure::reference::parse_work_item_url;
use crate::output::OutputFormat;
use crate::tools::{ToolError, render};
use config::{CONFIG_FILE, WorkItemConfig};
use simplify::{SimplifiedWorkItem, simplify_work_item, work_item_to_map};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Options {
    pub work_item_url: String,
    pub include_description: bool,
    pub include_discussion: bool,
    pub include_children: bool,
    pub include_attachments: bool,
    /// 0 fetches the whole discussion.
    pub max_comments: usize,
    pub format: OutputFormat,
    pub config_dir: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            work_item_url: String::new(),
            include_description: true,
            include_discussion: true,
            include_children: true,
            include_attachments: true,
            max_comments: 0,
            format: OutputFormat::default(),
            config_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorkItemDetails {
    pub work_item: SimplifiedWorkItem,
    pub output: String,
}

pub async fn run(opts: &Options) -> Result<WorkItemDetails, ToolError> {
    parse_work_item_url(&opts.work_item_url)?;

    let credential = CredentialResolver::new().resolve().await?;
    log::debug!("Auth: {}", credential.scheme().as_str());

    let config: WorkItemConfig =
        crate::config::load_or_default(opts.config_dir.as_deref(), CONFIG_FILE);
    let client = AzureDevOpsClient::new(credential)?;
    run_with(&client, client.base_url(), opts, &config).await
}

/// The pipeline after credentials and config are resolved. `base_url` is
/// used for the UI and download links.
pub async fn run_with(
    api: &dyn DevOpsApi,
    base_url: &str,
    opts: &Options,
    config: &WorkItemConfig,
) -> Result<WorkItemDetails, ToolError> {
    let work_item_ref = parse_work_item_url(&opts.work_item_url)?;

    let item = api.fetch_work_item(&work_item_ref).await?;
    let comments = if opts.include_discussion {
        api.fetch_all_comments(&work_item_ref, opts.max_comments)
            .await?
    } else {
        Vec::new()
    };

    let mut simplified = simplify_work_item(base_url, &work_item_ref, &item, &comments);
    if !opts.include_description {
        simplified.description.clear();
    }
    if !opts.include_children {
        simplified.children.clear();
    }
    if !opts.include_attachments {
        simplified.attachments.clear();
    }

    let projected = work_item_to_map(&simplified, &config.output);
    let output = render(&simplified, &projected, opts.format)?;

    Ok(WorkItemDetails {
        work_item: simplified,
        output,
    })
}
