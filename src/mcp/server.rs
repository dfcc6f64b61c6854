use crate::output::OutputFormat;
use crate::tools::{pr_comments, work_item};
use rmcp::{
    ErrorData as McpError,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars,
    schemars::JsonSchema,
    serde::Deserialize,
    tool, tool_handler, tool_router,
};
use std::path::PathBuf;

#[derive(Clone)]
pub struct ToolboxMcpServer {
    config_dir: Option<PathBuf>,
    tool_router: ToolRouter<Self>,
}

#[derive(Deserialize, JsonSchema)]
struct PrCommentsArgs {
    /// Azure DevOps pull request URL
    #[serde(default)]
    pr_url: String,
    /// Only return threads with these statuses (active, pending, fixed, wontFix, byDesign, closed).
    /// When omitted the configured default applies, which is every status unless configured otherwise.
    #[serde(default)]
    statuses: Vec<String>,
    /// Output format. Defaults to a compact token-efficient notation; set to "json" for JSON.
    #[serde(default)]
    format: Option<String>,
    /// Disable the configured content filter
    #[serde(default)]
    no_filter: bool,
}

#[derive(Deserialize, JsonSchema)]
struct WorkItemArgs {
    /// Azure DevOps work item URL
    #[serde(default)]
    work_item_url: String,
    /// Output format. Defaults to a compact token-efficient notation; set to "json" for JSON.
    #[serde(default)]
    format: Option<String>,
    /// Leave out the description
    #[serde(default)]
    no_description: bool,
    /// Leave out the discussion (comments are then not fetched)
    #[serde(default)]
    no_discussion: bool,
    /// Leave out child work items
    #[serde(default)]
    no_children: bool,
    /// Leave out attachments
    #[serde(default)]
    no_attachments: bool,
    /// Maximum number of discussion comments to fetch (0 or omitted for all)
    #[serde(default)]
    max_comments: Option<usize>,
}

fn error_result(message: impl std::fmt::Display) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("error: {}", message))])
}

fn format_of(format: Option<&str>) -> OutputFormat {
    format.map(OutputFormat::parse).unwrap_or_default()
}

/// In compact mode a non-empty summary goes first as its own text content.
/// JSON output stays a single parseable document.
fn pr_comments_contents(result: pr_comments::PrComments, format: OutputFormat) -> Vec<Content> {
    let mut contents = Vec::with_capacity(2);
    if format != OutputFormat::Json && !result.summary.is_empty() {
        contents.push(Content::text(result.summary));
    }
    contents.push(Content::text(result.output));
    contents
}

#[tool_router]
impl ToolboxMcpServer {
    pub fn new(config_dir: Option<PathBuf>) -> Self {
        Self {
            config_dir,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Fetch pull request comment threads from Azure DevOps. Returns threads with file location, status and comments (author, dates, content)."
    )]
    async fn ado_pr_comments(
        &self,
        args: Parameters<PrCommentsArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = args.0;
        log::info!(
            "Tool invoked: ado_pr_comments(pr_url={}, statuses={:?}, format={:?}, no_filter={})",
            args.pr_url,
            args.statuses,
            args.format,
            args.no_filter
        );

        if args.pr_url.trim().is_empty() {
            return Ok(error_result("pr_url is required"));
        }

        let format = format_of(args.format.as_deref());
        let opts = pr_comments::Options {
            pr_url: args.pr_url,
            statuses: args.statuses,
            format,
            no_filter: args.no_filter,
            config_dir: self.config_dir.clone(),
        };

        match pr_comments::run(&opts).await {
            Ok(result) => Ok(CallToolResult::success(pr_comments_contents(result, format))),
            Err(e) => Ok(error_result(e)),
        }
    }

    #[tool(
        description = "Fetch an Azure DevOps work item with its description, discussion, child work items and attachments."
    )]
    async fn ado_work_item(
        &self,
        args: Parameters<WorkItemArgs>,
    ) -> Result<CallToolResult, McpError> {
        let args = args.0;
        log::info!(
            "Tool invoked: ado_work_item(work_item_url={}, format={:?}, max_comments={:?})",
            args.work_item_url,
            args.format,
            args.max_comments
        );

        if args.work_item_url.trim().is_empty() {
            return Ok(error_result("work_item_url is required"));
        }

        let opts = work_item::Options {
            work_item_url: args.work_item_url,
            include_description: !args.no_description,
            include_discussion: !args.no_discussion,
            include_children: !args.no_children,
            include_attachments: !args.no_attachments,
            max_comments: args.max_comments.unwrap_or(0),
            format: format_of(args.format.as_deref()),
            config_dir: self.config_dir.clone(),
        };

        match work_item::run(&opts).await {
            Ok(result) => Ok(CallToolResult::success(vec![Content::text(result.output)])),
            Err(e) => Ok(error_result(e)),
        }
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ToolboxMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "toolbox".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "Use these tools to read Azure DevOps pull request comments and work items".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
