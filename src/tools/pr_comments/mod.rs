//! `ado-pr-comments`: review threads of a pull request.

pub mod config;
pub mod filter;
pub mod simplify;
pub mod status;

use crate::azure::api::DevOpsApi;
use crate::azure::auth::CredentialResolver;
use crate::azure::client::AzureDevOpsClient;
use crate::azure::reference::parse_pull_request_url;
use crate::output::OutputFormat;
use crate::tools::{ToolError, render};
use config::{CONFIG_FILE, PrCommentsConfig};
use filter::CompiledFilter;
use simplify::{SimplifiedThread, simplify_threads, threads_to_maps};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub pr_url: String,
    /// Overrides the configured `status.include` when non-empty.
    pub statuses: Vec<String>,
    pub format: OutputFormat,
    pub no_filter: bool,
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PrComments {
    pub threads: Vec<SimplifiedThread>,
    /// Set only when a status filter matched nothing. Not part of `output`.
    pub summary: String,
    pub output: String,
}

pub async fn run(opts: &Options) -> Result<PrComments, ToolError> {
    parse_pull_request_url(&opts.pr_url)?;

    let credential = CredentialResolver::new().resolve().await?;
    log::debug!("Auth: {}", credential.scheme().as_str());

    let config: PrCommentsConfig =
        crate::config::load_or_default(opts.config_dir.as_deref(), CONFIG_FILE);
    let client = AzureDevOpsClient::new(credential)?;
    run_with(&client, opts, &config).await
}

/// The pipeline after credentials and config are resolved.
pub async fn run_with(
    api: &dyn DevOpsApi,
    opts: &Options,
    config: &PrCommentsConfig,
) -> Result<PrComments, ToolError> {
    let pr = parse_pull_request_url(&opts.pr_url)?;

    let filter = if opts.no_filter {
        None
    } else {
        compile_filter(config)
    };

    let threads = api.fetch_threads(&pr).await?;
    let all_counts = status::count_by_status(&threads);

    let statuses = if opts.statuses.is_empty() {
        &config.status.include
    } else {
        &opts.statuses
    };
    let filtered = status::filter_by_status(threads, statuses);
    let summary = status::empty_status_filter_summary(statuses, &all_counts, filtered.len());

    let simplified = simplify_threads(&filtered, filter.as_ref());
    let projected = threads_to_maps(&simplified, &config.output);
    let output = render(&simplified, &projected, opts.format)?;

    Ok(PrComments {
        threads: simplified,
        summary,
        output,
    })
}

fn compile_filter(config: &PrCommentsConfig) -> Option<CompiledFilter> {
    match config.filter.compile() {
        Ok(filter) => Some(filter),
        Err(e) => {
            log::warn!("Ignoring content filter, invalid pattern: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::api::MockDevOpsApi;
    use crate::azure::client::AzureError;
    use crate::azure::models::Thread;
    use crate::tools::pr_comments::filter::FilterConfig;
    use serde_json::json;

    const PR_URL: &str = "https://dev.azure.com/org/project/_git/repo/pullrequest/42";

    fn threads() -> Vec<Thread> {
        serde_json::from_value(json!([
            {
                "id": 1,
                "status": "active",
                "threadContext": {"filePath": "/a.rs", "rightFileStart": {"line": 3}},
                "comments": [{"author": {"displayName": "Bot"}, "content": "Fix this\n--\nfooter"}]
            },
            {
                "id": 2,
                "status": "fixed",
                "comments": [{"author": {"displayName": "Ann"}, "content": "<b>done</b>"}]
            },
            {"id": 3, "status": "closed", "comments": []}
        ]))
        .unwrap()
    }

    fn api_returning(threads: Vec<Thread>) -> MockDevOpsApi {
        let mut api = MockDevOpsApi::new();
        api.expect_fetch_threads()
            .withf(|pr| pr.repository == "repo" && pr.id == "42")
            .times(1)
            .returning(move |_| Ok(threads.clone()));
        api
    }

    fn options(statuses: &[&str], format: OutputFormat) -> Options {
        Options {
            pr_url: PR_URL.to_string(),
            statuses: statuses.iter().map(|s| s.to_string()).collect(),
            format,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn no_status_filter_returns_every_thread() {
        let api = api_returning(threads());
        let result = run_with(&api, &options(&[], OutputFormat::Json), &PrCommentsConfig::default())
            .await
            .unwrap();

        assert_eq!(result.threads.len(), 3);
        assert_eq!(result.summary, "");
        assert_eq!(result.threads[1].comments[0].content, "done");
    }

    #[tokio::test]
    async fn requested_statuses_override_config() {
        let api = api_returning(threads());
        let mut config = PrCommentsConfig::default();
        config.status.include = vec!["closed".to_string()];

        let result = run_with(&api, &options(&["fixed"], OutputFormat::Json), &config)
            .await
            .unwrap();
        assert_eq!(result.threads.len(), 1);
        assert_eq!(result.threads[0].status, "fixed");
    }

    #[tokio::test]
    async fn config_statuses_apply_when_none_requested() {
        let api = api_returning(threads());
        let mut config = PrCommentsConfig::default();
        config.status.include = vec!["closed".to_string()];

        let result = run_with(&api, &options(&[], OutputFormat::Json), &config)
            .await
            .unwrap();
        assert_eq!(result.threads.len(), 1);
        assert_eq!(result.threads[0].status, "closed");
    }

    #[tokio::test]
    async fn unmatched_filter_produces_summary() {
        let api = api_returning(threads());
        let result = run_with(&api, &options(&["pending"], OutputFormat::Compact), &PrCommentsConfig::default())
            .await
            .unwrap();

        assert!(result.threads.is_empty());
        assert_eq!(
            result.summary,
            "0 comment threads matched status filter (pending); 3 comment threads have other statuses: active=1, fixed=1, closed=1"
        );
        assert_eq!(result.output, "[0]:");
    }

    #[tokio::test]
    async fn content_filter_respects_no_filter() {
        let mut config = PrCommentsConfig::default();
        config.filter = FilterConfig {
            cut_patterns: vec!["(?m)^--".to_string()],
            ..Default::default()
        };

        let api = api_returning(threads());
        let filtered = run_with(&api, &options(&["active"], OutputFormat::Json), &config)
            .await
            .unwrap();
        assert_eq!(filtered.threads[0].comments[0].content, "Fix this");

        let api = api_returning(threads());
        let mut opts = options(&["active"], OutputFormat::Json);
        opts.no_filter = true;
        let unfiltered = run_with(&api, &opts, &config).await.unwrap();
        assert_eq!(unfiltered.threads[0].comments[0].content, "Fix this\n--\nfooter");
    }

    #[tokio::test]
    async fn invalid_filter_pattern_is_ignored() {
        let mut config = PrCommentsConfig::default();
        config.filter.cut_patterns = vec!["(".to_string()];

        let api = api_returning(threads());
        let result = run_with(&api, &options(&["active"], OutputFormat::Json), &config)
            .await
            .unwrap();
        assert_eq!(result.threads[0].comments[0].content, "Fix this\n--\nfooter");
    }

    #[tokio::test]
    async fn compact_output_is_projected() {
        let api = api_returning(threads());
        let result = run_with(&api, &options(&["active"], OutputFormat::Compact), &PrCommentsConfig::default())
            .await
            .unwrap();
        assert_eq!(
            result.output,
            "[1]:\n  - filePath: /a.rs\n    lineStart: 3\n    status: active\n    comments[1]{author,content}:\n      Bot,\"Fix this\\n--\\nfooter\""
        );
    }

    #[tokio::test]
    async fn api_errors_propagate() {
        let mut api = MockDevOpsApi::new();
        api.expect_fetch_threads().returning(|_| {
            Err(AzureError::Status {
                status: 401,
                url: "u".to_string(),
                body: String::new(),
            })
        });

        let err = run_with(&api, &options(&[], OutputFormat::Json), &PrCommentsConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "request failed (401): u");
    }

    #[tokio::test]
    async fn bad_url_fails_before_any_request() {
        let mut api = MockDevOpsApi::new();
        api.expect_fetch_threads().times(0);

        let opts = Options {
            pr_url: "https://example.com/x".to_string(),
            ..Default::default()
        };
        let err = run_with(&api, &opts, &PrCommentsConfig::default()).await.unwrap_err();
        assert!(matches!(err, ToolError::Url(_)));
    }
}
