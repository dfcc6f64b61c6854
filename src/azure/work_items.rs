use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{CommentListResponse, WorkItem, WorkItemComment};
use crate::azure::reference::WorkItemRef;

const API_VERSION: &str = "7.1-preview.3";
const COMMENTS_PAGE_SIZE: usize = 200;
const CONTINUATION_HEADER: &str = "x-ms-continuationtoken";

fn work_item_url(client: &AzureDevOpsClient, work_item: &WorkItemRef) -> String {
    let path = format!(
        "wit/workitems/{}?$expand=relations&api-version={}",
        work_item.id, API_VERSION
    );
    client.api_url(&work_item.organization, &work_item.project, &path)
}

fn comments_url(
    client: &AzureDevOpsClient,
    work_item: &WorkItemRef,
    top: usize,
    continuation_token: Option<&str>,
) -> String {
    let mut path = format!(
        "wit/workItems/{}/comments?api-version={}",
        work_item.id, API_VERSION
    );
    if top > 0 {
        path.push_str(&format!("&$top={}", top));
    }
    if let Some(token) = continuation_token {
        path.push_str(&format!(
            "&continuationToken={}",
            urlencoding::encode(token)
        ));
    }
    client.api_url(&work_item.organization, &work_item.project, &path)
}

pub async fn fetch_work_item(
    client: &AzureDevOpsClient,
    work_item: &WorkItemRef,
) -> Result<WorkItem, AzureError> {
    client.get(&work_item_url(client, work_item)).await
}

/// Pages through a work item's comments until the server stops returning a
/// continuation token or `max_comments` (when non-zero) is reached. The result
/// is truncated to exactly `max_comments` in the latter case.
pub async fn fetch_all_comments(
    client: &AzureDevOpsClient,
    work_item: &WorkItemRef,
    max_comments: usize,
) -> Result<Vec<WorkItemComment>, AzureError> {
    let mut all_comments = Vec::new();
    let mut continuation_token: Option<String> = None;

    loop {
        let url = comments_url(
            client,
            work_item,
            COMMENTS_PAGE_SIZE,
            continuation_token.as_deref(),
        );
        let (response, headers): (CommentListResponse, _) = client.get_with_headers(&url).await?;

        all_comments.extend(response.comments);
        if max_comments > 0 && all_comments.len() >= max_comments {
            all_comments.truncate(max_comments);
            return Ok(all_comments);
        }

        // Newer API versions return the token in the body, older ones in a header.
        continuation_token = response
            .continuation_token
            .filter(|token| !token.is_empty())
            .or_else(|| {
                headers
                    .get(CONTINUATION_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .filter(|token| !token.is_empty())
                    .map(|token| token.to_string())
            });

        if continuation_token.is_none() {
            return Ok(all_comments);
        }
    }
}
