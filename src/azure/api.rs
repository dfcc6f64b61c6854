use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{Thread, WorkItem, WorkItemComment};
use crate::azure::reference::{PullRequestRef, WorkItemRef};
use crate::azure::{pull_requests, work_items};
use async_trait::async_trait;

/// The Azure DevOps reads the tools depend on.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait DevOpsApi: Send + Sync {
    async fn fetch_threads(&self, pr: &PullRequestRef) -> Result<Vec<Thread>, AzureError>;

    async fn fetch_work_item(&self, work_item: &WorkItemRef) -> Result<WorkItem, AzureError>;

    /// Pages through the discussion. `max_comments == 0` means no limit.
    async fn fetch_all_comments(
        &self,
        work_item: &WorkItemRef,
        max_comments: usize,
    ) -> Result<Vec<WorkItemComment>, AzureError>;
}

#[async_trait]
impl DevOpsApi for AzureDevOpsClient {
    async fn fetch_threads(&self, pr: &PullRequestRef) -> Result<Vec<Thread>, AzureError> {
        pull_requests::fetch_threads(self, pr).await
    }

    async fn fetch_work_item(&self, work_item: &WorkItemRef) -> Result<WorkItem, AzureError> {
        work_items::fetch_work_item(self, work_item).await
    }

    async fn fetch_all_comments(
        &self,
        work_item: &WorkItemRef,
        max_comments: usize,
    ) -> Result<Vec<WorkItemComment>, AzureError> {
        work_items::fetch_all_comments(self, work_item, max_comments).await
    }
}
