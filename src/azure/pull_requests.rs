use crate::azure::client::{AzureDevOpsClient, AzureError};
use crate::azure::models::{PullRequest, Thread, ThreadListResponse};
use crate::azure::reference::PullRequestRef;

const API_VERSION: &str = "7.1-preview.1";

fn threads_url(client: &AzureDevOpsClient, pr: &PullRequestRef, repository: &str) -> String {
    let path = format!(
        "git/repositories/{}/pullRequests/{}/threads?api-version={}",
        urlencoding::encode(repository),
        urlencoding::encode(&pr.id),
        API_VERSION
    );
    client.api_url(&pr.organization, &pr.project, &path)
}

fn pull_request_url(client: &AzureDevOpsClient, pr: &PullRequestRef) -> String {
    let path = format!(
        "git/pullRequests/{}?api-version={}",
        urlencoding::encode(&pr.id),
        API_VERSION
    );
    client.api_url(&pr.organization, &pr.project, &path)
}

/// Fetches every comment thread of a pull request.
///
/// The repository segment of a web URL is a name, which the threads endpoint
/// does not always accept. On a 404 the pull request is looked up by id to
/// learn the repository id and the threads request is retried once with it.
pub async fn fetch_threads(
    client: &AzureDevOpsClient,
    pr: &PullRequestRef,
) -> Result<Vec<Thread>, AzureError> {
    match client
        .get::<ThreadListResponse>(&threads_url(client, pr, &pr.repository))
        .await
    {
        Ok(response) => return Ok(response.value),
        Err(e) if e.status() == Some(404) => {
            log::debug!("Thread fetch 404; attempting to resolve PR and retry");
        }
        Err(e) => return Err(e),
    }

    let pull_request: PullRequest = client.get(&pull_request_url(client, pr)).await?;
    let repository_id = match pull_request.repository {
        Some(repository) if !repository.id.is_empty() => repository.id,
        _ => return Err(AzureError::MissingRepositoryId),
    };

    let response: ThreadListResponse = client
        .get(&threads_url(client, pr, &repository_id))
        .await?;
    Ok(response.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::auth::Credential;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pr() -> PullRequestRef {
        PullRequestRef {
            organization: "org".to_string(),
            project: "project".to_string(),
            repository: "repo".to_string(),
            id: "42".to_string(),
        }
    }

    fn client_for(server: &MockServer) -> AzureDevOpsClient {
        AzureDevOpsClient::with_base_url(Credential::basic("dummy"), &server.uri()).unwrap()
    }

    fn threads_body() -> serde_json::Value {
        json!({
            "value": [
                {
                    "id": 1,
                    "status": "active",
                    "threadContext": {
                        "filePath": "/src/lib.rs",
                        "rightFileStart": {"line": 10, "offset": 1},
                        "rightFileEnd": {"line": 12, "offset": 1}
                    },
                    "comments": [
                        {
                            "id": 1,
                            "content": "Please rename this.",
                            "commentType": "text",
                            "publishedDate": "2025-01-01T00:00:00Z",
                            "author": {"displayName": "Jane Doe"}
                        }
                    ]
                },
                {"id": 2, "status": "fixed", "comments": []}
            ],
            "count": 2
        })
    }

    #[tokio::test]
    async fn fetches_threads_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/repo/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(threads_body()))
            .expect(1)
            .mount(&server)
            .await;

        let threads = fetch_threads(&client_for(&server), &pr()).await.unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].status, "active");
        let context = threads[0].thread_context.as_ref().unwrap();
        assert_eq!(context.file_path, "/src/lib.rs");
        assert_eq!(context.right_file_start.unwrap().line, 10);
        assert_eq!(
            threads[0].comments[0].author.as_ref().unwrap().display_name,
            "Jane Doe"
        );
    }

    #[tokio::test]
    async fn retries_with_repository_id_after_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/repo/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/pullRequests/42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"repository": {"id": "guid-1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/guid-1/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(threads_body()))
            .expect(1)
            .mount(&server)
            .await;

        let threads = fetch_threads(&client_for(&server), &pr()).await.unwrap();
        assert_eq!(threads.len(), 2);
    }

    #[tokio::test]
    async fn second_failure_propagates_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/repo/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/pullRequests/42"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = fetch_threads(&client_for(&server), &pr()).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn missing_repository_id_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/repo/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/pullRequests/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"pullRequestId": 42})))
            .mount(&server)
            .await;

        let err = fetch_threads(&client_for(&server), &pr()).await.unwrap_err();
        assert!(matches!(err, AzureError::MissingRepositoryId));
    }

    #[tokio::test]
    async fn other_errors_do_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/repositories/repo/pullRequests/42/threads"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/org/project/_apis/git/pullRequests/42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = fetch_threads(&client_for(&server), &pr()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
