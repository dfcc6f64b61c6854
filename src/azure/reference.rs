//! Parsing of Azure DevOps web URLs into the organization/project/repository
//! coordinates the REST API needs.
//!
//! Two host shapes are accepted:
//! - `https://dev.azure.com/{org}/{project}/...`
//! - `https://{org}.visualstudio.com/{project}/...`

use thiserror::Error;
use url::Url;

const DEV_AZURE_HOST: &str = "dev.azure.com";
const VISUAL_STUDIO_SUFFIX: &str = ".visualstudio.com";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("unsupported Azure DevOps host: {0}")]
    UnsupportedHost(String),
    #[error("{kind} URL path does not match expected {host} format")]
    MalformedPath { kind: &'static str, host: &'static str },
    #[error("invalid work item id: {0}")]
    InvalidWorkItemId(String),
}

/// A pull request located by its web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub organization: String,
    pub project: String,
    pub repository: String,
    pub id: String,
}

/// A work item located by its web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItemRef {
    pub organization: String,
    pub project: String,
    pub id: u32,
}

enum Host {
    DevAzure,
    VisualStudio { organization: String },
}

/// Splits the URL into its host shape and percent-decoded path segments.
fn split_url(raw_url: &str) -> Result<(Host, Vec<String>), UrlError> {
    let url = Url::parse(raw_url).map_err(|_| UrlError::InvalidUrl(raw_url.to_string()))?;
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let segments = decode_segments(url.path());

    if host == DEV_AZURE_HOST {
        return Ok((Host::DevAzure, segments));
    }

    if let Some(organization) = host.strip_suffix(VISUAL_STUDIO_SUFFIX)
        && !organization.is_empty()
    {
        let organization = organization
            .split('.')
            .next()
            .unwrap_or(organization)
            .to_string();
        return Ok((Host::VisualStudio { organization }, segments));
    }

    Err(UrlError::UnsupportedHost(host))
}

/// Decodes each non-empty path segment on its own. A segment that fails to
/// decode is kept as written.
fn decode_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect()
}

/// Parses `dev.azure.com/{org}/{project}/_git/{repo}/pullrequest/{id}` or
/// `{org}.visualstudio.com/{project}/_git/{repo}/pullrequest/{id}`.
pub fn parse_pull_request_url(raw_url: &str) -> Result<PullRequestRef, UrlError> {
    let (host, parts) = split_url(raw_url)?;

    match host {
        Host::DevAzure => {
            if parts.len() < 6 || parts[2] != "_git" || parts[4] != "pullrequest" {
                return Err(UrlError::MalformedPath {
                    kind: "PR",
                    host: "dev.azure.com",
                });
            }
            Ok(PullRequestRef {
                organization: parts[0].clone(),
                project: parts[1].clone(),
                repository: parts[3].clone(),
                id: parts[5].clone(),
            })
        }
        Host::VisualStudio { organization } => {
            if parts.len() < 5 || parts[1] != "_git" || parts[3] != "pullrequest" {
                return Err(UrlError::MalformedPath {
                    kind: "PR",
                    host: "{org}.visualstudio.com",
                });
            }
            Ok(PullRequestRef {
                organization,
                project: parts[0].clone(),
                repository: parts[2].clone(),
                id: parts[4].clone(),
            })
        }
    }
}

/// Parses `dev.azure.com/{org}/{project}/_workitems/edit/{id}` or
/// `{org}.visualstudio.com/{project}/_workitems/edit/{id}`.
pub fn parse_work_item_url(raw_url: &str) -> Result<WorkItemRef, UrlError> {
    let (host, parts) = split_url(raw_url)?;

    match host {
        Host::DevAzure => {
            if parts.len() < 5 || parts[2] != "_workitems" || parts[3] != "edit" {
                return Err(UrlError::MalformedPath {
                    kind: "work item",
                    host: "dev.azure.com",
                });
            }
            Ok(WorkItemRef {
                organization: parts[0].clone(),
                project: parts[1].clone(),
                id: parse_work_item_id(&parts[4])?,
            })
        }
        Host::VisualStudio { organization } => {
            if parts.len() < 4 || parts[1] != "_workitems" || parts[2] != "edit" {
                return Err(UrlError::MalformedPath {
                    kind: "work item",
                    host: "{org}.visualstudio.com",
                });
            }
            Ok(WorkItemRef {
                organization,
                project: parts[0].clone(),
                id: parse_work_item_id(&parts[3])?,
            })
        }
    }
}

fn parse_work_item_id(raw: &str) -> Result<u32, UrlError> {
    match raw.parse::<u32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(UrlError::InvalidWorkItemId(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(org: &str, project: &str, repo: &str, id: &str) -> PullRequestRef {
        PullRequestRef {
            organization: org.to_string(),
            project: project.to_string(),
            repository: repo.to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn parses_dev_azure_pull_request() {
        let got =
            parse_pull_request_url("https://dev.azure.com/org/project/_git/repo/pullrequest/123")
                .unwrap();
        assert_eq!(got, pr("org", "project", "repo", "123"));
    }

    #[test]
    fn parses_visualstudio_pull_request() {
        let got =
            parse_pull_request_url("https://org.visualstudio.com/project/_git/repo/pullrequest/123")
                .unwrap();
        assert_eq!(got, pr("org", "project", "repo", "123"));
    }

    #[test]
    fn decodes_each_path_segment() {
        let got = parse_pull_request_url(
            "https://dev.azure.com/org/my%20project/_git/my%20repo/pullrequest/123",
        )
        .unwrap();
        assert_eq!(got, pr("org", "my project", "my repo", "123"));
    }

    #[test]
    fn undecodable_segment_is_kept_raw() {
        // %FF alone is not valid UTF-8 once decoded.
        let got = parse_pull_request_url(
            "https://dev.azure.com/org/proj%FF/_git/repo/pullrequest/7",
        )
        .unwrap();
        assert_eq!(got.project, "proj%FF");
    }

    #[test]
    fn host_is_case_insensitive() {
        let got =
            parse_pull_request_url("https://Dev.Azure.com/org/project/_git/repo/pullrequest/9")
                .unwrap();
        assert_eq!(got.id, "9");
    }

    #[test]
    fn rejects_unsupported_host() {
        let err =
            parse_pull_request_url("https://example.com/org/project/_git/repo/pullrequest/123")
                .unwrap_err();
        assert_eq!(err, UrlError::UnsupportedHost("example.com".to_string()));
    }

    #[test]
    fn rejects_wrong_pull_request_path() {
        let err =
            parse_pull_request_url("https://dev.azure.com/org/project/_git/repo/pullrequests/123")
                .unwrap_err();
        assert!(matches!(err, UrlError::MalformedPath { .. }));

        let err = parse_pull_request_url("https://dev.azure.com/org/project/_git/repo")
            .unwrap_err();
        assert!(matches!(err, UrlError::MalformedPath { .. }));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = parse_pull_request_url("://not a url").unwrap_err();
        assert!(matches!(err, UrlError::InvalidUrl(_)));
    }

    #[test]
    fn parses_work_item_urls() {
        let want = WorkItemRef {
            organization: "org".to_string(),
            project: "project".to_string(),
            id: 1144734,
        };
        assert_eq!(
            parse_work_item_url("https://dev.azure.com/org/project/_workitems/edit/1144734")
                .unwrap(),
            want
        );
        assert_eq!(
            parse_work_item_url("https://org.visualstudio.com/project/_workitems/edit/1144734")
                .unwrap(),
            want
        );
    }

    #[test]
    fn work_item_project_is_decoded() {
        let got =
            parse_work_item_url("https://dev.azure.com/org/my%20project/_workitems/edit/5")
                .unwrap();
        assert_eq!(got.project, "my project");
    }

    #[test]
    fn rejects_bad_work_item_urls() {
        assert!(matches!(
            parse_work_item_url("https://example.com/org/project/_workitems/edit/1"),
            Err(UrlError::UnsupportedHost(_))
        ));
        assert!(matches!(
            parse_work_item_url("https://dev.azure.com/org/project/_workitems/edits/1"),
            Err(UrlError::MalformedPath { .. })
        ));
        assert!(matches!(
            parse_work_item_url("https://dev.azure.com/org/project/_workitems/edit/not-an-int"),
            Err(UrlError::InvalidWorkItemId(_))
        ));
        assert!(matches!(
            parse_work_item_url("://not a url"),
            Err(UrlError::InvalidUrl(_))
        ));
    }
}
