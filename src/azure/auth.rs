//! Credential resolution for Azure DevOps.
//!
//! Sources are tried in order: the `AZDO_PAT` and `ADO_PAT` environment
//! variables (Basic auth with the PAT), then the Azure CLI, which is asked for
//! a bearer token for the Azure DevOps resource.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use std::ffi::OsString;
use thiserror::Error;
use tokio::process::Command;

/// Azure DevOps application id, used as the token resource.
pub const AZURE_DEVOPS_RESOURCE: &str = "499b84ac-1321-427f-aa17-267ca6975798";

pub const PAT_ENV_VARS: [&str; 2] = ["AZDO_PAT", "ADO_PAT"];

#[cfg(windows)]
const AZ_PROGRAM: &str = "az.cmd";
#[cfg(not(windows))]
const AZ_PROGRAM: &str = "az";

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("missing auth: set AZDO_PAT or ADO_PAT, or sign in with `az login`")]
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
}

impl AuthScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::Basic => "Basic",
        }
    }
}

/// A resolved token, good for a single run.
#[derive(Clone)]
pub struct Credential {
    scheme: AuthScheme,
    token: SecretString,
}

impl Credential {
    pub fn basic(pat: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Basic,
            token: SecretString::from(pat.into()),
        }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            scheme: AuthScheme::Bearer,
            token: SecretString::from(token.into()),
        }
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Value for the `Authorization` header. PATs are sent as the password of
    /// an empty user name.
    pub fn authorization_header(&self) -> String {
        let token = self.token.expose_secret();
        match self.scheme {
            AuthScheme::Basic => format!("Basic {}", STANDARD.encode(format!(":{}", token))),
            AuthScheme::Bearer => format!("Bearer {}", token),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Walks the credential sources in order and returns the first that works.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    pat_vars: Vec<String>,
    cli_program: OsString,
}

impl Default for CredentialResolver {
    fn default() -> Self {
        Self {
            pat_vars: PAT_ENV_VARS.iter().map(|v| v.to_string()).collect(),
            cli_program: OsString::from(AZ_PROGRAM),
        }
    }
}

impl CredentialResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the program used for the delegated login (the Azure CLI).
    pub fn with_cli_program(mut self, program: impl Into<OsString>) -> Self {
        self.cli_program = program.into();
        self
    }

    pub async fn resolve(&self) -> Result<Credential, AuthError> {
        for var in &self.pat_vars {
            if let Ok(pat) = std::env::var(var)
                && !pat.is_empty()
            {
                log::debug!("Using PAT from {}", var);
                return Ok(Credential::basic(pat));
            }
        }

        match self.cli_token().await {
            Some(token) => Ok(Credential::bearer(token)),
            None => Err(AuthError::Unavailable),
        }
    }

    async fn cli_token(&self) -> Option<String> {
        let output = Command::new(&self.cli_program)
            .args([
                "account",
                "get-access-token",
                "--resource",
                AZURE_DEVOPS_RESOURCE,
                "--query",
                "accessToken",
                "-o",
                "tsv",
            ])
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                log::debug!("az cli failed to start: {}", e);
                return None;
            }
        };

        if !output.status.success() {
            log::debug!("az cli failed: {}", output.status);
            return None;
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            log::debug!("az cli returned empty token");
            return None;
        }

        Some(token)
    }
}
