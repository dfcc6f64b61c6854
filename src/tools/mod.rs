//! The two fetch-and-shape pipelines behind the CLI and MCP surfaces.

pub mod pr_comments;
pub mod work_item;

use crate::azure::auth::AuthError;
use crate::azure::client::AzureError;
use crate::azure::reference::UrlError;
use crate::output::{self, EncodeError, OutputFormat};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error(transparent)]
    Url(#[from] UrlError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Azure(#[from] AzureError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Renders a pipeline result.
///
/// JSON output is the simplified records as-is. Compact output is the
/// projected maps; if that encoding fails the records are emitted as JSON
/// instead and a warning is logged.
pub(crate) fn render<S, P>(simplified: &S, projected: &P, format: OutputFormat) -> Result<String, ToolError>
where
    S: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    match format {
        OutputFormat::Json => Ok(output::encode(simplified, OutputFormat::Json)?),
        OutputFormat::Compact => match output::encode(projected, OutputFormat::Compact) {
            Ok(text) => Ok(text),
            Err(e) => {
                log::warn!("Compact encoding failed, falling back to JSON: {}", e);
                Ok(output::encode(simplified, OutputFormat::Json)?)
            }
        },
    }
}
