//! Shared helpers for command handlers.

use hemma_api::HubClient;

use crate::cli::GlobalOpts;
use crate::config::{self, ResolvedContext};
use crate::error::CliError;

/// Resolve the active context and open a REST client against it.
pub fn connect(global: &GlobalOpts) -> Result<(ResolvedContext, HubClient), CliError> {
    let ctx = config::resolve_context(global)?;
    let client = HubClient::connect(&ctx.entry.address, ctx.entry.port, &ctx.credential)
        .map_err(|e| CliError::from_api(e, &ctx.name))?;
    Ok((ctx, client))
}

/// Render an optional timestamp for detail views.
pub fn fmt_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map_or_else(|| "-".into(), |t| t.to_rfc3339())
}
