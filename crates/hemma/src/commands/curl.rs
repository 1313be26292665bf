//! Raw authenticated GET against the hub API.
//!
//! For endpoints the typed client does not model; the response body is
//! passed through untouched.

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn handle(path: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let body = client
        .get_raw(path)
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    if !global.quiet {
        println!("{body}");
    }
    Ok(())
}
