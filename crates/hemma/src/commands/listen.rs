//! Live event streaming: print events to stdout until interrupted.

use std::sync::Arc;

use hemma_api::EventStream;

use crate::cli::{GlobalOpts, ListenArgs};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: ListenArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = config::resolve_context(global)?;

    let stream = Arc::new(
        EventStream::new(&ctx.entry.address, ctx.entry.port, &ctx.credential)
            .map_err(|e| CliError::from_api(e, &ctx.name))?,
    );

    // One JSON line per event; filtering happens in the registry.
    stream.register_handler(
        |event| match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "could not render event"),
        },
        args.types.unwrap_or_default(),
    );

    if !global.quiet {
        eprintln!("Listening for events on '{}' -- Ctrl-C to stop", ctx.name);
    }

    // The loop owns its task; this task waits for the interrupt and
    // then joins on the loop's completion through `run`'s return.
    let runner = tokio::spawn({
        let stream = Arc::clone(&stream);
        async move { stream.run().await }
    });

    tokio::signal::ctrl_c().await?;

    if !global.quiet {
        eprintln!();
        eprintln!("Stopping event stream");
    }
    stream
        .stop()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    runner
        .await
        .map_err(|e| CliError::Internal {
            message: format!("event loop task failed: {e}"),
        })?
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    Ok(())
}
