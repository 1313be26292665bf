//! Device command handlers.

use tabled::Tabled;

use hemma_api::models::Device;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    category: String,
    #[tabled(rename = "Subtype")]
    device_type: String,
    #[tabled(rename = "Room")]
    room: String,
    #[tabled(rename = "Reachable")]
    reachable: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id.clone(),
            name: d.custom_name().unwrap_or_default().to_owned(),
            category: d.device_category.clone(),
            device_type: d.device_type.clone(),
            room: d.room.as_ref().map(|r| r.name.clone()).unwrap_or_default(),
            reachable: if d.is_reachable { "yes" } else { "no" }.into(),
        }
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:        {}", d.id),
        format!("Name:      {}", d.custom_name().unwrap_or("-")),
        format!("Type:      {}", d.device_category),
        format!("Subtype:   {}", d.device_type),
        format!("Reachable: {}", if d.is_reachable { "yes" } else { "no" }),
        format!("Created:   {}", util::fmt_time(d.created_at)),
        format!("Last seen: {}", util::fmt_time(d.last_seen)),
    ];
    if let Some(ref room) = d.room {
        lines.push(format!("Room:      {} ({})", room.name, room.id));
    }
    if !d.attributes.is_empty() {
        lines.push("Attributes:".into());
        for (key, value) in &d.attributes {
            lines.push(format!("  {key}: {value}"));
        }
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let devices = client
        .list_devices()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_list(&global.output, &devices, |d| DeviceRow::from(d), |d| {
        d.id.clone()
    });
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn show(id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let device = client
        .get_device(id)
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_single(&global.output, &device, detail, |d| d.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

/// `show hub` -- the hub describes itself as a device.
pub async fn show_hub(global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let hub = client
        .hub_status()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_single(&global.output, &hub, detail, |d| d.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}
