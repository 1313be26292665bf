//! Scene command handlers.

use tabled::Tabled;

use hemma_api::models::Scene;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct SceneRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    scene_type: String,
    #[tabled(rename = "Triggers")]
    triggers: usize,
    #[tabled(rename = "Actions")]
    actions: usize,
}

impl From<&Scene> for SceneRow {
    fn from(s: &Scene) -> Self {
        Self {
            id: s.id.clone(),
            name: s.info.name.clone(),
            scene_type: s.scene_type.clone(),
            triggers: s.triggers.len(),
            actions: s.actions.len(),
        }
    }
}

fn detail(s: &Scene) -> String {
    let mut lines = vec![
        format!("ID:      {}", s.id),
        format!("Name:    {}", s.info.name),
        format!("Type:    {}", s.scene_type),
        format!("Created: {}", util::fmt_time(s.created_at)),
    ];
    if !s.triggers.is_empty() {
        lines.push("Triggers:".into());
        for trigger in &s.triggers {
            let state = if trigger.disabled { " (disabled)" } else { "" };
            lines.push(format!("  {} [{}]{state}", trigger.id, trigger.trigger_type));
        }
    }
    if !s.actions.is_empty() {
        lines.push("Actions:".into());
        for action in &s.actions {
            lines.push(format!(
                "  {} [{}] -> device {}",
                action.id, action.action_type, action.device_id
            ));
        }
    }
    lines.join("\n")
}

pub async fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let scenes = client
        .list_scenes()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_list(&global.output, &scenes, |s| SceneRow::from(s), |s| s.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn show(id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let scene = client
        .get_scene(id)
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_single(&global.output, &scene, detail, |s| s.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}
