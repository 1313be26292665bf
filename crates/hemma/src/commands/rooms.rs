//! Room command handlers.

use tabled::Tabled;

use hemma_api::models::Room;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Room> for RoomRow {
    fn from(r: &Room) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
        }
    }
}

pub async fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let rooms = client
        .list_rooms()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_list(&global.output, &rooms, |r| RoomRow::from(r), |r| r.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn show(id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let room = client
        .get_room(id)
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_single(
        &global.output,
        &room,
        |r| format!("ID:   {}\nName: {}", r.id, r.name),
        |r| r.id.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
