//! User command handlers.

use tabled::Tabled;

use hemma_api::models::User;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            created: util::fmt_time(u.created_at),
        }
    }
}

fn detail(u: &User) -> String {
    format!(
        "ID:      {}\nName:    {}\nCreated: {}",
        u.id,
        u.name,
        util::fmt_time(u.created_at)
    )
}

pub async fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    let users = client
        .list_users()
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_list(&global.output, &users, |u| UserRow::from(u), |u| u.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn show(id: Option<&str>, me: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;

    let user = if me {
        client.current_user().await
    } else {
        // clap guarantees an id when --me is absent
        let id = id.ok_or_else(|| CliError::Validation {
            field: "id".into(),
            reason: "a user id or --me is required".into(),
        })?;
        client.get_user(id).await
    }
    .map_err(|e| CliError::from_api(e, &ctx.name))?;

    let rendered = output::render_single(&global.output, &user, detail, |u| u.id.clone());
    output::print_output(&rendered, global.quiet);
    Ok(())
}

pub async fn delete(id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let (ctx, client) = util::connect(global)?;
    client
        .delete_user(id)
        .await
        .map_err(|e| CliError::from_api(e, &ctx.name))?;

    if !global.quiet {
        println!("Deleted user {id}");
    }
    Ok(())
}
