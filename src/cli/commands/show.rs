use serde::Serialize;

use crate::domain::ItemKind;
use crate::state::SharedState;

pub async fn cmd_show(state: &SharedState, kind: ItemKind, id: &str) -> anyhow::Result<()> {
    let found = match kind {
        ItemKind::Skin => print_json(state.skins.get_by_id(id).await)?,
        ItemKind::Agent => print_json(state.agents.get_by_id(id).await)?,
        ItemKind::Crate => print_json(state.crates.get_by_id(id).await)?,
        ItemKind::Key => print_json(state.keys.get_by_id(id).await)?,
    };

    if !found {
        println!("No {kind} with ID '{id}'");
    }
    Ok(())
}

fn print_json<T: Serialize>(item: Option<T>) -> anyhow::Result<bool> {
    let Some(item) = item else {
        return Ok(false);
    };
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(true)
}
