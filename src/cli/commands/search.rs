use crate::domain::{ItemKind, SearchQuery, SearchResult};
use crate::models::GameItem;
use crate::state::SharedState;

pub async fn cmd_search(
    state: &SharedState,
    kind: ItemKind,
    query: SearchQuery,
) -> anyhow::Result<()> {
    match kind {
        ItemKind::Skin => print_page(&state.skins.search(query).await),
        ItemKind::Agent => print_page(&state.agents.search(query).await),
        ItemKind::Crate => print_page(&state.crates.search(query).await),
        ItemKind::Key => print_page(&state.keys.search(query).await),
    }
    Ok(())
}

fn print_page<T: GameItem>(result: &SearchResult<T>) {
    let kind = T::KIND.plural();

    if result.items.is_empty() {
        println!("No {kind} found (page {}, {} total)", result.page, result.total);
        return;
    }

    println!();
    println!(
        "{} {kind} matched, page {} ({} per page)",
        result.total, result.page, result.page_size
    );
    println!("{:-<60}", "");

    for item in &result.items {
        println!("• {}", item.name());
        println!("  ID: {}", item.id());
        if let Some(description) = item.description() {
            let line = description.lines().next().unwrap_or_default();
            println!("  {line}");
        }
    }
    println!();
}
