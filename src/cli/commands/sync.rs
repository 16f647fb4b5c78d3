use crate::state::SharedState;

pub async fn cmd_sync(state: &SharedState) -> anyhow::Result<()> {
    println!("Synchronizing catalog from {}", state.config.upstream.base_url);

    let report = state.synchronize().await?;

    println!("✓ Catalog synchronized in {} ms", report.duration_ms);
    println!("  Skins:  {}", report.skins);
    println!("  Agents: {}", report.agents);
    println!("  Crates: {}", report.crates);
    println!("  Keys:   {}", report.keys);
    println!(
        "  Crate links: {} ({} unresolved)",
        report.links, report.skipped_links
    );

    if !report.failed_kinds.is_empty() {
        let failed: Vec<&str> = report.failed_kinds.iter().map(|k| k.plural()).collect();
        println!("  ⚠ Stored empty after fetch failure: {}", failed.join(", "));
    }
    if report.duplicates_dropped > 0 {
        println!("  Duplicate ids dropped: {}", report.duplicates_dropped);
    }

    Ok(())
}
