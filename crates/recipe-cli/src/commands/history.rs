use anyhow::Result;

use crate::context::CliContext;

pub fn list(ctx: &CliContext) -> Result<()> {
    let entries = ctx.app.search().history();
    if entries.is_empty() {
        println!("No search history.");
    }
    for (index, query) in entries.iter().enumerate() {
        println!("{:>2}. {}", index + 1, query);
    }
    Ok(())
}

pub fn remove(ctx: &CliContext, query: &str) -> Result<()> {
    if !ctx.app.history().contains(query) {
        anyhow::bail!("'{}' is not in the search history", query);
    }
    ctx.app.search().remove_from_history(query);
    Ok(())
}

pub fn clear(ctx: &CliContext) -> Result<()> {
    ctx.app.search().clear_history();
    println!("Search history cleared.");
    Ok(())
}
