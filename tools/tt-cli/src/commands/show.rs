//! Item detail command.

use anyhow::{bail, Context as _, Result};
use chrono::Utc;
use console::style;
use tt_catalog::{EquipmentItem, PriceEntry};

use super::ShowArgs;
use crate::context::Context;
use crate::output::format_age;

/// Run the show command.
pub async fn run(args: ShowArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    let spinner = ctx
        .output
        .spinner(&format!("Fetching {} {}...", args.equipment.singular(), args.id));
    let result = client.fetch_item(args.equipment, &args.id).await;
    spinner.finish_and_clear();

    let item = result.with_context(|| format!("Failed to fetch {} {}", args.equipment.singular(), args.id))?;
    let Some(item) = item else {
        bail!("{} '{}' not found", args.equipment.singular(), args.id);
    };

    if ctx.output.is_json() {
        ctx.output.json(&item);
        return Ok(());
    }

    print_item(&item, ctx);
    Ok(())
}

fn print_item(item: &EquipmentItem, ctx: &Context) {
    ctx.output.header(&item.name);
    ctx.output.kv("All-time low", &item.all_time_low_price);
    if let Some(best) = item.best_entry() {
        ctx.output.kv("Best price", &format!("{} at {}", best.price, best.site()));
    }
    if let Some(lowest) = item.lowest_entry() {
        ctx.output.kv("Lowest listed", &format!("{} at {}", lowest.price, lowest.site()));
    }

    if item.entries.is_empty() {
        ctx.output.info("No prices listed.");
        return;
    }

    ctx.output.header("Prices");
    for entry in &item.entries {
        let line = entry_line(entry);
        if entry.is_old {
            ctx.output.list_item(&style(line).red().to_string());
        } else {
            ctx.output.list_item(&line);
        }
    }

    if item.has_stale_entries() {
        ctx.output.warn("Prices in red have not been refreshed recently.");
    }
}

fn entry_line(entry: &PriceEntry) -> String {
    let updated = entry
        .updated_at()
        .map(|at| format_age(at, Utc::now()))
        .unwrap_or_else(|| entry.last_updated.clone());
    format!("{:<10} {}  (updated {})", entry.price, entry.source_url, updated)
}
