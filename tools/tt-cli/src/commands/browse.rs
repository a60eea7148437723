//! Listing commands: browse, and the shared rendering used by search.

use anyhow::{anyhow, bail, Result};
use dialoguer::Confirm;
use serde::Serialize;
use tt_catalog::{EquipmentItem, EquipmentType};
use tt_data::{FetchClient, FetchError};
use tt_listing::{
    ListingParams, ListingState, LoadMore, Location, MemoryLocation, PaginationController, Phase,
    Replay,
};

use super::BrowseArgs;
use crate::context::Context;
use crate::output::phase_badge;

pub(crate) type Listing = PaginationController<FetchClient, MemoryLocation>;

/// Run the browse command.
pub async fn run(args: BrowseArgs, ctx: &Context) -> Result<()> {
    if args.more && ctx.output.is_json() {
        bail!("--more is interactive and cannot be combined with --json");
    }

    let params = ListingParams::new(args.page, args.query.as_deref());
    let listing = open(args.equipment, &params.to_query_string(), ctx)?;

    let spinner = ctx
        .output
        .spinner(&format!("Loading {}...", args.equipment.display_name()));
    let result = listing.mount().await;
    spinner.finish_and_clear();

    finish_replay(result, &listing, args.width, ctx)?;

    if args.more {
        load_more_loop(&listing, args.width, ctx).await?;
    }

    Ok(())
}

/// Controller over a fresh in-memory location for `equipment`.
pub(crate) fn open(equipment: EquipmentType, query: &str, ctx: &Context) -> Result<Listing> {
    let location = MemoryLocation::new(format!("/{}", equipment.as_path()), query);
    let mut listing = PaginationController::new(equipment, ctx.client()?, location);
    if let Some(cache) = ctx.cache() {
        listing = listing.with_cache(cache);
    }
    ctx.output.debug(&format!("Listing {}", listing.location().href()));
    Ok(listing)
}

/// Print whatever a replay produced; a failed replay still shows the pages
/// that did load before the error is returned.
pub(crate) fn finish_replay(
    result: Result<Replay, FetchError>,
    listing: &Listing,
    width: usize,
    ctx: &Context,
) -> Result<()> {
    let state = listing.snapshot();

    if ctx.output.is_json() {
        ctx.output.json(&ListingView::new(listing, &state));
    } else {
        print_heading(&state, ctx);
        print_items(&state.items, width, ctx);
        print_summary(listing, &state, ctx);
    }

    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(anyhow!(e).context(format!(
            "Failed to load page {} of {}",
            state.current_page + 1,
            state.equipment
        ))),
    }
}

/// Ask before each further page until the listing runs out or the user stops.
pub(crate) async fn load_more_loop(listing: &Listing, width: usize, ctx: &Context) -> Result<()> {
    loop {
        let state = listing.snapshot();
        if !state.has_more {
            ctx.output.info("No more pages.");
            return Ok(());
        }

        let next = state.current_page + 1;
        let proceed = Confirm::new()
            .with_prompt(format!("Load page {}?", next))
            .default(true)
            .interact()?;
        if !proceed {
            return Ok(());
        }

        let before = state.items.len();
        let spinner = ctx.output.spinner(&format!("Loading page {}...", next));
        let result = listing.load_more().await;
        spinner.finish_and_clear();

        match result {
            Ok(LoadMore::Appended { page, count }) => {
                let state = listing.snapshot();
                print_items(state.items.get(before..).unwrap_or(&[]), width, ctx);
                ctx.output.success(&format!(
                    "Loaded page {} ({} items, {} total)",
                    page,
                    count,
                    state.items.len()
                ));
                ctx.output.kv("URL", &listing.location().href());
            }
            Ok(LoadMore::Exhausted) => {
                ctx.output.info("No more pages.");
                return Ok(());
            }
            Ok(LoadMore::Skipped) | Ok(LoadMore::Superseded) => return Ok(()),
            Err(e) => {
                ctx.output.error(&format!("{}", e));
                ctx.output.info("Nothing was lost; you can try again.");
            }
        }
    }
}

fn print_heading(state: &ListingState, ctx: &Context) {
    let title = match &state.active_query {
        Some(query) => format!("{} matching \"{}\"", state.equipment.display_name(), query),
        None => state.equipment.display_name().to_string(),
    };
    ctx.output.header(&title);

    if state.items.is_empty() {
        ctx.output.info("No items found.");
    }
}

fn print_items(items: &[EquipmentItem], width: usize, ctx: &Context) {
    let widths = [width, 10, 10];
    for item in items {
        let name = item.display_name(width);
        ctx.output.table_row(
            &[
                name.as_str(),
                item.best_price().unwrap_or("-"),
                item.all_time_low_price.as_str(),
            ],
            &widths,
        );
    }
}

fn print_summary(listing: &Listing, state: &ListingState, ctx: &Context) {
    ctx.output.info("");
    ctx.output.kv("Items", &state.items.len().to_string());
    ctx.output.kv("Page", &state.current_page.to_string());
    ctx.output.kv("State", &phase_badge(listing.phase()));
    ctx.output.kv("URL", &listing.location().href());
    if state.has_more {
        ctx.output.info("More pages are available (use --more).");
    }
}

/// JSON shape of a listing.
#[derive(Serialize)]
struct ListingView<'a> {
    href: String,
    phase: Phase,
    #[serde(flatten)]
    state: &'a ListingState,
}

impl<'a> ListingView<'a> {
    fn new(listing: &Listing, state: &'a ListingState) -> Self {
        Self {
            href: listing.location().href(),
            phase: listing.phase(),
            state,
        }
    }
}
