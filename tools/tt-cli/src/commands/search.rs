//! Search command.

use anyhow::{bail, Result};
use tt_listing::{encode, Location, ParamsPatch};

use super::browse::{finish_replay, load_more_loop, open};
use super::SearchArgs;
use crate::context::Context;

/// Run the search command.
///
/// Behaves like the search box: the term is written into the URL as a new
/// history entry and the listing reacts to the changed location.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    if args.term.trim().is_empty() {
        bail!("Search term must not be empty");
    }
    if args.more && ctx.output.is_json() {
        bail!("--more is interactive and cannot be combined with --json");
    }

    let listing = open(args.equipment, "", ctx)?;

    let location = listing.location();
    location.push(&encode(&location.query_string(), &ParamsPatch::search(&args.term)));

    let spinner = ctx.output.spinner(&format!("Searching for \"{}\"...", args.term));
    let result = listing.location_changed().await;
    spinner.finish_and_clear();

    finish_replay(result, &listing, args.width, ctx)?;

    if args.more {
        load_more_loop(&listing, args.width, ctx).await?;
    }

    Ok(())
}
