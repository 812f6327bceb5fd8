//! Handlers of the built-in commands.

use crate::bag::AttributeBag;
use crate::builtin::kinds;
use crate::builtin::MODULE_NAME;
use crate::dispatch::{Context, Event, HandlerResult};
use crate::elapsed::elapsed;
use crate::registry::types::bare_name;
use crate::store::{FindOptions, Selector};
use chrono::Local;

/// `cmd`: comma-separated list of every registered command
pub fn cmd(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    event.reply(ctx.registry.commands().names().join(","));
    Ok(())
}

/// `log [text]`
pub fn log(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    note(event, ctx, kinds::LOG)
}

/// `tdo [text]`
pub fn tdo(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    note(event, ctx, kinds::TODO)
}

/// With text, store a new note of `kind`; without, list the stored ones
fn note(event: &mut Event, ctx: &Context<'_>, kind: &str) -> HandlerResult {
    if event.rest.is_empty() {
        let options = FindOptions::new().skip_deleted(true);
        let notes = ctx.store.find(&kind.to_lowercase(), &options)?;
        for (nr, bag) in notes.iter().enumerate() {
            event.reply(format!("{} {} {}", nr, bag.text("txt"), age(bag)));
        }
        return Ok(());
    }

    let qualified = format!("{}.{}", MODULE_NAME, kind);
    let mut bag = ctx
        .registry
        .types()
        .construct(&qualified)
        .unwrap_or_else(|| AttributeBag::new(qualified.clone()));
    bag.set("txt", event.rest.clone());
    ctx.store.save(&mut bag)?;
    event.ok();
    Ok(())
}

/// `upt`: time since the dispatcher started
pub fn upt(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    event.reply(elapsed(ctx.uptime().as_secs_f64()));
    Ok(())
}

/// `fnd [type [key=value ...]]`
///
/// Without arguments, lists the stored type names. Otherwise lists the current
/// version of each matching instance.
pub fn fnd(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    let (tag, pairs) = match event.args.split_first() {
        Some((tag, pairs)) => (tag.clone(), pairs.to_vec()),
        None => {
            let mut names: Vec<String> = ctx
                .store
                .type_tags(None)?
                .iter()
                .map(|tag| bare_name(tag).to_lowercase())
                .collect();
            names.sort();
            names.dedup();
            if !names.is_empty() {
                event.reply(names.join(","));
            }
            return Ok(());
        }
    };

    let selector = Selector::from_pairs(pairs.iter().map(String::as_str));
    let options = FindOptions::new().selector(selector).skip_deleted(true);
    let found = ctx.store.find(&tag, &options)?;
    if found.is_empty() {
        event.reply("no result");
        return Ok(());
    }
    for (nr, bag) in found.iter().enumerate() {
        event.reply(format!("{} {} {}", nr, bag.printable(None, &[], false), age(bag)));
    }
    Ok(())
}

/// `dlt <type> <key=value ...>`: soft-delete the most recent match
pub fn dlt(event: &mut Event, ctx: &Context<'_>) -> HandlerResult {
    let selector = Selector::from_pairs(event.args.iter().skip(1).map(String::as_str));
    let tag = match event.args.first() {
        Some(tag) if !selector.is_empty() => tag.clone(),
        _ => {
            event.reply("dlt <type> <key=value>");
            return Ok(());
        }
    };

    let options = FindOptions::new().selector(selector).skip_deleted(true);
    match ctx.store.find(&tag, &options)?.pop() {
        Some(mut bag) => {
            ctx.store.soft_delete(&mut bag)?;
            event.ok();
        }
        None => event.reply("no match"),
    }
    Ok(())
}

fn age(bag: &AttributeBag) -> String {
    let seconds = bag
        .version()
        .map(|v| v.seconds_until(Local::now().naive_local()))
        .unwrap_or(0.0);
    elapsed(seconds)
}
