use tracing::debug;
use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use rusty_core::Context;
use rusty_interactive::{
    ActionOnStop, Emote, InputType, MessageTarget, Page, PageSource, Paginator, PaginatorAction,
    PaginatorConfig, PaginatorControl,
};
use rusty_utils::embed::build_embed;
use rusty_utils::parse::parse_page_index;

pub const META: CommandMeta = CommandMeta {
    name: "pagetest",
    desc: "Test embed pagination behavior.",
    category: "utility",
    usage: "!pagetest [page] [reactions]",
};

const ITEMS_PER_PAGE: usize = 5;
const ITEM_COUNT: usize = 24;

/// Paginate a list of sample items.
///
/// Inputs:
/// - optional start page: `!pagetest 3`.
/// - `reactions` as the second argument switches from buttons to reaction controls.
///
/// Error behavior:
/// - returns usage text on invalid page input.
pub async fn run(
    ctx: Context,
    msg: Box<MessageCreate>,
    arg1: Option<&str>,
    arg_tail: Option<&str>,
) -> anyhow::Result<()> {
    let page_count = ITEM_COUNT.div_ceil(ITEMS_PER_PAGE);

    let start_page_index = match arg1 {
        None => 0,
        Some(raw) => match parse_page_index(raw, page_count) {
            Some(index) => index,
            None => {
                let usage = format!("Usage: `{}` (pages 1-{page_count})", META.usage);
                ctx.http.create_message(msg.channel_id).content(&usage).await?;
                return Ok(());
            }
        },
    };

    let use_reactions = arg_tail.is_some_and(|raw| raw.eq_ignore_ascii_case("reactions"));

    let mut config = PaginatorConfig::new(PageSource::lazy(page_count, render_page));
    config.controls.insert(
        4,
        PaginatorControl::new(Emote::unicode("🔢"), PaginatorAction::Jump),
    );
    config.users = vec![msg.author.id];
    config.input_type = if use_reactions {
        InputType::REACTIONS
    } else {
        InputType::BUTTONS
    };
    config.start_page_index = start_page_index;
    config.page_footer = true;
    config.action_on_timeout = if use_reactions {
        ActionOnStop::DELETE_INPUT
    } else {
        ActionOnStop::DISABLE_INPUT
    };
    config.action_on_cancellation = ActionOnStop::DELETE_MESSAGE;

    let paginator = Paginator::new(config)?;
    let result = ctx
        .interactive
        .send_paginator(paginator, MessageTarget::Channel(msg.channel_id), None, None)
        .await?;

    debug!(
        status = ?result.status,
        page = result.current_page_index + 1,
        elapsed = ?result.elapsed,
        "pagetest finished"
    );

    Ok(())
}

fn render_page(index: usize) -> Page {
    let first = index * ITEMS_PER_PAGE + 1;
    let last = (first + ITEMS_PER_PAGE - 1).min(ITEM_COUNT);
    let description = (first..=last)
        .map(|item| format!("• Sample pagination item #{item}"))
        .collect::<Vec<_>>()
        .join("\n");

    match build_embed("Pagination Test", description) {
        Ok(embed) => Page::from_embed(embed),
        Err(_) => Page::from_content(format!("Items {first}-{last}")),
    }
}
