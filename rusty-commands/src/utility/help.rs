use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::{COMMANDS, CommandMeta};
use rusty_core::Context;
use rusty_interactive::{ActionOnStop, MessageTarget, Page, PageSource, Paginator, PaginatorConfig};
use rusty_utils::embed::build_embed;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [category]",
};

const HELP_COMMANDS_PER_PAGE: usize = 5;

/// Render the command catalog as a paginator, optionally filtered by category.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;
    let category = arg1.map(str::to_ascii_lowercase);

    let commands = sorted_commands(category.as_deref());
    if commands.is_empty() {
        let out = match category {
            Some(category) => format!("No commands in category `{category}`."),
            None => "No commands are registered.".to_owned(),
        };
        http.create_message(msg.channel_id).content(&out).await?;
        return Ok(());
    }

    let pages = commands
        .chunks(HELP_COMMANDS_PER_PAGE)
        .map(help_page)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut config = PaginatorConfig::new(PageSource::Static(pages));
    config.users = vec![msg.author.id];
    config.page_footer = true;
    config.action_on_cancellation = ActionOnStop::DELETE_MESSAGE;

    ctx.interactive
        .send_paginator(
            Paginator::new(config)?,
            MessageTarget::Channel(msg.channel_id),
            None,
            None,
        )
        .await?;

    Ok(())
}

fn sorted_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut commands: Vec<&CommandMeta> = COMMANDS
        .iter()
        .filter(|command| category.is_none_or(|wanted| command.category == wanted))
        .collect();
    commands.sort_unstable_by_key(|command| (command.category, command.name));

    commands
}

fn help_page(commands: &[&CommandMeta]) -> anyhow::Result<Page> {
    let description = commands
        .iter()
        .map(|command| format!("**{}** `{}`\n{}", command.name, command.usage, command.desc))
        .collect::<Vec<_>>()
        .join("\n\n");

    Ok(Page::from_embed(build_embed("Commands", description)?))
}
