pub mod utility;

use twilight_model::gateway::payload::incoming::MessageCreate;

use rusty_core::Context;
use rusty_utils::COMMAND_PREFIX;

// Global command meta data
pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::help::META,
    utility::pagetest::META,
    utility::choose::META,
    utility::waitfor::META,
    // Add new commands here
];

/// Run the prefix command in `msg`, if any.
///
/// Interactive commands hold their task until the widget ends, so call this from a spawned task.
pub async fn handle_message(ctx: Context, msg: Box<MessageCreate>) -> anyhow::Result<()> {
    if msg.author.bot {
        return Ok(());
    }

    let content_owned = msg.content.clone();
    let content = content_owned.trim();

    if !content.starts_with(COMMAND_PREFIX) {
        return Ok(());
    }

    let content = content.trim_start_matches(COMMAND_PREFIX).trim();
    let mut command_and_rest = content.splitn(2, char::is_whitespace);
    let cmd = command_and_rest.next().unwrap_or("").to_ascii_lowercase();
    let rest = command_and_rest
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let (arg1, arg_tail): (Option<String>, Option<String>) = match rest {
        Some(value) => {
            let mut args = value.splitn(2, char::is_whitespace);
            let first = args
                .next()
                .filter(|arg| !arg.is_empty())
                .map(ToOwned::to_owned);
            let tail = args
                .next()
                .map(str::trim)
                .filter(|remaining| !remaining.is_empty())
                .map(ToOwned::to_owned);

            (first, tail)
        }
        None => (None, None),
    };

    let arg1 = arg1.as_deref();
    let arg_tail = arg_tail.as_deref();

    match cmd.as_str() {
        "help" => utility::help::run(ctx.clone(), msg, arg1).await?,
        "pagetest" => utility::pagetest::run(ctx.clone(), msg, arg1, arg_tail).await?,
        "choose" => utility::choose::run(ctx.clone(), msg, rest).await?,
        "waitfor" => utility::waitfor::run(ctx.clone(), msg, arg1).await?,
        // Add new commands here
        _ => {}
    }

    Ok(())
}
