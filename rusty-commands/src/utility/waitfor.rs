use std::time::Duration;

use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use rusty_core::Context;
use rusty_interactive::InteractiveStatus;
use rusty_utils::parse::parse_duration_seconds;

pub const META: CommandMeta = CommandMeta {
    name: "waitfor",
    desc: "Wait for the author's next message in this channel.",
    category: "utility",
    usage: "!waitfor [duration]",
};

const DEFAULT_WAIT: Duration = Duration::from_secs(30);

/// Echo the author's next message, or report that none arrived in time.
///
/// The wait is clamped to the interactive timeout bounds.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, arg1: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let wait = match arg1 {
        None => DEFAULT_WAIT,
        Some(raw) => match parse_duration_seconds(raw) {
            Some(seconds) => Duration::from_secs(seconds),
            None => {
                let usage = format!("Usage: `{}` (e.g. `45s`, `2m`)", META.usage);
                http.create_message(msg.channel_id).content(&usage).await?;
                return Ok(());
            }
        },
    };
    let wait = ctx.interactive.config().clamp_timeout(Some(wait));

    let prompt = format!("Listening for your next message for {}s.", wait.as_secs());
    http.create_message(msg.channel_id).content(&prompt).await?;

    let author_id = msg.author.id;
    let channel_id = msg.channel_id;
    let result = ctx
        .interactive
        .next_message(
            move |message| message.author_id == author_id && message.channel_id == channel_id,
            Some(wait),
            None,
        )
        .await?;

    let out = match (result.status(), result.value()) {
        (InteractiveStatus::Success, Some(message)) => format!(
            "Got it after {:.1}s: {}",
            result.elapsed().as_secs_f32(),
            message.content
        ),
        _ => "No message arrived in time.".to_owned(),
    };
    http.create_message(msg.channel_id).content(&out).await?;

    Ok(())
}
