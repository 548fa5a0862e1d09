use std::time::Duration;

use twilight_model::gateway::payload::incoming::MessageCreate;

use crate::CommandMeta;
use rusty_core::Context;
use rusty_interactive::{
    ActionOnStop, InputType, InteractiveStatus, MessageTarget, Page, Selection, SelectionConfig,
};
use rusty_utils::embed::build_embed;

pub const META: CommandMeta = CommandMeta {
    name: "choose",
    desc: "Let the author pick one of several options.",
    category: "utility",
    usage: "!choose <option> | <option> [| ...]",
};

const CANCEL_LABEL: &str = "Cancel";
const MAX_OPTIONS: usize = 10;
const SELECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Offer `|`-separated options as buttons (and as typed replies) and report the choice.
///
/// Error behavior:
/// - fewer than two distinct options returns usage text.
pub async fn run(ctx: Context, msg: Box<MessageCreate>, rest: Option<&str>) -> anyhow::Result<()> {
    let http = &ctx.http;

    let Some(options) = rest.and_then(parse_options) else {
        let usage = format!("Usage: `{}` (2-{MAX_OPTIONS} distinct options)", META.usage);
        http.create_message(msg.channel_id).content(&usage).await?;
        return Ok(());
    };

    let mut all_options = options;
    all_options.push(CANCEL_LABEL.to_owned());

    let prompt = build_embed("Make a choice", "Press a button or type one of the options.")?;

    let mut config = SelectionConfig::new(all_options, String::clone, Page::from_embed(prompt));
    config.allow_cancel = true;
    config.cancel_option = Some(CANCEL_LABEL.to_owned());
    config.users = vec![msg.author.id];
    config.input_type = InputType::BUTTONS | InputType::MESSAGES;
    config.action_on_success = ActionOnStop::DISABLE_INPUT;
    config.action_on_timeout = ActionOnStop::MODIFY_MESSAGE | ActionOnStop::DELETE_INPUT;
    config.action_on_cancellation = ActionOnStop::MODIFY_MESSAGE | ActionOnStop::DELETE_INPUT;
    config.timeout_page = Some(Page::from_content("Nobody chose in time."));
    config.canceled_page = Some(Page::from_content("Selection canceled."));

    let selection = Selection::new(config)?;
    let result = ctx
        .interactive
        .send_selection(
            selection,
            MessageTarget::Channel(msg.channel_id),
            Some(SELECTION_TIMEOUT),
            None,
        )
        .await?;

    if result.status() == InteractiveStatus::Success
        && let Some(choice) = result.value()
    {
        let out = format!("<@{}> chose **{choice}**.", msg.author.id);
        http.create_message(msg.channel_id).content(&out).await?;
    }

    Ok(())
}

fn parse_options(raw: &str) -> Option<Vec<String>> {
    let mut options: Vec<String> = Vec::new();

    for option in raw.split('|').map(str::trim).filter(|option| !option.is_empty()) {
        let duplicate = options
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(option))
            || option.eq_ignore_ascii_case(CANCEL_LABEL);
        if !duplicate {
            options.push(option.to_owned());
        }
    }

    (2..=MAX_OPTIONS).contains(&options.len()).then_some(options)
}
