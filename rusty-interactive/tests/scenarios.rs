mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use futures_util::FutureExt as _;
use tokio_util::sync::CancellationToken;
use twilight_model::{http::interaction::InteractionResponseType, id::Id};

use rusty_interactive::{
    ActionOnStop, Emote, EventAction, IncomingMessage, InputType, InteractionPayload,
    InteractiveConfig, InteractiveError, InteractiveEvent, InteractiveHttp, InteractiveService,
    InteractiveStatus, MessageTarget, Page, PageSource, Paginator, PaginatorAction,
    PaginatorConfig, PaginatorControl, PlatformError, RESTRICTED_INPUT_MESSAGE,
    RestrictedInputBehavior, Selection, SelectionConfig, StopWitness,
};

use common::{
    CHANNEL_ID, Call, FIRST_MESSAGE_ID, Failure, RecordingHttp, button_press, message,
    message_handle, reaction, settle, until,
};

const USER: u64 = 42;
const OTHER_USER: u64 = 43;

fn service() -> (Arc<RecordingHttp>, InteractiveService) {
    let http = Arc::new(RecordingHttp::default());
    let platform: Arc<dyn InteractiveHttp> = http.clone();
    (http, InteractiveService::new(platform, InteractiveConfig::default()))
}

fn pages(count: usize) -> PageSource {
    PageSource::Static(
        (1..=count)
            .map(|index| Page::from_content(format!("page {index}")))
            .collect(),
    )
}

fn channel() -> MessageTarget {
    MessageTarget::Channel(Id::new(CHANNEL_ID))
}

fn colors(input_type: InputType) -> Selection<&'static str> {
    let mut config = SelectionConfig::new(
        vec!["red", "blue"],
        |option: &&'static str| (*option).to_owned(),
        Page::from_content("Pick a color"),
    );
    config.input_type = input_type;
    config.emote_converter = Some(Arc::new(|option: &&'static str| {
        Emote::unicode(if *option == "red" { "🔴" } else { "🔵" })
    }));

    Selection::new(config).expect("valid selection")
}

#[tokio::test(start_paused = true)]
async fn reaction_paginator_walks_to_the_last_page_and_times_out() {
    let (http, service) = service();
    let mut config = PaginatorConfig::new(pages(5));
    config.input_type = InputType::REACTIONS;
    config.action_on_timeout = ActionOnStop::MODIFY_MESSAGE;
    config.timeout_page = Some(Page::from_content("expired"));
    let paginator = Paginator::new(config).expect("valid paginator");

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_paginator(paginator, channel(), Some(Duration::from_secs(10)), None)
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;
    settle().await;

    // Each accepted page change restarts the 10 second timeout.
    for _ in 0..4 {
        tokio::time::advance(Duration::from_secs(6)).await;
        service.handle_event(InteractiveEvent::Reaction(reaction(
            FIRST_MESSAGE_ID,
            USER,
            "▶",
        )));
        settle().await;
    }

    let result = task.await.expect("task joins").expect("paginator runs");

    assert_eq!(result.status, InteractiveStatus::Timeout);
    assert_eq!(result.current_page_index, 4);
    assert_eq!(result.witness, StopWitness::None);
    assert!(result.elapsed >= Duration::from_secs(34));
    assert_eq!(service.active_session_count(), 0);

    let calls = http.calls();
    let primed = calls
        .iter()
        .filter(|call| matches!(call, Call::CreateReaction { .. }))
        .count();
    assert_eq!(primed, PaginatorControl::defaults().len());
    assert!(calls.contains(&Call::UpdateMessage {
        message_id: FIRST_MESSAGE_ID,
        content: Some("page 5".to_owned()),
        components: None,
    }));
    assert_eq!(
        calls.last(),
        Some(&Call::UpdateMessage {
            message_id: FIRST_MESSAGE_ID,
            content: Some("expired".to_owned()),
            components: None,
        })
    );
}

#[tokio::test(start_paused = true)]
async fn selection_cancel_option_answers_with_the_canceled_page() {
    let (http, service) = service();
    let mut config = SelectionConfig::new(
        vec!["accept", "cancel"],
        |option: &&'static str| (*option).to_owned(),
        Page::from_content("Continue?"),
    );
    config.allow_cancel = true;
    config.cancel_option = Some("cancel");
    config.action_on_cancellation = ActionOnStop::MODIFY_MESSAGE | ActionOnStop::DELETE_INPUT;
    config.canceled_page = Some(Page::from_content("canceled"));
    let selection = Selection::new(config).expect("valid selection");

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.send_selection(selection, channel(), None, None).await }
    });
    until(|| service.active_session_count() == 1).await;

    let press = button_press(7, USER, FIRST_MESSAGE_ID, "selection:1");
    service.handle_event(InteractiveEvent::Interaction(press.clone()));

    let result = task.await.expect("task joins").expect("selection runs");

    assert_eq!(result.status(), InteractiveStatus::Canceled);
    assert_eq!(result.value(), None);
    assert_eq!(result.witness(), &StopWitness::Interaction(press));
    assert_eq!(result.user_id(), Some(Id::new(USER)));
    assert_eq!(
        http.calls().last(),
        Some(&Call::CreateResponse {
            interaction_id: 7,
            kind: InteractionResponseType::UpdateMessage,
            content: Some("canceled".to_owned()),
        })
    );
}

#[tokio::test(start_paused = true)]
async fn only_the_matching_waiter_resolves() {
    let (_http, service) = service();

    let yes = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .next_message(
                    |message| message.content == "yes",
                    Some(Duration::from_secs(5)),
                    None,
                )
                .await
        }
    });
    let no = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .next_message(
                    |message| message.content == "no",
                    Some(Duration::from_secs(5)),
                    None,
                )
                .await
        }
    });
    until(|| service.pending_waiter_count() == 2).await;

    service.handle_event(InteractiveEvent::Message(message(500, USER, "yes")));

    let yes = yes.await.expect("task joins").expect("wait runs");
    let no = no.await.expect("task joins").expect("wait runs");

    assert_eq!(yes.status(), InteractiveStatus::Success);
    assert_eq!(yes.value().map(|message| message.id), Some(Id::new(500)));
    assert_eq!(no.status(), InteractiveStatus::Timeout);
    assert!(no.value().is_none());
    assert!(no.elapsed() >= Duration::from_secs(5));
    assert_eq!(service.pending_waiter_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn one_message_reaches_a_session_and_a_waiter() {
    let (_http, service) = service();

    let selection = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_selection(colors(InputType::MESSAGES), channel(), None, None)
                .await
        }
    });
    let waiter = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .next_message(|message| message.author_id == Id::new(USER), None, None)
                .await
        }
    });
    until(|| service.active_session_count() == 1 && service.pending_waiter_count() == 1).await;

    service.handle_event(InteractiveEvent::Message(message(500, USER, " RED ")));

    let selection = selection.await.expect("task joins").expect("selection runs");
    let waiter = waiter.await.expect("task joins").expect("wait runs");

    assert_eq!(selection.value(), Some(&"red"));
    assert!(waiter.is_success());
}

#[tokio::test(start_paused = true)]
async fn a_selection_resolves_exactly_once() {
    let (_http, service) = service();

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_selection(colors(InputType::REACTIONS), channel(), None, None)
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;
    settle().await;

    service.handle_event(InteractiveEvent::Reaction(reaction(
        FIRST_MESSAGE_ID,
        USER,
        "🔵",
    )));
    service.handle_event(InteractiveEvent::Reaction(reaction(
        FIRST_MESSAGE_ID,
        OTHER_USER,
        "🔴",
    )));

    let result = task.await.expect("task joins").expect("selection runs");

    assert_eq!(result.value(), Some(&"blue"));
    assert_eq!(result.user_id(), Some(Id::new(USER)));
    assert!(!service.cancel_session(Id::new(FIRST_MESSAGE_ID)));
}

#[tokio::test(start_paused = true)]
async fn restricted_users_and_the_bot_itself_are_ignored() {
    let (_http, service) = service();
    service.set_current_user(Id::new(1));

    let mut config = SelectionConfig::new(
        vec!["red", "blue"],
        |option: &&'static str| (*option).to_owned(),
        Page::from_content("Pick a color"),
    );
    config.input_type = InputType::REACTIONS;
    config.users = vec![Id::new(USER)];
    config.emote_converter = Some(Arc::new(|option: &&'static str| {
        Emote::unicode(if *option == "red" { "🔴" } else { "🔵" })
    }));
    let selection = Selection::new(config).expect("valid selection");

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_selection(selection, channel(), Some(Duration::from_secs(30)), None)
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;
    settle().await;

    service.handle_event(InteractiveEvent::Reaction(reaction(FIRST_MESSAGE_ID, 1, "🔴")));
    service.handle_event(InteractiveEvent::Reaction(reaction(
        FIRST_MESSAGE_ID,
        OTHER_USER,
        "🔴",
    )));
    settle().await;

    let result = task.await.expect("task joins").expect("selection runs");
    assert_eq!(result.status(), InteractiveStatus::Timeout);
}

#[tokio::test(start_paused = true)]
async fn external_cancellation_ends_a_paginator() {
    let (_http, service) = service();
    let paginator = Paginator::new(PaginatorConfig::new(pages(3))).expect("valid paginator");
    let cancel = CancellationToken::new();

    let task = tokio::spawn({
        let service = service.clone();
        let cancel = cancel.clone();
        async move {
            service
                .send_paginator(paginator, channel(), None, Some(cancel))
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;

    cancel.cancel();
    let result = task.await.expect("task joins").expect("paginator runs");

    assert_eq!(result.status, InteractiveStatus::Canceled);
    assert_eq!(result.current_page_index, 0);
}

#[tokio::test(start_paused = true)]
async fn already_canceled_tokens_are_rejected_before_sending() {
    let (http, service) = service();
    let paginator = Paginator::new(PaginatorConfig::new(pages(3))).expect("valid paginator");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = service
        .send_paginator(paginator, channel(), None, Some(cancel))
        .await;

    assert!(matches!(result, Err(InteractiveError::AlreadyCanceled)));
    assert!(http.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn button_paginator_jumps_through_the_modal_and_exits() {
    let (http, service) = service();
    let mut config = PaginatorConfig::new(pages(6));
    config
        .controls
        .push(PaginatorControl::new(Emote::unicode("🔢"), PaginatorAction::Jump));
    let paginator = Paginator::new(config).expect("valid paginator");

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.send_paginator(paginator, channel(), None, None).await }
    });
    until(|| service.active_session_count() == 1).await;

    let jump = button_press(7, USER, FIRST_MESSAGE_ID, "paginator:jump");
    service.handle_event(InteractiveEvent::Interaction(jump));
    settle().await;

    let mut submit = button_press(8, USER, FIRST_MESSAGE_ID, "paginator-jump");
    submit.payload = InteractionPayload::Modal {
        custom_id: "paginator-jump".to_owned(),
        fields: vec![("page".to_owned(), "4".to_owned())],
    };
    service.handle_event(InteractiveEvent::Interaction(submit));
    settle().await;

    let exit = button_press(9, USER, FIRST_MESSAGE_ID, "paginator:exit");
    service.handle_event(InteractiveEvent::Interaction(exit.clone()));

    let result = task.await.expect("task joins").expect("paginator runs");

    assert_eq!(result.status, InteractiveStatus::Canceled);
    assert_eq!(result.current_page_index, 3);
    assert_eq!(result.witness, StopWitness::Interaction(exit));

    let calls = http.calls();
    assert!(calls.contains(&Call::CreateResponse {
        interaction_id: 7,
        kind: InteractionResponseType::Modal,
        content: None,
    }));
    assert!(calls.contains(&Call::CreateResponse {
        interaction_id: 8,
        kind: InteractionResponseType::UpdateMessage,
        content: Some("page 4".to_owned()),
    }));
    assert!(calls.contains(&Call::CreateResponse {
        interaction_id: 9,
        kind: InteractionResponseType::UpdateMessage,
        content: None,
    }));
}

#[tokio::test(start_paused = true)]
async fn reaction_jump_reads_the_typed_page_number() {
    let (http, service) = service();
    let mut config = PaginatorConfig::new(pages(6));
    config.input_type = InputType::REACTIONS;
    config
        .controls
        .push(PaginatorControl::new(Emote::unicode("🔢"), PaginatorAction::Jump));
    let paginator = Paginator::new(config).expect("valid paginator");

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.send_paginator(paginator, channel(), None, None).await }
    });
    until(|| service.active_session_count() == 1).await;
    settle().await;

    service.handle_event(InteractiveEvent::Reaction(reaction(
        FIRST_MESSAGE_ID,
        USER,
        "🔢",
    )));
    until(|| service.pending_waiter_count() == 1).await;

    // Someone else typing a number does not count.
    service.handle_event(InteractiveEvent::Message(message(599, OTHER_USER, "2")));
    service.handle_event(InteractiveEvent::Message(message(600, USER, "4")));
    until(|| service.pending_waiter_count() == 0).await;
    settle().await;

    assert!(service.cancel_session(Id::new(FIRST_MESSAGE_ID)));
    let result = task.await.expect("task joins").expect("paginator runs");

    assert_eq!(result.status, InteractiveStatus::Canceled);
    assert_eq!(result.current_page_index, 3);
    assert_eq!(result.witness, StopWitness::None);

    let calls = http.calls();
    assert!(calls.contains(&Call::DeleteReaction {
        message_id: FIRST_MESSAGE_ID,
        emote: "🔢".to_owned(),
        user_id: USER,
    }));
    assert!(calls.contains(&Call::DeleteUserMessage { message_id: 600 }));
    assert!(!calls.contains(&Call::DeleteUserMessage { message_id: 599 }));
    assert!(calls.contains(&Call::UpdateMessage {
        message_id: FIRST_MESSAGE_ID,
        content: Some("page 4".to_owned()),
        components: None,
    }));
}

#[tokio::test(start_paused = true)]
async fn event_actions_run_for_rejected_events_too() {
    let (_http, service) = service();
    let passes = Arc::new(Mutex::new(Vec::new()));
    let action: EventAction<IncomingMessage> = Arc::new({
        let passes = Arc::clone(&passes);
        move |_message: IncomingMessage, passed: bool| {
            passes.lock().expect("passes lock").push(passed);
            async { Ok::<_, anyhow::Error>(()) }.boxed()
        }
    });

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .next_event(
                    |message: &IncomingMessage| message.content == "yes",
                    Some(action),
                    Some(Duration::from_secs(5)),
                    None,
                )
                .await
        }
    });
    until(|| service.pending_waiter_count() == 1).await;

    service.handle_event(InteractiveEvent::Message(message(500, USER, "no")));
    settle().await;
    service.handle_event(InteractiveEvent::Message(message(501, USER, "yes")));

    let result = task.await.expect("task joins").expect("wait runs");

    assert_eq!(result.status(), InteractiveStatus::Success);
    assert_eq!(result.value().map(|message| message.id), Some(Id::new(501)));
    assert_eq!(*passes.lock().expect("passes lock"), vec![false, true]);
}

#[tokio::test(start_paused = true)]
async fn restricted_presses_get_the_configured_answer() {
    let (http, service) = service();
    let mut config = SelectionConfig::new(
        vec!["red", "blue"],
        |option: &&'static str| (*option).to_owned(),
        Page::from_content("Pick a color"),
    );
    config.users = vec![Id::new(USER)];
    config.restricted_input = RestrictedInputBehavior::SendMessage;
    let selection = Selection::new(config).expect("valid selection");

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.send_selection(selection, channel(), None, None).await }
    });
    until(|| service.active_session_count() == 1).await;

    let intruder = button_press(7, OTHER_USER, FIRST_MESSAGE_ID, "selection:0");
    service.handle_event(InteractiveEvent::Interaction(intruder));
    settle().await;
    assert_eq!(service.active_session_count(), 1);

    service.handle_event(InteractiveEvent::Interaction(button_press(
        8,
        USER,
        FIRST_MESSAGE_ID,
        "selection:1",
    )));
    let result = task.await.expect("task joins").expect("selection runs");

    assert_eq!(result.value(), Some(&"blue"));
    assert!(http.calls().contains(&Call::CreateResponse {
        interaction_id: 7,
        kind: InteractionResponseType::ChannelMessageWithSource,
        content: Some(RESTRICTED_INPUT_MESSAGE.to_owned()),
    }));
}

#[tokio::test(start_paused = true)]
async fn restricted_presses_can_be_deferred_silently() {
    let (http, service) = service();
    let mut config = PaginatorConfig::new(pages(3));
    config.users = vec![Id::new(USER)];
    config.restricted_input = RestrictedInputBehavior::Defer;
    let paginator = Paginator::new(config).expect("valid paginator");

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.send_paginator(paginator, channel(), None, None).await }
    });
    until(|| service.active_session_count() == 1).await;

    let intruder = button_press(7, OTHER_USER, FIRST_MESSAGE_ID, "paginator:forward");
    service.handle_event(InteractiveEvent::Interaction(intruder));
    settle().await;

    assert!(service.cancel_session(Id::new(FIRST_MESSAGE_ID)));
    let result = task.await.expect("task joins").expect("paginator runs");

    assert_eq!(result.current_page_index, 0);
    assert!(http.calls().contains(&Call::CreateResponse {
        interaction_id: 7,
        kind: InteractionResponseType::DeferredUpdateMessage,
        content: None,
    }));
}

#[tokio::test(start_paused = true)]
async fn failed_reaction_priming_ends_the_session_with_the_error() {
    let (http, service) = service();
    http.fail_reactions_with(Failure::Other);

    let result = service
        .send_selection(colors(InputType::REACTIONS), channel(), None, None)
        .await;

    assert!(matches!(
        result,
        Err(InteractiveError::Platform(PlatformError::Other(_)))
    ));
    assert_eq!(service.active_session_count(), 0);

    let calls = http.calls();
    let primed = calls
        .iter()
        .filter(|call| matches!(call, Call::CreateReaction { .. }))
        .count();
    assert_eq!(primed, 1);
    assert!(
        !calls
            .iter()
            .any(|call| matches!(call, Call::UpdateMessage { .. } | Call::DeleteMessage { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn a_reply_to_an_unrelated_message_still_reaches_the_channel() {
    let (_http, service) = service();

    let task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_selection(colors(InputType::MESSAGES), channel(), None, None)
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;

    let mut reply = message(500, USER, "red");
    reply.referenced_message_id = Some(Id::new(77));
    service.handle_event(InteractiveEvent::Message(reply));

    let result = task.await.expect("task joins").expect("selection runs");

    assert_eq!(result.status(), InteractiveStatus::Success);
    assert_eq!(result.value(), Some(&"red"));
}

#[tokio::test(start_paused = true)]
async fn an_ending_session_leaves_its_replacement_registered() {
    let (_http, service) = service();
    let paginator = Paginator::new(PaginatorConfig::new(pages(3))).expect("valid paginator");
    let cancel = CancellationToken::new();

    let old = tokio::spawn({
        let service = service.clone();
        let cancel = cancel.clone();
        async move {
            service
                .send_paginator(paginator, channel(), None, Some(cancel))
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;

    assert!(service.try_remove_session(Id::new(FIRST_MESSAGE_ID)));
    assert!(!service.try_remove_session(Id::new(FIRST_MESSAGE_ID)));

    let replacement = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .send_selection(
                    colors(InputType::BUTTONS),
                    MessageTarget::Existing(message_handle(FIRST_MESSAGE_ID)),
                    None,
                    None,
                )
                .await
        }
    });
    until(|| service.active_session_count() == 1).await;

    cancel.cancel();
    let old = old.await.expect("task joins").expect("paginator runs");
    assert_eq!(old.status, InteractiveStatus::Canceled);
    assert_eq!(service.active_session_count(), 1);

    service.handle_event(InteractiveEvent::Interaction(button_press(
        8,
        USER,
        FIRST_MESSAGE_ID,
        "selection:0",
    )));
    let replacement = replacement.await.expect("task joins").expect("selection runs");

    assert_eq!(replacement.status(), InteractiveStatus::Success);
    assert_eq!(replacement.value(), Some(&"red"));
}
