//! Message component builders for widgets (buttons, select menus, the jump modal).

use twilight_model::{
    channel::message::component::{
        ActionRow, Button, ButtonStyle, Component, SelectMenu, SelectMenuOption, SelectMenuType,
        TextInput, TextInputStyle,
    },
    http::interaction::{InteractionResponse, InteractionResponseData, InteractionResponseType},
};

use crate::emote::Emote;

/// Custom id of the modal opened by a paginator's jump button.
pub const JUMP_MODAL_CUSTOM_ID: &str = "paginator-jump";
/// Custom id of the page-number field inside the jump modal.
pub const JUMP_MODAL_FIELD_ID: &str = "page";
/// Custom id of a selection's select menu.
pub const SELECTION_MENU_CUSTOM_ID: &str = "selection-menu";

const MAX_ROW_WIDTH: usize = 5;
/// Action rows a single message can carry.
pub(crate) const MAX_ACTION_ROWS: usize = 5;

/// One button as a widget wants it rendered.
#[derive(Clone, Debug)]
pub(crate) struct ButtonSpec {
    pub custom_id: String,
    pub emote: Option<Emote>,
    pub label: Option<String>,
    pub style: ButtonStyle,
    pub disabled: bool,
}

/// Lay buttons out in action rows of five.
pub(crate) fn button_rows(buttons: Vec<ButtonSpec>) -> Vec<Component> {
    let mut rows = Vec::new();
    let mut current = Vec::with_capacity(MAX_ROW_WIDTH);

    for spec in buttons {
        current.push(Component::Button(Button {
            id: None,
            custom_id: Some(spec.custom_id),
            disabled: spec.disabled,
            emoji: spec.emote.as_ref().map(Emote::to_reaction_type),
            label: spec.label,
            style: spec.style,
            url: None,
            sku_id: None,
        }));

        if current.len() == MAX_ROW_WIDTH {
            rows.push(Component::ActionRow(ActionRow {
                id: None,
                components: std::mem::take(&mut current),
            }));
        }
    }

    if !current.is_empty() {
        rows.push(Component::ActionRow(ActionRow {
            id: None,
            components: current,
        }));
    }

    rows
}

/// Rows `button_rows` needs for `count` buttons.
pub(crate) fn button_row_count(count: usize) -> usize {
    count.div_ceil(MAX_ROW_WIDTH)
}

/// A single-choice text select menu wrapped in its own action row.
pub(crate) fn select_menu_row(
    options: Vec<(String, String, Option<Emote>)>,
    placeholder: Option<String>,
    disabled: bool,
) -> Component {
    let options = options
        .into_iter()
        .map(|(label, value, emote)| SelectMenuOption {
            default: false,
            description: None,
            emoji: emote.as_ref().map(Emote::to_reaction_type),
            label,
            value,
        })
        .collect();

    Component::ActionRow(ActionRow {
        id: None,
        components: vec![Component::SelectMenu(SelectMenu {
            channel_types: None,
            custom_id: SELECTION_MENU_CUSTOM_ID.to_owned(),
            default_values: None,
            disabled,
            id: None,
            kind: SelectMenuType::Text,
            max_values: Some(1),
            min_values: Some(1),
            options: Some(options),
            placeholder,
            required: None,
        })],
    })
}

/// Copy of `components` with every button and select menu disabled.
pub fn disable_components(components: &[Component]) -> Vec<Component> {
    components.iter().cloned().map(disable_component).collect()
}

fn disable_component(component: Component) -> Component {
    match component {
        Component::ActionRow(mut row) => {
            row.components = row.components.into_iter().map(disable_component).collect();
            Component::ActionRow(row)
        }
        Component::Button(mut button) if button.url.is_none() => {
            button.disabled = true;
            Component::Button(button)
        }
        Component::SelectMenu(mut menu) => {
            menu.disabled = true;
            Component::SelectMenu(menu)
        }
        other => other,
    }
}

/// Modal asking for a one-based page number.
#[allow(deprecated)]
pub(crate) fn jump_modal_response(page_count: usize) -> InteractionResponse {
    let page_input = Component::TextInput(TextInput {
        id: None,
        custom_id: JUMP_MODAL_FIELD_ID.to_owned(),
        label: Some("Page Number".to_owned()),
        max_length: Some(6),
        min_length: Some(1),
        placeholder: Some(format!("Enter a page from 1 to {page_count}")),
        required: Some(true),
        style: TextInputStyle::Short,
        value: None,
    });

    InteractionResponse {
        kind: InteractionResponseType::Modal,
        data: Some(InteractionResponseData {
            components: Some(vec![Component::ActionRow(ActionRow {
                id: None,
                components: vec![page_input],
            })]),
            custom_id: Some(JUMP_MODAL_CUSTOM_ID.to_owned()),
            title: Some("Jump to Page".to_owned()),
            ..InteractionResponseData::default()
        }),
    }
}
