//! Selection widget: a single-shot choice among a fixed option set.

use std::{fmt, sync::Arc};

use twilight_model::{
    channel::message::component::{ButtonStyle, Component},
    id::{Id, marker::UserMarker},
};

use crate::components::{
    ButtonSpec, MAX_ACTION_ROWS, SELECTION_MENU_CUSTOM_ID, button_row_count, button_rows,
    disable_components, select_menu_row,
};
use crate::emote::Emote;
use crate::error::{Result, invalid};
use crate::flags::{
    ActionOnStop, InputStatus, InputType, RestrictedInputBehavior, validate_stop_action,
};
use crate::page::Page;
use crate::result::InteractiveStatus;

const CUSTOM_ID_PREFIX: &str = "selection:";
const MAX_REACTION_OPTIONS: usize = 20;
const MAX_BUTTON_OPTIONS: usize = 25;
const MAX_MENU_OPTIONS: usize = 25;

pub type Stringifier<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
pub type EmoteConverter<T> = Arc<dyn Fn(&T) -> Emote + Send + Sync>;

/// Plain selection configuration, validated by [`Selection::new`].
#[derive(Clone)]
pub struct SelectionConfig<T> {
    pub options: Vec<T>,
    /// Label for buttons and menu entries, and the text matched against message input.
    pub stringifier: Stringifier<T>,
    /// Required for reaction input.
    pub emote_converter: Option<EmoteConverter<T>>,
    pub allow_cancel: bool,
    /// With `allow_cancel`, choosing this option cancels instead of succeeding.
    pub cancel_option: Option<T>,
    pub selection_page: Page,
    pub placeholder: Option<String>,
    /// Users allowed to choose. Empty means everyone.
    pub users: Vec<Id<UserMarker>>,
    pub input_type: InputType,
    pub action_on_success: ActionOnStop,
    pub action_on_timeout: ActionOnStop,
    pub action_on_cancellation: ActionOnStop,
    pub success_page: Option<Page>,
    pub timeout_page: Option<Page>,
    pub canceled_page: Option<Page>,
    pub restricted_input: RestrictedInputBehavior,
    pub restricted_page: Option<Page>,
}

impl<T> SelectionConfig<T> {
    pub fn new(
        options: Vec<T>,
        stringifier: impl Fn(&T) -> String + Send + Sync + 'static,
        selection_page: Page,
    ) -> Self {
        Self {
            options,
            stringifier: Arc::new(stringifier),
            emote_converter: None,
            allow_cancel: false,
            cancel_option: None,
            selection_page,
            placeholder: None,
            users: Vec::new(),
            input_type: InputType::BUTTONS,
            action_on_success: ActionOnStop::DISABLE_INPUT,
            action_on_timeout: ActionOnStop::DISABLE_INPUT,
            action_on_cancellation: ActionOnStop::DISABLE_INPUT,
            success_page: None,
            timeout_page: None,
            canceled_page: None,
            restricted_input: RestrictedInputBehavior::default(),
            restricted_page: None,
        }
    }
}

pub struct Selection<T> {
    config: SelectionConfig<T>,
}

impl<T> fmt::Debug for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("options", &self.config.options.len())
            .field("input_type", &self.config.input_type)
            .field("allow_cancel", &self.config.allow_cancel)
            .finish_non_exhaustive()
    }
}

impl<T> Selection<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(config: SelectionConfig<T>) -> Result<Self> {
        let options = &config.options;
        if options.is_empty() {
            return Err(invalid("selection needs at least one option"));
        }
        if config.input_type.is_empty() {
            return Err(invalid("selection needs an input type"));
        }
        for (position, option) in options.iter().enumerate() {
            if options[..position].contains(option) {
                return Err(invalid(format!(
                    "selection option {:?} is declared twice",
                    (config.stringifier)(option)
                )));
            }
        }

        if config.input_type.contains(InputType::REACTIONS) {
            let Some(converter) = config.emote_converter.as_ref() else {
                return Err(invalid("reaction input needs an emote converter"));
            };
            if options.len() > MAX_REACTION_OPTIONS {
                return Err(invalid(format!(
                    "reaction input supports at most {MAX_REACTION_OPTIONS} options"
                )));
            }
            let emotes: Vec<Emote> = options.iter().map(|option| converter(option)).collect();
            for (position, emote) in emotes.iter().enumerate() {
                if emotes[..position].iter().any(|earlier| earlier.matches(emote)) {
                    return Err(invalid(format!("emote {emote} is used by two options")));
                }
            }
        }
        if config.input_type.contains(InputType::BUTTONS) && options.len() > MAX_BUTTON_OPTIONS {
            return Err(invalid(format!(
                "button input supports at most {MAX_BUTTON_OPTIONS} options"
            )));
        }
        if config.input_type.contains(InputType::SELECT_MENU) && options.len() > MAX_MENU_OPTIONS {
            return Err(invalid(format!(
                "select menu input supports at most {MAX_MENU_OPTIONS} options"
            )));
        }

        if config
            .input_type
            .contains(InputType::BUTTONS | InputType::SELECT_MENU)
            && button_row_count(options.len()) + 1 > MAX_ACTION_ROWS
        {
            return Err(invalid(format!(
                "{} options do not fit in {MAX_ACTION_ROWS} rows of buttons and a select menu",
                options.len()
            )));
        }

        if config.allow_cancel {
            match config.cancel_option.as_ref() {
                Some(cancel) if options.contains(cancel) => {}
                Some(_) => return Err(invalid("cancel option must be one of the options")),
                None => return Err(invalid("allow_cancel needs a cancel option")),
            }
        }

        validate_stop_action(config.action_on_success, "action on success")?;
        validate_stop_action(config.action_on_timeout, "action on timeout")?;
        validate_stop_action(config.action_on_cancellation, "action on cancellation")?;

        Ok(Self { config })
    }

    pub fn options(&self) -> &[T] {
        &self.config.options
    }

    pub fn input_type(&self) -> InputType {
        self.config.input_type
    }

    pub fn selection_page(&self) -> &Page {
        &self.config.selection_page
    }

    pub fn restricted_input(&self) -> RestrictedInputBehavior {
        self.config.restricted_input
    }

    pub fn restricted_page(&self) -> Option<&Page> {
        self.config.restricted_page.as_ref()
    }

    pub fn can_interact(&self, user_id: Id<UserMarker>) -> bool {
        self.config.users.is_empty() || self.config.users.contains(&user_id)
    }

    pub fn label(&self, option: &T) -> String {
        (self.config.stringifier)(option)
    }

    pub fn emote(&self, option: &T) -> Option<Emote> {
        self.config
            .emote_converter
            .as_ref()
            .map(|converter| converter(option))
    }

    /// Emotes to add to the message for reaction input, in option order.
    pub fn emotes(&self) -> Vec<Emote> {
        self.config
            .options
            .iter()
            .filter_map(|option| self.emote(option))
            .collect()
    }

    pub fn option_for_emote(&self, emote: &Emote) -> Option<&T> {
        self.config
            .options
            .iter()
            .find(|option| self.emote(option).is_some_and(|own| own.matches(emote)))
    }

    /// Case-insensitive match of message content against option labels.
    pub fn option_for_text(&self, text: &str) -> Option<&T> {
        let text = text.trim();
        self.config
            .options
            .iter()
            .find(|option| self.label(option).eq_ignore_ascii_case(text))
    }

    /// Resolve a button custom id or select-menu submission.
    pub fn option_for_component(&self, custom_id: &str, values: &[String]) -> Option<&T> {
        let index = if custom_id == SELECTION_MENU_CUSTOM_ID {
            values.first()?.parse::<usize>().ok()?
        } else {
            custom_id.strip_prefix(CUSTOM_ID_PREFIX)?.parse::<usize>().ok()?
        };

        self.config.options.get(index)
    }

    /// `Canceled` for the cancel option (when cancelling is allowed), `Success` otherwise.
    pub fn verdict(&self, option: &T) -> InputStatus {
        if self.config.allow_cancel && self.config.cancel_option.as_ref() == Some(option) {
            InputStatus::Canceled
        } else {
            InputStatus::Success
        }
    }

    pub fn components(&self) -> Vec<Component> {
        let mut components = Vec::new();

        if self.config.input_type.contains(InputType::BUTTONS) {
            let buttons = self
                .config
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| ButtonSpec {
                    custom_id: format!("{CUSTOM_ID_PREFIX}{index}"),
                    emote: self.emote(option),
                    label: Some(self.label(option)),
                    style: match self.verdict(option) {
                        InputStatus::Canceled => ButtonStyle::Danger,
                        _ => ButtonStyle::Primary,
                    },
                    disabled: false,
                })
                .collect();
            components.extend(button_rows(buttons));
        }

        if self.config.input_type.contains(InputType::SELECT_MENU) {
            let entries = self
                .config
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| (self.label(option), index.to_string(), self.emote(option)))
                .collect();
            components.push(select_menu_row(
                entries,
                self.config.placeholder.clone(),
                false,
            ));
        }

        components
    }

    pub(crate) fn disabled_components(&self) -> Vec<Component> {
        disable_components(&self.components())
    }

    pub fn action_on_stop(&self, status: InteractiveStatus) -> ActionOnStop {
        match status {
            InteractiveStatus::Success => self.config.action_on_success,
            InteractiveStatus::Timeout => self.config.action_on_timeout,
            InteractiveStatus::Canceled => self.config.action_on_cancellation,
        }
    }

    pub fn stop_page(&self, status: InteractiveStatus) -> Option<Page> {
        match status {
            InteractiveStatus::Success => self.config.success_page.clone(),
            InteractiveStatus::Timeout => self.config.timeout_page.clone(),
            InteractiveStatus::Canceled => self.config.canceled_page.clone(),
        }
    }
}
