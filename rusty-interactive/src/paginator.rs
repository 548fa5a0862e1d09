//! Paginator widget: immutable configuration plus the current page index.

use std::{fmt, sync::Arc, time::Duration};

use twilight_model::{
    channel::message::component::{ButtonStyle, Component},
    id::{Id, marker::UserMarker},
};

use crate::components::{ButtonSpec, button_rows, disable_components};
use crate::emote::Emote;
use crate::error::{Result, invalid};
use crate::flags::{
    ActionOnStop, InputStatus, InputType, RestrictedInputBehavior, WidgetStatus,
    validate_stop_action,
};
use crate::page::Page;
use crate::result::InteractiveStatus;

const CUSTOM_ID_PREFIX: &str = "paginator:";

/// What a paginator control does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaginatorAction {
    Backward,
    Forward,
    SkipToStart,
    SkipToEnd,
    Jump,
    Exit,
}

impl PaginatorAction {
    fn name(self) -> &'static str {
        match self {
            Self::Backward => "backward",
            Self::Forward => "forward",
            Self::SkipToStart => "start",
            Self::SkipToEnd => "end",
            Self::Jump => "jump",
            Self::Exit => "exit",
        }
    }

    pub fn custom_id(self) -> String {
        format!("{CUSTOM_ID_PREFIX}{}", self.name())
    }

    pub fn from_custom_id(custom_id: &str) -> Option<Self> {
        let name = custom_id.strip_prefix(CUSTOM_ID_PREFIX)?;
        [
            Self::Backward,
            Self::Forward,
            Self::SkipToStart,
            Self::SkipToEnd,
            Self::Jump,
            Self::Exit,
        ]
        .into_iter()
        .find(|action| action.name() == name)
    }
}

/// A control bound to an emote (reactions and button icons) and an optional button label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginatorControl {
    pub emote: Emote,
    pub label: Option<String>,
    pub action: PaginatorAction,
}

impl PaginatorControl {
    pub fn new(emote: Emote, action: PaginatorAction) -> Self {
        Self {
            emote,
            label: None,
            action,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The standard ⏮ ◀ ▶ ⏭ 🛑 control set.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(Emote::unicode("⏮"), PaginatorAction::SkipToStart),
            Self::new(Emote::unicode("◀"), PaginatorAction::Backward),
            Self::new(Emote::unicode("▶"), PaginatorAction::Forward),
            Self::new(Emote::unicode("⏭"), PaginatorAction::SkipToEnd),
            Self::new(Emote::unicode("🛑"), PaginatorAction::Exit),
        ]
    }
}

pub type PageFactory = Arc<dyn Fn(usize) -> Page + Send + Sync>;

/// Where pages come from.
#[derive(Clone)]
pub enum PageSource {
    Static(Vec<Page>),
    /// Pages rendered on demand from their zero-based index.
    Lazy { page_count: usize, factory: PageFactory },
}

impl PageSource {
    pub fn lazy(
        page_count: usize,
        factory: impl Fn(usize) -> Page + Send + Sync + 'static,
    ) -> Self {
        Self::Lazy {
            page_count,
            factory: Arc::new(factory),
        }
    }

    pub fn page_count(&self) -> usize {
        match self {
            Self::Static(pages) => pages.len(),
            Self::Lazy { page_count, .. } => *page_count,
        }
    }

    fn page(&self, index: usize) -> Page {
        match self {
            Self::Static(pages) => pages.get(index).cloned().unwrap_or_default(),
            Self::Lazy { factory, .. } => factory(index),
        }
    }
}

impl fmt::Debug for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(pages) => f.debug_tuple("Static").field(&pages.len()).finish(),
            Self::Lazy { page_count, .. } => f
                .debug_struct("Lazy")
                .field("page_count", page_count)
                .finish_non_exhaustive(),
        }
    }
}

/// Plain paginator configuration, validated by [`Paginator::new`].
#[derive(Clone, Debug)]
pub struct PaginatorConfig {
    pub pages: PageSource,
    pub controls: Vec<PaginatorControl>,
    /// Users allowed to interact. Empty means everyone.
    pub users: Vec<Id<UserMarker>>,
    pub input_type: InputType,
    pub action_on_timeout: ActionOnStop,
    pub action_on_cancellation: ActionOnStop,
    pub timeout_page: Option<Page>,
    pub canceled_page: Option<Page>,
    pub restricted_input: RestrictedInputBehavior,
    pub restricted_page: Option<Page>,
    pub start_page_index: usize,
    /// Stamp `Page x/y` on the first embed of every page.
    pub page_footer: bool,
    /// How long a reaction jump waits for the page-number message. `None` uses the service default.
    pub jump_input_timeout: Option<Duration>,
    /// Delete the user's page-number message after a reaction jump.
    pub delete_jump_input: bool,
}

impl PaginatorConfig {
    pub fn new(pages: PageSource) -> Self {
        Self {
            pages,
            controls: PaginatorControl::defaults(),
            users: Vec::new(),
            input_type: InputType::BUTTONS,
            action_on_timeout: ActionOnStop::DISABLE_INPUT,
            action_on_cancellation: ActionOnStop::DISABLE_INPUT,
            timeout_page: None,
            canceled_page: None,
            restricted_input: RestrictedInputBehavior::default(),
            restricted_page: None,
            start_page_index: 0,
            page_footer: false,
            jump_input_timeout: None,
            delete_jump_input: true,
        }
    }
}

#[derive(Debug)]
pub struct Paginator {
    config: PaginatorConfig,
    current_page_index: usize,
    status: WidgetStatus,
}

impl Paginator {
    pub fn new(config: PaginatorConfig) -> Result<Self> {
        let page_count = config.pages.page_count();
        if page_count == 0 {
            return Err(invalid("paginator needs at least one page"));
        }
        if config.controls.is_empty() {
            return Err(invalid("paginator needs at least one control"));
        }
        if config.input_type.is_empty() {
            return Err(invalid("paginator needs an input type"));
        }
        if config
            .input_type
            .intersects(InputType::MESSAGES | InputType::SELECT_MENU)
        {
            return Err(invalid("paginators accept only reaction and button input"));
        }
        if config.start_page_index >= page_count {
            return Err(invalid(format!(
                "start page index {} is out of range for {page_count} pages",
                config.start_page_index
            )));
        }
        for (position, control) in config.controls.iter().enumerate() {
            let duplicate = config.controls[..position].iter().any(|earlier| {
                earlier.emote.matches(&control.emote) || earlier.action == control.action
            });
            if duplicate {
                return Err(invalid(format!(
                    "paginator control {} ({:?}) is declared twice",
                    control.emote, control.action
                )));
            }
        }
        validate_stop_action(config.action_on_timeout, "action on timeout")?;
        validate_stop_action(config.action_on_cancellation, "action on cancellation")?;

        Ok(Self {
            current_page_index: config.start_page_index,
            config,
            status: WidgetStatus::Active,
        })
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn page_count(&self) -> usize {
        self.config.pages.page_count()
    }

    pub fn status(&self) -> WidgetStatus {
        self.status
    }

    pub fn input_type(&self) -> InputType {
        self.config.input_type
    }

    pub fn controls(&self) -> &[PaginatorControl] {
        &self.config.controls
    }

    pub fn restricted_input(&self) -> RestrictedInputBehavior {
        self.config.restricted_input
    }

    pub fn restricted_page(&self) -> Option<&Page> {
        self.config.restricted_page.as_ref()
    }

    pub fn jump_input_timeout(&self) -> Option<Duration> {
        self.config.jump_input_timeout
    }

    pub fn delete_jump_input(&self) -> bool {
        self.config.delete_jump_input
    }

    /// Whether `user_id` is on the allow-list (an empty list allows everyone).
    pub fn can_interact(&self, user_id: Id<UserMarker>) -> bool {
        self.config.users.is_empty() || self.config.users.contains(&user_id)
    }

    pub fn current_page(&self) -> Page {
        self.render_page(self.current_page_index)
    }

    fn render_page(&self, index: usize) -> Page {
        let page = self.config.pages.page(index);
        if self.config.page_footer {
            page.with_page_footer(index, self.page_count())
        } else {
            page
        }
    }

    pub fn action_for_emote(&self, emote: &Emote) -> Option<PaginatorAction> {
        self.config
            .controls
            .iter()
            .find(|control| control.emote.matches(emote))
            .map(|control| control.action)
    }

    pub fn action_for_custom_id(&self, custom_id: &str) -> Option<PaginatorAction> {
        let action = PaginatorAction::from_custom_id(custom_id)?;
        self.config
            .controls
            .iter()
            .any(|control| control.action == action)
            .then_some(action)
    }

    /// Apply a navigation action. `Jump` needs a page number and is handled by the session.
    pub fn apply(&mut self, action: PaginatorAction) -> InputStatus {
        let last = self.page_count() - 1;
        let target = match action {
            PaginatorAction::Backward => self.current_page_index.checked_sub(1),
            PaginatorAction::Forward => {
                (self.current_page_index < last).then_some(self.current_page_index + 1)
            }
            PaginatorAction::SkipToStart => Some(0),
            PaginatorAction::SkipToEnd => Some(last),
            PaginatorAction::Exit => return InputStatus::Canceled,
            PaginatorAction::Jump => return InputStatus::Ignored,
        };

        match target {
            Some(index) if self.set_page(index) => InputStatus::Success,
            _ => InputStatus::Ignored,
        }
    }

    /// Move to `index`. Returns `false` when out of range or already there.
    pub fn set_page(&mut self, index: usize) -> bool {
        if index >= self.page_count() || index == self.current_page_index {
            return false;
        }

        self.current_page_index = index;
        true
    }

    /// Buttons for the current page, with navigation disabled at the bounds.
    pub fn components(&self) -> Vec<Component> {
        if !self.config.input_type.contains(InputType::BUTTONS) {
            return Vec::new();
        }

        let at_start = self.current_page_index == 0;
        let at_end = self.current_page_index + 1 >= self.page_count();
        let inactive = self.status != WidgetStatus::Active;

        let buttons = self
            .config
            .controls
            .iter()
            .map(|control| {
                let at_bound = match control.action {
                    PaginatorAction::Backward | PaginatorAction::SkipToStart => at_start,
                    PaginatorAction::Forward | PaginatorAction::SkipToEnd => at_end,
                    PaginatorAction::Jump => self.page_count() <= 1,
                    PaginatorAction::Exit => false,
                };
                ButtonSpec {
                    custom_id: control.action.custom_id(),
                    emote: Some(control.emote.clone()),
                    label: control.label.clone(),
                    style: match control.action {
                        PaginatorAction::Exit => ButtonStyle::Danger,
                        _ => ButtonStyle::Secondary,
                    },
                    disabled: inactive || at_bound,
                }
            })
            .collect();

        button_rows(buttons)
    }

    pub(crate) fn mark_stopped(&mut self, status: InteractiveStatus) {
        self.status = match status {
            InteractiveStatus::Timeout => WidgetStatus::TimedOut,
            InteractiveStatus::Canceled | InteractiveStatus::Success => WidgetStatus::Canceled,
        };
    }

    pub fn action_on_stop(&self, status: InteractiveStatus) -> ActionOnStop {
        match status {
            InteractiveStatus::Timeout => self.config.action_on_timeout,
            InteractiveStatus::Canceled | InteractiveStatus::Success => {
                self.config.action_on_cancellation
            }
        }
    }

    pub fn stop_page(&self, status: InteractiveStatus) -> Option<Page> {
        match status {
            InteractiveStatus::Timeout => self.config.timeout_page.clone(),
            InteractiveStatus::Canceled | InteractiveStatus::Success => {
                self.config.canceled_page.clone()
            }
        }
    }

    pub(crate) fn disabled_components(&self) -> Vec<Component> {
        disable_components(&self.components())
    }
}
