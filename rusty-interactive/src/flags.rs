//! Input kinds and stop policies shared by every widget.

use bitflags::bitflags;

use crate::error::{Result, invalid};

bitflags! {
    /// Which kinds of user input a widget listens to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct InputType: u8 {
        const REACTIONS = 1;
        const MESSAGES = 1 << 1;
        const BUTTONS = 1 << 2;
        const SELECT_MENU = 1 << 3;
    }
}

bitflags! {
    /// What to do with the message once a widget stops.
    ///
    /// The empty set means "leave the message alone".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ActionOnStop: u8 {
        /// Replace the message with the page configured for the stop reason.
        const MODIFY_MESSAGE = 1;
        /// Remove buttons and select menus (and reactions when permitted).
        const DELETE_INPUT = 1 << 1;
        /// Keep buttons and select menus but disable them.
        const DISABLE_INPUT = 1 << 2;
        /// Delete the message outright.
        const DELETE_MESSAGE = 1 << 3;
    }
}

impl InputType {
    /// Input kinds rendered as message components.
    pub fn uses_components(self) -> bool {
        self.intersects(Self::BUTTONS | Self::SELECT_MENU)
    }
}

/// How a widget treats input from users outside its allow-list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RestrictedInputBehavior {
    /// Do nothing. Component interactions are left unanswered.
    #[default]
    Ignore,
    /// Answer component interactions with an ephemeral "not yours" message.
    SendMessage,
    /// Acknowledge component interactions without any visible change.
    Defer,
}

/// Lifecycle state recorded on a widget when its session stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidgetStatus {
    #[default]
    Active,
    Canceled,
    TimedOut,
}

/// A widget's verdict on one piece of input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStatus {
    /// Not for this widget, or a no-op.
    Ignored,
    /// Accepted. Paginators stay active; selections resolve.
    Success,
    /// The input ends the widget as canceled.
    Canceled,
}

pub(crate) fn validate_stop_action(action: ActionOnStop, name: &str) -> Result<()> {
    if action.contains(ActionOnStop::DELETE_INPUT | ActionOnStop::DISABLE_INPUT) {
        return Err(invalid(format!(
            "{name}: DELETE_INPUT and DISABLE_INPUT cannot be combined"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_and_disable_input_conflict() {
        assert!(validate_stop_action(ActionOnStop::empty(), "timeout").is_ok());
        assert!(
            validate_stop_action(
                ActionOnStop::MODIFY_MESSAGE | ActionOnStop::DISABLE_INPUT,
                "timeout"
            )
            .is_ok()
        );
        assert!(
            validate_stop_action(
                ActionOnStop::DELETE_INPUT | ActionOnStop::DISABLE_INPUT,
                "cancellation"
            )
            .is_err()
        );
    }

    #[test]
    fn component_inputs() {
        assert!(InputType::BUTTONS.uses_components());
        assert!((InputType::REACTIONS | InputType::SELECT_MENU).uses_components());
        assert!(!(InputType::REACTIONS | InputType::MESSAGES).uses_components());
    }
}
