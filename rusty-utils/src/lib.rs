/// Generic embed builders shared across commands and paginated widgets.
pub mod embed;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
