use std::fmt;

use twilight_model::{
    channel::message::EmojiReactionType,
    id::{Id, marker::EmojiMarker},
};

/// An emoji usable as a reaction or a button icon.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Emote {
    Unicode(String),
    Custom {
        id: Id<EmojiMarker>,
        name: Option<String>,
        animated: bool,
    },
}

impl Emote {
    pub fn unicode(name: impl Into<String>) -> Self {
        Self::Unicode(name.into())
    }

    /// Whether two emotes refer to the same emoji. Custom emojis compare by id only.
    pub fn matches(&self, other: &Emote) -> bool {
        match (self, other) {
            (Self::Unicode(left), Self::Unicode(right)) => left == right,
            (Self::Custom { id: left, .. }, Self::Custom { id: right, .. }) => left == right,
            _ => false,
        }
    }

    pub fn to_reaction_type(&self) -> EmojiReactionType {
        match self {
            Self::Unicode(name) => EmojiReactionType::Unicode { name: name.clone() },
            Self::Custom { id, name, animated } => EmojiReactionType::Custom {
                animated: *animated,
                id: *id,
                name: name.clone(),
            },
        }
    }
}

impl From<&EmojiReactionType> for Emote {
    fn from(value: &EmojiReactionType) -> Self {
        match value {
            EmojiReactionType::Unicode { name } => Self::Unicode(name.clone()),
            EmojiReactionType::Custom { animated, id, name } => Self::Custom {
                id: *id,
                name: name.clone(),
                animated: *animated,
            },
        }
    }
}

impl fmt::Display for Emote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unicode(name) => f.write_str(name),
            Self::Custom { id, name, animated } => {
                let prefix = if *animated { "a" } else { "" };
                write!(f, "<{prefix}:{}:{}>", name.as_deref().unwrap_or("_"), id)
            }
        }
    }
}
