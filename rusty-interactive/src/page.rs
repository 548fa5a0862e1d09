use twilight_model::channel::message::embed::Embed;

/// Renderable message content: optional text plus embeds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
}

impl Page {
    pub fn from_content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
        }
    }

    pub fn from_embed(embed: Embed) -> Self {
        Self {
            content: None,
            embeds: vec![embed],
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.as_deref().is_none_or(str::is_empty) && self.embeds.is_empty()
    }

    /// Stamp `Page x/y` on the first embed. Pages without embeds are returned unchanged.
    pub(crate) fn with_page_footer(mut self, index: usize, page_count: usize) -> Self {
        if let Some(embed) = self.embeds.first_mut() {
            rusty_utils::embed::apply_page_footer(embed, index + 1, page_count);
        }
        self
    }
}
