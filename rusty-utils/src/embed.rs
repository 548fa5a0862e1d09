use twilight_model::channel::message::embed::Embed;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder};

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_54_30;

/// Build a standard embed with consistent styling.
pub fn build_embed(title: &str, description: impl Into<String>) -> anyhow::Result<Embed> {
    let embed = EmbedBuilder::new()
        .title(title)
        .color(DEFAULT_EMBED_COLOR)
        .description(description)
        .validate()?
        .build();

    Ok(embed)
}

/// Footer text for a one-based page position, with an optional suffix.
pub fn page_footer_text(page: usize, total_pages: usize, footer_note: Option<&str>) -> String {
    let page = page.max(1);
    let total_pages = total_pages.max(1);

    match footer_note {
        Some(note) if !note.is_empty() => format!("Page {}/{} • {}", page, total_pages, note),
        _ => format!("Page {}/{}", page, total_pages),
    }
}

/// Stamp a page-number footer onto an embed, keeping any existing footer text as the note.
pub fn apply_page_footer(embed: &mut Embed, page: usize, total_pages: usize) {
    let note = embed.footer.as_ref().map(|footer| footer.text.clone());
    let text = page_footer_text(page, total_pages, note.as_deref());
    embed.footer = Some(EmbedFooterBuilder::new(text).build());
}
