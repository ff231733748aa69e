use super::models::{Author, Gallery};
use super::proxy::ProxyUrls;
use super::Result;
use crate::discord::models::{Embed, EmbedAuthor, EmbedFooter, EmbedImage};

pub const EMBED_COLOR: u32 = 1942002;
pub const TAG_SEPARATOR: &str = " • ";
const AUTHOR_PAGE_BASE: &str = "https://www.pixiv.net/en/users/";
const FOOTER_ICON: &str = "https://www.pixiv.net/favicon.ico";

/// Builds the embed for one gallery
///
/// Every image URL is routed through the proxy; raw `i.pximg.net` links are
/// never handed to Discord.
pub fn build_embed(gallery: &Gallery, author: &Author, proxy: &ProxyUrls) -> Result<Embed> {
    let tags = gallery
        .tags
        .tags
        .iter()
        .map(|tag| tag.display_name())
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR);

    let image = gallery
        .urls
        .original
        .as_deref()
        .map(|url| proxy.rewrite(url).map(|url| EmbedImage { url }))
        .transpose()?;

    let icon_url = author.icon_url().map(|url| proxy.rewrite(url)).transpose()?;

    Ok(Embed {
        title: gallery.title.clone(),
        url: gallery.canonical_url().to_string(),
        description: format!("`{tags}`"),
        color: EMBED_COLOR,
        timestamp: gallery.create_date,
        image,
        author: EmbedAuthor {
            name: author.name.clone(),
            url: format!("{AUTHOR_PAGE_BASE}{}", gallery.user_id),
            icon_url,
        },
        footer: EmbedFooter {
            text: format!("Gallery with {} page(s).", gallery.page_count),
            icon_url: FOOTER_ICON.to_string(),
        },
    })
}
