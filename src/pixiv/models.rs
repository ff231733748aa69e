//! Typed views over the Pixiv ajax payloads.
//!
//! Only the fields the embed pipeline reads are modelled; everything else in
//! the upstream bodies is ignored on decode.

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::BTreeMap;

/// A single artwork entry (`/ajax/illust/{id}`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    #[serde(rename = "illustId")]
    pub id: String,
    #[serde(rename = "illustTitle")]
    pub title: String,
    pub create_date: DateTime<FixedOffset>,
    pub page_count: u32,
    pub user_id: String,
    pub tags: TagList,
    pub urls: ImageUrls,
    pub extra_data: ExtraData,
}

impl Gallery {
    /// Canonical page URL of the artwork
    pub fn canonical_url(&self) -> &str {
        &self.extra_data.meta.canonical
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagList {
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub tag: String,
    #[serde(default)]
    pub translation: Option<BTreeMap<String, String>>,
}

impl Tag {
    /// English translation when Pixiv has one, the raw tag otherwise
    pub fn display_name(&self) -> &str {
        self.translation
            .as_ref()
            .and_then(|translations| translations.get("en"))
            .map(String::as_str)
            .unwrap_or(&self.tag)
    }
}

/// Image variants; restricted works come back with `null` entries
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub regular: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtraData {
    pub meta: Meta,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub canonical: String,
}

/// One page of a multi-page work (`/ajax/illust/{id}/pages`)
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryPage {
    pub urls: ImageUrls,
    pub width: u32,
    pub height: u32,
}

/// Author profile (`/ajax/user/{id}`)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_big: Option<String>,
}

impl Author {
    /// Large avatar when available, falling back to the standard one
    pub fn icon_url(&self) -> Option<&str> {
        self.image_big.as_deref().or(self.image.as_deref())
    }
}
