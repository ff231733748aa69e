//! In-memory `GallerySource` for tests
//!
//! Galleries are registered with an artificial latency so tests can force
//! fetches to complete out of order. Unknown ids fail the way Pixiv does for
//! deleted works.

use async_trait::async_trait;
use chrono::DateTime;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::models::{Author, ExtraData, Gallery, GalleryPage, ImageUrls, Meta, Tag, TagList};
use super::{GallerySource, PixivError, Result};

#[derive(Debug, Default)]
struct State {
    galleries: HashMap<String, (Gallery, Duration)>,
    completed: Vec<String>,
    requests: usize,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Debug, Default)]
pub struct MockGallerySource {
    state: Mutex<State>,
}

impl MockGallerySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers gallery `id` titled `title`, answered after `latency`
    pub fn add_gallery(&self, id: &str, title: &str, latency: Duration) {
        let gallery = Gallery {
            id: id.to_string(),
            title: title.to_string(),
            create_date: DateTime::parse_from_rfc3339("2021-02-14T10:00:00+00:00")
                .unwrap_or_default(),
            page_count: 1,
            user_id: format!("author-{id}"),
            tags: TagList {
                tags: vec![Tag {
                    tag: "original".to_string(),
                    translation: None,
                }],
            },
            urls: ImageUrls {
                original: Some(format!("https://i.pximg.net/img-original/img/{id}_p0.png")),
                ..ImageUrls::default()
            },
            extra_data: ExtraData {
                meta: Meta {
                    canonical: format!("https://www.pixiv.net/en/artworks/{id}"),
                },
            },
        };

        self.lock()
            .galleries
            .insert(id.to_string(), (gallery, latency));
    }

    /// Gallery requests received so far
    pub fn requests(&self) -> usize {
        self.lock().requests
    }

    /// Gallery ids in the order their fetches finished
    pub fn completion_order(&self) -> Vec<String> {
        self.lock().completed.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl GallerySource for MockGallerySource {
    async fn fetch_gallery(&self, id: &str) -> Result<Gallery> {
        let entry = {
            let mut state = self.lock();
            state.requests += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.galleries.get(id).cloned()
        };

        if let Some((_, latency)) = &entry {
            tokio::time::sleep(*latency).await;
        }

        let mut state = self.lock();
        state.in_flight -= 1;
        match entry {
            Some((gallery, _)) => {
                state.completed.push(id.to_string());
                Ok(gallery)
            }
            None => Err(PixivError::Validation(
                "Work has been deleted or the ID does not exist.".to_string(),
            )),
        }
    }

    async fn fetch_gallery_pages(&self, id: &str) -> Result<Vec<GalleryPage>> {
        let gallery = self.fetch_gallery(id).await?;
        Ok(vec![GalleryPage {
            urls: gallery.urls,
            width: 1000,
            height: 1000,
        }])
    }

    async fn fetch_user(&self, id: &str) -> Result<Author> {
        Ok(Author {
            user_id: id.to_string(),
            name: format!("name of {id}"),
            image: Some("https://i.pximg.net/user-profile/img/a_50.png".to_string()),
            image_big: None,
        })
    }
}
