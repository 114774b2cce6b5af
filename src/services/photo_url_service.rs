use std::collections::HashMap;

use log::warn;
use url::Url;

use crate::config::{Config, DEFAULT_PHOTO_PLACEHOLDER, DEFAULT_PHOTO_URL_TEMPLATE};
use crate::models::place::{PhotoRef, Place};

/// Maps a place's first photo reference to a displayable URL. No network I/O.
///
/// URLs built from reference tokens are cached per resolver; entries are written once and never
/// invalidated, so a resolver should live no longer than the session that owns it.
#[derive(Debug, Clone)]
pub struct PhotoUrlResolver {
    placeholder: String,
    template: String,
    api_key: String,
    cache: HashMap<String, String>,
}

impl PhotoUrlResolver {
    pub fn new(
        placeholder: impl Into<String>,
        template: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            template: template.into(),
            api_key: api_key.into(),
            cache: HashMap::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.photo_placeholder.clone(),
            config.photo_url_template.clone(),
            config.google_maps_api_key.clone(),
        )
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self::new(DEFAULT_PHOTO_PLACEHOLDER, DEFAULT_PHOTO_URL_TEMPLATE, api_key)
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn resolve_url(&mut self, place: &Place) -> String {
        match place.first_photo() {
            None => self.placeholder.clone(),
            Some(PhotoRef::DirectUri(uri)) => match Url::parse(uri) {
                Ok(_) => uri.clone(),
                Err(e) => {
                    warn!("Error getting photo URI for {}: {}", place.id, e);
                    self.placeholder.clone()
                }
            },
            Some(PhotoRef::NamedResource(reference)) | Some(PhotoRef::LegacyToken(reference)) => {
                if is_full_url(reference) {
                    reference.clone()
                } else if reference.trim().is_empty() {
                    self.placeholder.clone()
                } else {
                    self.from_template(reference)
                }
            }
        }
    }

    fn from_template(&mut self, reference: &str) -> String {
        let template = &self.template;
        let api_key = &self.api_key;

        self.cache
            .entry(reference.to_string())
            .or_insert_with(|| {
                template
                    .replace("{reference}", reference)
                    .replace("{key}", api_key)
            })
            .clone()
    }
}

fn is_full_url(value: &str) -> bool {
    value.starts_with("http")
}
