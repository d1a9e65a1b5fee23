#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use wallpaper_sync_core::contract::{NewPage, Page};

pub fn page(id: i64, title: &str, slug: &str, content: &str) -> Page {
    Page {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        content: content.to_string(),
        is_hidden: false,
        is_html: false,
        created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        edited_at: None,
    }
}

pub fn page_from_new(id: i64, new: &NewPage) -> Page {
    page(
        id,
        &new.title,
        new.slug.as_deref().unwrap_or_default(),
        &new.content,
    )
}
