//! Month keys (`YYYY-MM`) and everything derived from them: page slug, page
//! title and the location of the month's document in the content repository.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Name of the document inside every month directory.
pub const MONTH_DOCUMENT: &str = "README.md";

const SLUG_PREFIX: &str = "bing-wallpaper-";

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only; no calendar validation, so "2024-13" passes.
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("valid month regex"))
}

/// True if `name` has the `YYYY-MM` digit shape.
pub fn is_month_name(name: &str) -> bool {
    month_pattern().is_match(name)
}

/// Slug of the page that holds `month`: `bing-wallpaper-<month lowercased>`.
pub fn slug_for(month: &str) -> String {
    format!("{SLUG_PREFIX}{}", month.to_lowercase())
}

/// Title of the page that holds `month`.
pub fn title_for(month: &str) -> String {
    format!("Bing Wallpaper ({month})")
}

/// A validated `YYYY-MM` key. Lexicographic order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey(String);

impl MonthKey {
    pub fn parse(raw: &str) -> Option<Self> {
        is_month_name(raw).then(|| Self(raw.to_string()))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(format!("{:04}-{:02}", date.year(), date.month()))
    }

    /// Key of the current local month.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn slug(&self) -> String {
        slug_for(&self.0)
    }

    pub fn title(&self) -> String {
        title_for(&self.0)
    }

    /// Repository path of this month's document below `base_path`.
    pub fn document_path(&self, base_path: &str) -> String {
        let base = base_path.trim_matches('/');
        if base.is_empty() {
            format!("{}/{MONTH_DOCUMENT}", self.0)
        } else {
            format!("{base}/{}/{MONTH_DOCUMENT}", self.0)
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_month_name(&value) {
            Ok(Self(value))
        } else {
            Err(format!("'{value}' is not a YYYY-MM month key"))
        }
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.0
    }
}
