//! Domain types for the catalog with strong typing.
//!
//! This module holds the primitives shared by every layer: the entity kind
//! discriminator, the search request and the paginated search result.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::constants::limits;

/// One of the four catalog categories.
///
/// The lowercase singular form (`"skin"`) is the discriminator stored in the
/// crate link table; the plural form (`"skins"`) is used by the upstream
/// catalog and by the HTTP routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Skin,
    Agent,
    Crate,
    Key,
}

impl ItemKind {
    pub const ALL: [Self; 4] = [Self::Skin, Self::Agent, Self::Crate, Self::Key];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skin => "skin",
            Self::Agent => "agent",
            Self::Crate => "crate",
            Self::Key => "key",
        }
    }

    #[must_use]
    pub const fn plural(&self) -> &'static str {
        match self {
            Self::Skin => "skins",
            Self::Agent => "agents",
            Self::Crate => "crates",
            Self::Key => "keys",
        }
    }

    /// Strict lookup by plural name, as used in routes.
    #[must_use]
    pub fn from_plural(plural: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.plural() == plural)
    }

    /// Returns true for kinds that are linked to crates through the
    /// `crate_references` table.
    #[must_use]
    pub const fn links_crates(&self) -> bool {
        matches!(self, Self::Skin | Self::Key)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = UnknownKind;

    /// Accepts both the singular and plural forms, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered || kind.plural() == lowered)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown item kind: {0}")]
pub struct UnknownKind(pub String);

/// A search request against one entity kind.
///
/// Two queries are cache-equivalent iff every field compares equal. The
/// filter is a `BTreeMap` so insertion order never affects equality or
/// hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    pub term: Option<String>,
    pub filter: BTreeMap<String, String>,
    pub page: u32,
    #[serde(alias = "page_size")]
    pub page_size: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: None,
            filter: BTreeMap::new(),
            page: 1,
            page_size: limits::DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    #[must_use]
    pub fn new(term: Option<&str>) -> Self {
        Self {
            term: term.map(str::to_string),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn with_page(mut self, page: u32, page_size: u32) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Trims the term and drops it when blank, and drops filters with blank
    /// values. Both forms select the same rows, so normalizing first keeps
    /// them on one cache entry.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.term = self
            .term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.filter = self
            .filter
            .into_iter()
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .filter(|(k, v)| !k.is_empty() && !v.is_empty())
            .collect();
        self
    }

    /// Zero-based row offset of the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    /// Number of rows matching the term and filters before pagination.
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> SearchResult<T> {
    /// An empty page echoing the query's pagination.
    #[must_use]
    pub const fn empty(query: &SearchQuery) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: query.page,
            page_size: query.page_size,
        }
    }
}
