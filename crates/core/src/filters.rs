//! Campaign audience filters.
//!
//! A campaign targets subscribers along three independent dimensions:
//! status, source and tag. An empty list on a dimension places no
//! restriction on it. Supplied dimensions are ANDed together; within the
//! tag dimension a subscriber matches if it carries *any* requested tag.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::status::{StatusId, SubscriberSource, SubscriberStatus};

/// Filters as stored in `campaigns.recipient_filters` (JSONB).
///
/// Every key is optional and `null` reads as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientFilters {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub statuses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl RecipientFilters {
    /// Parse a loosely-typed JSON value, treating `null` as "no filters".
    pub fn from_json(value: &serde_json::Value) -> Result<Self, CoreError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid recipient filters: {e}")))
    }

    /// Validate names and normalise tags.
    ///
    /// Unknown status or source names are rejected rather than ignored, since
    /// ignoring one would silently widen the audience.
    pub fn resolve(&self) -> Result<ResolvedFilters, CoreError> {
        let statuses = self
            .statuses
            .iter()
            .map(|name| {
                SubscriberStatus::from_name(name).ok_or_else(|| {
                    CoreError::Validation(format!("Unknown subscriber status '{name}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let sources = self
            .sources
            .iter()
            .map(|name| {
                SubscriberSource::from_name(name).ok_or_else(|| {
                    CoreError::Validation(format!("Unknown subscriber source '{name}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut tags: Vec<String> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        tags.sort();
        tags.dedup();

        Ok(ResolvedFilters {
            statuses: dedup(statuses),
            sources: dedup(sources),
            tags,
        })
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Validated filters, ready to drive a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFilters {
    pub statuses: Vec<SubscriberStatus>,
    pub sources: Vec<SubscriberSource>,
    pub tags: Vec<String>,
}

impl ResolvedFilters {
    pub fn status_ids(&self) -> Vec<StatusId> {
        self.statuses.iter().map(|s| s.id()).collect()
    }

    pub fn source_ids(&self) -> Vec<StatusId> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// `true` when no dimension restricts the audience.
    pub fn is_unrestricted(&self) -> bool {
        self.statuses.is_empty() && self.sources.is_empty() && self.tags.is_empty()
    }

    /// In-memory form of the subscriber query predicate.
    pub fn matches(
        &self,
        status: SubscriberStatus,
        source: SubscriberSource,
        tags: &[String],
    ) -> bool {
        let status_ok = self.statuses.is_empty() || self.statuses.contains(&status);
        let source_ok = self.sources.is_empty() || self.sources.contains(&source);
        let tags_ok = self.tags.is_empty() || tags.iter().any(|t| self.tags.contains(t));
        status_ok && source_ok && tags_ok
    }
}
