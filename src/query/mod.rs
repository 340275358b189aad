//! Tag query engine.
//!
//! Queries are a disjunction of filter groups: a record matches when any
//! single group matches it in full. Groups come in three shapes, mirroring
//! the two query surfaces:
//!
//! - [`FilterGroup::ExactCount`] from `tag`/`count` parameter pairs: every
//!   named species must appear with exactly the given count.
//! - [`FilterGroup::MinCount`] from JSON objects: every named species must
//!   appear with at least the given count.
//! - [`FilterGroup::Membership`] from JSON string arrays: every named
//!   species must appear at all.
//!
//! Species names match case-insensitively throughout.

use crate::error::{Error, Result};
use crate::store::RecordStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One conjunction of species criteria.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterGroup {
    /// Species must appear with exactly these counts.
    ///
    /// A species missing from a record is treated as absent, not as a
    /// count of zero, so even an exact-count-0 criterion fails on it.
    ExactCount(BTreeMap<String, u32>),
    /// Species must appear with at least these counts. Here a missing
    /// species counts as zero, so a minimum of 0 is vacuously satisfied.
    MinCount(BTreeMap<String, u32>),
    /// Species must appear with any positive count.
    Membership(Vec<String>),
}

impl FilterGroup {
    /// Whether a record's lowercase species-count map satisfies this group.
    #[must_use]
    pub fn matches(&self, counts: &BTreeMap<String, u32>) -> bool {
        match self {
            Self::ExactCount(wanted) => wanted
                .iter()
                .all(|(species, n)| counts.get(species) == Some(n)),
            Self::MinCount(wanted) => wanted
                .iter()
                .all(|(species, n)| counts.get(species).copied().unwrap_or(0) >= *n),
            Self::Membership(species) => species
                .iter()
                .all(|s| counts.get(s).is_some_and(|&c| c > 0)),
        }
    }
}

/// Result of a search: matching file locations and their count.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Locations of matching files.
    pub matched_files: Vec<String>,
    /// Number of matches.
    pub count: usize,
}

/// Build one exact-count group from `tag`/`count` parameter pairs.
///
/// Each pair is a species name and an optional count string. A missing or
/// unparsable count defaults to 1; a negative count drops the pair with a
/// warning. Returns no groups when no usable pair remains.
#[must_use]
pub fn parse_get_filters(pairs: &[(String, Option<String>)]) -> Vec<FilterGroup> {
    let mut wanted = BTreeMap::new();

    for (tag, count) in pairs {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }

        let count = match count.as_deref().map(str::parse::<i64>) {
            None => 1,
            Some(Ok(n)) if n < 0 => {
                warn!(tag, count = n, "dropping tag with negative count");
                continue;
            }
            Some(Ok(n)) => n,
            Some(Err(_)) => {
                debug!(tag, "unparsable count, defaulting to 1");
                1
            }
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        wanted.insert(tag.to_lowercase(), count as u32);
    }

    if wanted.is_empty() {
        Vec::new()
    } else {
        vec![FilterGroup::ExactCount(wanted)]
    }
}

/// Parse a JSON query body into filter groups.
///
/// The body must be a JSON array. Object entries become min-count groups
/// (values clamped to non-negative integers); array entries become
/// membership groups over their string items. Malformed pieces are dropped
/// item-wise with a warning rather than failing the whole query: a
/// non-numeric count loses that criterion, a non-string tag loses that tag,
/// and a group keeps whatever usable criteria remain.
pub fn parse_post_filters(body: &str) -> Result<Vec<FilterGroup>> {
    let parsed: serde_json::Value =
        serde_json::from_str(body).map_err(|e| Error::QueryParse {
            reason: e.to_string(),
        })?;

    let entries = parsed.as_array().ok_or_else(|| Error::QueryParse {
        reason: "query body must be a JSON array".to_string(),
    })?;

    let mut groups = Vec::new();
    for entry in entries {
        match entry {
            serde_json::Value::Object(map) => {
                let mut wanted = BTreeMap::new();
                for (species, value) in map {
                    if let Some(n) = value.as_u64() {
                        #[allow(clippy::cast_possible_truncation)]
                        wanted.insert(species.to_lowercase(), n as u32);
                    } else {
                        warn!(species, "dropping criterion with non-numeric count");
                    }
                }
                if !wanted.is_empty() {
                    groups.push(FilterGroup::MinCount(wanted));
                }
            }
            serde_json::Value::Array(items) => {
                let mut species = Vec::new();
                for item in items {
                    if let Some(tag) = item.as_str() {
                        species.push(tag.to_lowercase());
                    } else {
                        warn!("dropping non-string tag in species list");
                    }
                }
                if species.is_empty() {
                    warn!("dropping species list with no usable tags");
                } else {
                    groups.push(FilterGroup::Membership(species));
                }
            }
            _ => {
                warn!("dropping query entry that is neither object nor array");
            }
        }
    }

    Ok(groups)
}

/// Run a query against a record store.
///
/// A record matches when any one group matches it. Returns
/// `Error::EmptyQuery` when no filter groups were supplied.
pub fn search(store: &dyn RecordStore, groups: &[FilterGroup]) -> Result<QueryResponse> {
    if groups.is_empty() {
        return Err(Error::EmptyQuery);
    }

    let mut matched_files = Vec::new();
    for record in store.scan()? {
        let counts = record.count_map();
        if groups.iter().any(|g| g.matches(&counts)) {
            matched_files.push(record.original_url);
        }
    }

    debug!(matches = matched_files.len(), "query complete");
    let count = matched_files.len();
    Ok(QueryResponse {
        matched_files,
        count,
    })
}
