//! Paginated discovery and cleanup of synthetic records.

use std::time::Instant;

use tracing::info;

use fixtura_api::{paginate, ApiClient, Record, ResourceKind};

use crate::error::LifecycleError;
use crate::lifecycle::LifecycleManager;
use crate::payload::RUN_MARKER;
use crate::report::CleanupReport;

/// Discovery tuning.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Page size for listing calls.
    pub page_size: u64,
    /// Maximum number of pages fetched before discovery fails.
    pub page_cap: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            page_cap: 100,
        }
    }
}

/// Predicate selecting which discovered records to delete.
///
/// Cleanup never deletes the whole collection: a record must match the
/// filter to become a target.
#[derive(Debug, Clone)]
pub enum CleanupFilter {
    /// Records whose name carries the synthetic-run marker, optionally
    /// narrowed to a single run id.
    Marker(Option<String>),
    /// Records with a non-empty phone or mobile number. Legacy seeded
    /// data predates the name marker and is only recognizable by its
    /// generated phone fields.
    PhoneMarked,
}

impl CleanupFilter {
    /// Whether a discovered record is a cleanup target.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Marker(run) => record.name.as_deref().is_some_and(|name| {
                name.contains(RUN_MARKER)
                    && run
                        .as_deref()
                        .is_none_or(|run| name.contains(run))
            }),
            Self::PhoneMarked => {
                let filled =
                    |value: &Option<String>| value.as_deref().is_some_and(|s| !s.trim().is_empty());
                filled(&record.phone) || filled(&record.cell_phone)
            }
        }
    }
}

/// Enumerate the whole collection, page by page.
pub async fn discover(
    client: &ApiClient,
    kind: ResourceKind,
    config: &DiscoveryConfig,
) -> Result<Vec<Record>, LifecycleError> {
    let records = paginate(config.page_size, config.page_cap, |offset| {
        client.list(kind, offset, config.page_size)
    })
    .await?;
    info!(count = records.len(), resource = %kind, "discovery complete");
    Ok(records)
}

/// Discover the collection, select records matching the filter, and
/// delete them with the manager's retry semantics.
pub async fn cleanup(
    manager: &LifecycleManager,
    filter: &CleanupFilter,
    discovery: &DiscoveryConfig,
) -> Result<CleanupReport, LifecycleError> {
    let start = Instant::now();
    let records = discover(manager.client(), manager.kind(), discovery).await?;
    let targets: Vec<String> = records
        .iter()
        .filter(|record| filter.matches(record))
        .map(|record| record.id.clone())
        .collect();
    info!(
        discovered = records.len(),
        matched = targets.len(),
        resource = %manager.kind(),
        "cleanup targets selected"
    );

    let summary = manager.delete_ids(&targets).await;
    Ok(CleanupReport {
        discovered: records.len(),
        matched: targets.len(),
        deleted: summary.deleted,
        errors: summary.errors,
        failed_ids: summary.failed_ids,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: Option<&str>, phone: Option<&str>, cell: Option<&str>) -> Record {
        Record {
            id: "r-1".to_string(),
            name: name.map(str::to_string),
            email: None,
            phone: phone.map(str::to_string),
            cell_phone: cell.map(str::to_string),
        }
    }

    #[test]
    fn marker_filter_matches_marked_names_only() {
        let filter = CleanupFilter::Marker(None);
        assert!(filter.matches(&record(Some("Fixtura Test Contact 17-1"), None, None)));
        assert!(!filter.matches(&record(Some("Real Customer S.L."), None, None)));
        assert!(!filter.matches(&record(None, None, None)));
    }

    #[test]
    fn marker_filter_narrows_to_run_id() {
        let filter = CleanupFilter::Marker(Some("4242".to_string()));
        assert!(filter.matches(&record(Some("Fixtura Test Contact 4242-3"), None, None)));
        assert!(!filter.matches(&record(Some("Fixtura Test Contact 9999-3"), None, None)));
    }

    #[test]
    fn phone_filter_requires_non_blank_number() {
        let filter = CleanupFilter::PhoneMarked;
        assert!(filter.matches(&record(None, Some("+34 600 001 002"), None)));
        assert!(filter.matches(&record(None, None, Some("+34 600 001 002"))));
        assert!(!filter.matches(&record(None, Some("   "), None)));
        assert!(!filter.matches(&record(None, None, None)));
    }
}
