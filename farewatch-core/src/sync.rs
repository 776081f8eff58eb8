//! Fill in missing airport codes.
//!
//! Rows are handled one at a time in sheet order. A failure on one row is
//! recorded and the run moves on to the next.

use tracing::{debug, info, warn};

use crate::error::FarewatchResult;
use crate::flight_search::{NotFoundReason, Resolution};
use crate::row::Row;

/// Read/update access to the tracked rows.
#[allow(async_fn_in_trait)]
pub trait SheetStore {
    async fn fetch_rows(&self) -> FarewatchResult<Vec<Row>>;
    async fn update_row(&self, id: i64, iata_code: &str) -> FarewatchResult<()>;
}

/// City name to IATA code lookup.
#[allow(async_fn_in_trait)]
pub trait IataResolver {
    async fn resolve_iata(&mut self, city: &str) -> FarewatchResult<Resolution>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    /// Row already had a code.
    Skipped,
    Updated(String),
    /// Lookup succeeded but found nothing; the row is left empty.
    Unresolved(NotFoundReason),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
    pub id: i64,
    pub city: String,
    pub status: RowStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Set when the rows could not be read; nothing else was attempted.
    pub store_error: Option<String>,
    pub rows: Vec<RowOutcome>,
}

impl SyncReport {
    fn count(&self, predicate: impl Fn(&RowStatus) -> bool) -> usize {
        self.rows.iter().filter(|row| predicate(&row.status)).count()
    }

    /// Rows read from the sheet (and so attempted).
    pub fn fetched(&self) -> usize {
        self.rows.len()
    }

    pub fn store_unavailable(&self) -> bool {
        self.store_error.is_some()
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Updated(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Skipped))
    }

    pub fn unresolved(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Unresolved(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RowStatus::Failed(_)))
    }
}

pub async fn run<S, R>(store: &S, resolver: &mut R) -> SyncReport
where
    S: SheetStore,
    R: IataResolver,
{
    let rows = match store.fetch_rows().await {
        Ok(rows) => rows,
        Err(e) => {
            warn!(error = %e, "Sheet unavailable, nothing to sync");
            return SyncReport {
                store_error: Some(e.to_string()),
                rows: Vec::new(),
            };
        }
    };

    let mut report = SyncReport::default();

    for row in rows {
        let status = sync_row(store, resolver, &row).await;
        report.rows.push(RowOutcome {
            id: row.id,
            city: row.city,
            status,
        });
    }

    info!(
        fetched = report.fetched(),
        updated = report.updated(),
        skipped = report.skipped(),
        unresolved = report.unresolved(),
        failed = report.failed(),
        "Sync finished"
    );

    report
}

async fn sync_row<S, R>(store: &S, resolver: &mut R, row: &Row) -> RowStatus
where
    S: SheetStore,
    R: IataResolver,
{
    if !row.needs_code() {
        debug!(id = row.id, city = row.city.as_str(), "Code already set");
        return RowStatus::Skipped;
    }

    let code = match resolver.resolve_iata(&row.city).await {
        Ok(Resolution::Found(code)) => code,
        Ok(Resolution::NotFound(reason)) => return RowStatus::Unresolved(reason),
        Err(e) => return RowStatus::Failed(e.to_string()),
    };

    match store.update_row(row.id, &code).await {
        Ok(()) => {
            info!(id = row.id, city = row.city.as_str(), code = code.as_str(), "Filled in airport code");
            RowStatus::Updated(code)
        }
        Err(e) => RowStatus::Failed(e.to_string()),
    }
}
