//! Batch reconciliation over many objects with aggregate reporting.

use std::fmt;

use crate::adapter::PropertyTreeAdapter;
use crate::engine::{reconcile, ReconcileError};

/// Per-object outcomes of a batch run.
///
/// An adapter failure on one object does not abort the rest; the error is
/// recorded in that object's slot and processing continues.
#[derive(Debug)]
pub struct BatchReport<Id> {
    pub per_object: Vec<(Id, Result<usize, ReconcileError>)>,
}

impl<Id> BatchReport<Id> {
    /// Total overrides reverted across all successfully processed objects.
    pub fn total_reverted(&self) -> usize {
        self.per_object
            .iter()
            .filter_map(|(_, outcome)| outcome.as_ref().ok())
            .sum()
    }

    /// Number of objects whose reconciliation failed.
    pub fn failed(&self) -> usize {
        self.per_object
            .iter()
            .filter(|(_, outcome)| outcome.is_err())
            .count()
    }
}

impl<Id> fmt::Display for BatchReport<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reverted {} overrides across {} objects.",
            self.total_reverted(),
            self.per_object.len()
        )?;
        let failed = self.failed();
        if failed > 0 {
            write!(f, " ({failed} failed)")?;
        }
        Ok(())
    }
}

/// Reconciles every object in `objects`, one at a time.
pub fn reconcile_all<A, I>(adapter: &mut A, objects: I) -> BatchReport<A::ObjectId>
where
    A: PropertyTreeAdapter,
    I: IntoIterator<Item = A::ObjectId>,
{
    let per_object = objects
        .into_iter()
        .map(|id| {
            let outcome = reconcile(adapter, id);
            (id, outcome)
        })
        .collect();
    BatchReport { per_object }
}
