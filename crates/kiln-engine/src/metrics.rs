//! Session counters and batch-load reports.
//!
//! [`ManagerStats`] is a point-in-time view of arena usage and pipeline
//! activity; [`LoadReport`] summarizes one [`load_all`] batch.
//!
//! [`load_all`]: crate::AssetManager::load_all

use kiln_core::LoadError;

use crate::pipeline::LoadOutcome;

/// Cumulative pipeline activity, owned by the manager and bumped by the
/// pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    pub conversions: u64,
    pub cache_hits: u64,
    pub replay_failures: u64,
}

/// Arena usage and pipeline counters of one manager.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    /// Cache entries, restored and created.
    pub entries: usize,
    /// Descriptors resolved this session.
    pub descriptors: usize,
    /// Bytes of converted asset data in use.
    pub asset_bytes_used: usize,
    /// Capacity of the asset arena in bytes.
    pub asset_bytes_capacity: usize,
    /// Bytes of dependency strings in use.
    pub dependency_bytes_used: usize,
    /// Capacity of the dependency arena in bytes.
    pub dependency_bytes_capacity: usize,
    /// Cache entries created since startup or the last flush.
    pub modifications: u64,
    /// Converter invocations this session, failed ones included.
    pub conversions: u64,
    /// Loads served from the cache this session.
    pub cache_hits: u64,
    /// Recorded dependencies that failed to re-resolve during replay.
    pub replay_failures: u64,
}

/// Outcome of a batch of top-level loads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Each requested path with its result, in request order.
    pub results: Vec<(String, Result<LoadOutcome, LoadError>)>,
    /// Recorded dependencies that failed to re-resolve during the batch.
    pub replay_failures: u64,
}

impl LoadReport {
    /// Paths that resolved, from cache or by conversion.
    pub fn loaded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    /// Paths served from the cache.
    pub fn cache_hits(&self) -> usize {
        self.count(LoadOutcome::CacheHit)
    }

    /// Paths that were converted.
    pub fn converted(&self) -> usize {
        self.count(LoadOutcome::Converted)
    }

    /// Paths that failed, duplicates excluded.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &LoadError)> {
        self.results.iter().filter_map(|(path, r)| match r {
            Err(LoadError::DuplicateInSession { .. }) | Ok(_) => None,
            Err(e) => Some((path.as_str(), e)),
        })
    }

    /// Number of failed paths, duplicates excluded.
    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// The first fatal error, if the batch was aborted by one.
    pub fn fatal(&self) -> Option<&LoadError> {
        self.results
            .iter()
            .find_map(|(_, r)| r.as_ref().err().filter(|e| e.is_fatal()))
    }

    /// Whether a fatal error aborted the batch.
    pub fn has_fatal(&self) -> bool {
        self.fatal().is_some()
    }

    fn count(&self, outcome: LoadOutcome) -> usize {
        self.results
            .iter()
            .filter(|(_, r)| r.as_ref().is_ok_and(|o| *o == outcome))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> LoadReport {
        LoadReport {
            results: vec![
                ("a.ogex".into(), Ok(LoadOutcome::CacheHit)),
                ("b.png".into(), Ok(LoadOutcome::Converted)),
                (
                    "b.png".into(),
                    Err(LoadError::DuplicateInSession {
                        path: "b.png".into(),
                    }),
                ),
                (
                    "c.xyz".into(),
                    Err(LoadError::NoConverter {
                        path: "c.xyz".into(),
                        extension: Some("xyz".into()),
                    }),
                ),
            ],
            replay_failures: 1,
        }
    }

    #[test]
    fn counts_by_outcome() {
        let r = report();
        assert_eq!(r.loaded(), 2);
        assert_eq!(r.cache_hits(), 1);
        assert_eq!(r.converted(), 1);
        assert_eq!(r.failed(), 1);
        assert!(!r.has_fatal());
    }

    #[test]
    fn duplicates_are_not_failures() {
        let r = report();
        let failed: Vec<_> = r.failures().map(|(p, _)| p).collect();
        assert_eq!(failed, vec!["c.xyz"]);
    }

    #[test]
    fn fatal_error_is_reported() {
        let mut r = report();
        r.results.push((
            "loop.ogex".into(),
            Err(LoadError::DepthExceeded {
                path: "loop.ogex".into(),
                max_depth: 16,
            }),
        ));
        assert!(r.has_fatal());
        assert!(matches!(r.fatal(), Some(LoadError::DepthExceeded { .. })));
    }

    #[test]
    fn default_stats_are_zero() {
        let s = ManagerStats::default();
        assert_eq!(s.entries, 0);
        assert_eq!(s.conversions, 0);
        assert_eq!(s.modifications, 0);
    }
}
