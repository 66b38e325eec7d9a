use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};

use crate::geometry::normalize_degrees;
use crate::nfp::{InnerFit, Nfp};

/// Rotation in whole millidegrees, normalized to `[0, 360000)`
pub fn millidegrees(angle: f64) -> i64 {
    let m = (normalize_degrees(angle) * 1000.0).round() as i64;
    m.rem_euclid(360_000)
}

/// Identifies an outer no-fit polygon: which part is stationary and which orbits, at which rotations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NfpKey {
    pub stationary: usize,
    pub stationary_rot: i64,
    pub orbiting: usize,
    pub orbiting_rot: i64,
}

impl NfpKey {
    pub fn new(stationary: usize, stationary_deg: f64, orbiting: usize, orbiting_deg: f64) -> Self {
        NfpKey {
            stationary,
            stationary_rot: millidegrees(stationary_deg),
            orbiting,
            orbiting_rot: millidegrees(orbiting_deg),
        }
    }
}

/// Identifies an inner-fit polygon of a part against the (single) sheet stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IfpKey {
    pub part: usize,
    pub rot: i64,
}

impl IfpKey {
    pub fn new(part: usize, deg: f64) -> Self {
        IfpKey {
            part,
            rot: millidegrees(deg),
        }
    }
}

/// Thread-safe memo of no-fit and inner-fit polygons, shared by all evaluations of a search.
///
/// Entries are pure functions of their key, so the contents are identical regardless of
/// which thread computed them first.
#[derive(Debug, Default)]
pub struct NfpCache {
    nfps: RwLock<HashMap<NfpKey, Arc<Nfp>>>,
    ifps: RwLock<HashMap<IfpKey, Option<Arc<InnerFit>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl NfpCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached no-fit polygon for `key`, or computes and stores it.
    /// Failed computations are not cached.
    pub fn nfp<F>(&self, key: NfpKey, compute: F) -> Result<Arc<Nfp>>
    where
        F: FnOnce() -> Result<Nfp>,
    {
        {
            let nfps = self
                .nfps
                .read()
                .map_err(|e| anyhow!("nfp cache lock poisoned: {e}"))?;
            if let Some(nfp) = nfps.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Arc::clone(nfp));
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let nfp = Arc::new(compute()?);

        let mut nfps = self
            .nfps
            .write()
            .map_err(|e| anyhow!("nfp cache lock poisoned: {e}"))?;
        //another thread may have stored an identical entry in the meantime
        Ok(Arc::clone(nfps.entry(key).or_insert(nfp)))
    }

    /// Returns the cached inner-fit polygon for `key` (`None`: the part does not fit), or computes and stores it.
    pub fn ifp<F>(&self, key: IfpKey, compute: F) -> Result<Option<Arc<InnerFit>>>
    where
        F: FnOnce() -> Option<InnerFit>,
    {
        {
            let ifps = self
                .ifps
                .read()
                .map_err(|e| anyhow!("ifp cache lock poisoned: {e}"))?;
            if let Some(ifp) = ifps.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(ifp.clone());
            }
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let ifp = compute().map(Arc::new);

        let mut ifps = self
            .ifps
            .write()
            .map_err(|e| anyhow!("ifp cache lock poisoned: {e}"))?;
        Ok(ifps.entry(key).or_insert(ifp).clone())
    }

    /// Number of cached no-fit and inner-fit polygons
    pub fn len(&self) -> usize {
        let n_nfps = self.nfps.read().map(|c| c.len()).unwrap_or(0);
        let n_ifps = self.ifps.read().map(|c| c.len()).unwrap_or(0);
        n_nfps + n_ifps
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses) since construction
    pub fn stats(&self) -> (usize, usize) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::{Rect, SPolygon};
    use crate::nfp::{inner_fit, no_fit_polygon};
    use anyhow::bail;
    use test_case::test_case;

    #[test_case(0.0, 0)]
    #[test_case(360.0, 0)]
    #[test_case(-90.0, 270_000)]
    #[test_case(359.9999, 0)]
    #[test_case(12.3456, 12_346)]
    fn rotation_keys(deg: f64, expected: i64) {
        assert_eq!(millidegrees(deg), expected);
    }

    #[test]
    fn computes_once_and_skips_failures() {
        let sq = SPolygon::from(Rect::try_new(-1.0, -1.0, 1.0, 1.0).unwrap());
        let cache = NfpCache::new();
        let key = NfpKey::new(0, 0.0, 1, 90.0);

        assert!(cache.nfp(key, || bail!("transient")).is_err());
        assert!(cache.is_empty());

        let a = cache
            .nfp(key, || no_fit_polygon(&[sq.clone()], &[sq.clone()]))
            .unwrap();
        let b = cache.nfp(key, || bail!("should not be recomputed")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        //a full turn maps onto the same entry
        assert!(cache.nfp(NfpKey::new(0, 360.0, 1, 450.0), || bail!("miss")).is_ok());

        let sheet = SPolygon::from(Rect::try_new(0.0, 0.0, 1.0, 1.0).unwrap());
        assert!(cache.ifp(IfpKey::new(0, 0.0), || inner_fit(&sheet, &sq)).unwrap().is_none());
        assert!(cache.ifp(IfpKey::new(0, 0.0), || unreachable!()).unwrap().is_none());
        assert_eq!(cache.len(), 2);
    }
}
