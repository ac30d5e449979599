//! Per-channel grid cache with exactly-once loading.
//!
//! Each channel gets a slot holding a one-time cell for its grid and a load
//! guard. A first request takes the guard, re-checks the cell, runs the
//! loader and publishes the result; concurrent first requests for the same
//! channel block on the guard and then see the published grid. Once
//! published, reads only touch the slot map's read lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::AxisConfiguration;
use crate::error::{PdfError, Result};
use crate::grid::Grid;
use crate::loader::GridLoader;

#[derive(Default)]
struct Slot {
    grid: OnceCell<Arc<Grid>>,
    loading: Mutex<()>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    loads: AtomicU64,
    load_failures: AtomicU64,
}

/// Statistics for the grid store.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StoreStats {
    /// Requests served from an already published grid.
    pub hits: u64,
    /// Requests that found no published grid.
    pub misses: u64,
    /// Successful loader invocations.
    pub loads: u64,
    /// Failed loader invocations.
    pub load_failures: u64,
    /// Channels currently holding a grid.
    pub entries: usize,
    /// Total cells across all held grids.
    pub cells: u64,
}

impl StoreStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Estimated memory usage in MB
    pub fn estimated_memory_mb(&self) -> f64 {
        (self.cells as f64 * std::mem::size_of::<f64>() as f64) / (1024.0 * 1024.0)
    }
}

/// Cache mapping channel identifiers to their loaded grids.
///
/// Grids are loaded lazily on first request and kept until the store is
/// dropped or the entry is invalidated.
pub struct GridStore<L> {
    loader: L,
    axes: AxisConfiguration,
    slots: RwLock<HashMap<i32, Arc<Slot>>>,
    counters: Counters,
}

impl<L: GridLoader> GridStore<L> {
    /// Create an empty store.
    ///
    /// # Errors
    /// * If `axes` fails validation
    pub fn new(loader: L, axes: AxisConfiguration) -> Result<Self> {
        axes.validate()?;
        Ok(Self {
            loader,
            axes,
            slots: RwLock::new(HashMap::new()),
            counters: Counters::default(),
        })
    }

    /// Axis configuration shared by every grid in the store.
    pub fn axes(&self) -> &AxisConfiguration {
        &self.axes
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Get the grid for `channel`, loading it on first request.
    ///
    /// # Errors
    /// * [`PdfError::ChannelOutOfRange`] if `channel` is outside the channel range
    /// * Any loader error; nothing is published and a later call retries
    pub fn get(&self, channel: i32) -> Result<Arc<Grid>> {
        if let Some(grid) = self.published(channel) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(grid);
        }

        self.axes.channels.check(channel)?;
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let slot = self.slot(channel);
        let _guard = slot.loading.lock().unwrap_or_else(|e| e.into_inner());

        // Another caller may have finished loading while we waited.
        if let Some(grid) = slot.grid.get() {
            debug!(channel, "Lookup table loaded by concurrent request");
            return Ok(Arc::clone(grid));
        }

        debug!(channel, "Lookup table cache miss, loading");
        let grid = match self.load_checked(channel) {
            Ok(grid) => Arc::new(grid),
            Err(err) => {
                self.counters.load_failures.fetch_add(1, Ordering::Relaxed);
                warn!(channel, error = %err, "Failed to load lookup table");
                return Err(err);
            }
        };
        self.counters.loads.fetch_add(1, Ordering::Relaxed);

        let published = slot.grid.get_or_init(|| grid);
        Ok(Arc::clone(published))
    }

    /// Whether a grid for `channel` is already published.
    pub fn contains(&self, channel: i32) -> bool {
        self.published(channel).is_some()
    }

    /// Drop the grid for `channel` so the next request reloads it.
    ///
    /// Returns whether a published grid was dropped. Callers already holding
    /// the grid keep their reference. A load in flight for `channel` finishes
    /// first and its grid is then dropped. Requests that fetched the slot
    /// before it was removed may still load into it once more.
    pub fn invalidate(&self, channel: i32) -> bool {
        let slot = match self.read_slots().get(&channel) {
            Some(slot) => Arc::clone(slot),
            None => return false,
        };

        // Loaders never take the map lock, so the guard can be held across it.
        let _guard = slot.loading.lock().unwrap_or_else(|e| e.into_inner());
        let mut slots = self.write_slots();
        let current = slots
            .get(&channel)
            .map_or(false, |entry| Arc::ptr_eq(entry, &slot));
        if !current {
            return false;
        }
        slots.remove(&channel);

        let had_grid = slot.grid.get().is_some();
        if had_grid {
            debug!(channel, "Invalidated lookup table");
        }
        had_grid
    }

    /// Drop every grid.
    ///
    /// Unlike [`invalidate`](Self::invalidate) this does not wait for loads in
    /// flight; their grids are returned to their callers but not kept.
    pub fn clear(&self) {
        self.write_slots().clear();
    }

    /// Load several channels in parallel, stopping at the first error.
    pub fn preload(&self, channels: &[i32]) -> Result<()> {
        channels
            .par_iter()
            .try_for_each(|&channel| self.get(channel).map(|_| ()))
    }

    /// Channels with a published grid, in ascending order.
    pub fn loaded_channels(&self) -> Vec<i32> {
        let mut channels: Vec<i32> = self
            .read_slots()
            .iter()
            .filter(|(_, slot)| slot.grid.get().is_some())
            .map(|(&channel, _)| channel)
            .collect();
        channels.sort_unstable();
        channels
    }

    /// Number of published grids.
    pub fn len(&self) -> usize {
        self.read_slots()
            .values()
            .filter(|slot| slot.grid.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cache statistics.
    pub fn stats(&self) -> StoreStats {
        let slots = self.read_slots();
        let grids = slots.values().filter_map(|slot| slot.grid.get());
        let (entries, cells) = grids.fold((0, 0u64), |(n, cells), grid| {
            (n + 1, cells + grid.len() as u64)
        });

        StoreStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            loads: self.counters.loads.load(Ordering::Relaxed),
            load_failures: self.counters.load_failures.load(Ordering::Relaxed),
            entries,
            cells,
        }
    }

    fn published(&self, channel: i32) -> Option<Arc<Grid>> {
        self.read_slots()
            .get(&channel)
            .and_then(|slot| slot.grid.get())
            .cloned()
    }

    fn slot(&self, channel: i32) -> Arc<Slot> {
        if let Some(slot) = self.read_slots().get(&channel) {
            return Arc::clone(slot);
        }
        Arc::clone(self.write_slots().entry(channel).or_default())
    }

    /// Run the loader and reject grids whose shape disagrees with the axes.
    fn load_checked(&self, channel: i32) -> Result<Grid> {
        let grid = self.loader.load(channel, &self.axes)?;
        let expected = self.axes.shape();
        if grid.shape() != expected {
            return Err(PdfError::ShapeMismatch {
                expected: expected.len(),
                found: grid.len(),
            });
        }
        Ok(grid)
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, HashMap<i32, Arc<Slot>>> {
        self.slots.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<i32, Arc<Slot>>> {
        self.slots.write().unwrap_or_else(|e| e.into_inner())
    }
}
