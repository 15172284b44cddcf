use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use blake3::Hash;

use crate::geometry::{GridSettings, Rect};

pub type ZoneId = String;

/// Host callback asking a zone to measure itself again.
pub type Remeasure = Arc<dyn Fn() + Send + Sync>;

/// Everything other zones may know about a registered drop zone.
#[derive(Clone)]
pub struct ZoneRecord {
    pub rect: Rect,
    pub grid: GridSettings,
    pub item_count: usize,
    pub disable_drop: bool,
    remeasure: Option<Remeasure>,
}

impl ZoneRecord {
    pub fn new(rect: Rect, grid: GridSettings, item_count: usize) -> Self {
        Self {
            rect,
            grid,
            item_count,
            disable_drop: false,
            remeasure: None,
        }
    }

    pub fn with_disable_drop(mut self, disabled: bool) -> Self {
        self.disable_drop = disabled;
        self
    }

    pub fn with_remeasure(mut self, remeasure: Option<Remeasure>) -> Self {
        self.remeasure = remeasure;
        self
    }

    // Geometry fingerprint; the callback is not part of it.
    fn fingerprint(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        let r = &self.rect;
        for value in [r.top, r.bottom, r.left, r.right, r.width, r.height] {
            hasher.update(&value.to_bits().to_le_bytes());
        }
        hasher.update(&self.grid.column_width.to_bits().to_le_bytes());
        hasher.update(&(self.grid.boxes_per_row as u64).to_le_bytes());
        hasher.update(&self.grid.row_height.to_bits().to_le_bytes());
        hasher.update(&(self.item_count as u64).to_le_bytes());
        hasher.update(&[u8::from(self.disable_drop)]);
        hasher.finalize()
    }
}

impl fmt::Debug for ZoneRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneRecord")
            .field("rect", &self.rect)
            .field("grid", &self.grid)
            .field("item_count", &self.item_count)
            .field("disable_drop", &self.disable_drop)
            .field("remeasure", &self.remeasure.is_some())
            .finish()
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    Updated,
    Unchanged,
}

struct ZoneEntry {
    record: ZoneRecord,
    hash: Hash,
}

#[derive(Default)]
struct RegistryState {
    // Registration order decides hit-test priority.
    order: Vec<ZoneId>,
    entries: HashMap<ZoneId, ZoneEntry>,
    dirty: HashSet<ZoneId>,
}

/// Single source of truth for every drop zone's geometry in one
/// coordination tree. Each zone writes only its own entry.
#[derive(Default)]
pub struct DropZoneRegistry {
    inner: RwLock<RegistryState>,
}

impl DropZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the record for `id`. A re-registration keeps the
    /// zone's original hit-test priority.
    pub fn register(&self, id: impl Into<ZoneId>, record: ZoneRecord) -> Registration {
        use std::collections::hash_map::Entry;

        let id = id.into();
        let hash = record.fingerprint();
        let mut state = self.write();

        let outcome = match state.entries.entry(id.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                let changed = entry.hash != hash;
                entry.record = record;
                entry.hash = hash;
                if changed {
                    Registration::Updated
                } else {
                    Registration::Unchanged
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(ZoneEntry { record, hash });
                Registration::Inserted
            }
        };

        if outcome == Registration::Inserted {
            state.order.push(id.clone());
        }
        if outcome != Registration::Unchanged {
            state.dirty.insert(id);
        }
        outcome
    }

    pub fn remove(&self, id: &str) -> Option<ZoneRecord> {
        let mut state = self.write();
        state.order.retain(|existing| existing != id);
        state.dirty.remove(id);
        state.entries.remove(id).map(|entry| entry.record)
    }

    pub fn get(&self, id: &str) -> Option<ZoneRecord> {
        self.read().entries.get(id).map(|entry| entry.record.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().entries.contains_key(id)
    }

    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ask every registered zone to remeasure. Callbacks run after the lock
    /// is released so they may re-register. Returns the number invoked.
    pub fn measure_all(&self) -> usize {
        let callbacks: Vec<Remeasure> = {
            let state = self.read();
            state
                .order
                .iter()
                .filter_map(|id| state.entries.get(id))
                .filter_map(|entry| entry.record.remeasure.clone())
                .collect()
        };
        for remeasure in &callbacks {
            remeasure();
        }
        callbacks.len()
    }

    /// The first zone (by registration order) accepting drops whose
    /// rectangle contains the absolute point, or `origin_id` when none does.
    pub fn active_drop_id(&self, origin_id: &str, x: f64, y: f64) -> ZoneId {
        let state = self.read();
        state
            .order
            .iter()
            .find(|id| {
                state
                    .entries
                    .get(*id)
                    .is_some_and(|entry| !entry.record.disable_drop && entry.record.rect.contains(x, y))
            })
            .cloned()
            .unwrap_or_else(|| origin_id.to_string())
    }

    /// Zones whose geometry changed since the last call.
    pub fn take_dirty(&self) -> Vec<ZoneId> {
        let mut state = self.write();
        let mut dirty: Vec<_> = state.dirty.drain().collect();
        dirty.sort();
        dirty
    }

    pub fn has_dirty(&self) -> bool {
        !self.read().dirty.is_empty()
    }
}
