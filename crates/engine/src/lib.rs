pub mod error;
pub mod reconcile;
pub mod snapshot;

pub use error::EngineError;
pub use reconcile::{Conflict, Decision, prepare};
pub use snapshot::EntitySnapshot;

use genval_core::{EntityModel, RowId, SaveOperation};
use genval_storage::{PreparedRow, Store};

/// Reconciles tracked snapshots against the physical store.
///
/// The engine itself performs no I/O while classifying: every property is
/// decided first, then a single atomic store call follows. Policy violations
/// are detected before the store is invoked, and a store failure leaves the
/// snapshot exactly as it was.
pub struct Engine<S: Store> {
    model: EntityModel,
    store: S,
}

impl<S: Store> Engine<S> {
    pub fn new(model: EntityModel, store: S) -> Self {
        Self { model, store }
    }

    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Start tracking a brand-new row with a fresh key.
    pub fn track_new(&self) -> EntitySnapshot {
        EntitySnapshot::new(RowId::new(), &self.model)
    }

    /// Load an existing row into a tracked snapshot.
    pub fn load(&self, key: RowId) -> Result<EntitySnapshot, EngineError> {
        let stored = self
            .store
            .fetch(self.model.name(), key)?
            .ok_or_else(|| EngineError::RowNotFound(key.to_string()))?;
        Ok(EntitySnapshot::from_store(key, &self.model, stored))
    }

    /// Save a snapshot: insert if it has never been persisted, update
    /// otherwise.
    ///
    /// Every property is classified before anything is sent, so a `Throw`
    /// violation anywhere aborts the save with zero store I/O. On success the
    /// store's returned row is merged back and all modified flags reset; on
    /// store failure the snapshot is untouched.
    pub fn save(&mut self, snapshot: &mut EntitySnapshot) -> Result<(), EngineError> {
        let op = if snapshot.is_new() {
            SaveOperation::Insert
        } else {
            SaveOperation::Update
        };

        let mut row = PreparedRow::new();
        let mut omitted = std::collections::BTreeSet::new();
        let mut conflicts = Vec::new();
        for descriptor in self.model.properties() {
            match prepare(op, descriptor, snapshot) {
                Decision::SendValue(value) => {
                    row.insert(descriptor.name().to_string(), Some(value));
                }
                Decision::OmitAndAcceptGenerated => {
                    row.insert(descriptor.name().to_string(), None);
                    omitted.insert(descriptor.name().to_string());
                }
                Decision::Fail(conflict) => conflicts.push(conflict),
            }
        }
        if let Some(conflict) = conflicts.into_iter().next() {
            return Err(EngineError::ConflictingGeneratedValue {
                property: conflict.property,
                operation: conflict.operation,
            });
        }

        let stored = match op {
            SaveOperation::Insert => self.store.insert(self.model.name(), snapshot.key(), &row)?,
            SaveOperation::Update => self.store.update(self.model.name(), snapshot.key(), &row)?,
        };
        snapshot.absorb_saved(&self.model, &omitted, &stored);
        Ok(())
    }
}
