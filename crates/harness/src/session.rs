use genval_core::{EntityModel, FieldValue, RowId};
use genval_engine::{Engine, EngineError, EntitySnapshot};
use genval_storage::{SqliteStorage, StorageError, StoredRow};

/// Open an in-memory store with the model's table already created.
pub fn sqlite_with_table(model: &EntityModel) -> Result<SqliteStorage, StorageError> {
    let storage = SqliteStorage::open_in_memory()?;
    storage.create_table(model)?;
    Ok(storage)
}

pub struct TestSession {
    pub engine: Engine<SqliteStorage>,
}

impl TestSession {
    pub fn new(model: EntityModel) -> Result<Self, StorageError> {
        let storage = sqlite_with_table(&model)?;
        Ok(Self {
            engine: Engine::new(model, storage),
        })
    }

    /// Track a new row, apply the given fields, and insert it.
    pub fn insert_new(
        &mut self,
        fields: Vec<(&str, FieldValue)>,
    ) -> Result<EntitySnapshot, EngineError> {
        let mut snapshot = self.engine.track_new();
        for (name, value) in fields {
            snapshot.set(name, value)?;
        }
        self.engine.save(&mut snapshot)?;
        Ok(snapshot)
    }

    /// Apply the given fields to a tracked snapshot and save it again.
    pub fn update(
        &mut self,
        snapshot: &mut EntitySnapshot,
        fields: Vec<(&str, FieldValue)>,
    ) -> Result<(), EngineError> {
        for (name, value) in fields {
            snapshot.set(name, value)?;
        }
        self.engine.save(snapshot)
    }

    /// Read the raw row straight from the store, bypassing tracking.
    pub fn stored_row(&self, key: RowId) -> Result<StoredRow, EngineError> {
        use genval_storage::Store;
        self.engine
            .store()
            .fetch(self.engine.model().name(), key)?
            .ok_or_else(|| EngineError::RowNotFound(key.to_string()))
    }
}
