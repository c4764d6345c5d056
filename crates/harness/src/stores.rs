use genval_core::RowId;
use genval_storage::{PreparedRow, StorageError, Store, StoredRow};

/// Delegating store that records how often each operation runs. Used to
/// verify that policy violations never reach the store.
pub struct CountingStore<S> {
    inner: S,
    pub inserts: usize,
    pub updates: usize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            inserts: 0,
            updates: 0,
        }
    }

    pub fn writes(&self) -> usize {
        self.inserts + self.updates
    }
}

impl<S: Store> Store for CountingStore<S> {
    fn insert(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        self.inserts += 1;
        self.inner.insert(table, key, row)
    }

    fn update(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        self.updates += 1;
        self.inner.update(table, key, row)
    }

    fn fetch(&self, table: &str, key: RowId) -> Result<Option<StoredRow>, StorageError> {
        self.inner.fetch(table, key)
    }
}

/// Delegating store that can be told to fail writes, for verifying that a
/// failed save leaves snapshots untouched.
pub struct FailingStore<S> {
    inner: S,
    fail_writes: bool,
}

impl<S> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_writes: false,
        }
    }

    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl<S: Store> Store for FailingStore<S> {
    fn insert(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner.insert(table, key, row)
    }

    fn update(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("injected write failure".into()));
        }
        self.inner.update(table, key, row)
    }

    fn fetch(&self, table: &str, key: RowId) -> Result<Option<StoredRow>, StorageError> {
        self.inner.fetch(table, key)
    }
}
