use std::collections::{BTreeMap, BTreeSet};

use genval_core::{EntityModel, FieldValue, RowId};
use genval_storage::StoredRow;

use crate::error::EngineError;

/// The tracked state of one row: current values, last-known-persisted values,
/// and which properties the application has diverged on.
///
/// The application writes through `set`; `originals`, `modified`, and `is_new`
/// are written only by the engine, on load and after a successful save.
#[derive(Debug, Clone)]
pub struct EntitySnapshot {
    key: RowId,
    values: BTreeMap<String, FieldValue>,
    originals: BTreeMap<String, FieldValue>,
    modified: BTreeSet<String>,
    is_new: bool,
}

impl EntitySnapshot {
    /// Start tracking a row that has never been persisted.
    pub fn new(key: RowId, model: &EntityModel) -> Self {
        let values: BTreeMap<String, FieldValue> = model
            .properties()
            .iter()
            .map(|p| (p.name().to_string(), FieldValue::Null))
            .collect();
        Self {
            key,
            originals: values.clone(),
            values,
            modified: BTreeSet::new(),
            is_new: true,
        }
    }

    /// Start tracking a row loaded from the store. Missing properties come
    /// back as `Null`.
    pub fn from_store(key: RowId, model: &EntityModel, stored: StoredRow) -> Self {
        let values: BTreeMap<String, FieldValue> = model
            .properties()
            .iter()
            .map(|p| {
                let value = stored.get(p.name()).cloned().unwrap_or(FieldValue::Null);
                (p.name().to_string(), value)
            })
            .collect();
        Self {
            key,
            originals: values.clone(),
            values,
            modified: BTreeSet::new(),
            is_new: false,
        }
    }

    pub fn key(&self) -> RowId {
        self.key
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn original(&self, name: &str) -> Option<&FieldValue> {
        self.originals.get(name)
    }

    pub fn is_modified(&self, name: &str) -> bool {
        self.modified.contains(name)
    }

    /// Application-side write. The modified flag is recomputed against the
    /// original, so setting a property back to its persisted value clears it.
    pub fn set(&mut self, name: &str, value: FieldValue) -> Result<(), EngineError> {
        let Some(slot) = self.values.get_mut(name) else {
            return Err(EngineError::UnknownProperty(name.to_string()));
        };
        *slot = value;
        if self.values[name] == self.originals[name] {
            self.modified.remove(name);
        } else {
            self.modified.insert(name.to_string());
        }
        Ok(())
    }

    /// Merge the store's post-save row back in and reset tracking state.
    ///
    /// Properties that were omitted from the write take the store's returned
    /// value (the generated, defaulted, or kept one — an ignored edit is
    /// overwritten here); sent properties keep the application value. Either
    /// way the result becomes the new original.
    pub(crate) fn absorb_saved(
        &mut self,
        model: &EntityModel,
        omitted: &BTreeSet<String>,
        stored: &StoredRow,
    ) {
        for prop in model.properties() {
            let name = prop.name();
            if omitted.contains(name) {
                if let Some(value) = stored.get(name) {
                    self.values.insert(name.to_string(), value.clone());
                }
            }
            let current = self.values.get(name).cloned().unwrap_or(FieldValue::Null);
            self.originals.insert(name.to_string(), current);
        }
        self.modified.clear();
        self.is_new = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genval_core::{GenerationTrigger, PropertyDescriptor};

    fn model() -> EntityModel {
        EntityModel::new(
            "gumball",
            vec![
                PropertyDescriptor::new("identity", GenerationTrigger::OnAdd),
                PropertyDescriptor::new("name", GenerationTrigger::Never),
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_snapshot_is_unmodified_and_new() {
        let snap = EntitySnapshot::new(RowId::new(), &model());
        assert!(snap.is_new());
        assert!(!snap.is_modified("identity"));
        assert_eq!(snap.value("identity"), Some(&FieldValue::Null));
    }

    #[test]
    fn set_marks_modified_and_reverting_clears_it() {
        let model = model();
        let mut stored = StoredRow::new();
        stored.insert("identity".into(), FieldValue::Text("Banana Joe".into()));
        stored.insert("name".into(), FieldValue::Text("Gumball".into()));
        let mut snap = EntitySnapshot::from_store(RowId::new(), &model, stored);

        snap.set("identity", FieldValue::Text("Zoe".into())).unwrap();
        assert!(snap.is_modified("identity"));

        snap.set("identity", FieldValue::Text("Banana Joe".into()))
            .unwrap();
        assert!(!snap.is_modified("identity"));
    }

    #[test]
    fn set_unknown_property_is_rejected() {
        let mut snap = EntitySnapshot::new(RowId::new(), &model());
        let result = snap.set("wattage", FieldValue::Integer(750));
        assert!(matches!(result, Err(EngineError::UnknownProperty(name)) if name == "wattage"));
    }

    #[test]
    fn absorb_saved_takes_store_values_for_omitted_properties() {
        let model = model();
        let mut snap = EntitySnapshot::new(RowId::new(), &model);
        snap.set("name", FieldValue::Text("Gumball".into())).unwrap();

        let mut stored = StoredRow::new();
        stored.insert("identity".into(), FieldValue::Text("Banana Joe".into()));
        stored.insert("name".into(), FieldValue::Text("Gumball".into()));
        let omitted = BTreeSet::from(["identity".to_string()]);
        snap.absorb_saved(&model, &omitted, &stored);

        assert!(!snap.is_new());
        assert!(!snap.is_modified("name"));
        assert_eq!(
            snap.value("identity"),
            Some(&FieldValue::Text("Banana Joe".into()))
        );
        assert_eq!(
            snap.original("name"),
            Some(&FieldValue::Text("Gumball".into()))
        );
    }
}
