use std::fmt;

use crate::error::CoreError;
use crate::value::FieldValue;

/// The two save operations a tracked row can pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveOperation {
    Insert,
    Update,
}

impl fmt::Display for SaveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// When the store is entitled to produce a value for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationTrigger {
    Never,
    OnAdd,
    OnUpdate,
    OnAddOrUpdate,
}

impl GenerationTrigger {
    /// True if the store generates for this property during `op`.
    pub fn applies_on(&self, op: SaveOperation) -> bool {
        match (self, op) {
            (Self::Never, _) => false,
            (Self::OnAdd, SaveOperation::Insert) => true,
            (Self::OnAdd, SaveOperation::Update) => false,
            (Self::OnUpdate, SaveOperation::Insert) => false,
            (Self::OnUpdate, SaveOperation::Update) => true,
            (Self::OnAddOrUpdate, _) => true,
        }
    }
}

/// How an application-supplied value is treated around store generation.
///
/// Each property carries two independent instances: one governing values set
/// before the store has ever generated for the row (`before_save`), one
/// governing edits to a value the store previously generated (`after_save`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaveBehavior {
    /// Honor the application's value, suppressing store generation.
    Use,
    /// Silently discard the application's value; the store's wins.
    Ignore,
    /// Reject the save before any store I/O.
    Throw,
}

/// Schema-level configuration for one persisted property.
///
/// Built once at model construction time and shared read-only by every
/// snapshot of the entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    trigger: GenerationTrigger,
    before_save: SaveBehavior,
    after_save: SaveBehavior,
    store_default: Option<FieldValue>,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, trigger: GenerationTrigger) -> Self {
        Self {
            name: name.into(),
            trigger,
            before_save: SaveBehavior::Use,
            after_save: SaveBehavior::Use,
            store_default: None,
        }
    }

    pub fn with_behaviors(mut self, before_save: SaveBehavior, after_save: SaveBehavior) -> Self {
        self.before_save = before_save;
        self.after_save = after_save;
        self
    }

    pub fn with_default(mut self, value: FieldValue) -> Self {
        self.store_default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trigger(&self) -> GenerationTrigger {
        self.trigger
    }

    pub fn before_save(&self) -> SaveBehavior {
        self.before_save
    }

    pub fn after_save(&self) -> SaveBehavior {
        self.after_save
    }

    pub fn store_default(&self) -> Option<&FieldValue> {
        self.store_default.as_ref()
    }

    /// True if the store generates for this property during `op`.
    pub fn applies_on(&self, op: SaveOperation) -> bool {
        self.trigger.applies_on(op)
    }
}

/// The validated property set for one entity type.
#[derive(Debug, Clone)]
pub struct EntityModel {
    name: String,
    properties: Vec<PropertyDescriptor>,
}

impl EntityModel {
    /// Validates and freezes a property set.
    ///
    /// Names must be unique. A `Never` property must keep `Use`/`Use`
    /// behaviors: save behaviors only govern conflicts with store-generated
    /// values, which a `Never` property cannot have.
    pub fn new(
        name: impl Into<String>,
        properties: Vec<PropertyDescriptor>,
    ) -> Result<Self, CoreError> {
        let mut seen = std::collections::BTreeSet::new();
        for prop in &properties {
            if !seen.insert(prop.name.clone()) {
                return Err(CoreError::DuplicateProperty(prop.name.clone()));
            }
            if prop.trigger == GenerationTrigger::Never
                && (prop.before_save != SaveBehavior::Use || prop.after_save != SaveBehavior::Use)
            {
                return Err(CoreError::InvalidSaveBehavior(prop.name.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            properties,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }
}
