use genval_core::{FieldValue, GenerationTrigger, PropertyDescriptor, SaveBehavior, SaveOperation};

use crate::snapshot::EntitySnapshot;

/// What the engine will do with one property on one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Send the application's value to the store.
    SendValue(FieldValue),
    /// Omit the column and accept whatever the store generates or keeps.
    OmitAndAcceptGenerated,
    /// Reject the whole save before any store I/O.
    Fail(Conflict),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub property: String,
    pub operation: SaveOperation,
}

/// Classify one property for one save operation. Pure: same inputs, same
/// decision, no snapshot mutation.
///
/// The governing behavior is picked by persistence history, not by the
/// operation kind. A snapshot that has never been persisted is governed by
/// `before_save` (there is no store-generated value to conflict with yet).
/// Once the row has been persisted, `after_save` governs every modified
/// store-generated property on every later save — including a property whose
/// trigger does not generate on the current operation, since the value being
/// edited is still the one the store produced.
pub fn prepare(
    op: SaveOperation,
    descriptor: &PropertyDescriptor,
    snapshot: &EntitySnapshot,
) -> Decision {
    let name = descriptor.name();
    let current = || {
        snapshot
            .value(name)
            .cloned()
            .unwrap_or(FieldValue::Null)
    };

    if descriptor.trigger() == GenerationTrigger::Never {
        // The store never generates here; behaviors only govern conflicts
        // with store-generated values.
        return Decision::SendValue(current());
    }
    let generating = descriptor.applies_on(op);
    if snapshot.is_new() && !generating {
        // First-ever save of a trigger that does not fire on it: nothing to
        // conflict with yet.
        return Decision::SendValue(current());
    }
    if !snapshot.is_modified(name) {
        return if generating {
            Decision::OmitAndAcceptGenerated
        } else {
            Decision::SendValue(current())
        };
    }

    let behavior = if snapshot.is_new() {
        descriptor.before_save()
    } else {
        descriptor.after_save()
    };
    match behavior {
        SaveBehavior::Use => Decision::SendValue(current()),
        SaveBehavior::Ignore => Decision::OmitAndAcceptGenerated,
        SaveBehavior::Throw => Decision::Fail(Conflict {
            property: name.to_string(),
            operation: op,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genval_core::{EntityModel, GenerationTrigger, RowId};
    use genval_storage::StoredRow;

    fn model_with(descriptor: PropertyDescriptor) -> EntityModel {
        EntityModel::new("anais", vec![descriptor]).unwrap()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    fn persisted(model: &EntityModel, name: &str, value: FieldValue) -> EntitySnapshot {
        let mut stored = StoredRow::new();
        stored.insert(name.into(), value);
        EntitySnapshot::from_store(RowId::new(), model, stored)
    }

    #[test]
    fn never_generated_property_always_sends_application_value() {
        let descriptor = PropertyDescriptor::new("plain", GenerationTrigger::Never);
        let model = model_with(descriptor.clone());
        let mut snap = EntitySnapshot::new(RowId::new(), &model);
        snap.set("plain", text("kept")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Insert, &descriptor, &snap),
            Decision::SendValue(text("kept"))
        );
        let persisted = persisted(&model, "plain", text("kept"));
        assert_eq!(
            prepare(SaveOperation::Update, &descriptor, &persisted),
            Decision::SendValue(text("kept"))
        );
    }

    #[test]
    fn unmodified_generating_property_is_omitted_never_failed() {
        for (before, after) in [
            (SaveBehavior::Use, SaveBehavior::Use),
            (SaveBehavior::Ignore, SaveBehavior::Throw),
            (SaveBehavior::Throw, SaveBehavior::Throw),
        ] {
            let descriptor = PropertyDescriptor::new("computed", GenerationTrigger::OnAddOrUpdate)
                .with_behaviors(before, after);
            let model = model_with(descriptor.clone());
            let snap = EntitySnapshot::new(RowId::new(), &model);
            assert_eq!(
                prepare(SaveOperation::Insert, &descriptor, &snap),
                Decision::OmitAndAcceptGenerated
            );
            let persisted = persisted(&model, "computed", text("Alan"));
            assert_eq!(
                prepare(SaveOperation::Update, &descriptor, &persisted),
                Decision::OmitAndAcceptGenerated
            );
        }
    }

    #[test]
    fn before_save_governs_first_ever_insert() {
        // after_save = Throw must not fire on a row the store has never
        // generated for.
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Use, SaveBehavior::Throw);
        let model = model_with(descriptor.clone());
        let mut snap = EntitySnapshot::new(RowId::new(), &model);
        snap.set("identity", text("X")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Insert, &descriptor, &snap),
            Decision::SendValue(text("X"))
        );
    }

    #[test]
    fn throw_before_rejects_value_set_on_new_row() {
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Throw, SaveBehavior::Use);
        let model = model_with(descriptor.clone());
        let mut snap = EntitySnapshot::new(RowId::new(), &model);
        snap.set("identity", text("X")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Insert, &descriptor, &snap),
            Decision::Fail(Conflict {
                property: "identity".into(),
                operation: SaveOperation::Insert,
            })
        );
    }

    #[test]
    fn after_save_governs_once_persisted() {
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Use, SaveBehavior::Throw);
        let model = model_with(descriptor.clone());
        let mut snap = persisted(&model, "identity", text("Banana Joe"));
        snap.set("identity", text("Zoe")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Update, &descriptor, &snap),
            Decision::Fail(Conflict {
                property: "identity".into(),
                operation: SaveOperation::Update,
            })
        );
    }

    #[test]
    fn after_save_governs_edits_even_when_trigger_skips_the_operation() {
        // OnAdd does not generate on update, but the value under edit is
        // still the store's; after_save dispatches all three ways.
        for (after, expected) in [
            (SaveBehavior::Use, Decision::SendValue(text("Zoe"))),
            (SaveBehavior::Ignore, Decision::OmitAndAcceptGenerated),
            (
                SaveBehavior::Throw,
                Decision::Fail(Conflict {
                    property: "identity".into(),
                    operation: SaveOperation::Update,
                }),
            ),
        ] {
            let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
                .with_behaviors(SaveBehavior::Use, after);
            let model = model_with(descriptor.clone());
            let mut snap = persisted(&model, "identity", text("Banana Joe"));
            snap.set("identity", text("Zoe")).unwrap();

            assert_eq!(prepare(SaveOperation::Update, &descriptor, &snap), expected);
        }
    }

    #[test]
    fn unmodified_non_generating_property_is_sent_verbatim_once_persisted() {
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Use, SaveBehavior::Throw);
        let model = model_with(descriptor.clone());
        let snap = persisted(&model, "identity", text("Banana Joe"));

        assert_eq!(
            prepare(SaveOperation::Update, &descriptor, &snap),
            Decision::SendValue(text("Banana Joe"))
        );
    }

    #[test]
    fn after_save_governs_reinsert_of_previously_persisted_row() {
        // "Before" means the store has never generated for this row, not
        // "this is an insert".
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Use, SaveBehavior::Ignore);
        let model = model_with(descriptor.clone());
        let mut snap = persisted(&model, "identity", text("Banana Joe"));
        snap.set("identity", text("Zoe")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Insert, &descriptor, &snap),
            Decision::OmitAndAcceptGenerated
        );
    }

    #[test]
    fn ignore_discards_application_value() {
        let descriptor = PropertyDescriptor::new("computed", GenerationTrigger::OnAddOrUpdate)
            .with_behaviors(SaveBehavior::Use, SaveBehavior::Ignore);
        let model = model_with(descriptor.clone());
        let mut snap = persisted(&model, "computed", text("Alan"));
        snap.set("computed", text("Mutant")).unwrap();

        assert_eq!(
            prepare(SaveOperation::Update, &descriptor, &snap),
            Decision::OmitAndAcceptGenerated
        );
    }

    #[test]
    fn prepare_is_idempotent() {
        let descriptor = PropertyDescriptor::new("identity", GenerationTrigger::OnAdd)
            .with_behaviors(SaveBehavior::Throw, SaveBehavior::Throw);
        let model = model_with(descriptor.clone());
        let mut snap = EntitySnapshot::new(RowId::new(), &model);
        snap.set("identity", text("X")).unwrap();

        let first = prepare(SaveOperation::Insert, &descriptor, &snap);
        let second = prepare(SaveOperation::Insert, &descriptor, &snap);
        assert_eq!(first, second);
    }
}
