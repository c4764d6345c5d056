use genval_core::{EntityModel, FieldValue, GenerationTrigger, PropertyDescriptor, SaveBehavior};

pub fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.into())
}

/// Named trigger/behavior columns with per-column store defaults, mirroring a
/// typical identity/computed column setup.
pub fn gumball_model() -> EntityModel {
    use GenerationTrigger::{Never, OnAdd, OnAddOrUpdate};
    use SaveBehavior::{Throw, Use};

    EntityModel::new(
        "gumball",
        vec![
            PropertyDescriptor::new("name", Never),
            PropertyDescriptor::new("identity", OnAdd).with_default(text("Banana Joe")),
            PropertyDescriptor::new("identity_read_only_before_save", OnAdd)
                .with_behaviors(Throw, Use)
                .with_default(text("Doughnut Sheriff")),
            PropertyDescriptor::new("identity_read_only_after_save", OnAdd)
                .with_behaviors(Use, Throw)
                .with_default(text("Anton")),
            PropertyDescriptor::new("computed", OnAddOrUpdate).with_default(text("Alan")),
            PropertyDescriptor::new("computed_read_only_before_save", OnAddOrUpdate)
                .with_behaviors(Throw, Use)
                .with_default(text("Carmen")),
            PropertyDescriptor::new("computed_read_only_after_save", OnAddOrUpdate)
                .with_behaviors(Use, Throw)
                .with_default(text("Tina Rex")),
        ],
    )
    .expect("gumball model is valid")
}

pub const MATRIX_TRIGGERS: [(&str, GenerationTrigger); 3] = [
    ("on_add", GenerationTrigger::OnAdd),
    ("on_add_or_update", GenerationTrigger::OnAddOrUpdate),
    ("on_update", GenerationTrigger::OnUpdate),
];

pub const MATRIX_BEHAVIORS: [(&str, SaveBehavior); 3] = [
    ("use", SaveBehavior::Use),
    ("ignore", SaveBehavior::Ignore),
    ("throw", SaveBehavior::Throw),
];

pub fn matrix_property_name(trigger: &str, before: &str, after: &str) -> String {
    format!("{trigger}_{before}_before_{after}_after")
}

/// The full trigger x before x after grid, one property per combination, all
/// defaulting to "Rabbit".
pub fn matrix_model() -> EntityModel {
    let mut properties = Vec::new();
    for (trigger_name, trigger) in MATRIX_TRIGGERS {
        for (before_name, before) in MATRIX_BEHAVIORS {
            for (after_name, after) in MATRIX_BEHAVIORS {
                properties.push(
                    PropertyDescriptor::new(
                        matrix_property_name(trigger_name, before_name, after_name),
                        trigger,
                    )
                    .with_behaviors(before, after)
                    .with_default(text("Rabbit")),
                );
            }
        }
    }
    EntityModel::new("anais", properties).expect("matrix model is valid")
}
