pub mod error;
pub mod ids;
pub mod model;
pub mod value;

pub use error::CoreError;
pub use ids::RowId;
pub use model::{EntityModel, GenerationTrigger, PropertyDescriptor, SaveBehavior, SaveOperation};
pub use value::FieldValue;
