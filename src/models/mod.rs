mod resource_id;
mod todo;

pub use resource_id::{ResourceId, ResourceIdError};
pub use todo::{TodoItem, TodoPayload};
