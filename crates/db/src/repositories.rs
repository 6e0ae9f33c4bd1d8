pub mod plan;
pub mod service_item;
pub mod task;
