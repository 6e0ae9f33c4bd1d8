pub mod actor;
pub mod assignment;
pub mod plan;
pub mod slot;
pub mod task;
