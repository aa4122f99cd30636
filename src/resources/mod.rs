//! Resource and data source handlers.

mod data_source;
mod plan;
mod project;
pub mod schema;

pub use data_source::ProjectDataSource;
pub use plan::plan_resource;
pub use project::ProjectResource;

/// Type name of the project resource and data source.
pub const PROJECT_TYPE: &str = "orynetwork_project";
