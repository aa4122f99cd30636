//! Declarative models of a project and their mapping to the remote API.
//!
//! Every model here exists in two shapes. The declarative shape is what the
//! framework hands the provider: plain JSON in which any attribute may be
//! null or unknown, decoded with serde into [`AttrValue`](crate::AttrValue)
//! fields. The remote shape is what the console API speaks. The
//! `from_remote`/`to_remote` functions on each model convert between them.

pub mod cors;
pub mod identity;
pub mod permission;
pub mod project;
pub mod remote;
pub mod services;

pub use cors::CorsSettings;
pub use identity::{IdentityConfig, IdentityService};
pub use permission::{Namespace, PermissionConfig, PermissionService};
pub use project::{ProjectBase, ProjectModel};
pub use remote::{DecodeError, FromRemote, Lens, RemoteObject, ToRemote};
pub use services::{OAuth2Service, ServicesBundle};
