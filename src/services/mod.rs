// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod importer;
pub mod media_storage;
pub mod place_service;
pub mod query_service;

pub use importer::*;
pub use media_storage::{content_type_for_path, LocalMediaStorage, MediaStorage};
pub use place_service::*;
pub use query_service::*;
