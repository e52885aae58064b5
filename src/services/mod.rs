//! Service layer: the object-store capability and the gallery logic on
//! top of it.

pub mod gallery_service;
pub mod memory_store;
pub mod object_store;
pub mod s3_store;
