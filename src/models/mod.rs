//! Response bodies for the gallery API.
//!
//! These are derived views over what the object store reports; nothing
//! here is persisted by the gateway. All structs serialize camelCase to
//! match the browser client's contract.

pub mod image;
pub mod page;
