pub mod endpoints;
pub mod revocations;
