pub mod extractor;
pub mod jwt;
pub mod revocation;
pub mod verifier;
