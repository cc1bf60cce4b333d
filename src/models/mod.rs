pub mod endpoint;
pub mod token_revocation;

pub use endpoint::Endpoint;
pub use token_revocation::TokenRevocation;
