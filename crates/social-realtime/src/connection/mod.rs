//! Connection records, the group registry, and socket authentication.

pub mod authenticator;
pub mod handle;
pub mod membership;
pub mod registry;

pub use authenticator::WsAuthenticator;
pub use handle::ConnectionHandle;
pub use membership::MembershipGuard;
pub use registry::ConnectionRegistry;
