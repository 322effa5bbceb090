//! The seam between the store and the remote persistence endpoint.
//!
//! The endpoint is stateless request/response with no transaction spanning
//! calls. The store treats it as best effort: reads happen at startup, writes are
//! fired after the local state already changed.

use std::future::Future;

use api_types::{
    init::InitResponse,
    mutation::Mutation,
    user::{LoginRequest, UserRow},
};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// CRUD endpoint backing the store.
pub trait Persistence: Send + Sync + 'static {
    /// Bulk load of every collection.
    fn init(&self) -> impl Future<Output = Result<InitResponse, PersistenceError>> + Send;

    /// Credential check. `Ok(None)` means the credentials were refused.
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<Option<UserRow>, PersistenceError>> + Send;

    /// Single write.
    fn apply(&self, mutation: &Mutation)
    -> impl Future<Output = Result<(), PersistenceError>> + Send;
}
