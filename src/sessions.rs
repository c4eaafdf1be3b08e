//! Sessions
//!
//! Session-scoped cart persistence. The cart core only needs get/put/delete
//! of a serializable line map keyed by session, so the substrate (in-memory
//! session, cookie, database row) stays a swappable adapter behind
//! [`CartStore`] rather than a design fork.

use std::convert::Infallible;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;

use crate::cart::Cart;

/// Opaque shopper session identifier, supplied by the surrounding web layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pluggable persistence adapter for session carts.
///
/// Implementations persist the cart's serialized line map (see the `Cart`
/// serde impls) under the session key. Carts for different sessions are
/// independent resources; no coordination between sessions is required.
pub trait CartStore {
    /// Backend-specific failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch the stored cart for a session, if any.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the underlying storage fails.
    fn get(&self, session: &SessionId) -> Result<Option<Cart>, Self::Error>;

    /// Store a session's cart, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the underlying storage fails.
    fn put(&self, session: &SessionId, cart: &Cart) -> Result<(), Self::Error>;

    /// Delete a session's cart; deleting an absent cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a backend error if the underlying storage fails.
    fn delete(&self, session: &SessionId) -> Result<(), Self::Error>;
}

/// In-memory [`CartStore`] for single-process deployments and tests.
#[derive(Debug, Default)]
pub struct MemoryCartStore {
    sessions: Mutex<FxHashMap<SessionId, Cart>>,
}

impl MemoryCartStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-modify-write against one session's cart under the store
    /// lock, creating the cart lazily on first mutation.
    ///
    /// Two racing requests for the same session (a double-click firing two
    /// adds) serialize here, so `add` keeps its increment semantics instead
    /// of losing an update to a concurrent overwrite.
    pub fn update<R>(&self, session: &SessionId, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut sessions = self.lock();
        let cart = sessions.entry(session.clone()).or_default();

        f(cart)
    }

    fn lock(&self) -> MutexGuard<'_, FxHashMap<SessionId, Cart>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartStore for MemoryCartStore {
    type Error = Infallible;

    fn get(&self, session: &SessionId) -> Result<Option<Cart>, Self::Error> {
        Ok(self.lock().get(session).cloned())
    }

    fn put(&self, session: &SessionId, cart: &Cart) -> Result<(), Self::Error> {
        self.lock().insert(session.clone(), cart.clone());

        Ok(())
    }

    fn delete(&self, session: &SessionId) -> Result<(), Self::Error> {
        self.lock().remove(session);

        Ok(())
    }
}
