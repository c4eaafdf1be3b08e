//! Checkout
//!
//! Order finalisation. Payment, stock and fulfilment live with external
//! collaborators; the cart core's only job on a placed order is to clear the
//! shopper's cart atomically.

use crate::cart::Cart;
use crate::sessions::{CartStore, SessionId};

/// Finalise an order by emptying the cart.
///
/// Checking out an already-empty cart is a no-op, so a retried confirmation
/// is safe.
pub fn checkout(cart: &mut Cart) {
    cart.clear();
}

/// Finalise an order for a stored session cart by deleting it from the store.
///
/// # Errors
///
/// Returns the store's backend error if the deletion fails.
pub fn checkout_session<S: CartStore>(store: &S, session: &SessionId) -> Result<(), S::Error> {
    store.delete(session)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::catalog::{ProductId, Variant};
    use crate::cart::LineKey;
    use crate::sessions::MemoryCartStore;

    use super::*;

    #[test]
    fn checkout_empties_the_cart_and_is_idempotent() -> TestResult {
        let mut cart = Cart::new();
        cart.add(LineKey::new(ProductId(1), Variant::size("M")), 2)?;

        checkout(&mut cart);
        assert!(cart.is_empty());

        checkout(&mut cart);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn checkout_session_deletes_the_stored_cart() -> TestResult {
        let store = MemoryCartStore::new();
        let session = "shopper-a".into();

        store.update(&session, |cart| {
            cart.add(LineKey::new(ProductId(1), Variant::size("M")), 1)
        })?;

        checkout_session(&store, &session)?;
        assert!(store.get(&session)?.is_none());

        // A second confirmation click must not error.
        checkout_session(&store, &session)?;

        Ok(())
    }
}
