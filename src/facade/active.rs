//! The spec's "process-wide active facade" slot (§4.6, §5, §9).
//!
//! The source's environment allows a single mutable global reference; a
//! systems language with a real ownership model does not get that for
//! free, and the spec's own Design Notes offer the way out explicitly:
//! "In a language without static mutable globals, expose this as an
//! explicit context object the scene-graph integration threads through."
//! `Facade` itself already *is* that context object — callers who don't
//! need process-wide lookup just hold one directly.
//!
//! For producers that do want to look the active facade up without a
//! thread-through reference (the spec's "walking upward from their own
//! node... or via the global reference"), this module keeps exactly one
//! slot, type-erased through `Any` since the slot is shared across every
//! `Facade<T, C>` instantiation a process might use. It is `thread_local`
//! rather than a truly cross-thread global: §5's concurrency model is
//! single-threaded cooperative with no suspension points, so there is only
//! ever one live call stack to hold the active reference for, and a
//! thread-local slot avoids taking on `Send`/`Sync` obligations for
//! arbitrary collider payload types that the spec never asked for.

use std::any::Any;
use std::cell::RefCell;

use crate::geometry::traits::RealNumber;

use super::collider::Collider;
use super::facade::Facade;

thread_local! {
    static ACTIVE: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// Establishes `facade` as the process-wide active facade, replacing any
/// previously active one. Pairs with `teardown`.
pub fn initialize<T: RealNumber + 'static, C: Collider<T> + 'static>(facade: Facade<T, C>) {
    ACTIVE.with(|slot| *slot.borrow_mut() = Some(Box::new(facade)));
}

/// Tears down the active facade, if any. A no-op if none is active.
pub fn teardown() {
    ACTIVE.with(|slot| *slot.borrow_mut() = None);
}

/// True if an active facade of any type is currently established.
pub fn is_active() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_some())
}

/// Runs `f` against the active facade if one is established *and* it was
/// established with this exact `(T, C)` instantiation. Returns `None` if
/// no facade is active or the active one was initialized with different
/// type parameters — the type-erasure equivalent of the source's runtime
/// type check on its global reference.
pub fn with_active<T, C, R>(f: impl FnOnce(&mut Facade<T, C>) -> R) -> Option<R>
where
    T: RealNumber + 'static,
    C: Collider<T> + 'static,
{
    ACTIVE.with(|slot| slot.borrow_mut().as_mut().and_then(|boxed| boxed.downcast_mut::<Facade<T, C>>()).map(f))
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::facade::FacadeConfig;
    use crate::geometry::primitives::Aabb;

    use super::*;

    struct Dot {
        bounds: Aabb<f64>,
    }

    impl Collider<f64> for Dot {
        fn world_bounds(&self) -> Aabb<f64> {
            self.bounds
        }
    }

    #[test]
    fn initialize_then_teardown_round_trips() {
        teardown(); // isolate from any state other tests in this thread left behind
        assert!(!is_active());

        initialize::<f64, Dot>(Facade::new(FacadeConfig::default()));
        assert!(is_active());

        let id = with_active::<f64, Dot, u64>(|facade| facade.register(Dot { bounds: Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0)) }));
        assert!(id.is_some());

        teardown();
        assert!(!is_active());
    }

    #[test]
    fn with_active_misses_on_a_type_mismatch() {
        teardown();
        initialize::<f64, Dot>(Facade::new(FacadeConfig::default()));

        struct Other {
            bounds: Aabb<f64>,
        }
        impl Collider<f64> for Other {
            fn world_bounds(&self) -> Aabb<f64> {
                self.bounds
            }
        }

        let result = with_active::<f64, Other, ()>(|_| ());
        assert!(result.is_none());

        teardown();
    }
}
