//! Debug-only reentrancy check.
//!
//! The map calls user strategies (hash and equality) while a bucket chain is
//! being walked or relinked. A strategy that reaches back into the same map
//! at that point would observe a half-updated chain, so every such operation
//! marks itself active here. Debug builds panic on nested entry and name both
//! operations; release builds compile the check away.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map tracker of the operation currently calling into user code.
#[derive(Debug, Default)]
pub struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
}

impl ReentrancyCheck {
    pub const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
        }
    }

    /// Mark `op` active until the returned guard drops.
    ///
    /// # Panics
    ///
    /// In debug builds, if another operation on the same map is still active.
    #[inline]
    pub fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("map reentered by `{op}` while `{outer}` was running");
            }
            self.active.set(Some(op));
            ReentrancyGuard {
                owner: self,
                _lt: PhantomData,
            }
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            ReentrancyGuard { _lt: PhantomData }
        }
    }

    /// Name of the operation currently inside the map, if any.
    #[cfg(all(test, debug_assertions))]
    pub fn active(&self) -> Option<&'static str> {
        self.active.get()
    }
}

/// Clears the active mark on drop, including during unwinding.
pub struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    _lt: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReentrancyCheck;

    #[test]
    fn sequential_entries_are_fine() {
        let r = ReentrancyCheck::new();
        {
            let _g = r.enter("get");
        }
        let _g = r.enter("add");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn guard_tracks_active_operation() {
        let r = ReentrancyCheck::new();
        assert_eq!(r.active(), None);
        let g = r.enter("remove");
        assert_eq!(r.active(), Some("remove"));
        drop(g);
        assert_eq!(r.active(), None);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_and_names_both_operations() {
        let r = ReentrancyCheck::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("set");
            let _inner = r.enter("get");
        }));
        let err = res.expect_err("expected reentrancy to panic in debug builds");
        let msg = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("`get`") && msg.contains("`set`"), "{msg}");
        // The outer guard was released while unwinding.
        assert_eq!(r.active(), None);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let r = ReentrancyCheck::new();
        let _g1 = r.enter("set");
        let _g2 = r.enter("get");
    }
}
