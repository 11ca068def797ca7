//! Side-effect runner
//!
//! A [`ReactiveEffect`] wraps a closure and records itself as the currently
//! running effect while the closure executes. The active effect is a
//! thread-local stack, so nested runs restore the outer effect when they
//! finish (including on unwind).
//!
//! There is no dependency tracking or re-run scheduling here; the
//! active-effect slot is the hook a tracking layer reads.
//!
//! ```rust
//! use ripple_core::effect::{active_effect, effect};
//!
//! let outer = effect(|| {
//!     assert!(active_effect().is_some());
//! });
//! assert!(active_effect().is_none());
//! assert!(outer.is_active());
//! ```

use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

static NEXT_EFFECT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTIVE_EFFECTS: RefCell<SmallVec<[EffectId; 4]>> = RefCell::new(SmallVec::new());
}

/// Unique identifier for an effect
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectId(u64);

impl EffectId {
    fn next() -> Self {
        Self(NEXT_EFFECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// The effect currently running on this thread, if any
pub fn active_effect() -> Option<EffectId> {
    ACTIVE_EFFECTS.with(|stack| stack.borrow().last().copied())
}

/// Pops the active-effect stack on drop
struct ActiveEffectGuard {
    id: EffectId,
}

impl ActiveEffectGuard {
    fn enter(id: EffectId) -> Self {
        ACTIVE_EFFECTS.with(|stack| stack.borrow_mut().push(id));
        Self { id }
    }
}

impl Drop for ActiveEffectGuard {
    fn drop(&mut self) {
        ACTIVE_EFFECTS.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.id), "active effect stack out of order");
        });
    }
}

/// A side effect that marks itself active while it runs
pub struct ReactiveEffect {
    id: EffectId,
    f: Box<dyn FnMut()>,
    active: bool,
}

impl ReactiveEffect {
    pub fn new<F: FnMut() + 'static>(f: F) -> Self {
        Self {
            id: EffectId::next(),
            f: Box::new(f),
            active: true,
        }
    }

    pub fn id(&self) -> EffectId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Run the effect body
    ///
    /// A stopped effect still runs its body but does not become the active
    /// effect, so nothing can be collected against it.
    pub fn run(&mut self) {
        if !self.active {
            (self.f)();
            return;
        }

        let _guard = ActiveEffectGuard::enter(self.id);
        (self.f)();
    }

    /// Stop the effect from becoming active on later runs
    pub fn stop(&mut self) {
        self.active = false;
    }
}

impl fmt::Debug for ReactiveEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveEffect")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}

/// Create an effect and run it once
pub fn effect<F: FnMut() + 'static>(f: F) -> ReactiveEffect {
    let mut effect = ReactiveEffect::new(f);
    effect.run();
    effect
}
