//! Process-wide slot for callers that cannot hold a loader themselves.
//!
//! The slot is thread-local: a loader driving a browser document is tied to
//! the thread that owns that document, so each execution context gets its own
//! slot. There is a single writer: [`install`] refuses to overwrite an
//! occupied slot, and the slot stays occupied until [`teardown`] removes it.
//! Closures passed to [`with_installed`] must not call back into the
//! registry; nested access observes an empty slot.

use std::any::Any;
use std::cell::RefCell;

use crate::error::LoaderError;

thread_local! {
    static SLOT: RefCell<Option<Box<dyn Any>>> = const { RefCell::new(None) };
}

/// Publishes `loader`, failing if another loader is already installed.
pub fn install<L: Any>(loader: L) -> Result<(), LoaderError> {
    SLOT.with(|slot| {
        let mut slot = slot
            .try_borrow_mut()
            .map_err(|_| LoaderError::AlreadyInstalled)?;
        if slot.is_some() {
            return Err(LoaderError::AlreadyInstalled);
        }
        *slot = Some(Box::new(loader));
        tracing::debug!("favicon loader installed");
        Ok(())
    })
}

pub fn is_installed() -> bool {
    SLOT.with(|slot| slot.try_borrow().map(|s| s.is_some()).unwrap_or(true))
}

/// Runs `f` against the installed loader.
///
/// Returns `None` when the slot is empty, holds a different type, or is
/// already borrowed by an enclosing call.
pub fn with_installed<L: Any, R>(f: impl FnOnce(&mut L) -> R) -> Option<R> {
    SLOT.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        let loader = slot.as_mut()?.downcast_mut::<L>()?;
        Some(f(loader))
    })
}

/// Empties the slot and hands the loader back.
///
/// A loader of a different type stays installed and `None` is returned.
pub fn teardown<L: Any>() -> Option<L> {
    SLOT.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        let boxed = slot.take()?;
        match boxed.downcast::<L>() {
            Ok(loader) => {
                tracing::debug!("favicon loader torn down");
                Some(*loader)
            }
            Err(other) => {
                *slot = Some(other);
                None
            }
        }
    })
}
