//! Recording navigator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pharma_direct_core::Area;

use crate::ports::{NavigateError, Navigator};

/// Which browser mechanism performed a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mechanism {
    /// Location assignment (adds a history entry).
    Assign,
    /// Location replacement (no history entry).
    Replace,
}

/// One recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Mechanism that performed it.
    pub mechanism: Mechanism,
    /// Target href, exactly as requested.
    pub href: String,
}

/// Recording stand-in for the hosting page's navigation facilities.
///
/// Navigations are recorded, not simulated: the current area never moves on
/// its own. Tests that need the "browser has landed" state call
/// [`set_area`](FakeNavigator::set_area) explicitly.
pub struct FakeNavigator {
    area: Mutex<Area>,
    log: Mutex<Vec<Navigation>>,
    fail_assign: AtomicBool,
    fail_replace: AtomicBool,
}

impl FakeNavigator {
    /// Create a navigator sitting in `area`.
    #[must_use]
    pub fn new(area: Area) -> Self {
        Self {
            area: Mutex::new(area),
            log: Mutex::new(Vec::new()),
            fail_assign: AtomicBool::new(false),
            fail_replace: AtomicBool::new(false),
        }
    }

    /// Move the browser to another area.
    pub fn set_area(&self, area: Area) {
        *self.area.lock().unwrap_or_else(PoisonError::into_inner) = area;
    }

    /// Everything navigated to so far, oldest first.
    #[must_use]
    pub fn navigations(&self) -> Vec<Navigation> {
        self.log().clone()
    }

    /// The most recent navigation, if any.
    #[must_use]
    pub fn last(&self) -> Option<Navigation> {
        self.log().last().cloned()
    }

    /// Make subsequent `assign` calls fail.
    pub fn fail_assign(&self, fail: bool) {
        self.fail_assign.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `replace` calls fail.
    pub fn fail_replace(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    fn log(&self) -> MutexGuard<'_, Vec<Navigation>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FakeNavigator {
    fn default() -> Self {
        Self::new(Area::Root)
    }
}

impl Navigator for FakeNavigator {
    fn current_area(&self) -> Area {
        *self.area.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn assign(&self, href: &str) -> Result<(), NavigateError> {
        if self.fail_assign.load(Ordering::SeqCst) {
            return Err(NavigateError::new("assign rejected"));
        }

        self.log().push(Navigation {
            mechanism: Mechanism::Assign,
            href: href.to_owned(),
        });
        Ok(())
    }

    fn replace(&self, href: &str) -> Result<(), NavigateError> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(NavigateError::new("replace rejected"));
        }

        self.log().push(Navigation {
            mechanism: Mechanism::Replace,
            href: href.to_owned(),
        });
        Ok(())
    }
}
