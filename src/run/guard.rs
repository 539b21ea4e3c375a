use std::ops::{Deref, DerefMut};

use tracing::{debug, warn};

use crate::browser::driver::PageDriver;
use crate::error::ProbeError;

/// Owns the browser for a whole run and shuts it down exactly once, on
/// `release` or on drop, whichever comes first.
pub struct BrowserGuard<D: PageDriver> {
    driver: D,
    released: bool,
}

impl<D: PageDriver> BrowserGuard<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            released: false,
        }
    }

    pub fn release(&mut self) -> Result<(), ProbeError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.driver.shutdown()
    }
}

impl<D: PageDriver> Deref for BrowserGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.driver
    }
}

impl<D: PageDriver> DerefMut for BrowserGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: PageDriver> Drop for BrowserGuard<D> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "browser shutdown failed");
        }
    }
}

/// A fresh browsing context, closed when the guard goes out of scope.
pub struct ContextGuard<'a> {
    driver: &'a mut dyn PageDriver,
}

impl<'a> ContextGuard<'a> {
    pub fn open(driver: &'a mut dyn PageDriver) -> Result<Self, ProbeError> {
        driver.new_context()?;
        debug!("browsing context opened");
        Ok(Self { driver })
    }

    pub fn driver(&mut self) -> &mut dyn PageDriver {
        &mut *self.driver
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        match self.driver.close_context() {
            Ok(()) => debug!("browsing context closed"),
            Err(e) => warn!(error = %e, "closing browsing context failed"),
        }
    }
}
