use tracing::debug;

use crate::browser::driver::PageDriver;
use crate::error::ProbeError;

/// One strategy in an escalation ladder.
pub struct Rung<'a> {
    pub name: &'static str,
    attempt: Box<dyn Fn(&mut dyn PageDriver) -> Result<(), ProbeError> + 'a>,
}

impl<'a> Rung<'a> {
    pub fn new(
        name: &'static str,
        attempt: impl Fn(&mut dyn PageDriver) -> Result<(), ProbeError> + 'a,
    ) -> Self {
        Self {
            name,
            attempt: Box::new(attempt),
        }
    }
}

/// Try each rung in order and stop at the first success, returning its name.
/// When every rung fails, the last error is returned.
pub fn climb(driver: &mut dyn PageDriver, rungs: &[Rung<'_>]) -> Result<&'static str, ProbeError> {
    let mut last_error = None;

    for rung in rungs {
        match (rung.attempt)(&mut *driver) {
            Ok(()) => {
                debug!(rung = rung.name, "ladder rung succeeded");
                return Ok(rung.name);
            }
            Err(e) => {
                debug!(rung = rung.name, error = %e, "ladder rung failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ProbeError::SessionProtocol {
        command: "ladder".into(),
        error: "no strategies to try".into(),
    }))
}
