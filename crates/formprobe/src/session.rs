//! Browser session shared by every case of a suite run.
//!
//! A [`Session`] owns the driver for the whole run: it is opened once before
//! the first case and closed exactly once after the last. Cases borrow the
//! driver through [`Session::driver_mut`] and never close it themselves.

use crate::driver::ProbeDriver;
use crate::result::{ProbeError, ProbeResult};

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Driver is live and may be borrowed by cases
    Open,
    /// Driver has been closed
    Closed,
    /// Closing the driver failed; the browser may still be running
    CloseFailed,
}

/// Scoped owner of a driver
#[derive(Debug)]
pub struct Session<D: ProbeDriver> {
    driver: D,
    state: SessionState,
    cases_run: usize,
}

impl<D: ProbeDriver> Session<D> {
    /// Take ownership of an already launched driver
    pub fn new(driver: D) -> Self {
        tracing::debug!("session opened");
        Self {
            driver,
            state: SessionState::Open,
            cases_run: 0,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether cases may still use the driver
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open)
    }

    /// Number of cases that borrowed the driver
    #[must_use]
    pub const fn cases_run(&self) -> usize {
        self.cases_run
    }

    /// Shared access to the driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Borrow the driver for one case.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::InvalidState`] once the session is closed.
    pub fn driver_mut(&mut self) -> ProbeResult<&mut D> {
        if !self.is_open() {
            return Err(ProbeError::invalid_state("session is closed"));
        }
        self.cases_run += 1;
        Ok(&mut self.driver)
    }

    /// Close the driver. Further calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the browser could not be shut down.
    pub async fn close(&mut self) -> ProbeResult<()> {
        if !self.is_open() {
            return Ok(());
        }
        match self.driver.close().await {
            Ok(()) => {
                self.state = SessionState::Closed;
                tracing::debug!(cases = self.cases_run, "session closed");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::CloseFailed;
                tracing::warn!(error = %e, "session close failed");
                Err(e)
            }
        }
    }
}

impl<D: ProbeDriver> Drop for Session<D> {
    fn drop(&mut self) {
        if self.is_open() {
            tracing::warn!("session dropped while open; browser was not closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDriver, RenderedResult};

    fn session() -> Session<MockDriver> {
        Session::new(MockDriver::with_fixed_result(RenderedResult::success("ok")))
    }

    #[test]
    fn test_new_session_is_open() {
        let session = session();
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.cases_run(), 0);
    }

    #[test]
    fn test_driver_borrow_counts_cases() {
        let mut session = session();
        session.driver_mut().unwrap();
        session.driver_mut().unwrap();
        assert_eq!(session.cases_run(), 2);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mut session = session();
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.driver().is_closed());
        assert_eq!(session.driver().call_count("close"), 1);
    }

    #[tokio::test]
    async fn test_closed_session_refuses_driver() {
        let mut session = session();
        session.close().await.unwrap();
        let err = session.driver_mut().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidState { .. }));
    }
}
