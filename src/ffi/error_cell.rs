use std::any::Any;
use std::ffi::{CString, c_char};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use tracing::{debug, error};

use crate::error::MapnikResult;

/// Last failure message owned by a handle.
///
/// The pointer handed out by [`ErrorCell::as_ptr`] stays valid until the
/// cell is cleared or overwritten.
#[derive(Debug, Default)]
pub struct ErrorCell {
    message: Option<CString>,
}

impl ErrorCell {
    pub fn clear(&mut self) {
        self.message = None;
    }

    /// Stores `message`, dropping any interior NUL bytes.
    pub fn record(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        message.retain(|c| c != '\0');
        self.message = CString::new(message).ok();
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().and_then(|msg| msg.to_str().ok())
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const c_char {
        self.message.as_ref().map_or(ptr::null(), |msg| msg.as_ptr())
    }

    /// Clears the cell, runs `operation` inside [`guard`] and records the
    /// failure message, if any.
    pub fn capture<T>(&mut self, operation: impl FnOnce() -> MapnikResult<T>) -> Option<T> {
        self.clear();
        match guard(operation) {
            Ok(value) => Some(value),
            Err(message) => {
                self.record(message);
                None
            }
        }
    }
}

/// Runs `operation`, turning both errors and panics into a message.
pub(crate) fn guard<T>(operation: impl FnOnce() -> MapnikResult<T>) -> Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            debug!(%err, "operation failed");
            Err(err.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(%message, "panic caught at the C boundary");
            Err(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("internal error: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("internal error: {message}")
    } else {
        "internal error".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCell;
    use crate::error::MapnikError;

    #[test]
    fn capture_records_errors_and_clears_on_success() {
        let mut cell = ErrorCell::default();
        let failed: Option<()> =
            cell.capture(|| Err(MapnikError::InvalidArgument("boom".to_owned())));
        assert!(failed.is_none());
        assert_eq!(cell.message(), Some("invalid argument: boom"));

        assert_eq!(cell.capture(|| Ok(7)), Some(7));
        assert!(cell.message().is_none());
        assert!(cell.as_ptr().is_null());
    }

    #[test]
    fn capture_converts_panics() {
        let mut cell = ErrorCell::default();
        let result: Option<()> = cell.capture(|| panic!("bad state"));
        assert!(result.is_none());
        assert_eq!(cell.message(), Some("internal error: bad state"));
    }

    #[test]
    fn interior_nul_bytes_are_dropped() {
        let mut cell = ErrorCell::default();
        cell.record("a\0b");
        assert_eq!(cell.message(), Some("ab"));
    }
}
