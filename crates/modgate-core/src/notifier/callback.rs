//! Closure-backed notifier

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::{DecisionEvent, DecisionNotifier, Delivery};
use crate::error::{GateError, GateResult};

/// Hands each decision to a callback. A panicking callback is reported as a
/// notification error instead of unwinding into the permission check. This
/// relies on the unwinding panic strategy; under `panic = "abort"` the
/// process still aborts.
pub struct CallbackNotifier {
    callback: Arc<dyn Fn(&DecisionEvent) + Send + Sync>,
}

impl CallbackNotifier {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&DecisionEvent) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl Clone for CallbackNotifier {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl fmt::Debug for CallbackNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackNotifier").finish_non_exhaustive()
    }
}

impl DecisionNotifier for CallbackNotifier {
    fn notify(&self, event: &DecisionEvent) -> GateResult<Delivery> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(event)))
            .map(|_| Delivery::Delivered(1))
            .map_err(|_| GateError::notification_on("decision callback panicked", "callback"))
    }
}
