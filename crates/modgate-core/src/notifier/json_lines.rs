//! Newline-delimited JSON notifier

use parking_lot::Mutex;
use std::io::Write;

use super::{DecisionEvent, DecisionNotifier, Delivery};
use crate::error::{GateError, GateResult};

/// Writes one JSON object per decision to a shared writer
#[derive(Debug)]
pub struct JsonLinesNotifier<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesNotifier<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> DecisionNotifier for JsonLinesNotifier<W> {
    fn notify(&self, event: &DecisionEvent) -> GateResult<Delivery> {
        let line = serde_json::to_string(event)
            .map_err(|e| GateError::notification_on(e.to_string(), "json-lines"))?;

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)
            .and_then(|_| writer.flush())
            .map_err(|e| GateError::notification_on(e.to_string(), "json-lines"))?;
        Ok(Delivery::Delivered(1))
    }
}
