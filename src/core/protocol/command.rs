//! Outgoing command description

use crate::core::codec::text_to_bytes;
use bytes::Bytes;
use std::time::Duration;

/// A payload plus how to send it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingCommand {
    payload: Bytes,
    repeat: u32,
    delay: Option<Duration>,
    label: Option<String>,
}

impl OutgoingCommand {
    /// Send `payload` once, pacing repeats by the endpoint's send delay
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            repeat: 1,
            delay: None,
            label: None,
        }
    }

    /// Build from single-byte text
    pub fn from_text(text: &str) -> Self {
        Self::new(text_to_bytes(text))
    }

    /// Number of identical writes; values below 1 are raised to 1
    #[must_use]
    pub fn repeat(mut self, count: u32) -> Self {
        self.repeat = count.max(1);
        self
    }

    /// Pause between repeated writes, overriding the endpoint default
    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(ms));
        self
    }

    /// Friendly name used in traces only
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Bytes written on each send
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Number of writes, at least 1
    pub fn repeat_count(&self) -> u32 {
        self.repeat
    }

    /// Pause override; `None` uses the endpoint's send delay
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    /// The label, or the payload as text when none was given
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| crate::core::codec::bytes_to_text(&self.payload))
    }
}
