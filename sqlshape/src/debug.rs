//! Statement debugging through `tracing`

use crate::config::DebugConfig;
use sqlshape_core::{Binds, Params, Statement};
use std::borrow::Cow;
use std::panic::Location;

/// Default cap on logged payloads, in bytes
pub const DEFAULT_MAX_LEN: usize = 1000;

/// Emits the SQL and binds a `Db` is about to run, when enabled.
///
/// Events go to target `sqlshape::sql` at DEBUG level and carry the source
/// location that produced them. Payloads longer than `max_len` bytes are cut
/// at a char boundary and suffixed with `...`; a `max_len` of 0 disables the
/// cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugSink {
    enabled: bool,
    max_len: usize,
}

impl Default for DebugSink {
    fn default() -> Self {
        Self {
            enabled: false,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl From<&DebugConfig> for DebugSink {
    fn from(config: &DebugConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_len: config.max_len,
        }
    }
}

impl DebugSink {
    pub fn new(enabled: bool, max_len: usize) -> Self {
        Self { enabled, max_len }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn set(&mut self, enabled: bool, max_len: usize) {
        self.enabled = enabled;
        self.max_len = max_len;
    }

    pub fn truncate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.max_len == 0 || text.len() <= self.max_len {
            return Cow::Borrowed(text);
        }
        let mut end = self.max_len;
        while end > 0 && !text.is_char_boundary(end) {
            end -= 1;
        }
        Cow::Owned(format!("{}...", &text[..end]))
    }

    /// Log a free-text payload
    #[track_caller]
    pub fn text(&self, payload: &str) {
        if !self.enabled {
            return;
        }
        let location = Location::caller();
        tracing::debug!(
            target: "sqlshape::sql",
            location = %location,
            payload = %self.truncate(payload),
        );
    }

    /// Log a statement's SQL and its binds
    #[track_caller]
    pub fn statement(&self, statement: &Statement) {
        if !self.enabled {
            return;
        }
        let location = Location::caller();
        let binds = render_params(statement.params());
        tracing::debug!(
            target: "sqlshape::sql",
            location = %location,
            sql = %self.truncate(statement.sql()),
            binds = %self.truncate(&binds),
        );
    }
}

fn render_binds(binds: &Binds) -> String {
    let rendered = match binds {
        Binds::Named(map) => serde_json::to_string(map),
        Binds::Positional(values) => serde_json::to_string(values),
    };
    rendered.unwrap_or_else(|e| format!("<unrenderable binds: {e}>"))
}

fn render_params(params: &Params) -> String {
    match params {
        Params::None => String::new(),
        Params::Single(binds) => render_binds(binds),
        Params::Batch(rows) => {
            let rendered: Vec<String> = rows.iter().map(render_binds).collect();
            format!("[{}]", rendered.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlshape_core::{row, Value};

    #[test]
    fn test_truncate() {
        let sink = DebugSink::new(true, 10);
        assert_eq!(sink.truncate("SELECT * FROM users"), "SELECT * F...");
        assert_eq!(sink.truncate("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let sink = DebugSink::new(true, 2);
        assert_eq!(sink.truncate("äöü"), "ä...");
    }

    #[test]
    fn test_zero_means_unlimited() {
        let sink = DebugSink::new(true, 0);
        let long = "x".repeat(5000);
        assert_eq!(sink.truncate(&long).len(), 5000);
    }

    #[test]
    fn test_defaults() {
        let sink = DebugSink::default();
        assert!(!sink.is_enabled());
        assert_eq!(sink.max_len(), DEFAULT_MAX_LEN);
    }

    #[test]
    fn test_render_binds_as_json() {
        let binds = Binds::Named(row! { "FirstName" => "Jimmy", "ID" => 1, "Note" => () });
        assert_eq!(
            render_binds(&binds),
            r#"{"FirstName":"Jimmy","ID":1,"Note":null}"#
        );
        let batch = Params::Batch(vec![
            Binds::Positional(vec![Value::I32(1)]),
            Binds::Positional(vec![Value::I32(2)]),
        ]);
        assert_eq!(render_params(&batch), "[[1],[2]]");
    }

    #[test]
    fn test_disabled_sink_is_silent() {
        let sink = DebugSink::default();
        sink.text("SELECT 1");
        sink.statement(&Statement::raw("SELECT 1").unwrap());
    }
}
