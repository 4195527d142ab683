//! Telemetry bootstrap and the structured logging surface.
//!
//! Records are emitted through `tracing` and rendered by the JSON
//! subscriber installed in [`init`]. Every record emitted via [`log`]
//! carries the active request's correlation identifier and enrichment
//! fields; values tagged [`sensitive`] are redacted before the record
//! leaves the logger, regardless of level.
//!
//! Levels map onto `tracing`: debug → `DEBUG`, information → `INFO`,
//! warning → `WARN`, error → `ERROR`.

use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::domain::DiagnosticContext;

/// Replacement text emitted instead of sensitive field values.
pub const REDACTED: &str = "[redacted]";

/// Initialise the JSON tracing subscriber from the default env filter.
///
/// Safe to call more than once; later calls log a warning instead of
/// failing.
pub fn init() {
    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }
}

/// A single structured log field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text, emitted verbatim.
    Plain(String),
    /// Sensitive text, replaced by [`REDACTED`] on emission.
    Sensitive(String),
}

impl FieldValue {
    fn rendered(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Sensitive(_) => REDACTED,
        }
    }
}

/// Plain field constructor.
pub fn field(value: impl Into<String>) -> FieldValue {
    FieldValue::Plain(value.into())
}

/// Sensitive field constructor; the raw value never leaves the logger.
pub fn sensitive(value: impl Into<String>) -> FieldValue {
    FieldValue::Sensitive(value.into())
}

/// Emit a structured record, merging in the active diagnostic context.
///
/// Enrichment fields from the context are merged first; caller-supplied
/// fields win on key collision. Works outside a request scope too, with an
/// empty trace identifier.
///
/// # Examples
/// ```
/// use faultline::telemetry::{self, field, sensitive};
/// use tracing::Level;
///
/// telemetry::log(
///     Level::INFO,
///     "password rotated",
///     &[("account", field("svc-web")), ("secret", sensitive("hunter2"))],
/// );
/// ```
pub fn log(level: Level, message: &str, fields: &[(&str, FieldValue)]) {
    let mut merged = serde_json::Map::new();
    if let Some(enrichment) = DiagnosticContext::enrichment_snapshot() {
        for (key, value) in enrichment {
            merged.insert(key, serde_json::Value::String(value));
        }
    }
    for (key, value) in fields {
        merged.insert(
            (*key).to_owned(),
            serde_json::Value::String(value.rendered().to_owned()),
        );
    }
    let fields = serde_json::Value::Object(merged);
    let trace_id = DiagnosticContext::current_trace_id()
        .map(|id| id.to_string())
        .unwrap_or_default();

    if level == Level::ERROR {
        error!(trace_id = %trace_id, fields = %fields, "{message}");
    } else if level == Level::WARN {
        warn!(trace_id = %trace_id, fields = %fields, "{message}");
    } else if level == Level::INFO {
        info!(trace_id = %trace_id, fields = %fields, "{message}");
    } else {
        debug!(trace_id = %trace_id, fields = %fields, "{message}");
    }
}

#[cfg(test)]
pub(crate) mod capture {
    //! In-process record capture for asserting on emitted log records.

    use std::fmt::Write as _;
    use std::sync::{Arc, Mutex};

    use tracing::field::{Field, Visit};
    use tracing::subscriber::DefaultGuard;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt as _};

    /// One captured record flattened to its level and rendered fields.
    #[derive(Debug, Clone)]
    pub(crate) struct Record {
        pub(crate) level: Level,
        pub(crate) text: String,
    }

    #[derive(Clone, Default)]
    struct CaptureLayer {
        records: Arc<Mutex<Vec<Record>>>,
    }

    struct Render<'a>(&'a mut String);

    impl Visit for Render<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            let _ = write!(self.0, "{}={:?} ", field.name(), value);
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut text = String::new();
            event.record(&mut Render(&mut text));
            let mut records = self.records.lock().expect("capture lock");
            records.push(Record {
                level: *event.metadata().level(),
                text,
            });
        }
    }

    /// Capture scope: records every event on this thread until dropped.
    pub(crate) struct Capture {
        records: Arc<Mutex<Vec<Record>>>,
        _guard: DefaultGuard,
    }

    impl Capture {
        pub(crate) fn install() -> Self {
            let layer = CaptureLayer::default();
            let records = Arc::clone(&layer.records);
            let guard = tracing::subscriber::set_default(Registry::default().with(layer));
            Self {
                records,
                _guard: guard,
            }
        }

        pub(crate) fn records(&self) -> Vec<Record> {
            self.records.lock().expect("capture lock").clone()
        }

        pub(crate) fn contains(&self, level: Level, needle: &str) -> bool {
            self.records()
                .iter()
                .any(|record| record.level == level && record.text.contains(needle))
        }
    }
}
