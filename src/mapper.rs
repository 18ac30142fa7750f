//! Maps an actuator JSON payload onto the republished gauges.
//!
//! Only the top level is parsed eagerly. Each value stays raw until its key is
//! found in the catalog, so an odd value under one key never fails the rest.

use std::collections::HashMap;

use serde_json::value::RawValue;

use crate::catalog::{lookup, ValueKind};
use crate::errors::ExporterError;
use crate::metrics::ActuatorGauges;

/// Coerce one raw JSON value according to the gauge's kind.
///
/// Returns `None` when the value does not fit: a negative, fractional or
/// non-numeric value for an unsigned field, a non-number or out-of-range
/// number for the float one. `null` is accepted and reads as zero.
pub fn coerce(kind: ValueKind, raw: &str) -> Option<f64> {
    if raw.trim() == "null" {
        return Some(0.0);
    }
    match kind {
        ValueKind::Unsigned => serde_json::from_str::<u64>(raw).ok().map(|v| v as f64),
        ValueKind::Float => serde_json::from_str::<f64>(raw).ok(),
    }
}

/// Parse `body` as a flat JSON object and write every tracked key into `gauges`.
///
/// Unknown keys are skipped without looking at their values. A field that
/// fails coercion is written as zero. Returns the number of tracked keys
/// found, or [`ExporterError::Json`] when the payload is not a JSON object.
pub fn apply(body: &[u8], gauges: &ActuatorGauges) -> Result<usize, ExporterError> {
    let metrics: Option<HashMap<String, Box<RawValue>>> = serde_json::from_slice(body)?;

    let mut mapped = 0;
    for (key, raw) in metrics.iter().flatten() {
        let Some(descriptor) = lookup(key) else {
            continue;
        };
        gauges.set(descriptor, coerce(descriptor.kind, raw.get()).unwrap_or(0.0));
        mapped += 1;
    }
    Ok(mapped)
}
