//! Prometheus registry and the gauges republished from the actuator.

use std::collections::HashMap;

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

use crate::catalog::{MetricDescriptor, CATALOG, NAMESPACE};
use crate::errors::ExporterError;

/// Owned registry holding the `up` indicator plus one gauge per catalog entry.
///
/// Nothing here is global: the collector owns an instance and decides when
/// values are reset, written and encoded.
pub struct ActuatorGauges {
    registry: Registry,
    up: Gauge,
    gauges: HashMap<&'static str, GaugeVec>,
}

impl ActuatorGauges {
    /// Register every catalog gauge under the `spring_actuator` namespace.
    pub fn new() -> Result<Self, ExporterError> {
        let registry = Registry::new_custom(Some(NAMESPACE.into()), None)?;

        let up = Gauge::with_opts(Opts::new(
            "up",
            "Was the last scrape of Spring Actuator successful",
        ))?;
        registry.register(Box::new(up.clone()))?;

        let mut gauges = HashMap::with_capacity(CATALOG.len());
        for descriptor in CATALOG {
            let opts = Opts::new(descriptor.exposed_name, descriptor.help_text);
            let vec = GaugeVec::new(opts, descriptor.label_names)?;
            registry.register(Box::new(vec.clone()))?;
            gauges.insert(descriptor.upstream_key, vec);
        }

        Ok(ActuatorGauges { registry, up, gauges })
    }

    /// Drop every labelled gauge value. `up` is left alone.
    pub fn reset(&self) {
        for vec in self.gauges.values() {
            vec.reset();
        }
    }

    pub fn set_up(&self, up: bool) {
        self.up.set(if up { 1.0 } else { 0.0 });
    }

    pub fn up(&self) -> f64 {
        self.up.get()
    }

    /// Write `value` into the gauge for `descriptor`, labelled with its own key.
    pub fn set(&self, descriptor: &MetricDescriptor, value: f64) {
        if let Some(vec) = self.gauges.get(descriptor.upstream_key) {
            vec.with_label_values(&[descriptor.upstream_key]).set(value);
        }
    }

    /// Encode all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<Vec<u8>, ExporterError> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;

    fn text(gauges: &ActuatorGauges) -> String {
        String::from_utf8(gauges.encode().unwrap()).unwrap()
    }

    #[test]
    fn fresh_registry_exposes_only_up() {
        let gauges = ActuatorGauges::new().unwrap();
        let out = text(&gauges);
        assert!(out.contains("spring_actuator_up 0"));
        assert!(!out.contains("spring_actuator_mem{"));
    }

    #[test]
    fn set_uses_key_as_label_value() {
        let gauges = ActuatorGauges::new().unwrap();
        gauges.set(lookup("mem.free").unwrap(), 51200.0);
        let out = text(&gauges);
        assert!(out.contains(r#"spring_actuator_mem_free{memory="mem.free"} 51200"#));
        assert!(out.contains("# HELP spring_actuator_mem_free The amount of free memory in KB"));
        assert!(out.contains("# TYPE spring_actuator_mem_free gauge"));
    }

    #[test]
    fn reset_clears_gauges_but_not_up() {
        let gauges = ActuatorGauges::new().unwrap();
        gauges.set_up(true);
        gauges.set(lookup("threads").unwrap(), 42.0);
        gauges.reset();
        let out = text(&gauges);
        assert!(!out.contains("spring_actuator_threads{"));
        assert_eq!(gauges.up(), 1.0);
    }
}
