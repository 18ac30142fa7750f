//! Fixed table of actuator fields the exporter republishes.
//!
//! Each upstream key maps to exactly one gauge. Every gauge carries a single
//! label, named after its category, whose value is the upstream key itself.
//! Dashboards built against the exporter select on that label, so it stays.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Namespace prefixed to every exposed metric.
pub const NAMESPACE: &str = "spring_actuator";

/// How a JSON value is coerced before it is written into its gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Non-negative integer, widened to `f64`.
    Unsigned,
    /// Any JSON number, passed through as `f64`.
    Float,
}

/// Static description of one republished actuator field.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Top-level key in the actuator JSON payload.
    pub upstream_key: &'static str,
    /// Metric name under [`NAMESPACE`].
    pub exposed_name: &'static str,
    pub help_text: &'static str,
    pub label_names: &'static [&'static str],
    pub kind: ValueKind,
}

const MEMORY: &[&str] = &["memory"];
const THREAD: &[&str] = &["thread"];
const CLASSES: &[&str] = &["classes"];
const GC: &[&str] = &["gc"];
const LOAD_AVERAGE: &[&str] = &["load_average"];

const fn unsigned(
    upstream_key: &'static str,
    exposed_name: &'static str,
    help_text: &'static str,
    label_names: &'static [&'static str],
) -> MetricDescriptor {
    MetricDescriptor {
        upstream_key,
        exposed_name,
        help_text,
        label_names,
        kind: ValueKind::Unsigned,
    }
}

pub static CATALOG: &[MetricDescriptor] = &[
    unsigned("mem", "mem", "The total system memory in KB", MEMORY),
    unsigned("mem.free", "mem_free", "The amount of free memory in KB", MEMORY),
    unsigned("heap.committed", "heap_committed", "Heap information in KB", MEMORY),
    unsigned("heap.used", "heap_used", "Heap information in KB", MEMORY),
    unsigned("nonheap.committed", "nonheap_committed", "Non heap information in KB", MEMORY),
    unsigned("nonheap.used", "nonheap_used", "Non heap information in KB", MEMORY),
    unsigned("threads", "threads", "Thread information", THREAD),
    unsigned("classes", "classes", "Class load information", CLASSES),
    unsigned("classes.loaded", "classes_loaded", "Class load information", CLASSES),
    unsigned("classes.unloaded", "classes_unloaded", "Class load information", CLASSES),
    unsigned("gc.ps_scavenge.count", "gc_ps_scavenge_count", "Garbage collection information", GC),
    unsigned("gc.ps_scavenge.time", "gc_ps_scavenge_time", "Garbage collection information", GC),
    unsigned("gc.ps_marksweep.count", "gc_ps_marksweep_count", "Garbage collection information", GC),
    unsigned("gc.ps_marksweep.time", "gc_ps_marksweep_time", "Garbage collection information", GC),
    MetricDescriptor {
        upstream_key: "systemload.average",
        exposed_name: "systemload_average",
        help_text: "The average system load",
        label_names: LOAD_AVERAGE,
        kind: ValueKind::Float,
    },
];

static BY_UPSTREAM_KEY: Lazy<HashMap<&'static str, &'static MetricDescriptor>> =
    Lazy::new(|| CATALOG.iter().map(|d| (d.upstream_key, d)).collect());

/// Find the descriptor for an upstream JSON key, if the exporter tracks it.
pub fn lookup(upstream_key: &str) -> Option<&'static MetricDescriptor> {
    BY_UPSTREAM_KEY.get(upstream_key).copied()
}
