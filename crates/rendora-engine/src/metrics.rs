//! The four counters/histogram spec.md §6.3 names, grounded on
//! `riptide-api::metrics::RipTideMetrics`'s `Registry` + `with_opts`
//! construction pattern, narrowed to the four series this gateway needs.

use prometheus::{Counter, Histogram, HistogramOpts, Opts, Registry};
use rendora_types::RendoraError;

pub struct RendoraMetrics {
    pub registry: Registry,
    /// Every request the public listener accepts, render or pass-through.
    pub requests_total: Counter,
    /// Requests the Engine actually rendered (cache miss path).
    pub requests_ssr: Counter,
    /// Requests served from the cache without invoking the driver.
    pub requests_ssr_cached: Counter,
    /// Render latency in milliseconds, miss path only.
    pub latency_ssr: Histogram,
}

impl RendoraMetrics {
    pub fn new() -> Result<Self, RendoraError> {
        let registry = Registry::new();

        let requests_total = Counter::with_opts(Opts::new(
            "rendora_requests_total",
            "Total number of requests accepted by the public listener",
        ))
        .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        let requests_ssr = Counter::with_opts(Opts::new(
            "rendora_requests_ssr",
            "Requests rendered by the headless driver (cache miss)",
        ))
        .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        let requests_ssr_cached = Counter::with_opts(Opts::new(
            "rendora_requests_ssr_cached",
            "Requests served from the result cache without rendering",
        ))
        .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        let latency_ssr = Histogram::with_opts(
            HistogramOpts::new("rendora_latency_ssr", "Render latency in milliseconds")
                .buckets(vec![
                    50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0, 500.0,
                ]),
        )
        .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        registry
            .register(Box::new(requests_total.clone()))
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;
        registry
            .register(Box::new(requests_ssr.clone()))
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;
        registry
            .register(Box::new(requests_ssr_cached.clone()))
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;
        registry
            .register(Box::new(latency_ssr.clone()))
            .map_err(|e| RendoraError::ConfigError(e.to_string()))?;

        Ok(Self {
            registry,
            requests_total,
            requests_ssr,
            requests_ssr_cached,
            latency_ssr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_four_named_series() {
        let metrics = RendoraMetrics::new().unwrap();
        let families = metrics.registry.gather();
        let names: Vec<_> = families.iter().map(|f| f.get_name().to_string()).collect();
        for expected in [
            "rendora_requests_total",
            "rendora_requests_ssr",
            "rendora_requests_ssr_cached",
            "rendora_latency_ssr",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
    }
}
