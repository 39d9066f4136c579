//! Thin wrapper around a prometheus registry. Compiles to a no-op when the
//! `metrics` feature is off so the core crate stays dependency-light.

#[cfg(feature = "metrics")]
pub struct Metrics {
    registry: prometheus::Registry,
}

#[cfg(feature = "metrics")]
impl Metrics {
    pub fn new() -> Self {
        Self {
            registry: prometheus::Registry::new(),
        }
    }

    pub fn registry(&self) -> &prometheus::Registry {
        &self.registry
    }

    /// Renders the registry in the prometheus text exposition format.
    pub fn render(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        let _ = encoder.encode(&families, &mut buf);
        String::from_utf8_lossy(&buf).to_string()
    }
}

#[cfg(feature = "metrics")]
impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(feature = "metrics"))]
pub struct Metrics;

#[cfg(not(feature = "metrics"))]
impl Metrics {
    pub fn new() -> Self {
        Metrics
    }

    pub fn render(&self) -> String {
        String::new()
    }
}

#[cfg(not(feature = "metrics"))]
impl Default for Metrics {
    fn default() -> Self {
        Metrics
    }
}
