//! Service configuration.

/// Configuration for the catalog services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Upper bound on events generated by one recurrence request
    /// (default: 50).
    pub recurrence_cap: usize,
    /// Google Geocoding API key. `None` disables geocoding of new
    /// locations.
    pub geocoding_api_key: Option<String>,
    /// Geocoding endpoint (default: the public Google endpoint).
    pub geocoding_url: String,
    /// Request timeout for geocoding calls in seconds (default: 10).
    pub geocoding_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            recurrence_cap: 50,
            geocoding_api_key: None,
            geocoding_url: "https://maps.googleapis.com/maps/api/geocode/json".into(),
            geocoding_timeout_secs: 10,
        }
    }
}
