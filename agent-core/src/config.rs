//! Agent configuration: one immutable struct built at process start and
//! passed by reference to the scheduler loop and the collaborators.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    // WiFi settings
    pub wifi_ssid: String,
    pub wifi_password: String,

    // Collector endpoint (plain HTTP, host without scheme)
    pub collector_host: String,
    pub collector_port: u16,
    /// POST target for telemetry records.
    pub data_path: String,
    /// GET target for firmware images.
    pub ota_path: String,

    /// Identity reported in every telemetry record.
    pub device_id: String,

    // Scheduler cadences
    pub report_interval: Duration,
    pub update_interval: Duration,

    /// Bound applied to every HTTP operation so a stalled peer cannot hang
    /// the loop indefinitely.
    pub http_timeout: Duration,
    /// Fixed delay between association attempts.
    pub wifi_retry_backoff: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            collector_host: String::new(),
            collector_port: 5000,
            data_path: "/api/data".to_string(),
            ota_path: "/ota".to_string(),
            device_id: "ESP32_DEV_001".to_string(),
            report_interval: Duration::from_secs(10),
            update_interval: Duration::from_secs(300),
            http_timeout: Duration::from_secs(30),
            wifi_retry_backoff: Duration::from_millis(500),
        }
    }
}

impl AgentConfig {
    /// Full URL of the telemetry endpoint.
    pub fn data_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.collector_host, self.collector_port, self.data_path
        )
    }

    /// Full URL of the update endpoint.
    pub fn ota_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.collector_host, self.collector_port, self.ota_path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_collector_contract() {
        let config = AgentConfig::default();
        assert_eq!(config.collector_port, 5000);
        assert_eq!(config.data_path, "/api/data");
        assert_eq!(config.ota_path, "/ota");
        assert_eq!(config.report_interval, Duration::from_secs(10));
        assert_eq!(config.update_interval, Duration::from_secs(300));
    }

    #[test]
    fn urls_compose_host_port_and_path() {
        let config = AgentConfig {
            collector_host: "192.168.1.100".to_string(),
            ..AgentConfig::default()
        };
        assert_eq!(config.data_url(), "http://192.168.1.100:5000/api/data");
        assert_eq!(config.ota_url(), "http://192.168.1.100:5000/ota");
    }
}
