use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPortConfig {
    pub base_url: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for DataPortConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/".to_string(),
            connect_timeout_ms: 30_000,
            request_timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub fan_on_temp_c: f32,
    pub low_water_percent: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            fan_on_temp_c: 34.0,
            low_water_percent: 15.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub poll_interval_ms: u64,
    pub blink_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10_000,
            blink_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub data_port: DataPortConfig,
    pub thresholds: ThresholdConfig,
    pub timing: TimingConfig,
    pub status_port: u16,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            data_port: DataPortConfig::default(),
            thresholds: ThresholdConfig::default(),
            timing: TimingConfig::default(),
            status_port: 8081,
        }
    }
}

pub const ENV_BASE_URL: &str = "SOIL_API_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "SOIL_POLL_INTERVAL_MS";
pub const ENV_BLINK_INTERVAL_MS: &str = "SOIL_BLINK_INTERVAL_MS";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "SOIL_CONNECT_TIMEOUT_MS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "SOIL_REQUEST_TIMEOUT_MS";
pub const ENV_STATUS_PORT: &str = "MONITOR_HTTP_PORT";

impl MonitorConfig {
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.data_port.base_url = url.trim().to_string();
        }

        let parse_u64 = |key: &str| lookup(key).and_then(|value| value.trim().parse::<u64>().ok());

        if let Some(value) = parse_u64(ENV_POLL_INTERVAL_MS) {
            self.timing.poll_interval_ms = value;
        }
        if let Some(value) = parse_u64(ENV_BLINK_INTERVAL_MS) {
            self.timing.blink_interval_ms = value;
        }
        if let Some(value) = parse_u64(ENV_CONNECT_TIMEOUT_MS) {
            self.data_port.connect_timeout_ms = value;
        }
        if let Some(value) = parse_u64(ENV_REQUEST_TIMEOUT_MS) {
            self.data_port.request_timeout_ms = value;
        }
        if let Some(port) = lookup(ENV_STATUS_PORT).and_then(|value| value.trim().parse::<u16>().ok())
        {
            self.status_port = port;
        }
    }

    pub fn sanitize(&mut self) {
        self.timing.poll_interval_ms = self.timing.poll_interval_ms.max(100);
        self.timing.blink_interval_ms = self.timing.blink_interval_ms.max(50);
        self.data_port.connect_timeout_ms = self.data_port.connect_timeout_ms.max(100);
        self.data_port.request_timeout_ms = self.data_port.request_timeout_ms.max(100);

        // Relative endpoint paths are joined onto the base, which drops the last
        // segment unless the base ends with a slash.
        if !self.data_port.base_url.ends_with('/') {
            self.data_port.base_url.push('/');
        }

        if !self.thresholds.fan_on_temp_c.is_finite() {
            self.thresholds.fan_on_temp_c = ThresholdConfig::default().fan_on_temp_c;
        }
        if !self.thresholds.low_water_percent.is_finite() {
            self.thresholds.low_water_percent = ThresholdConfig::default().low_water_percent;
        }
    }
}
