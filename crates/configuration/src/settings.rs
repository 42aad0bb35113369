use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
}

/// Where the HTTP server binds.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Thresholds for the fleet-wide alert sweep.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertSettings {
    /// Days since the last service before a truck counts as overdue.
    #[serde(default = "default_maintenance_threshold_days")]
    pub maintenance_threshold_days: i64,
    /// The trailing window the profitability check looks back over.
    #[serde(default = "default_profit_window_days")]
    pub profit_window_days: i64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            maintenance_threshold_days: default_maintenance_threshold_days(),
            profit_window_days: default_profit_window_days(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_maintenance_threshold_days() -> i64 {
    30
}

fn default_profit_window_days() -> i64 {
    30
}
