use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default allocation server host
pub const DEFAULT_SERVER_HOST: &str = "vns-1.stanford.edu";

/// Default allocation server TCP port
pub const DEFAULT_SERVER_PORT: u16 = 25039;

/// File where the most recently assigned topology number is stored
pub const DEFAULT_LAST_TOPOLOGY_FILE: &str = ".last_topo_num";

/// File where the routing table is stored
pub const DEFAULT_ROUTING_TABLE_FILE: &str = "rtable";

/// Router binary started after a successful negotiation
pub const DEFAULT_ROUTER_BINARY: &str = "./sr";

/// Virtual host name passed to the router
pub const DEFAULT_ROUTER_VHOST: &str = "vrhost";

/// Complete client configuration. Every section is optional in YAML.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub state: StateConfig,
    pub router: RouterConfig,
}

/// Allocation server endpoint and connection timeouts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Per-address connect timeout. `None` uses the OS default.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<Duration>,
    /// Read timeout for the response. `None` blocks until the server closes.
    #[serde(with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<Duration>,
}

/// Locations of the persisted state files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateConfig {
    pub last_topology_file: PathBuf,
    pub routing_table_file: PathBuf,
}

/// Downstream router invocation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RouterConfig {
    pub binary: PathBuf,
    pub vhost: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
    /// When false the run stops after the state files are written
    pub launch: bool,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.server.host.trim().is_empty() {
            return Err(ValidationError::InvalidServer(
                "host cannot be empty".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ValidationError::InvalidServer(
                "port must be between 1 and 65535".to_string(),
            ));
        }
        for (name, timeout) in [
            ("connect_timeout", self.server.connect_timeout),
            ("read_timeout", self.server.read_timeout),
        ] {
            // std rejects a zero timeout on sockets
            if timeout == Some(Duration::ZERO) {
                return Err(ValidationError::InvalidServer(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        if self.state.last_topology_file.as_os_str().is_empty() {
            return Err(ValidationError::InvalidState(
                "last_topology_file cannot be empty".to_string(),
            ));
        }
        if self.state.routing_table_file.as_os_str().is_empty() {
            return Err(ValidationError::InvalidState(
                "routing_table_file cannot be empty".to_string(),
            ));
        }
        if self.state.last_topology_file == self.state.routing_table_file {
            return Err(ValidationError::InvalidState(format!(
                "last_topology_file and routing_table_file both point to {:?}",
                self.state.routing_table_file
            )));
        }

        if self.router.binary.as_os_str().is_empty() {
            return Err(ValidationError::InvalidRouter(
                "binary cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// `host:port` of the allocation server, as used in log lines
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid server configuration: {0}")]
    InvalidServer(String),
    #[error("Invalid state configuration: {0}")]
    InvalidState(String),
    #[error("Invalid router configuration: {0}")]
    InvalidRouter(String),
}

/// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_SERVER_PORT,
            connect_timeout: None,
            read_timeout: None,
        }
    }
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            last_topology_file: PathBuf::from(DEFAULT_LAST_TOPOLOGY_FILE),
            routing_table_file: PathBuf::from(DEFAULT_ROUTING_TABLE_FILE),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_ROUTER_BINARY),
            vhost: DEFAULT_ROUTER_VHOST.to_string(),
            extra_args: Vec::new(),
            launch: true,
        }
    }
}
