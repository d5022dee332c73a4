use thiserror::Error;

use crate::cli::{ConnectArgs, HostArgs};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_HOST_NAME: &str = "Server";

/// Rejections produced while validating command-line arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("display name must not be blank")]
    BlankName,
    #[error("display name must not contain ',' (it delimits the wire format)")]
    CommaInName,
    #[error("server address must not be empty")]
    EmptyHost,
    #[error("port must be between 1 and 65535")]
    PortOutOfRange,
}

/// Configuration for the connect (client) role: who we are and where the
/// peer listens. Validated once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ConnectConfig {
    name: String,
    host: String,
    port: u16,
}

impl ConnectConfig {
    pub fn new(args: ConnectArgs) -> Result<Self, ConfigError> {
        let name = validate_name(args.name)?;
        let host = args.host.trim().to_string();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        validate_port(args.port)?;
        Ok(Self {
            name,
            host,
            port: args.port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Configuration for the host (server) role.
#[derive(Debug, Clone)]
pub struct HostConfig {
    name: String,
    port: u16,
}

impl HostConfig {
    pub fn new(args: HostArgs) -> Result<Self, ConfigError> {
        let name = validate_name(args.name)?;
        validate_port(args.port)?;
        Ok(Self {
            name,
            port: args.port,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

fn validate_name(name: String) -> Result<String, ConfigError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ConfigError::BlankName);
    }
    // A comma in the sender name would be indistinguishable from the wire
    // separator, so it is forbidden at the source.
    if name.contains(',') {
        return Err(ConfigError::CommaInName);
    }
    Ok(name)
}

fn validate_port(port: u16) -> Result<(), ConfigError> {
    if port == 0 {
        return Err(ConfigError::PortOutOfRange);
    }
    Ok(())
}
