use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub transform: TransformConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin requests from any origin (browser tool pages).
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

/// Transform service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformConfig {
    /// Largest accepted request body in bytes (default: 50 MiB).
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Quality used by compress and convert when the form omits it.
    #[serde(default = "default_quality")]
    pub default_quality: u8,
    /// Fixed quality for lossy output of the resize operation.
    #[serde(default = "default_resize_quality")]
    pub resize_quality: u8,
    /// Largest output image, in pixels, a resize may produce.
    #[serde(default = "default_max_output_pixels")]
    pub max_output_pixels: u64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: default_max_upload_bytes(),
            default_quality: default_quality(),
            resize_quality: default_resize_quality(),
            max_output_pixels: default_max_output_pixels(),
        }
    }
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_quality() -> u8 {
    75
}

fn default_resize_quality() -> u8 {
    90
}

fn default_max_output_pixels() -> u64 {
    0x3FFF * 0x3FFF
}
