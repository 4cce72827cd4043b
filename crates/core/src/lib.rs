pub mod client;
pub mod config;
pub mod metrics;
pub mod testing;
pub mod transform;

pub use client::{
    ClientError, CompressOptions, ControllerConfig, ConvertOptions, HttpTransport,
    HttpTransportConfig, OptionValue, ProcessingController, ProcessingSession, ResizeOptions,
    SelectedFile, Stats, ToolOptions, TransformTransport,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ServerConfig,
    TransformConfig,
};
pub use transform::{TransformError, TransformService, Upload};
