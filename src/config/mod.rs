//! 配置模块

mod app_config;

pub use app_config::{get_config, AppConfig, CONFIG_ENV_VAR};
