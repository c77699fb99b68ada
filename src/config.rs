//! Process-wide configuration
//!
//! Read once from the environment on first access:
//! - `HARP_FLOATX`: default float type (`float32` or `float64`, default `float64`)
//! - `CC`: C compiler used by the native backend (default `cc`)

use std::sync::LazyLock;

use crate::dtype::DType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Type that discrete operands are promoted to by the float policies.
    pub float_x: DType,
    /// C compiler command.
    pub cc: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            float_x: DType::F64,
            cc: "cc".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Ok(value) = std::env::var("HARP_FLOATX") {
            match value.parse::<DType>() {
                Ok(dtype) if dtype.is_float() => config.float_x = dtype,
                _ => log::warn!("ignoring HARP_FLOATX={value}: expected float32 or float64"),
            }
        }
        if let Ok(cc) = std::env::var("CC")
            && !cc.is_empty()
        {
            config.cc = cc;
        }
        config
    }
}

static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_env);

pub fn config() -> &'static Config {
    &CONFIG
}

/// The configured default float type.
pub fn float_x() -> DType {
    config().float_x
}
