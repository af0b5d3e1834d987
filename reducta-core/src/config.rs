//! Process-wide runtime configuration.
//!
//! The configuration is written at most once. Reads before any explicit
//! initialisation install the defaults.

use crate::error::ReductaError;
use crate::types::DType;
use std::sync::OnceLock;

/// Tunables shared by every operator.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Floating type integral inputs are promoted to (`logsumexp`, `gradient`).
    pub default_float_dtype: DType,
    /// Minimum number of elements handed to one parallel chunk.
    pub grain_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            default_float_dtype: DType::F32,
            grain_size: 32768,
        }
    }
}

static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();

/// Installs `config` as the process-wide configuration.
///
/// # Errors
/// `ConfigAlreadyInitialized` if a configuration was installed (or defaulted) before,
/// `InvalidArgument` if the default float type is not a floating type or the grain is zero.
pub fn init_config(config: RuntimeConfig) -> Result<(), ReductaError> {
    if !config.default_float_dtype.is_floating_point() {
        return Err(ReductaError::InvalidArgument {
            operation: "init_config".to_string(),
            message: format!(
                "default_float_dtype must be a floating type, got {:?}",
                config.default_float_dtype
            ),
        });
    }
    if config.grain_size == 0 {
        return Err(ReductaError::InvalidArgument {
            operation: "init_config".to_string(),
            message: "grain_size must be positive".to_string(),
        });
    }
    CONFIG
        .set(config)
        .map_err(|_| ReductaError::ConfigAlreadyInitialized)?;
    log::debug!("reducta runtime configuration installed: {:?}", CONFIG.get());
    Ok(())
}

/// Returns the active configuration, installing the defaults on first use.
pub fn config() -> &'static RuntimeConfig {
    CONFIG.get_or_init(RuntimeConfig::default)
}

/// Shorthand for `config().default_float_dtype`.
pub fn default_float_dtype() -> DType {
    config().default_float_dtype
}
