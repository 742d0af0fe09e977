//! Lowering configuration.
//!
//! Read from a TOML document in which every key is optional:
//!
//! ```toml
//! temporary_prefix = "$tmp"
//! default_method_prefix = "$"
//!
//! [runtime]
//! bind = "ss.bind"
//! ```

use std::path::Path;

use serde::Deserialize;

/// Names of the script runtime helpers the lowering emits calls to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeNames {
    pub bind: String,
    pub bind_base_call: String,
    pub instantiate_generic_method: String,
    pub instantiate_generic_type: String,
    pub bind_first_parameter_to_this: String,
}

impl Default for RuntimeNames {
    fn default() -> Self {
        RuntimeNames {
            bind: "$Bind".to_string(),
            bind_base_call: "$BindBaseCall".to_string(),
            instantiate_generic_method: "$InstantiateGenericMethod".to_string(),
            instantiate_generic_type: "$InstantiateGenericType".to_string(),
            bind_first_parameter_to_this: "$BindFirstParameterToThis".to_string(),
        }
    }
}

/// Settings for one lowering run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LowerConfig {
    pub runtime: RuntimeNames,
    /// Prefix for receiver temporaries; a counter is appended (`$tmp1`).
    pub temporary_prefix: String,
    /// Prefix added to a method's source name when no policy rule renames it.
    pub default_method_prefix: String,
    /// Prefix for class type parameters read as runtime variables (`$T2`).
    pub type_parameter_prefix: String,
    /// Print `{System.Int32}` instead of `{Int32}`.
    pub qualify_type_names: bool,
}

impl Default for LowerConfig {
    fn default() -> Self {
        LowerConfig {
            runtime: RuntimeNames::default(),
            temporary_prefix: "$tmp".to_string(),
            default_method_prefix: "$".to_string(),
            type_parameter_prefix: "$".to_string(),
            qualify_type_names: false,
        }
    }
}

impl LowerConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<LowerConfig, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<LowerConfig, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse lowering config: {}", e))
    }
}
