// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler configuration.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Names and switches shaping the emitted source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Name of the context pointer parameter
    pub context_param: String,
    /// Type of the context struct
    pub context_type: String,
    /// Name of the external data buffer
    pub data_buffer: String,
    /// Type of the struct patterns write their terminals to
    pub pattern_struct: String,
    /// Index of the first data buffer slot
    pub base_offset: usize,
    /// Emit the time, seed and camera locals in free-flow functions
    pub free_flow_prologue: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            context_param: "__funcData".to_string(),
            context_type: "FuncData".to_string(),
            data_buffer: "__data".to_string(),
            pattern_struct: "PatternOut".to_string(),
            base_offset: 0,
            free_flow_prologue: true,
        }
    }
}

impl CompilerConfig {
    /// Decode a configuration from RON. Missing fields take their defaults.
    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Encode the configuration as pretty RON
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Access to a field of the context struct (`__funcData->hash`)
    pub fn context_field(&self, field: &str) -> String {
        format!("{}->{}", self.context_param, field)
    }

    /// Declaration of the trailing context parameter
    pub fn context_parameter(&self) -> String {
        format!("thread {} *{}", self.context_type, self.context_param)
    }
}
