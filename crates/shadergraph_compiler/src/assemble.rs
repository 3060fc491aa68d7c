// SPDX-License-Identifier: MIT OR Apache-2.0
//! Assembly of a compiled component into one self-contained source text.

use crate::compiler::CompileOutput;
use crate::config::CompilerConfig;
use crate::pattern::TEXTURE_DEFINITIONS;
use std::fmt;

const TEXTURE_TYPE: &str = "texture2d<half, access::sample>";

/// A complete translation unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    /// Source text
    pub source: String,
}

impl TranslationUnit {
    /// Assemble the context struct, the pattern output struct when
    /// patterns are bound, the global code and the local code. Texture
    /// placeholders are replaced by locals read from the context.
    pub fn assemble(output: &CompileOutput, config: &CompilerConfig) -> Self {
        let code = &output.code;

        let mut source = format!("struct {} {{\n", config.context_type);
        source.push_str("float GlobalTime;\n");
        source.push_str("float GlobalSeed;\n");
        source.push_str("float3 cameraOrigin;\n");
        source.push_str("float3 cameraDirection;\n");
        source.push_str("float distance2D;\n");
        source.push_str("float hash;\n");
        source.push_str(&format!("constant float4 *{};\n", config.data_buffer));
        for texture in &code.textures {
            source.push_str(&format!("{TEXTURE_TYPE} {};\n", texture.token));
        }
        source.push_str("};\n\n");

        if !code.pattern_bindings.is_empty() {
            source.push_str(&format!(
                "struct {} {{\nfloat4 color;\nfloat mask;\nfloat id;\n}};\n\n",
                config.pattern_struct
            ));
        }

        source.push_str(&code.global_code);
        source.push_str(&code.code);

        let definitions: String = code
            .textures
            .iter()
            .map(|t| format!("{TEXTURE_TYPE} {} = {};\n", t.token, config.context_field(&t.token)))
            .collect();
        let source = source.replace(&format!("{TEXTURE_DEFINITIONS}\n"), &definitions);

        tracing::debug!(
            bytes = source.len(),
            textures = code.textures.len(),
            "Assembled translation unit"
        );
        Self { source }
    }
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
