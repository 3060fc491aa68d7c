// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pattern composition: ordering the patterns a material uses and wrapping
//! each into a callable global function.

use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};
use crate::symbol::fresh_symbol;
use indexmap::IndexMap;
use shadergraph_model::{Component, ComponentId, ComponentKind};
use std::collections::HashSet;

/// Placeholder replaced by texture definitions when assembling
pub const TEXTURE_DEFINITIONS: &str = "__CREATE_TEXTURE_DEFINITIONS__";

/// Entry symbols of the patterns supplied to a pass
#[derive(Debug, Default)]
pub struct PatternTable {
    entries: IndexMap<ComponentId, String>,
}

impl PatternTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the entry function of every pattern, assigning its symbol
    /// on first sight. Patterns without functions have no entry.
    pub fn from_components(patterns: &mut [Component]) -> Self {
        let entries = patterns
            .iter_mut()
            .filter_map(|pattern| {
                let id = pattern.id;
                let entry = pattern.functions.last_mut()?;
                Some((id, entry.symbol.get_or_insert_with(fresh_symbol).clone()))
            })
            .collect();
        Self { entries }
    }

    /// Entry symbol of a pattern
    pub fn entry(&self, pattern: ComponentId) -> Option<&str> {
        self.entries.get(&pattern).map(String::as_str)
    }

    /// Number of patterns with an entry
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pattern was supplied
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order in which the patterns used by a consumer must be compiled
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PatternOrder {
    /// Indices into the supplied patterns, dependencies first
    pub order: Vec<usize>,
    /// Patterns reached again while being visited
    pub cycles: Vec<ComponentId>,
}

/// Order the patterns transitively connected to `consumer` so that every
/// pattern follows the patterns it reads from. Connections to components
/// not among `patterns` are ignored. A cycle is broken by skipping the
/// edge back into a pattern still being visited.
pub fn used_patterns(consumer: &Component, patterns: &[Component]) -> PatternOrder {
    let index_of: IndexMap<ComponentId, usize> = patterns
        .iter()
        .enumerate()
        .filter(|(_, p)| p.id != consumer.id)
        .map(|(index, p)| (p.id, index))
        .collect();

    let mut visiting = HashSet::new();
    let mut visited = HashSet::new();
    let mut result = PatternOrder::default();

    for connection in consumer.connections.values() {
        if let Some(&index) = index_of.get(&connection.component) {
            visit(index, patterns, &index_of, &mut visiting, &mut visited, &mut result);
        }
    }

    tracing::debug!(
        component = %consumer.id,
        patterns = result.order.len(),
        cycles = result.cycles.len(),
        "Ordered patterns"
    );
    result
}

fn visit(
    index: usize,
    patterns: &[Component],
    index_of: &IndexMap<ComponentId, usize>,
    visiting: &mut HashSet<usize>,
    visited: &mut HashSet<usize>,
    result: &mut PatternOrder,
) {
    if visited.contains(&index) {
        return;
    }
    if !visiting.insert(index) {
        let pattern = patterns[index].id;
        tracing::warn!(pattern = %pattern, "Pattern cycle broken");
        if !result.cycles.contains(&pattern) {
            result.cycles.push(pattern);
        }
        return;
    }

    for connection in patterns[index].connections.values() {
        if let Some(&dependency) = index_of.get(&connection.component) {
            visit(dependency, patterns, index_of, visiting, visited, result);
        }
    }

    visiting.remove(&index);
    visited.insert(index);
    result.order.push(index);
}

/// Entry symbol of a pattern in use, failing if it has no function
pub fn require_entry<'a>(table: &'a PatternTable, pattern: &Component) -> Result<&'a str> {
    table
        .entry(pattern.id)
        .ok_or(CompileError::EmptyPattern(pattern.id))
}

/// Arguments a consumer passes to a pattern entry, ahead of the output
/// and context pointers
pub fn call_arguments(consumer: ComponentKind) -> &'static str {
    match consumer {
        ComponentKind::Material3D => "uv, localPosition, hitNormal, rayOrigin, incomingDirection",
        _ => "uv, position, normal, rayOrigin, rayDirection",
    }
}

fn entry_signature(entry: &str, config: &CompilerConfig) -> String {
    format!(
        "void {entry}(float2 uv, float3 position, float3 normal, float3 rayOrigin, float3 rayDirection, thread {} *__patternData, {})",
        config.pattern_struct,
        config.context_parameter()
    )
}

/// Forward declaration of a pattern entry
pub fn entry_prototype(entry: &str, config: &CompilerConfig) -> String {
    format!("{};\n", entry_signature(entry, config))
}

/// Wrap the local code of a compiled pattern into its entry function
pub fn entry_wrapper(entry: &str, body: &str, config: &CompilerConfig) -> String {
    let field = |name: &str| config.context_field(name);
    let mut code = format!("{} {{\n", entry_signature(entry, config));
    code.push_str("float4 outColor = float4(0); float outMask = 0.; float outId = 0.;\n");
    code.push_str(&format!(
        "constant float4 *{} = {};\n",
        config.data_buffer,
        field(&config.data_buffer)
    ));
    code.push_str(&format!("float GlobalTime = {};\n", field("GlobalTime")));
    code.push_str(&format!("float GlobalSeed = {};\n", field("GlobalSeed")));
    code.push_str(&format!("float distance2D = {};\n", field("distance2D")));
    code.push_str(&format!("float3 CamOrigin = {};\n", field("cameraOrigin")));
    code.push_str(&format!("float3 CamDir = {};\n", field("cameraDirection")));
    code.push_str(TEXTURE_DEFINITIONS);
    code.push('\n');
    code.push_str(body);
    code.push_str("__patternData->color = outColor;\n");
    code.push_str("__patternData->mask = outMask;\n");
    code.push_str("__patternData->id = outId;\n");
    code.push_str("}\n");
    code
}
