// SPDX-License-Identifier: MIT OR Apache-2.0
//! Data buffer contents for a compiled component.

use crate::error::{CompileError, Result};
use shadergraph_model::{extract_value, CompiledCode, Component, ComponentId, GlobalScope, InputRef};
use std::collections::HashMap;

/// Current value of every bound input, in data buffer order. Property
/// values are read from the right-hand constant of their declaring line
/// in the owning component; global variables from the global scope.
pub fn input_values<'a>(
    code: &CompiledCode,
    components: impl IntoIterator<Item = &'a Component>,
    globals: &GlobalScope,
) -> Result<Vec<[f32; 4]>> {
    let by_id: HashMap<ComponentId, &Component> =
        components.into_iter().map(|c| (c.id, c)).collect();

    code.inputs
        .iter()
        .zip(&code.input_components)
        .map(|(input, owner)| -> Result<[f32; 4]> {
            match *input {
                InputRef::Property(property) => {
                    let component = by_id
                        .get(owner)
                        .ok_or(CompileError::ComponentNotSupplied(*owner))?;
                    let block = component.require_property(property)?;
                    Ok(block
                        .statement
                        .fragments
                        .first()
                        .map_or([0.0; 4], extract_value))
                }
                InputRef::GlobalVariable(variable) => globals
                    .find_by_id(variable)
                    .map(|v| v.value)
                    .ok_or(CompileError::ComponentNotSupplied(variable)),
            }
        })
        .collect()
}
