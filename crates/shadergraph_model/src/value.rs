// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reading and writing the numeric value of constant fragments.

use crate::fragment::{Fragment, FragmentKind};

/// Extract the value of a constant as four floats, unused lanes zero.
///
/// A constructor only yields values when it has exactly one argument per
/// component.
pub fn extract_value(fragment: &Fragment) -> [f32; 4] {
    let mut value = [0.0; 4];
    match fragment.kind {
        FragmentKind::ConstantValue => {
            value[0] = fragment.value().unwrap_or_default();
        }
        FragmentKind::ConstantDefinition => {
            let components = fragment.component_count(true);
            if fragment.arguments.len() == components {
                for (lane, argument) in value.iter_mut().zip(&fragment.arguments) {
                    *lane = argument
                        .fragments
                        .first()
                        .and_then(Fragment::value)
                        .unwrap_or_default();
                }
            }
        }
        _ => {}
    }
    value
}

/// Write values into a constant. Lanes beyond the constant's width are
/// ignored, missing lanes are left untouched.
pub fn insert_value(fragment: &mut Fragment, value: &[f32]) {
    match fragment.kind {
        FragmentKind::ConstantValue => {
            if let Some(first) = value.first() {
                fragment.set_value(*first);
            }
        }
        FragmentKind::ConstantDefinition => {
            let components = fragment.component_count(true);
            if fragment.arguments.len() != components {
                return;
            }
            for (argument, lane) in fragment.arguments.iter_mut().zip(value) {
                if let Some(constant) = argument.fragments.first_mut() {
                    constant.set_value(*lane);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_value() {
        let mut constant = Fragment::constant("float", 2.0);
        assert_eq!(extract_value(&constant), [2.0, 0.0, 0.0, 0.0]);

        insert_value(&mut constant, &[0.25, 9.0]);
        assert_eq!(constant.value(), Some(0.25));
    }

    #[test]
    fn test_vector_value() {
        let mut constant = Fragment::default_constant("float3");
        insert_value(&mut constant, &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(extract_value(&constant), [0.1, 0.2, 0.3, 0.0]);
    }

    #[test]
    fn test_malformed_constructor_reads_zero() {
        let mut constant = Fragment::default_constant("float4");
        constant.arguments.pop();
        insert_value(&mut constant, &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(extract_value(&constant), [0.0; 4]);
    }

    #[test]
    fn test_non_constant_is_zero() {
        let variable = Fragment::variable("float", "radius");
        assert_eq!(extract_value(&variable), [0.0; 4]);
    }
}
