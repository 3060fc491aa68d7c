// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader type names and their arity.
//!
//! Types are kept as target-language names (`float`, `float3`, `int2`, ...).
//! A trailing `2`, `3` or `4` is the vector arity, anything else is scalar.

/// Get the base type of a type name, i.e. `float` for `float3`
pub fn base_type(type_name: &str) -> &str {
    match type_name.as_bytes().last() {
        Some(b'2' | b'3' | b'4') => &type_name[..type_name.len() - 1],
        _ => type_name,
    }
}

/// Get the number of components of a type name (1 for scalars)
pub fn arity(type_name: &str) -> usize {
    match type_name.as_bytes().last() {
        Some(b'2') => 2,
        Some(b'3') => 3,
        Some(b'4') => 4,
        _ => 1,
    }
}

/// Build a type name from a base type and a component count
pub fn with_arity(base: &str, components: usize) -> String {
    if components > 1 {
        format!("{base}{components}")
    } else {
        base.to_string()
    }
}

/// Whether values of this type are integral
pub fn is_integer(type_name: &str) -> bool {
    type_name.contains("int")
}
