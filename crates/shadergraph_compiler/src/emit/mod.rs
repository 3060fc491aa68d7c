// SPDX-License-Identifier: MIT OR Apache-2.0
//! Text emission, one module per level of the model tree.

pub mod block;
pub mod component;
pub mod fragment;
pub mod function;
