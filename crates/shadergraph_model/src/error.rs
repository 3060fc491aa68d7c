// SPDX-License-Identifier: MIT OR Apache-2.0
//! Model errors.

use crate::component::ComponentId;
use crate::fragment::FragmentId;

/// Result alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while editing or persisting a project
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Component not found
    #[error("Component not found: {0}")]
    ComponentNotFound(ComponentId),

    /// Property id without a declaring line
    #[error("Property not found: {0:?}")]
    PropertyNotFound(FragmentId),

    /// Project text could not be decoded
    #[error("Failed to decode project: {0}")]
    Serialization(#[from] ron::error::SpannedError),

    /// Project could not be encoded
    #[error("Failed to encode project: {0}")]
    Encode(#[from] ron::Error),
}
