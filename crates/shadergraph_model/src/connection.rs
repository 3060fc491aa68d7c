// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connections from a component's output terminal into a property.

use crate::component::ComponentId;
use serde::{Deserialize, Serialize};

/// Output terminals a pattern exposes
pub const PATTERN_TERMINALS: [&str; 3] = ["color", "mask", "id"];

/// A wire from another component's named output terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Source component ID
    pub component: ComponentId,
    /// Output terminal name (`color`, `mask`, `id`)
    pub terminal: String,
}

impl Connection {
    /// Create a new connection
    pub fn new(component: ComponentId, terminal: impl Into<String>) -> Self {
        Self {
            component,
            terminal: terminal.into(),
        }
    }

    /// Check if this connection comes from a specific component
    pub fn involves_component(&self, component: ComponentId) -> bool {
        self.component == component
    }
}
