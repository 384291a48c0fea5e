//! Rendering strategy selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a renderable error reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Build a response value and return it as the step's success.
    #[default]
    Synthesize,
    /// Write onto the live exchange and keep the original error.
    DirectWrite,
}

impl RenderStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synthesize => "synthesize",
            Self::DirectWrite => "direct_write",
        }
    }
}

impl fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
