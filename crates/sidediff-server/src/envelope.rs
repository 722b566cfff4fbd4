//! Request and response bodies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sidediff_sdk::{DiffReport, LineRun};

use crate::error::{ServerError, ServerResult};

/// Body of a part submission: the payload, base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartEnvelope {
    pub binary: String,
}

impl PartEnvelope {
    pub fn encode(data: &[u8]) -> Self {
        Self {
            binary: STANDARD.encode(data),
        }
    }

    pub fn decode(&self) -> ServerResult<Vec<u8>> {
        STANDARD
            .decode(self.binary.trim())
            .map_err(|e| ServerError::MalformedInput(format!("binary is not valid base64: {e}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResponse {
    pub message: String,
    pub lines: Vec<LineRun>,
}

impl DiffResponse {
    /// A response carrying only a message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            lines: Vec::new(),
        }
    }
}

impl From<DiffReport> for DiffResponse {
    fn from(report: DiffReport) -> Self {
        Self {
            message: report.message().to_string(),
            lines: report.runs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
