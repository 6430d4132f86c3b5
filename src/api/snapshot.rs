use serde::{Deserialize, Serialize};

use crate::core::FormState;
use crate::error::{StarMapError, StarMapResult};
use crate::render::{CelestialRenderer, RenderSurface};

use super::{CaptureOutcome, ObjectUrl, ObjectUrlRegistry, StarMapController};

pub const CONTROLLER_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub generation: u64,
    pub url: ObjectUrl,
    pub bytes: usize,
}

/// Deterministic view of controller state for hosts and regression tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub form: FormState,
    pub generating: bool,
    pub generation: u64,
    pub artifact: Option<ArtifactSummary>,
    pub last_outcome: Option<CaptureOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ControllerSnapshot,
}

impl ControllerSnapshot {
    pub fn to_json_pretty(&self) -> StarMapResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StarMapError::InvalidSettings(format!("failed to serialize snapshot: {e}")))
    }

    pub fn to_json_contract_v1_pretty(&self) -> StarMapResult<String> {
        let payload = ControllerSnapshotJsonContractV1 {
            schema_version: CONTROLLER_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            StarMapError::InvalidSettings(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts both a bare snapshot and a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> StarMapResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ControllerSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ControllerSnapshotJsonContractV1 =
            serde_json::from_str(input).map_err(|e| {
                StarMapError::InvalidSettings(format!("failed to parse snapshot json payload: {e}"))
            })?;
        if payload.schema_version != CONTROLLER_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(StarMapError::InvalidSettings(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R, S, U> StarMapController<R, S, U>
where
    R: CelestialRenderer,
    S: RenderSurface,
    U: ObjectUrlRegistry,
{
    #[must_use]
    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            form: self.form.clone(),
            generating: self.is_generating(),
            generation: self.generation,
            artifact: self.artifact.as_ref().map(|artifact| ArtifactSummary {
                generation: artifact.generation,
                url: artifact.url.clone(),
                bytes: artifact.len(),
            }),
            last_outcome: self.last_outcome.clone(),
        }
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> StarMapResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }
}
