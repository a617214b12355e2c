use serde::Serialize;

use krxboard_core::{HealthState, HealthStatus, ProviderId};

use crate::error::CliError;

use super::{build_provider, CommandResult};

#[derive(Debug, Serialize)]
struct SourceStatus {
    id: ProviderId,
    state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceStatus>,
}

/// Checks every provider. A provider that cannot be constructed is reported
/// as unhealthy rather than failing the command.
pub fn run(seed: u64) -> Result<CommandResult, CliError> {
    let mut warnings = Vec::new();

    let sources = ProviderId::ALL
        .into_iter()
        .map(|id| {
            let health = match build_provider(id, seed) {
                Ok(provider) => provider.health(),
                Err(error) => HealthStatus::unhealthy(error.to_string()),
            };
            if health.state != HealthState::Healthy {
                warnings.push(format!("source '{id}' is {}", state_label(health.state)));
            }
            SourceStatus {
                id,
                state: health.state,
                detail: health.detail,
            }
        })
        .collect::<Vec<_>>();

    let data = serde_json::to_value(SourcesResponseData { sources })?;
    Ok(CommandResult::ok(data, ProviderId::ALL.to_vec()).with_warnings(warnings))
}

const fn state_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Healthy => "healthy",
        HealthState::Degraded => "degraded",
        HealthState::Unhealthy => "unhealthy",
    }
}
