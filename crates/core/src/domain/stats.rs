use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Aggregate counters over every deployment ever recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeploymentStats {
    pub total_deployments: i64,
    pub successful_deployments: i64,
    pub failed_deployments: i64,
    pub pending_deployments: i64,
    pub success_rate: String,
}

impl DeploymentStats {
    pub fn new(total: i64, successful: i64, failed: i64, pending: i64) -> Self {
        Self {
            total_deployments: total,
            successful_deployments: successful,
            failed_deployments: failed,
            pending_deployments: pending,
            success_rate: success_rate(successful, total),
        }
    }
}

/// Percentage with one decimal, `"0%"` when nothing has been deployed.
pub fn success_rate(successful: i64, total: i64) -> String {
    if total <= 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", successful as f64 / total as f64 * 100.0)
}
