// Policy assignment lookups

use crate::client::FmcClient;
use crate::error::Error;
use crate::models::{NamedObject, PolicyAssignment};

impl FmcClient {
    /// Devices and device groups a policy is assigned to.
    ///
    /// A policy with no assignments yields an empty list.
    pub async fn policy_assignment_targets(
        &self,
        policy_id: &str,
    ) -> Result<Vec<NamedObject>, Error> {
        let url = self.config_url(&format!("assignment/policyassignments/{policy_id}"))?;
        let assignment: PolicyAssignment = self.get(url).await?;
        Ok(assignment.targets)
    }

    /// Whether `policy_id` is assigned to the object with id `target_id`.
    pub async fn is_policy_assigned_to(
        &self,
        policy_id: &str,
        target_id: &str,
    ) -> Result<bool, Error> {
        let targets = self.policy_assignment_targets(policy_id).await?;
        Ok(targets.iter().any(|t| t.id == target_id))
    }
}
