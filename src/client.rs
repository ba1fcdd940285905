use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::context::{Groups, Properties};

/// Request record for a single remote flag lookup. Built from the evaluation
/// context, handed to the client, and dropped; it has no lifecycle of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlagPayload {
    pub key: String,
    pub distinct_id: String,
    pub groups: Groups,
    pub group_properties: HashMap<String, Properties>,
    pub person_properties: Properties,
}

/// Boundary to the remote PostHog API.
///
/// The reply convention is inherited from the backend: a found flag always
/// comes back as a JSON string, and a boolean reply (in practice `false`) is
/// the backend's way of saying the flag has no value for this subject. The
/// provider never retries; transport errors bubble up as-is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatureFlagClient: Send + Sync {
    async fn get_feature_flag(
        &self,
        payload: FeatureFlagPayload,
    ) -> anyhow::Result<serde_json::Value>;
}
