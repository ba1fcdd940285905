use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::client::{FeatureFlagClient, FeatureFlagPayload};
use crate::context::{ContextError, EvaluationContext};
use crate::resolution::{
    FeatureProvider, Hook, ProviderMetadata, ResolutionDetail, ResolutionError,
};
use crate::value::{coerce, ParseFlagValue};

pub const PROVIDER_NAME: &str = "PostHog";

/// Feature-flag provider backed by PostHog remote evaluation.
///
/// Stateless apart from the client handle; safe for concurrent use as long
/// as the client is.
pub struct PostHogProvider {
    client: Arc<dyn FeatureFlagClient>,
}

/// Classified reply of one remote lookup.
enum Lookup {
    NotFound,
    Found(Value),
}

impl PostHogProvider {
    pub fn new(client: Arc<dyn FeatureFlagClient>) -> Self {
        Self { client }
    }

    async fn lookup(&self, payload: FeatureFlagPayload) -> anyhow::Result<Lookup> {
        let reply = self.client.get_feature_flag(payload).await?;

        // The backend returns a boolean only when the flag could not be
        // found; found values are always strings. A boolean reply is
        // therefore the not-found sentinel, never a flag value.
        match reply {
            Value::Bool(_) => Ok(Lookup::NotFound),
            value => Ok(Lookup::Found(value)),
        }
    }

    /// Map the context, perform one remote lookup, classify the reply.
    async fn resolve_raw(
        &self,
        flag: &str,
        ctx: &EvaluationContext,
    ) -> Result<Lookup, ResolutionError> {
        let payload = ctx.to_payload(flag).map_err(|err| match err {
            ContextError::MissingTargetingKey => {
                ResolutionError::targeting_key_missing(err.to_string())
            }
            other => ResolutionError::general(other.to_string()),
        })?;

        match self.lookup(payload).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(flag, error = %err, "feature flag lookup failed");
                Err(ResolutionError::general(err.to_string()))
            }
        }
    }

    /// The full pipeline for scalar targets; the typed entry points are thin
    /// wrappers over this.
    async fn resolve<T: ParseFlagValue>(
        &self,
        flag: &str,
        default_value: T,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<T> {
        let raw = match self.resolve_raw(flag, ctx).await {
            Ok(Lookup::Found(raw)) => raw,
            Ok(Lookup::NotFound) => return ResolutionDetail::not_found(default_value, flag),
            Err(err) => return ResolutionDetail::from_error(default_value, err),
        };

        match coerce::<T>(&raw) {
            Ok(value) => {
                debug!(flag, "feature flag resolved");
                ResolutionDetail::matched(value)
            }
            Err(err) => ResolutionDetail::from_error(default_value, err),
        }
    }
}

#[async_trait]
impl FeatureProvider for PostHogProvider {
    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: PROVIDER_NAME,
        }
    }

    fn hooks(&self) -> &[Arc<dyn Hook>] {
        &[]
    }

    async fn evaluate_bool(
        &self,
        flag: &str,
        default_value: bool,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<bool> {
        self.resolve(flag, default_value, ctx).await
    }

    async fn evaluate_int(
        &self,
        flag: &str,
        default_value: i64,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<i64> {
        self.resolve(flag, default_value, ctx).await
    }

    async fn evaluate_float(
        &self,
        flag: &str,
        default_value: f64,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<f64> {
        self.resolve(flag, default_value, ctx).await
    }

    async fn evaluate_string(
        &self,
        flag: &str,
        default_value: String,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<String> {
        self.resolve(flag, default_value, ctx).await
    }

    // Object flags decode into a JSON map rather than going through the
    // scalar parser; the shared part of the pipeline is identical.
    async fn evaluate_object(
        &self,
        flag: &str,
        default_value: Map<String, Value>,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<Map<String, Value>> {
        let raw = match self.resolve_raw(flag, ctx).await {
            Ok(Lookup::Found(raw)) => raw,
            Ok(Lookup::NotFound) => return ResolutionDetail::not_found(default_value, flag),
            Err(err) => return ResolutionDetail::from_error(default_value, err),
        };

        let Value::String(raw) = raw else {
            return ResolutionDetail::from_error(
                default_value,
                ResolutionError::type_mismatch(format!("{raw} is not a string")),
            );
        };

        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(object) => {
                debug!(flag, "feature flag resolved");
                ResolutionDetail::matched(object)
            }
            Err(_) => ResolutionDetail::from_error(
                default_value,
                ResolutionError::type_mismatch("invalid JSON as flag value"),
            ),
        }
    }
}
