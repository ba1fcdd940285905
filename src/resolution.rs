use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::EvaluationContext;

// MODELS

/// Why an evaluation resolved the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
    /// The backend resolved a value for this subject.
    TargetingMatch,
    /// The caller's default was returned because the flag was not found.
    Default,
    /// The caller's default was returned because resolution failed.
    Error,
}

/// Machine-readable category of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TargetingKeyMissing,
    FlagNotFound,
    TypeMismatch,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionError {
    pub code: ErrorCode,
    pub message: String,
}

impl ResolutionError {
    pub fn targeting_key_missing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::TargetingKeyMissing,
            message: message.into(),
        }
    }

    pub fn flag_not_found(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::FlagNotFound,
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::TypeMismatch,
            message: message.into(),
        }
    }

    pub fn general(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::General,
            message: message.into(),
        }
    }
}

/// The outcome of a single evaluation call: a usable value plus the reason it
/// was chosen and, on failure, the error that forced the default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionDetail<T> {
    pub value: T,
    pub reason: EvaluationReason,
    pub error: Option<ResolutionError>,
}

impl<T> ResolutionDetail<T> {
    pub fn matched(value: T) -> Self {
        Self {
            value,
            reason: EvaluationReason::TargetingMatch,
            error: None,
        }
    }

    pub fn not_found(default_value: T, flag: &str) -> Self {
        Self {
            value: default_value,
            reason: EvaluationReason::Default,
            error: Some(ResolutionError::flag_not_found(format!(
                "{flag:?} not found"
            ))),
        }
    }

    pub fn from_error(default_value: T, error: ResolutionError) -> Self {
        Self {
            value: default_value,
            reason: EvaluationReason::Error,
            error: Some(error),
        }
    }
}

/// Provider identity as reported to the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderMetadata {
    pub name: &'static str,
}

/// Evaluation lifecycle hook. The PostHog provider attaches none, so the
/// list it reports is always empty.
pub trait Hook: Send + Sync {
    fn name(&self) -> &str;
}

// PROVIDER CONTRACT

/// Typed flag evaluation, one operation per supported value type. Each call
/// always yields a usable value: the resolved one on success, the supplied
/// default otherwise.
#[async_trait]
pub trait FeatureProvider: Send + Sync {
    fn metadata(&self) -> ProviderMetadata;

    fn hooks(&self) -> &[Arc<dyn Hook>];

    async fn evaluate_bool(
        &self,
        flag: &str,
        default_value: bool,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<bool>;

    async fn evaluate_int(
        &self,
        flag: &str,
        default_value: i64,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<i64>;

    async fn evaluate_float(
        &self,
        flag: &str,
        default_value: f64,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<f64>;

    async fn evaluate_string(
        &self,
        flag: &str,
        default_value: String,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<String>;

    async fn evaluate_object(
        &self,
        flag: &str,
        default_value: Map<String, Value>,
        ctx: &EvaluationContext,
    ) -> ResolutionDetail<Map<String, Value>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matched_detail_has_no_error() {
        let detail = ResolutionDetail::matched(42i64);
        assert_eq!(detail.value, 42);
        assert_eq!(detail.reason, EvaluationReason::TargetingMatch);
        assert!(detail.error.is_none());
    }

    #[test]
    fn not_found_detail_quotes_flag_name() {
        let detail = ResolutionDetail::not_found(false, "dark-mode");
        assert_eq!(detail.reason, EvaluationReason::Default);
        let err = detail.error.unwrap();
        assert_eq!(err.code, ErrorCode::FlagNotFound);
        assert_eq!(err.message, "\"dark-mode\" not found");
    }

    #[test]
    fn error_codes_serialize_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::TargetingKeyMissing).unwrap();
        assert_eq!(json, "\"TARGETING_KEY_MISSING\"");
        let json = serde_json::to_string(&EvaluationReason::TargetingMatch).unwrap();
        assert_eq!(json, "\"TARGETING_MATCH\"");
    }
}
