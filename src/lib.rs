//! PostHog remote-evaluation provider for typed feature-flag clients.
//!
//! The provider translates between a generic typed evaluation contract
//! ([`FeatureProvider`]) and PostHog's flag-lookup API ([`FeatureFlagClient`]):
//! it maps the caller's [`EvaluationContext`] into a lookup payload, classifies
//! the reply (found, not found, transport error), and parses the backend's
//! string values into the expected type. Every call yields a usable value —
//! the resolved one on success, the caller's default otherwise — plus a reason
//! and an optional error code for observability.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use posthog_flags_provider::{EvaluationContext, FeatureFlagClient, FeatureProvider, PostHogProvider};
//! # async fn example(client: Arc<dyn FeatureFlagClient>) {
//! let provider = PostHogProvider::new(client);
//! let ctx = EvaluationContext::new("user-1");
//! let detail = provider.evaluate_bool("dark-mode", false, &ctx).await;
//! if detail.value {
//!     // dark mode is on for this user
//! }
//! # }
//! ```

pub mod client;
pub mod context;
pub mod provider;
pub mod resolution;
pub mod value;

pub use client::{FeatureFlagClient, FeatureFlagPayload};
pub use context::{
    ContextError, ContextValue, EvaluationContext, Groups, PostHogProperties, Properties,
    GROUPS_KEY, PROPERTIES_KEY, TARGETING_KEY,
};
pub use provider::{PostHogProvider, PROVIDER_NAME};
pub use resolution::{
    ErrorCode, EvaluationReason, FeatureProvider, Hook, ProviderMetadata, ResolutionDetail,
    ResolutionError,
};
pub use value::ParseFlagValue;
