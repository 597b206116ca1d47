//! Per-operation limiter registry.

use crate::error::RateLimitError;
use crate::limiter::RateLimiter;
use dashmap::DashMap;
use sluice_commons::{CredentialId, OperationId};
use sluice_configs::RateLimitSettings;
use std::sync::Arc;

/// Maps protected operations to their rate limiters.
///
/// Each operation owns an independent limiter with its own quota and its
/// own ledger, so one credential is tracked separately per operation.
/// Registries are built at bootstrap from configuration and can be extended
/// at runtime.
#[derive(Default)]
pub struct LimiterRegistry {
    limiters: DashMap<OperationId, Arc<RateLimiter>>,
}

impl LimiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the quota for an operation and returns its
    /// limiter.
    pub fn register(
        &self,
        operation: OperationId,
        settings: &RateLimitSettings,
    ) -> Arc<RateLimiter> {
        let limiter = Arc::new(RateLimiter::with_config(settings));
        log::debug!(
            "registered rate limit for operation {}: {} requests per {}s window",
            operation,
            settings.max_requests,
            settings.window_seconds
        );
        self.limiters.insert(operation, limiter.clone());
        limiter
    }

    /// The limiter for an operation, if one is registered.
    pub fn get(&self, operation: &OperationId) -> Option<Arc<RateLimiter>> {
        self.limiters
            .get(operation)
            .map(|entry| entry.value().clone())
    }

    /// Admits or rejects a request against the operation's quota.
    ///
    /// Operations with no registered quota are unprotected; their requests
    /// are always admitted.
    pub fn check(
        &self,
        operation: &OperationId,
        credential: &CredentialId,
    ) -> Result<(), RateLimitError> {
        match self.get(operation) {
            Some(limiter) => limiter.check(credential),
            None => Ok(()),
        }
    }

    /// Sweeps every registered limiter and returns the total entries dropped.
    pub fn purge_expired(&self) -> usize {
        self.limiters
            .iter()
            .map(|entry| entry.value().purge_expired())
            .sum()
    }

    /// Registered operations, sorted by name.
    pub fn operations(&self) -> Vec<OperationId> {
        let mut operations: Vec<OperationId> =
            self.limiters.iter().map(|entry| entry.key().clone()).collect();
        operations.sort();
        operations
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quota(max_requests: u32, window_seconds: u64) -> RateLimitSettings {
        RateLimitSettings {
            max_requests,
            window_seconds,
        }
    }

    #[test]
    fn test_unregistered_operation_is_unprotected() {
        let registry = LimiterRegistry::new();
        let render = OperationId::new("render_page");
        let alice = CredentialId::new("token-alice");

        for _ in 0..100 {
            assert!(registry.check(&render, &alice).is_ok());
        }
    }

    #[test]
    fn test_registered_operation_enforces_quota() {
        let registry = LimiterRegistry::new();
        let render = OperationId::new("render_page");
        let alice = CredentialId::new("token-alice");

        registry.register(render.clone(), &quota(1, 60));

        assert!(registry.check(&render, &alice).is_ok());
        assert!(registry.check(&render, &alice).is_ok());
        assert!(registry.check(&render, &alice).is_err());
    }

    #[test]
    fn test_operations_are_limited_independently() {
        let registry = LimiterRegistry::new();
        let render = OperationId::new("render_page");
        let export = OperationId::new("export_pdf");
        let alice = CredentialId::new("token-alice");

        registry.register(render.clone(), &quota(1, 60));
        registry.register(export.clone(), &quota(1, 60));

        assert!(registry.check(&render, &alice).is_ok());
        assert!(registry.check(&render, &alice).is_ok());
        assert!(registry.check(&render, &alice).is_err());

        // The same credential still has headroom on the other operation.
        assert!(registry.check(&export, &alice).is_ok());
    }

    #[test]
    fn test_purge_spans_every_limiter() {
        let registry = LimiterRegistry::new();
        let render = registry.register(OperationId::new("render_page"), &quota(5, 60));
        let export = registry.register(OperationId::new("export_pdf"), &quota(5, 60));

        let alice = CredentialId::new("token-alice");
        let short = Duration::from_millis(20);
        assert!(render.check_and_increment(&alice, 5, short).is_ok());
        assert!(export.check_and_increment(&alice, 5, short).is_ok());

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(registry.purge_expired(), 2);
    }

    #[test]
    fn test_operations_listing_is_sorted() {
        let registry = LimiterRegistry::new();
        registry.register(OperationId::new("zeta"), &quota(1, 60));
        registry.register(OperationId::new("alpha"), &quota(1, 60));

        let names: Vec<String> = registry
            .operations()
            .into_iter()
            .map(OperationId::into_string)
            .collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
        assert_eq!(registry.len(), 2);
    }
}
