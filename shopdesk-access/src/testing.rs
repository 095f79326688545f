//! Test doubles for the access layer

use crate::source::PermissionSource;
use async_trait::async_trait;
use shopdesk_core::{
    ErrorContext, SessionKey, SessionToken, ShopdeskError, ShopdeskResult, Username,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn key(token: &str, username: &str) -> SessionKey {
    SessionKey::new(
        SessionToken::parse(token).unwrap(),
        Username::parse(username).unwrap(),
    )
}

/// Permission source with a fixed answer, an optional delay and a number of
/// leading failures
pub(crate) struct ScriptedSource {
    names: Vec<String>,
    delay: Duration,
    failures_left: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn build(names: &[&str], delay: Duration, failures: usize) -> Arc<Self> {
        Arc::new(Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            delay,
            failures_left: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn granting(names: &[&str]) -> Arc<Self> {
        Self::build(names, Duration::ZERO, 0)
    }

    pub(crate) fn slow(delay: Duration, names: &[&str]) -> Arc<Self> {
        Self::build(names, delay, 0)
    }

    pub(crate) fn failing_first(failures: usize, names: &[&str]) -> Arc<Self> {
        Self::build(names, Duration::ZERO, failures)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PermissionSource for ScriptedSource {
    async fn fetch_permissions(&self, _username: &Username) -> ShopdeskResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ShopdeskError::Network {
                message: "simulated outage".to_string(),
                status: None,
                source: None,
                context: ErrorContext::new("scripted_source"),
            });
        }
        Ok(self.names.clone())
    }
}
