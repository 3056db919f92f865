//! Per-call context: who is calling and how long they will wait.

use std::time::Duration;

use pvz_core::{Principal, Role};
use uuid::Uuid;

/// Passed explicitly to every [`PvzService`](crate::PvzService) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestContext {
    pub principal: Principal,

    /// Deadline for the whole operation. `None` uses the service default.
    pub timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new(principal: Principal) -> Self {
        RequestContext {
            principal,
            timeout: None,
        }
    }

    /// A context for a fresh principal with the given role.
    pub fn for_role(role: Role) -> Self {
        RequestContext::new(Principal::new(Uuid::new_v4(), role))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
