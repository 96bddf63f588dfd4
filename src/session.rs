//! Caller identity for read access
//!
//! The authentication system is external; all the query layer needs is who
//! is asking and whether the call is a simulated (optimistic, client-side)
//! run rather than the authoritative one.

/// Identity of the caller of a query
pub trait CallerContext {
    /// Authenticated user, if any
    fn user_id(&self) -> Option<&str>;

    /// Whether this is a speculative pre-execution of the call
    fn is_simulation(&self) -> bool {
        false
    }

    fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }
}

/// Concrete caller context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
    user_id: Option<String>,
    simulation: bool,
}

impl Caller {
    /// An authenticated caller
    pub fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            simulation: false,
        }
    }

    /// A caller with no session
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build from an optional identity; blank identities are anonymous
    pub fn from_user(user_id: Option<&str>) -> Self {
        match user_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => Self::authenticated(id),
            None => Self::anonymous(),
        }
    }

    /// Mark this call as a simulated execution
    pub fn simulated(mut self) -> Self {
        self.simulation = true;
        self
    }
}

impl CallerContext for Caller {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn is_simulation(&self) -> bool {
        self.simulation
    }
}
