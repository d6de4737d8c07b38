//! `Origin` allow-list checked before a WebSocket upgrade is accepted.

use std::collections::HashSet;

/// Exact-match allow-list of request origins.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    allowed: HashSet<String>,
}

impl OriginPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a request carrying this `Origin` value may connect.
    /// A missing header should be passed as `""`.
    pub fn allows(&self, origin: &str) -> bool {
        self.allowed.contains(origin)
    }
}
