//! Request-scoped authentication context

use super::principal::Principal;

/// Authentication state of a single request.
///
/// Written once by the authentication middleware into the request extensions
/// and only read afterwards. It is dropped together with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestAuthContext {
    principal: Option<Principal>,
}

impl RequestAuthContext {
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}
