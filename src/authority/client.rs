//! Contract between a node and the authority that owns users and roles.

use std::sync::Arc;

use crate::types::{
    AuthStatus, LoginRequest, PatternTreeInfo, PermissionInfo, PermissionOperation,
    PermissionQuery, PermissionQueryResponse, PrivilegeCheckRequest, RoleMembershipRequest,
};
use crate::{AuthorityError, Result};

/// Blocking request/response contract of the remote authority.
///
/// An `Err` from any call is a transport failure; authority-side refusals are
/// reported through the status of an `Ok` response.
pub trait AuthorityClient: Send + Sync {
    fn check_privilege(&self, request: &PrivilegeCheckRequest) -> Result<PermissionInfo>;

    fn login(&self, request: &LoginRequest) -> Result<PermissionInfo>;

    /// Status is `Success` when the user holds the role, `UserNotHasRole`
    /// when it does not, anything else on failure.
    fn check_role_membership(&self, request: &RoleMembershipRequest) -> Result<PermissionInfo>;

    fn fetch_authorized_pattern_tree(
        &self,
        request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo>;

    /// Applies a user or role change on the authority.
    ///
    /// Clients without a management channel keep this default.
    fn operate_permission(&self, operation: &PermissionOperation) -> Result<AuthStatus> {
        Err(AuthorityError::Transport(format!(
            "{} is not supported by this authority client",
            operation.name()
        )))
    }

    fn query_permission(&self, _query: &PermissionQuery) -> Result<PermissionQueryResponse> {
        Err(AuthorityError::Transport(
            "permission queries are not supported by this authority client".into(),
        ))
    }
}

impl<T: AuthorityClient + ?Sized> AuthorityClient for Arc<T> {
    fn check_privilege(&self, request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
        (**self).check_privilege(request)
    }

    fn login(&self, request: &LoginRequest) -> Result<PermissionInfo> {
        (**self).login(request)
    }

    fn check_role_membership(&self, request: &RoleMembershipRequest) -> Result<PermissionInfo> {
        (**self).check_role_membership(request)
    }

    fn fetch_authorized_pattern_tree(
        &self,
        request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo> {
        (**self).fetch_authorized_pattern_tree(request)
    }

    fn operate_permission(&self, operation: &PermissionOperation) -> Result<AuthStatus> {
        (**self).operate_permission(operation)
    }

    fn query_permission(&self, query: &PermissionQuery) -> Result<PermissionQueryResponse> {
        (**self).query_permission(query)
    }
}
