//! Public types exposed by the `authority-core` crate.

pub mod management;
pub mod object;
pub mod path;
pub mod pattern_tree;
pub mod principal;
pub mod privilege;
pub mod request;
pub mod status;
pub mod target;

pub use management::{PermissionOperation, PermissionQuery, PermissionQueryResponse};
pub use object::{DatabasePrivileges, GrantedSet, ObjectPrivileges};
pub use path::{PathPattern, PathPrivilege};
pub use pattern_tree::PatternTree;
pub use principal::{Grants, Principal, Role, User};
pub use privilege::{PrivilegeScope, PrivilegeSet, PrivilegeType};
pub use request::{
    LoginRequest, PatternTreeInfo, PermissionInfo, PrivilegeCheckRequest, RoleMembershipRequest,
};
pub use status::{AuthStatus, BatchOutcome, CheckOutcome, RoleMembership, StatusCode};
pub use target::{CheckRequest, CheckTarget};
