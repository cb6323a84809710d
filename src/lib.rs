#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::useless_vec,
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: most operations are self-describing through their
// types and the error enum; public entry points still carry docs.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Casts: durations are logged as u64 milliseconds/microseconds and stripe
// indices are reduced modulo the stripe count first.
#![allow(clippy::cast_possible_truncation)]
//
// Pattern matching: these pedantic lints often suggest changes that reduce clarity.
#![allow(clippy::manual_let_else)]
#![allow(clippy::match_same_arms)]
//
// Ergonomics trade-offs that are acceptable for this codebase:
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::unnecessary_wraps)]

//! Node-side authorization core.
//!
//! [`AuthorityChecker`] answers "may this user do this?" for system, path and
//! database/table privileges. Answers come from a local cache of user and
//! role snapshots when possible and from the remote [`AuthorityClient`]
//! otherwise. [`LocalAuthority`] is the authority-side implementation of that
//! contract, backed by an [`EntryStore`].

/// The authority-core crate version (matches `Cargo.toml`).
pub const AUTHORITY_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod authority;
pub mod config;
pub mod constants;
pub mod error;
pub mod manager;
pub mod password;
pub mod storage;
pub mod types;

pub use authority::{
    AuthMetrics, AuthorityCache, AuthorityChecker, AuthorityClient, AuthorityFetcher,
    DeadlineClient, MetricsSnapshot, PathsCheckResult,
};
pub use config::{AuthorityConfig, AuthorityConfigBuilder};
pub use constants::*;
pub use error::{AuthorityError, Result};
pub use manager::{HashLock, LocalAuthority};
pub use password::{encrypt_password, validate_password};
pub use storage::{EntryStore, FileStore, MemoryStore, StoredEntry};
pub use types::{
    AuthStatus, BatchOutcome, CheckOutcome, CheckRequest, CheckTarget, DatabasePrivileges,
    GrantedSet, Grants, LoginRequest, ObjectPrivileges, PathPattern, PathPrivilege, PatternTree,
    PatternTreeInfo, PermissionInfo, PermissionOperation, PermissionQuery,
    PermissionQueryResponse, Principal, PrivilegeCheckRequest, PrivilegeScope, PrivilegeSet,
    PrivilegeType, Role, RoleMembership, RoleMembershipRequest, StatusCode, User,
};
