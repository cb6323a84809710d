//! Per-call deadline around a blocking [`AuthorityClient`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};

use super::client::AuthorityClient;
use crate::constants::RPC_QUEUE_DEPTH_PER_WORKER;
use crate::types::{
    AuthStatus, LoginRequest, PatternTreeInfo, PermissionInfo, PermissionOperation,
    PermissionQuery, PermissionQueryResponse, PrivilegeCheckRequest, RoleMembershipRequest,
};
use crate::{AuthorityError, Result};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs every call on a small worker pool and waits at most `timeout` for it.
///
/// A call that misses its deadline keeps running on its worker if it already
/// started, and its answer is discarded. A call still queued when its caller
/// gives up is skipped. The queue is bounded; a call arriving while it is full
/// fails immediately with a transport error.
pub struct DeadlineClient<C> {
    client: Arc<C>,
    jobs: Sender<Job>,
    timeout: Duration,
}

impl<C: AuthorityClient + 'static> DeadlineClient<C> {
    pub fn new(client: C, workers: usize, timeout: Duration) -> Result<Self> {
        let workers = workers.max(1);
        let (jobs, queue) = crossbeam_channel::bounded::<Job>(workers * RPC_QUEUE_DEPTH_PER_WORKER);
        for idx in 0..workers {
            let queue = queue.clone();
            // Workers exit once every sender is gone.
            thread::Builder::new()
                .name(format!("authority-rpc-{idx}"))
                .spawn(move || {
                    for job in queue {
                        job();
                    }
                })?;
        }
        Ok(Self {
            client: Arc::new(client),
            jobs,
            timeout,
        })
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Calls waiting for a free worker.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.jobs.len()
    }

    fn call<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T> + Send + 'static,
    {
        let (reply, answer) = crossbeam_channel::bounded(1);
        let abandoned = Arc::new(AtomicBool::new(false));
        let client = Arc::clone(&self.client);
        let job: Job = {
            let abandoned = Arc::clone(&abandoned);
            Box::new(move || {
                if abandoned.load(Ordering::Acquire) {
                    return;
                }
                // The receiver is gone when the caller already timed out.
                let _ = reply.send(f(&client));
            })
        };
        match self.jobs.try_send(job) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    target = "authority::rpc",
                    operation,
                    queued = self.jobs.len(),
                    "authority worker pool saturated"
                );
                return Err(AuthorityError::Transport(
                    "authority worker pool is saturated".into(),
                ));
            }
            Err(TrySendError::Disconnected(_)) => {
                return Err(AuthorityError::Transport(
                    "authority worker pool is shut down".into(),
                ));
            }
        }
        match answer.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                abandoned.store(true, Ordering::Release);
                tracing::warn!(
                    target = "authority::rpc",
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "authority call timed out"
                );
                Err(AuthorityError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(AuthorityError::Transport(format!(
                "authority worker dropped {operation} without answering"
            ))),
        }
    }
}

impl<C: AuthorityClient + 'static> AuthorityClient for DeadlineClient<C> {
    fn check_privilege(&self, request: &PrivilegeCheckRequest) -> Result<PermissionInfo> {
        let request = request.clone();
        self.call("check_privilege", move |client| {
            client.check_privilege(&request)
        })
    }

    fn login(&self, request: &LoginRequest) -> Result<PermissionInfo> {
        let request = request.clone();
        self.call("login", move |client| client.login(&request))
    }

    fn check_role_membership(&self, request: &RoleMembershipRequest) -> Result<PermissionInfo> {
        let request = request.clone();
        self.call("check_role_membership", move |client| {
            client.check_role_membership(&request)
        })
    }

    fn fetch_authorized_pattern_tree(
        &self,
        request: &PrivilegeCheckRequest,
    ) -> Result<PatternTreeInfo> {
        let request = request.clone();
        self.call("fetch_authorized_pattern_tree", move |client| {
            client.fetch_authorized_pattern_tree(&request)
        })
    }

    fn operate_permission(&self, operation: &PermissionOperation) -> Result<AuthStatus> {
        let operation = operation.clone();
        self.call("operate_permission", move |client| {
            client.operate_permission(&operation)
        })
    }

    fn query_permission(&self, query: &PermissionQuery) -> Result<PermissionQueryResponse> {
        let query = query.clone();
        self.call("query_permission", move |client| client.query_permission(&query))
    }
}
