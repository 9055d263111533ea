//! # Job Handlers
//!
//! Backend-facing implementations of each job kind.
//!
//! - [`JobHandler`] - one operation per job kind, called by the executor
//! - [`JobScope`] - what a handler may see: run config and earlier jobs
//! - [`ChainHandler`] - production handler over a [`Backend`](crate::backend::Backend)
//! - [`MockHandler`] - test handler with queued results and failures
//!
//! Handlers are synchronous and blocking. A handler error ends the run as-is.

mod chain;
mod mock;

pub use chain::ChainHandler;
pub use mock::MockHandler;

use crate::config::RunConfig;
use crate::error::EpmError;
use crate::job::*;
use crate::vars;

// ============================================================================
// SCOPE
// ============================================================================

/// Read-only view handed to every handler call
#[derive(Debug, Clone, Copy)]
pub struct JobScope<'a> {
    pub config: &'a RunConfig,
    /// Jobs before the current one, results already recorded
    pub completed: &'a [Job],
}

impl<'a> JobScope<'a> {
    pub fn new(config: &'a RunConfig, completed: &'a [Job]) -> Self {
        Self { config, completed }
    }

    /// Substitute `$name` references to earlier results
    pub fn resolve(&self, text: &str) -> String {
        vars::resolve(text, self.completed)
    }
}

// ============================================================================
// HANDLER TRAIT
// ============================================================================

/// One operation per job kind, each returning the job's result string
pub trait JobHandler {
    // Utility
    fn account(&mut self, params: &AccountParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
    fn set(&mut self, params: &SetParams, scope: &JobScope<'_>) -> Result<String, EpmError>;

    // Transaction
    fn send(&mut self, params: &SendParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
    fn register_name(
        &mut self,
        params: &RegisterNameParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn permission(
        &mut self,
        params: &PermissionParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn bond(&mut self, params: &BondParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
    fn unbond(&mut self, params: &UnbondParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
    fn rebond(&mut self, params: &RebondParams, scope: &JobScope<'_>) -> Result<String, EpmError>;

    // Contract
    fn deploy(&mut self, params: &DeployParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
    fn package_deploy(
        &mut self,
        params: &PackageDeployParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn call(&mut self, params: &CallParams, scope: &JobScope<'_>) -> Result<String, EpmError>;

    // State
    fn restore_state(
        &mut self,
        params: &RestoreStateParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn dump_state(
        &mut self,
        params: &DumpStateParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;

    // Query / test
    fn query_account(
        &mut self,
        params: &QueryAccountParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn query_contract(
        &mut self,
        params: &QueryContractParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn query_name(
        &mut self,
        params: &QueryNameParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn query_vals(
        &mut self,
        params: &QueryValsParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError>;
    fn assert(&mut self, params: &AssertParams, scope: &JobScope<'_>) -> Result<String, EpmError>;
}

/// Route a job kind to the matching handler operation
pub fn dispatch<H>(handler: &mut H, kind: &JobKind, scope: &JobScope<'_>) -> Result<String, EpmError>
where
    H: JobHandler + ?Sized,
{
    match kind {
        JobKind::Account(p) => handler.account(p, scope),
        JobKind::Set(p) => handler.set(p, scope),
        JobKind::Send(p) => handler.send(p, scope),
        JobKind::RegisterName(p) => handler.register_name(p, scope),
        JobKind::Permission(p) => handler.permission(p, scope),
        JobKind::Bond(p) => handler.bond(p, scope),
        JobKind::Unbond(p) => handler.unbond(p, scope),
        JobKind::Rebond(p) => handler.rebond(p, scope),
        JobKind::Deploy(p) => handler.deploy(p, scope),
        JobKind::PackageDeploy(p) => handler.package_deploy(p, scope),
        JobKind::Call(p) => handler.call(p, scope),
        JobKind::RestoreState(p) => handler.restore_state(p, scope),
        JobKind::DumpState(p) => handler.dump_state(p, scope),
        JobKind::QueryAccount(p) => handler.query_account(p, scope),
        JobKind::QueryContract(p) => handler.query_contract(p, scope),
        JobKind::QueryName(p) => handler.query_name(p, scope),
        JobKind::QueryVals(p) => handler.query_vals(p, scope),
        JobKind::Assert(p) => handler.assert(p, scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_resolves_completed_results() {
        let config = RunConfig::default();
        let mut done = Job::set("addr", "ABC");
        done.result = JobResult::Completed("ABC".into());
        let completed = vec![done];

        let scope = JobScope::new(&config, &completed);
        assert_eq!(scope.resolve("to $addr"), "to ABC");
        assert_eq!(scope.resolve("$other"), "$other");
    }

    #[test]
    fn dispatch_routes_by_kind() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = MockHandler::new();

        dispatch(&mut handler, &JobKind::Call(CallParams::default()), &scope).unwrap();
        dispatch(&mut handler, &JobKind::QueryVals(QueryValsParams::default()), &scope).unwrap();

        assert_eq!(handler.calls(), ["Call", "QueryVals"]);
    }
}
