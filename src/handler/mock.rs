//! Mock handler for testing
//!
//! Records every dispatched job kind and answers without a backend.
//! Account and Set echo their value; every other kind returns the next
//! queued response, or the default once the queue is empty.

use std::collections::{HashMap, VecDeque};

use super::{JobHandler, JobScope};
use crate::error::EpmError;
use crate::job::*;

/// Handler that returns predefined results
#[derive(Debug)]
pub struct MockHandler {
    /// Queue of responses to return (FIFO)
    responses: VecDeque<String>,
    /// Default response when queue is empty
    default_response: String,
    /// Call number (1-based) → failure message
    failures: HashMap<usize, String>,
    /// Labels of every kind dispatched, in order
    calls: Vec<&'static str>,
}

impl MockHandler {
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            default_response: "Mock result".to_string(),
            failures: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Create with a queue of responses
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    /// Set the default response when queue is empty
    pub fn with_default(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    /// Fail the `call`-th dispatch (1-based) with a transport error
    pub fn fail_on_call(mut self, call: usize, message: impl Into<String>) -> Self {
        self.failures.insert(call, message.into());
        self
    }

    /// Labels of the kinds dispatched so far
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }

    fn record(&mut self, label: &'static str) -> Result<(), EpmError> {
        self.calls.push(label);
        match self.failures.remove(&self.calls.len()) {
            Some(reason) => Err(EpmError::Transport {
                endpoint: "mock".to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    fn respond(&mut self, label: &'static str) -> Result<String, EpmError> {
        self.record(label)?;
        Ok(self
            .responses
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

impl Default for MockHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl JobHandler for MockHandler {
    fn account(&mut self, params: &AccountParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        self.record("Account")?;
        Ok(scope.resolve(&params.address))
    }

    fn set(&mut self, params: &SetParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        self.record("Set")?;
        Ok(scope.resolve(&params.value))
    }

    fn send(&mut self, _: &SendParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Sent")
    }

    fn register_name(&mut self, _: &RegisterNameParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("RegisterName")
    }

    fn permission(&mut self, _: &PermissionParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Permission")
    }

    fn bond(&mut self, _: &BondParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Bond")
    }

    fn unbond(&mut self, _: &UnbondParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Unbond")
    }

    fn rebond(&mut self, _: &RebondParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Rebond")
    }

    fn deploy(&mut self, _: &DeployParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Deploy")
    }

    fn package_deploy(&mut self, _: &PackageDeployParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("PackageDeploy")
    }

    fn call(&mut self, _: &CallParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Call")
    }

    fn restore_state(&mut self, _: &RestoreStateParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("RestoreState")
    }

    fn dump_state(&mut self, _: &DumpStateParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("DumpState")
    }

    fn query_account(&mut self, _: &QueryAccountParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("QueryAccount")
    }

    fn query_contract(&mut self, _: &QueryContractParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("QueryContract")
    }

    fn query_name(&mut self, _: &QueryNameParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("QueryName")
    }

    fn query_vals(&mut self, _: &QueryValsParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("QueryVals")
    }

    fn assert(&mut self, _: &AssertParams, _: &JobScope<'_>) -> Result<String, EpmError> {
        self.respond("Assert")
    }
}
