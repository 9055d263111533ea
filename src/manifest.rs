//! Package manifest parsing
//!
//! ```yaml
//! jobs:
//! - name: limit
//!   job:
//!     set:
//!       val: 100
//! - name: storage
//!   job:
//!     deploy:
//!       contract: storage.sol
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::EpmError;
use crate::job::*;

/// Package file as written on disk
#[derive(Debug, Default, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

/// One manifest entry before kind resolution
#[derive(Debug, Deserialize)]
pub struct JobSpec {
    pub name: String,
    #[serde(default)]
    pub job: Option<JobFields>,
}

/// Every kind a manifest entry may name. Nothing stops an entry from
/// filling several; [`JobFields::into_kind`] keeps the first one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JobFields {
    pub account: Option<AccountParams>,
    pub set: Option<SetParams>,
    pub send: Option<SendParams>,
    #[serde(alias = "register-name")]
    pub register: Option<RegisterNameParams>,
    pub permission: Option<PermissionParams>,
    pub bond: Option<BondParams>,
    pub unbond: Option<UnbondParams>,
    pub rebond: Option<RebondParams>,
    pub deploy: Option<DeployParams>,
    pub package_deploy: Option<PackageDeployParams>,
    pub call: Option<CallParams>,
    pub restore_state: Option<RestoreStateParams>,
    pub dump_state: Option<DumpStateParams>,
    pub query_account: Option<QueryAccountParams>,
    pub query_contract: Option<QueryContractParams>,
    pub query_name: Option<QueryNameParams>,
    pub query_vals: Option<QueryValsParams>,
    pub assert: Option<AssertParams>,
}

impl JobFields {
    /// Resolve to a single kind, checking in dispatch-priority order
    pub fn into_kind(self) -> Option<JobKind> {
        let JobFields {
            account,
            set,
            send,
            register,
            permission,
            bond,
            unbond,
            rebond,
            deploy,
            package_deploy,
            call,
            restore_state,
            dump_state,
            query_account,
            query_contract,
            query_name,
            query_vals,
            assert,
        } = self;

        account
            .map(JobKind::Account)
            .or(set.map(JobKind::Set))
            .or(send.map(JobKind::Send))
            .or(register.map(JobKind::RegisterName))
            .or(permission.map(JobKind::Permission))
            .or(bond.map(JobKind::Bond))
            .or(unbond.map(JobKind::Unbond))
            .or(rebond.map(JobKind::Rebond))
            .or(deploy.map(JobKind::Deploy))
            .or(package_deploy.map(JobKind::PackageDeploy))
            .or(call.map(JobKind::Call))
            .or(restore_state.map(JobKind::RestoreState))
            .or(dump_state.map(JobKind::DumpState))
            .or(query_account.map(JobKind::QueryAccount))
            .or(query_contract.map(JobKind::QueryContract))
            .or(query_name.map(JobKind::QueryName))
            .or(query_vals.map(JobKind::QueryVals))
            .or(assert.map(JobKind::Assert))
    }
}

impl From<JobSpec> for Job {
    fn from(spec: JobSpec) -> Self {
        Job {
            name: spec.name,
            kind: spec.job.and_then(JobFields::into_kind),
            result: JobResult::Pending,
        }
    }
}

impl Package {
    /// Parse a manifest from YAML text
    pub fn parse(yaml: &str) -> Result<Self, EpmError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a manifest file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EpmError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| EpmError::FileRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&yaml)
    }

    /// Convert into the job list the executor runs
    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs.into_iter().map(Job::from).collect()
    }
}
