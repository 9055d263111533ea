//! Job descriptors
//!
//! A [`Job`] is one named operation from the package manifest. Its
//! [`JobKind`] is a closed sum type; each variant carries the parameter
//! record for that kind. The variant order below is the dispatch priority
//! used when the manifest loader sees more than one kind on a job.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

// ============================================================================
// PARAMETER RECORDS
// ============================================================================

/// Account job - set the active signing identity
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AccountParams {
    pub address: String,
}

/// Set job - assign a literal to a named variable
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SetParams {
    #[serde(rename = "val", alias = "value", deserialize_with = "scalar")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SendParams {
    pub source: String,
    pub destination: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
}

/// RegisterName job - write an entry into the chain's name registry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisterNameParams {
    pub source: String,
    pub name: String,
    #[serde(deserialize_with = "scalar")]
    pub data: String,
    /// Read the entry data from this file when `data` is empty
    pub data_file: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub fee: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PermissionParams {
    pub source: String,
    /// set_base, unset_base, set_global, add_role, rm_role
    pub action: String,
    #[serde(alias = "permission_flag")]
    pub permission: String,
    #[serde(deserialize_with = "scalar")]
    pub value: String,
    pub target: String,
    pub role: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BondParams {
    pub pub_key: String,
    pub account: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UnbondParams {
    pub account: String,
    #[serde(deserialize_with = "scalar")]
    pub height: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RebondParams {
    pub account: String,
    #[serde(deserialize_with = "scalar")]
    pub height: String,
}

/// Deploy job - compile a contract source and create it on chain
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeployParams {
    pub source: String,
    /// Path relative to the contracts directory
    pub contract: String,
    /// Name used for the ABI file (defaults to the contract file stem)
    pub instance: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub fee: String,
    #[serde(deserialize_with = "scalar")]
    pub gas: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
    pub wait: bool,
}

/// PackageDeploy job - create a contract from precompiled hex bytecode
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PackageDeployParams {
    pub source: String,
    /// Path of the bytecode file relative to the contracts directory
    pub contract: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub fee: String,
    #[serde(deserialize_with = "scalar")]
    pub gas: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CallParams {
    pub source: String,
    pub destination: String,
    #[serde(deserialize_with = "scalar")]
    pub data: String,
    #[serde(deserialize_with = "scalar")]
    pub amount: String,
    #[serde(deserialize_with = "scalar")]
    pub fee: String,
    #[serde(deserialize_with = "scalar")]
    pub gas: String,
    #[serde(deserialize_with = "scalar")]
    pub nonce: String,
    pub wait: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RestoreStateParams {
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DumpStateParams {
    pub file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryAccountParams {
    pub account: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryContractParams {
    pub source: String,
    pub destination: String,
    #[serde(deserialize_with = "scalar")]
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryNameParams {
    pub name: String,
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct QueryValsParams {
    pub field: String,
    #[serde(deserialize_with = "scalar")]
    pub height: String,
}

/// Assert job - compare two values, failing the run on mismatch
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssertParams {
    #[serde(deserialize_with = "scalar")]
    pub key: String,
    pub relation: String,
    #[serde(rename = "val", alias = "value", deserialize_with = "scalar")]
    pub value: String,
}

/// Accept YAML strings, numbers and booleans for string-typed parameters
fn scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, got {:?}",
            other
        ))),
    }
}

// ============================================================================
// JOB KIND
// ============================================================================

/// The closed set of job kinds, in dispatch-priority order
#[derive(Debug, Clone, PartialEq)]
pub enum JobKind {
    // Utility
    Account(AccountParams),
    Set(SetParams),

    // Transaction
    Send(SendParams),
    RegisterName(RegisterNameParams),
    Permission(PermissionParams),
    Bond(BondParams),
    Unbond(UnbondParams),
    Rebond(RebondParams),

    // Contract
    Deploy(DeployParams),
    PackageDeploy(PackageDeployParams),
    Call(CallParams),

    // State
    RestoreState(RestoreStateParams),
    DumpState(DumpStateParams),

    // Query / test
    QueryAccount(QueryAccountParams),
    QueryContract(QueryContractParams),
    QueryName(QueryNameParams),
    QueryVals(QueryValsParams),
    Assert(AssertParams),
}

impl JobKind {
    /// Label announced when the job is dispatched
    pub fn label(&self) -> &'static str {
        match self {
            Self::Account(_) => "Account",
            Self::Set(_) => "Set",
            Self::Send(_) => "Sent",
            Self::RegisterName(_) => "RegisterName",
            Self::Permission(_) => "Permission",
            Self::Bond(_) => "Bond",
            Self::Unbond(_) => "Unbond",
            Self::Rebond(_) => "Rebond",
            Self::Deploy(_) => "Deploy",
            Self::PackageDeploy(_) => "PackageDeploy",
            Self::Call(_) => "Call",
            Self::RestoreState(_) => "RestoreState",
            Self::DumpState(_) => "DumpState",
            Self::QueryAccount(_) => "QueryAccount",
            Self::QueryContract(_) => "QueryContract",
            Self::QueryName(_) => "QueryName",
            Self::QueryVals(_) => "QueryVals",
            Self::Assert(_) => "Assert",
        }
    }
}

// ============================================================================
// JOB
// ============================================================================

/// Result slot of a job: pending until the executor writes it once
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JobResult {
    #[default]
    Pending,
    Completed(String),
}

impl JobResult {
    /// Result text; pending (and skipped) jobs read as empty
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "",
            Self::Completed(s) => s,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// One named job of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub name: String,
    /// `None` when the manifest entry named no known kind; such jobs are skipped
    pub kind: Option<JobKind>,
    pub result: JobResult,
}

impl Job {
    pub fn new(name: impl Into<String>, kind: JobKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            result: JobResult::Pending,
        }
    }

    /// A job with no populated kind
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            result: JobResult::Pending,
        }
    }

    pub fn account(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self::new(
            name,
            JobKind::Account(AccountParams {
                address: address.into(),
            }),
        )
    }

    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            name,
            JobKind::Set(SetParams {
                value: value.into(),
            }),
        )
    }

    pub fn result(&self) -> &str {
        self.result.as_str()
    }

    pub fn label(&self) -> &'static str {
        self.kind.as_ref().map(JobKind::label).unwrap_or("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_become_strings() {
        let yaml = "val: 5";
        let set: SetParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(set.value, "5");

        let yaml = "source: abc\ndestination: def\namount: 100\nnonce: true";
        let send: SendParams = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(send.amount, "100");
        assert_eq!(send.nonce, "true");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let call: CallParams = serde_yaml::from_str("destination: $deploy").unwrap();
        assert_eq!(call.destination, "$deploy");
        assert!(call.data.is_empty());
        assert!(!call.wait);
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = serde_yaml::from_str::<SetParams>("val: [1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected a scalar"));
    }

    #[test]
    fn send_label_is_sent() {
        assert_eq!(JobKind::Send(SendParams::default()).label(), "Sent");
        assert_eq!(JobKind::Assert(AssertParams::default()).label(), "Assert");
    }

    #[test]
    fn pending_result_reads_empty() {
        let job = Job::empty("nothing");
        assert_eq!(job.result(), "");
        assert!(!job.result.is_completed());
        assert_eq!(job.label(), "-");
    }
}
