//! # Backend Client
//!
//! The chain node, signing daemon and contract compiler behind the
//! [`ChainHandler`](crate::handler::ChainHandler).
//!
//! | Backend | Use Case |
//! |---------|----------|
//! | [`RpcBackend`] | JSON-RPC over HTTP to the three services |
//! | [`MockBackend`] | In-memory, records transactions for tests |

mod mock;
mod rpc;

pub use mock::MockBackend;
pub use rpc::RpcBackend;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EpmError;

// ============================================================================
// TRANSACTIONS
// ============================================================================

/// Unsigned transaction body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transaction {
    Send {
        to: String,
        amount: u64,
    },
    Name {
        name: String,
        data: String,
        amount: u64,
        fee: u64,
    },
    Permission {
        action: PermissionAction,
        target: String,
        permission: String,
        value: String,
        role: String,
    },
    Bond {
        pub_key: String,
        unbond_to: String,
        amount: u64,
    },
    Unbond {
        account: String,
        height: u64,
    },
    Rebond {
        account: String,
        height: u64,
    },
    Call {
        to: String,
        data: String,
        amount: u64,
        fee: u64,
        gas: u64,
    },
    /// Contract creation
    Create {
        code: String,
        amount: u64,
        fee: u64,
        gas: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    SetBase,
    UnsetBase,
    SetGlobal,
    AddRole,
    RmRole,
}

impl std::str::FromStr for PermissionAction {
    type Err = EpmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set_base" | "setBase" => Ok(Self::SetBase),
            "unset_base" | "unsetBase" => Ok(Self::UnsetBase),
            "set_global" | "setGlobal" => Ok(Self::SetGlobal),
            "add_role" | "addRole" => Ok(Self::AddRole),
            "rm_role" | "rmRole" => Ok(Self::RmRole),
            other => Err(EpmError::UnknownPermissionAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Transaction plus who signs it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxRequest {
    /// Address of the signing account
    pub signer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// Wait for the transaction to be committed
    pub wait: bool,
    pub tx: Transaction,
}

/// What the chain reports back for a broadcast transaction
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TxReceipt {
    pub tx_hash: String,
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Return data of a call, when waited for
    #[serde(default)]
    pub return_value: Option<String>,
}

/// Output of the compiler service
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Compiled {
    /// Hex-encoded bytecode
    pub bytecode: String,
    #[serde(default)]
    pub abi: Value,
}

/// Read-only chain lookups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Account { address: String },
    Name { name: String },
    Validators { height: Option<u64> },
}

// ============================================================================
// BACKEND TRAIT
// ============================================================================

/// Everything the chain handler needs from the outside world.
/// All calls block until the backend answers.
pub trait Backend {
    /// Identifier of the chain the node serves
    fn chain_id(&self) -> Result<String, EpmError>;

    /// Compile a contract source file
    fn compile(&self, name: &str, source: &str) -> Result<Compiled, EpmError>;

    /// Sign and broadcast a transaction
    fn transact(&self, request: &TxRequest) -> Result<TxReceipt, EpmError>;

    /// Run a contract call without creating a transaction
    fn simulate_call(&self, from: &str, to: &str, data: &str) -> Result<String, EpmError>;

    fn query(&self, query: &Query) -> Result<Value, EpmError>;

    /// Snapshot the chain state
    fn dump_state(&self) -> Result<Value, EpmError>;

    /// Load a snapshot produced by [`Backend::dump_state`]
    fn restore_state(&self, state: &Value) -> Result<String, EpmError>;
}
