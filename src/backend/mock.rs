//! Mock backend for testing
//!
//! Answers every call from memory. Transactions get sequential hashes and
//! creations get sequential contract addresses, so tests can predict them.

use std::cell::RefCell;

use serde_json::{json, Value};

use super::{Backend, Compiled, Query, Transaction, TxReceipt, TxRequest};
use crate::error::EpmError;

/// In-memory backend that records what it was asked to do
#[derive(Debug)]
pub struct MockBackend {
    chain_id: String,
    /// Account records returned by `Query::Account`
    accounts: Value,
    /// Name registry entries returned by `Query::Name`
    names: Value,
    validators: Value,
    /// Value returned from calls and simulated calls
    call_return: Option<String>,
    state: RefCell<Value>,
    transactions: RefCell<Vec<TxRequest>>,
    compiled: RefCell<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            chain_id: "mock-chain".to_string(),
            accounts: json!({}),
            names: json!({}),
            validators: json!({"bonded_validators": [], "unbonding_validators": []}),
            call_return: None,
            state: RefCell::new(json!({"accounts": []})),
            transactions: RefCell::new(Vec::new()),
            compiled: RefCell::new(Vec::new()),
        }
    }

    /// Register an account record for `Query::Account`
    pub fn with_account(mut self, address: &str, record: Value) -> Self {
        self.accounts[address] = record;
        self
    }

    /// Register a name entry for `Query::Name`
    pub fn with_name(mut self, name: &str, entry: Value) -> Self {
        self.names[name] = entry;
        self
    }

    pub fn with_validators(mut self, validators: Value) -> Self {
        self.validators = validators;
        self
    }

    /// Return data for calls and simulated calls
    pub fn with_call_return(mut self, value: impl Into<String>) -> Self {
        self.call_return = Some(value.into());
        self
    }

    /// Every transaction submitted so far
    pub fn transactions(&self) -> Vec<TxRequest> {
        self.transactions.borrow().clone()
    }

    /// Names of compiled contracts, in order
    pub fn compiled(&self) -> Vec<String> {
        self.compiled.borrow().clone()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for MockBackend {
    fn chain_id(&self) -> Result<String, EpmError> {
        Ok(self.chain_id.clone())
    }

    fn compile(&self, name: &str, source: &str) -> Result<Compiled, EpmError> {
        self.compiled.borrow_mut().push(name.to_string());
        Ok(Compiled {
            bytecode: format!("{:08X}", source.len()),
            abi: json!([{"type": "constructor", "inputs": []}]),
        })
    }

    fn transact(&self, request: &TxRequest) -> Result<TxReceipt, EpmError> {
        let mut transactions = self.transactions.borrow_mut();
        transactions.push(request.clone());
        let n = transactions.len();

        let contract_address = match request.tx {
            Transaction::Create { .. } => Some(format!("C0{:038X}", n)),
            _ => None,
        };
        let return_value = match request.tx {
            Transaction::Call { .. } if request.wait => self.call_return.clone(),
            _ => None,
        };

        Ok(TxReceipt {
            tx_hash: format!("{:064X}", n),
            contract_address,
            return_value,
        })
    }

    fn simulate_call(&self, _from: &str, _to: &str, _data: &str) -> Result<String, EpmError> {
        Ok(self.call_return.clone().unwrap_or_default())
    }

    fn query(&self, query: &Query) -> Result<Value, EpmError> {
        let found = match query {
            Query::Account { address } => self.accounts.get(address).cloned(),
            Query::Name { name } => self.names.get(name).cloned(),
            Query::Validators { .. } => Some(self.validators.clone()),
        };
        found.ok_or_else(|| EpmError::Rpc {
            method: "query".to_string(),
            code: -32602,
            message: format!("not found: {:?}", query),
        })
    }

    fn dump_state(&self) -> Result<Value, EpmError> {
        Ok(self.state.borrow().clone())
    }

    fn restore_state(&self, state: &Value) -> Result<String, EpmError> {
        *self.state.borrow_mut() = state.clone();
        Ok("state restored".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creations_get_addresses() {
        let backend = MockBackend::new();
        let request = TxRequest {
            signer: "ABC".into(),
            nonce: None,
            wait: true,
            tx: Transaction::Create {
                code: "6060".into(),
                amount: 0,
                fee: 0,
                gas: 100,
            },
        };
        let receipt = backend.transact(&request).unwrap();
        assert_eq!(receipt.contract_address.as_deref().map(str::len), Some(40));
        assert_eq!(backend.transactions().len(), 1);
    }

    #[test]
    fn unknown_account_is_error() {
        let backend = MockBackend::new();
        let err = backend
            .query(&Query::Account {
                address: "nobody".into(),
            })
            .unwrap_err();
        assert!(matches!(err, EpmError::Rpc { .. }));
    }

    #[test]
    fn restore_replaces_state() {
        let backend = MockBackend::new();
        backend.restore_state(&json!({"accounts": [1]})).unwrap();
        assert_eq!(backend.dump_state().unwrap(), json!({"accounts": [1]}));
    }
}
