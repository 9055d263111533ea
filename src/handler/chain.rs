//! Chain handler
//!
//! Runs each job kind against a [`Backend`]. Account, Set and Assert are
//! answered locally; everything else goes through the backend. String
//! parameters are `$name`-resolved against earlier results first.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::{JobHandler, JobScope};
use crate::backend::{Backend, PermissionAction, Query, Transaction, TxReceipt, TxRequest};
use crate::error::EpmError;
use crate::job::*;

/// File DumpState writes to and RestoreState reads from by default
pub const DEFAULT_STATE_FILE: &str = "state_dump.json";

/// Result of a passing Assert job
pub const ASSERT_PASSED: &str = "passed";

/// Production handler
#[derive(Debug)]
pub struct ChainHandler<B> {
    backend: B,
    /// Address set by the last Account job
    account: Option<String>,
}

impl<B: Backend> ChainHandler<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            account: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Address transactions are signed with when a job names no source
    pub fn active_account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    fn signer(&self, source: &str, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let source = scope.resolve(source);
        if !source.is_empty() {
            return Ok(source);
        }
        self.account.clone().ok_or(EpmError::NoAccount)
    }

    fn submit(&self, request: TxRequest) -> Result<TxReceipt, EpmError> {
        debug!(signer = %request.signer, tx = ?request.tx, "Submitting transaction");
        let receipt = self.backend.transact(&request)?;
        debug!(tx_hash = %receipt.tx_hash, "Transaction accepted");
        Ok(receipt)
    }

    fn create(
        &self,
        contract: &str,
        code: String,
        fees: Fees,
        signer: String,
        nonce: Option<u64>,
        wait: bool,
    ) -> Result<String, EpmError> {
        let receipt = self.submit(TxRequest {
            signer,
            nonce,
            wait,
            tx: Transaction::Create {
                code,
                amount: fees.amount,
                fee: fees.fee,
                gas: fees.gas,
            },
        })?;
        receipt
            .contract_address
            .ok_or_else(|| EpmError::NoContractAddress {
                contract: contract.to_string(),
            })
    }
}

/// Amount, fee and gas after applying run defaults
struct Fees {
    amount: u64,
    fee: u64,
    gas: u64,
}

impl Fees {
    fn resolve(
        amount: &str,
        fee: &str,
        gas: &str,
        scope: &JobScope<'_>,
    ) -> Result<Self, EpmError> {
        let config = scope.config;
        Ok(Self {
            amount: number("amount", &scope.resolve(amount), config.default_amount)?,
            fee: number("fee", &scope.resolve(fee), config.default_fee)?,
            gas: number("gas", &scope.resolve(gas), config.default_gas)?,
        })
    }
}

impl<B: Backend> JobHandler for ChainHandler<B> {
    // ─────────────────────────────────────────────────────────────
    // Utility
    // ─────────────────────────────────────────────────────────────

    fn account(&mut self, params: &AccountParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let address = required("Account", "address", scope.resolve(&params.address))?;
        debug!(address = %address, "Setting active account");
        self.account = Some(address.clone());
        Ok(address)
    }

    fn set(&mut self, params: &SetParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        Ok(scope.resolve(&params.value))
    }

    // ─────────────────────────────────────────────────────────────
    // Transactions
    // ─────────────────────────────────────────────────────────────

    fn send(&mut self, params: &SendParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let to = required("Send", "destination", scope.resolve(&params.destination))?;
        let request = TxRequest {
            signer: self.signer(&params.source, scope)?,
            nonce: optional_number("nonce", &scope.resolve(&params.nonce))?,
            wait: false,
            tx: Transaction::Send {
                to,
                amount: number(
                    "amount",
                    &scope.resolve(&params.amount),
                    scope.config.default_amount,
                )?,
            },
        };
        Ok(self.submit(request)?.tx_hash)
    }

    fn register_name(
        &mut self,
        params: &RegisterNameParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let name = required("RegisterName", "name", scope.resolve(&params.name))?;
        let mut data = scope.resolve(&params.data);
        if data.is_empty() && !params.data_file.is_empty() {
            data = read_file(Path::new(&scope.resolve(&params.data_file)))?
                .trim()
                .to_string();
        }
        let fees = Fees::resolve(&params.amount, &params.fee, "", scope)?;

        let request = TxRequest {
            signer: self.signer(&params.source, scope)?,
            nonce: optional_number("nonce", &scope.resolve(&params.nonce))?,
            wait: false,
            tx: Transaction::Name {
                name,
                data,
                amount: fees.amount,
                fee: fees.fee,
            },
        };
        Ok(self.submit(request)?.tx_hash)
    }

    fn permission(
        &mut self,
        params: &PermissionParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let action: PermissionAction =
            required("Permission", "action", scope.resolve(&params.action))?.parse()?;
        let target = required("Permission", "target", scope.resolve(&params.target))?;

        let request = TxRequest {
            signer: self.signer(&params.source, scope)?,
            nonce: optional_number("nonce", &scope.resolve(&params.nonce))?,
            wait: false,
            tx: Transaction::Permission {
                action,
                target,
                permission: scope.resolve(&params.permission),
                value: scope.resolve(&params.value),
                role: scope.resolve(&params.role),
            },
        };
        Ok(self.submit(request)?.tx_hash)
    }

    fn bond(&mut self, params: &BondParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let pub_key = required("Bond", "pub_key", scope.resolve(&params.pub_key))?;
        let signer = self.signer(&params.account, scope)?;

        let request = TxRequest {
            nonce: optional_number("nonce", &scope.resolve(&params.nonce))?,
            wait: false,
            tx: Transaction::Bond {
                pub_key,
                unbond_to: signer.clone(),
                amount: number(
                    "amount",
                    &scope.resolve(&params.amount),
                    scope.config.default_amount,
                )?,
            },
            signer,
        };
        Ok(self.submit(request)?.tx_hash)
    }

    fn unbond(&mut self, params: &UnbondParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let account = self.signer(&params.account, scope)?;
        let height = required("Unbond", "height", scope.resolve(&params.height))?;

        let request = TxRequest {
            signer: account.clone(),
            nonce: None,
            wait: false,
            tx: Transaction::Unbond {
                account,
                height: number("height", &height, 0)?,
            },
        };
        Ok(self.submit(request)?.tx_hash)
    }

    fn rebond(&mut self, params: &RebondParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let account = self.signer(&params.account, scope)?;
        let height = required("Rebond", "height", scope.resolve(&params.height))?;

        let request = TxRequest {
            signer: account.clone(),
            nonce: None,
            wait: false,
            tx: Transaction::Rebond {
                account,
                height: number("height", &height, 0)?,
            },
        };
        Ok(self.submit(request)?.tx_hash)
    }

    // ─────────────────────────────────────────────────────────────
    // Contracts
    // ─────────────────────────────────────────────────────────────

    fn deploy(&mut self, params: &DeployParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let contract = required("Deploy", "contract", scope.resolve(&params.contract))?;
        let source = read_file(&scope.config.contracts_path.join(&contract))?;
        let stem = file_stem(&contract);

        let compiled = self.backend.compile(&stem, &source)?;

        let fees = Fees::resolve(&params.amount, &params.fee, &params.gas, scope)?;
        let signer = self.signer(&params.source, scope)?;
        let nonce = optional_number("nonce", &scope.resolve(&params.nonce))?;
        let address = self.create(&contract, compiled.bytecode, fees, signer, nonce, params.wait)?;

        // Only contracts that landed get an ABI
        let instance = match scope.resolve(&params.instance) {
            i if i.is_empty() => stem,
            i => i,
        };
        fs::create_dir_all(&scope.config.abi_path)?;
        fs::write(
            scope.config.abi_path.join(&instance),
            serde_json::to_string_pretty(&compiled.abi)?,
        )?;
        debug!(instance = %instance, "Wrote ABI");

        Ok(address)
    }

    fn package_deploy(
        &mut self,
        params: &PackageDeployParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let contract = required("PackageDeploy", "contract", scope.resolve(&params.contract))?;
        let code = read_file(&scope.config.contracts_path.join(&contract))?
            .trim()
            .to_string();

        let fees = Fees::resolve(&params.amount, &params.fee, &params.gas, scope)?;
        let signer = self.signer(&params.source, scope)?;
        let nonce = optional_number("nonce", &scope.resolve(&params.nonce))?;
        self.create(&contract, code, fees, signer, nonce, params.wait)
    }

    fn call(&mut self, params: &CallParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let to = required("Call", "destination", scope.resolve(&params.destination))?;
        let fees = Fees::resolve(&params.amount, &params.fee, &params.gas, scope)?;

        let request = TxRequest {
            signer: self.signer(&params.source, scope)?,
            nonce: optional_number("nonce", &scope.resolve(&params.nonce))?,
            wait: params.wait,
            tx: Transaction::Call {
                to,
                data: scope.resolve(&params.data),
                amount: fees.amount,
                fee: fees.fee,
                gas: fees.gas,
            },
        };
        let receipt = self.submit(request)?;

        Ok(match receipt.return_value {
            Some(value) if params.wait => value,
            _ => receipt.tx_hash,
        })
    }

    // ─────────────────────────────────────────────────────────────
    // State
    // ─────────────────────────────────────────────────────────────

    fn restore_state(
        &mut self,
        params: &RestoreStateParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let file = or_default(scope.resolve(&params.file), DEFAULT_STATE_FILE);
        let state: Value = serde_json::from_str(&read_file(Path::new(&file))?)?;
        self.backend.restore_state(&state)
    }

    fn dump_state(
        &mut self,
        params: &DumpStateParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let file = or_default(scope.resolve(&params.file), DEFAULT_STATE_FILE);
        let state = self.backend.dump_state()?;
        fs::write(&file, serde_json::to_string_pretty(&state)?)?;
        Ok(file)
    }

    // ─────────────────────────────────────────────────────────────
    // Queries and assertions
    // ─────────────────────────────────────────────────────────────

    fn query_account(
        &mut self,
        params: &QueryAccountParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let address = required("QueryAccount", "account", scope.resolve(&params.account))?;
        let record = self.backend.query(&Query::Account { address })?;
        select_field(&record, &scope.resolve(&params.field))
    }

    fn query_contract(
        &mut self,
        params: &QueryContractParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let to = required("QueryContract", "destination", scope.resolve(&params.destination))?;
        let from = self.signer(&params.source, scope)?;
        self.backend
            .simulate_call(&from, &to, &scope.resolve(&params.data))
    }

    fn query_name(
        &mut self,
        params: &QueryNameParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let name = required("QueryName", "name", scope.resolve(&params.name))?;
        let entry = self.backend.query(&Query::Name { name })?;
        select_field(&entry, &scope.resolve(&params.field))
    }

    fn query_vals(
        &mut self,
        params: &QueryValsParams,
        scope: &JobScope<'_>,
    ) -> Result<String, EpmError> {
        let height = optional_number("height", &scope.resolve(&params.height))?;
        let validators = self.backend.query(&Query::Validators { height })?;
        select_field(&validators, &scope.resolve(&params.field))
    }

    fn assert(&mut self, params: &AssertParams, scope: &JobScope<'_>) -> Result<String, EpmError> {
        let key = scope.resolve(&params.key);
        let expected = scope.resolve(&params.value);
        let relation = match params.relation.trim() {
            "" => Relation::Eq,
            other => other.parse()?,
        };

        if relation.holds(&key, &expected)? {
            debug!(key = %key, expected = %expected, "Assertion passed");
            Ok(ASSERT_PASSED.to_string())
        } else {
            Err(EpmError::AssertionFailed {
                key,
                relation: relation.as_str().to_string(),
                expected,
            })
        }
    }
}

// ============================================================================
// ASSERT RELATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl std::str::FromStr for Relation {
    type Err = EpmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" | "==" | "equal" => Ok(Self::Eq),
            "ne" | "!=" | "notEqual" => Ok(Self::Ne),
            "gt" | ">" => Ok(Self::Gt),
            "ge" | ">=" => Ok(Self::Ge),
            "lt" | "<" => Ok(Self::Lt),
            "le" | "<=" => Ok(Self::Le),
            other => Err(EpmError::UnknownRelation {
                relation: other.to_string(),
            }),
        }
    }
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }

    /// Integers compare numerically; anything else only supports eq / ne
    pub fn holds(&self, key: &str, expected: &str) -> Result<bool, EpmError> {
        if let (Ok(a), Ok(b)) = (key.trim().parse::<i128>(), expected.trim().parse::<i128>()) {
            return Ok(match self {
                Self::Eq => a == b,
                Self::Ne => a != b,
                Self::Gt => a > b,
                Self::Ge => a >= b,
                Self::Lt => a < b,
                Self::Le => a <= b,
            });
        }

        match self {
            Self::Eq => Ok(key == expected),
            Self::Ne => Ok(key != expected),
            _ => Err(EpmError::NotComparable {
                key: key.to_string(),
                relation: self.as_str().to_string(),
                expected: expected.to_string(),
            }),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn required(kind: &'static str, field: &'static str, value: String) -> Result<String, EpmError> {
    if value.is_empty() {
        Err(EpmError::MissingField { kind, field })
    } else {
        Ok(value)
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn number(field: &'static str, raw: &str, default: u64) -> Result<u64, EpmError> {
    Ok(optional_number(field, raw)?.unwrap_or(default))
}

fn optional_number(field: &'static str, raw: &str) -> Result<Option<u64>, EpmError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| EpmError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, EpmError> {
    fs::read_to_string(path).map_err(|e| EpmError::FileRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn file_stem(contract: &str) -> String {
    Path::new(contract)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| contract.to_string())
}

/// Pick a dotted path (`permissions.base`, `validators.0`) out of a query
/// result. Strings come back raw, everything else JSON-encoded. An empty
/// path returns the whole value.
pub fn select_field(value: &Value, path: &str) -> Result<String, EpmError> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        current = next.ok_or_else(|| EpmError::FieldNotFound {
            field: path.to_string(),
        })?;
    }

    Ok(match current {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::config::RunConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn completed(name: &str, result: &str) -> Job {
        let mut job = Job::set(name, result);
        job.result = JobResult::Completed(result.to_string());
        job
    }

    #[test]
    fn account_sets_active_signer() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let params = AccountParams {
            address: "ABCDEF".into(),
        };
        assert_eq!(handler.account(&params, &scope).unwrap(), "ABCDEF");
        assert_eq!(handler.active_account(), Some("ABCDEF"));

        let send = SendParams {
            destination: "123456".into(),
            amount: "10".into(),
            ..Default::default()
        };
        handler.send(&send, &scope).unwrap();

        let txs = handler.backend().transactions();
        assert_eq!(txs[0].signer, "ABCDEF");
        assert_eq!(
            txs[0].tx,
            Transaction::Send {
                to: "123456".into(),
                amount: 10
            }
        );
    }

    #[test]
    fn transaction_without_account_fails() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let send = SendParams {
            destination: "123456".into(),
            ..Default::default()
        };
        let err = handler.send(&send, &scope).unwrap_err();
        assert!(matches!(err, EpmError::NoAccount));
        assert!(handler.backend().transactions().is_empty());
    }

    #[test]
    fn set_resolves_earlier_results() {
        let config = RunConfig::default();
        let completed = vec![completed("base", "5")];
        let scope = JobScope::new(&config, &completed);
        let mut handler = ChainHandler::new(MockBackend::new());

        let params = SetParams {
            value: "$base0".into(),
        };
        // Unknown name stays as written
        assert_eq!(handler.set(&params, &scope).unwrap(), "$base0");

        let params = SetParams {
            value: "x$base".into(),
        };
        assert_eq!(handler.set(&params, &scope).unwrap(), "x5");
    }

    #[test]
    fn call_applies_defaults_and_returns_value_when_waiting() {
        let config = RunConfig::default();
        let completed = vec![completed("storage", "C0FFEE")];
        let scope = JobScope::new(&config, &completed);
        let mut handler = ChainHandler::new(MockBackend::new().with_call_return("42"));
        handler
            .account(&AccountParams { address: "AA".into() }, &scope)
            .unwrap();

        let params = CallParams {
            destination: "$storage".into(),
            data: "get".into(),
            wait: true,
            ..Default::default()
        };
        assert_eq!(handler.call(&params, &scope).unwrap(), "42");

        let params = CallParams {
            wait: false,
            ..params
        };
        let hash = handler.call(&params, &scope).unwrap();
        assert_eq!(hash.len(), 64);

        match &handler.backend().transactions()[0].tx {
            Transaction::Call { to, gas, fee, .. } => {
                assert_eq!(to, "C0FFEE");
                assert_eq!(*gas, config.default_gas);
                assert_eq!(*fee, config.default_fee);
            }
            other => panic!("unexpected tx {:?}", other),
        }
    }

    #[test]
    fn bad_number_is_reported() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());
        let params = SendParams {
            source: "AA".into(),
            destination: "BB".into(),
            amount: "lots".into(),
            ..Default::default()
        };
        let err = handler.send(&params, &scope).unwrap_err();
        assert_eq!(err.to_string(), "EPM-021: Field 'amount' is not a valid number: 'lots'");
    }

    #[test]
    fn deploy_compiles_writes_abi_and_returns_address() {
        let dir = TempDir::new().unwrap();
        let contracts = dir.path().join("contracts");
        fs::create_dir_all(&contracts).unwrap();
        fs::write(contracts.join("storage.sol"), "contract Storage {}").unwrap();

        let config = RunConfig {
            contracts_path: contracts,
            abi_path: dir.path().join("abi"),
            ..Default::default()
        };
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let params = DeployParams {
            source: "AA".into(),
            contract: "storage.sol".into(),
            ..Default::default()
        };
        let address = handler.deploy(&params, &scope).unwrap();

        assert_eq!(address.len(), 40);
        assert_eq!(handler.backend().compiled(), ["storage"]);
        assert!(dir.path().join("abi").join("storage").exists());
    }

    #[test]
    fn failed_deploy_writes_no_abi() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("storage.sol"), "contract Storage {}").unwrap();
        let config = RunConfig {
            contracts_path: dir.path().to_path_buf(),
            abi_path: dir.path().join("abi"),
            ..Default::default()
        };
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        // No source and no active account
        let params = DeployParams {
            contract: "storage.sol".into(),
            ..Default::default()
        };
        assert!(matches!(
            handler.deploy(&params, &scope),
            Err(EpmError::NoAccount)
        ));
        assert!(handler.backend().transactions().is_empty());
        assert!(!dir.path().join("abi").join("storage").exists());
    }

    #[test]
    fn deploy_missing_source_file() {
        let dir = TempDir::new().unwrap();
        let config = RunConfig {
            contracts_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());
        let params = DeployParams {
            source: "AA".into(),
            contract: "nope.sol".into(),
            ..Default::default()
        };
        assert!(matches!(
            handler.deploy(&params, &scope),
            Err(EpmError::FileRead { .. })
        ));
    }

    #[test]
    fn package_deploy_uses_bytecode_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("token.bin"), "6060604052\n").unwrap();
        let config = RunConfig {
            contracts_path: dir.path().to_path_buf(),
            ..Default::default()
        };
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let params = PackageDeployParams {
            source: "AA".into(),
            contract: "token.bin".into(),
            ..Default::default()
        };
        handler.package_deploy(&params, &scope).unwrap();

        assert!(handler.backend().compiled().is_empty());
        match &handler.backend().transactions()[0].tx {
            Transaction::Create { code, .. } => assert_eq!(code, "6060604052"),
            other => panic!("unexpected tx {:?}", other),
        }
    }

    #[test]
    fn permission_action_is_validated() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());
        let params = PermissionParams {
            source: "AA".into(),
            action: "grant_everything".into(),
            target: "BB".into(),
            ..Default::default()
        };
        assert!(matches!(
            handler.permission(&params, &scope),
            Err(EpmError::UnknownPermissionAction { .. })
        ));
    }

    #[test]
    fn query_account_selects_field() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let backend = MockBackend::new().with_account(
            "AA",
            json!({"balance": 1000, "permissions": {"base": {"perms": 2302}}, "code": "60"}),
        );
        let mut handler = ChainHandler::new(backend);

        let mut params = QueryAccountParams {
            account: "AA".into(),
            field: "balance".into(),
        };
        assert_eq!(handler.query_account(&params, &scope).unwrap(), "1000");

        params.field = "permissions.base.perms".into();
        assert_eq!(handler.query_account(&params, &scope).unwrap(), "2302");

        params.field = "code".into();
        assert_eq!(handler.query_account(&params, &scope).unwrap(), "60");

        params.field = "sequence".into();
        assert!(matches!(
            handler.query_account(&params, &scope),
            Err(EpmError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn query_name_selects_field() {
        let config = RunConfig::default();
        let completed = vec![completed("key", "greeting")];
        let scope = JobScope::new(&config, &completed);
        let backend =
            MockBackend::new().with_name("greeting", json!({"data": "hi", "owner": "AA"}));
        let mut handler = ChainHandler::new(backend);

        let mut params = QueryNameParams {
            name: "$key".into(),
            field: "data".into(),
        };
        assert_eq!(handler.query_name(&params, &scope).unwrap(), "hi");

        params.field = "expires".into();
        assert!(matches!(
            handler.query_name(&params, &scope),
            Err(EpmError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn query_name_unknown_name_fails() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let params = QueryNameParams {
            name: "nobody".into(),
            field: "data".into(),
        };
        assert!(matches!(
            handler.query_name(&params, &scope),
            Err(EpmError::Rpc { .. })
        ));
    }

    #[test]
    fn query_vals_indexes_arrays() {
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let backend = MockBackend::new()
            .with_validators(json!({"bonded_validators": [{"address": "V1"}]}));
        let mut handler = ChainHandler::new(backend);

        let params = QueryValsParams {
            field: "bonded_validators.0.address".into(),
            height: String::new(),
        };
        assert_eq!(handler.query_vals(&params, &scope).unwrap(), "V1");
    }

    #[test]
    fn dump_then_restore_state() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("dump.json").display().to_string();
        let config = RunConfig::default();
        let scope = JobScope::new(&config, &[]);
        let mut handler = ChainHandler::new(MockBackend::new());

        let dumped = handler
            .dump_state(&DumpStateParams { file: file.clone() }, &scope)
            .unwrap();
        assert_eq!(dumped, file);

        let restored = handler
            .restore_state(&RestoreStateParams { file }, &scope)
            .unwrap();
        assert_eq!(restored, "state restored");
    }

    #[test]
    fn assert_relations() {
        let config = RunConfig::default();
        let completed = vec![completed("limit", "100")];
        let scope = JobScope::new(&config, &completed);
        let mut handler = ChainHandler::new(MockBackend::new());

        let pass = AssertParams {
            key: "$limit".into(),
            relation: "ge".into(),
            value: "99".into(),
        };
        assert_eq!(handler.assert(&pass, &scope).unwrap(), ASSERT_PASSED);

        let default_eq = AssertParams {
            key: "$limit".into(),
            relation: String::new(),
            value: "100".into(),
        };
        assert_eq!(handler.assert(&default_eq, &scope).unwrap(), ASSERT_PASSED);

        let fail = AssertParams {
            key: "$limit".into(),
            relation: "<".into(),
            value: "50".into(),
        };
        assert!(matches!(
            handler.assert(&fail, &scope),
            Err(EpmError::AssertionFailed { .. })
        ));
    }

    #[test]
    fn string_relations() {
        assert!(Relation::Eq.holds("abc", "abc").unwrap());
        assert!(Relation::Ne.holds("abc", "abd").unwrap());
        assert!(matches!(
            Relation::Gt.holds("abc", "abd"),
            Err(EpmError::NotComparable { .. })
        ));
        assert!(matches!(
            "~=".parse::<Relation>(),
            Err(EpmError::UnknownRelation { .. })
        ));
    }

    #[test]
    fn select_field_whole_value() {
        let value = json!({"a": [1, 2]});
        assert_eq!(select_field(&value, "").unwrap(), r#"{"a":[1,2]}"#);
        assert_eq!(select_field(&value, "a.1").unwrap(), "2");
        assert!(select_field(&value, "a.9").is_err());
    }
}
