//! Run configuration
//!
//! Resolved run-level defaults shared by every job. Built once by the
//! binary from command-line flags, then only read: default job injection
//! copies values out of it, handlers and post-processing borrow it.

use std::path::PathBuf;

use url::Url;

use crate::error::EpmError;

/// Report format written after a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
    /// Any other selector: no report file
    #[default]
    None,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        if s.eq_ignore_ascii_case("csv") {
            Self::Csv
        } else if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::None
        }
    }
}

/// Endpoints of the three backend services
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoints {
    pub chain: Url,
    pub signer: Url,
    pub compiler: Url,
}

impl Endpoints {
    pub fn new(chain: &str, signer: &str, compiler: &str) -> Result<Self, EpmError> {
        Ok(Self {
            chain: normalize_endpoint(chain)?,
            signer: normalize_endpoint(signer)?,
            compiler: normalize_endpoint(compiler)?,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        let local = |port: u16| {
            Url::parse(&format!("http://localhost:{}/", port)).expect("literal localhost URL")
        };
        Self {
            chain: local(46657),
            signer: local(4767),
            compiler: local(8091),
        }
    }
}

/// Settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding contract sources and bytecode files
    pub contracts_path: PathBuf,
    /// Directory ABIs are written to after deployment
    pub abi_path: PathBuf,
    pub endpoints: Endpoints,
    pub chain_id: String,

    pub default_gas: u64,
    pub default_fee: u64,
    pub default_amount: u64,

    /// Signing address override; empty means unset
    pub default_addr: String,
    /// `name=value` assignments turned into Set jobs
    pub default_sets: Vec<String>,

    pub output: OutputFormat,
    pub summary_table: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            contracts_path: PathBuf::from("./contracts"),
            abi_path: PathBuf::from("./abi"),
            endpoints: Endpoints::default(),
            chain_id: String::new(),
            default_gas: 1_111_111_111,
            default_fee: 1234,
            default_amount: 9999,
            default_addr: String::new(),
            default_sets: Vec::new(),
            output: OutputFormat::None,
            summary_table: false,
        }
    }
}

/// Turn `host:port` or a full URL into a URL, adding `http://` when no
/// scheme is given
pub fn normalize_endpoint(endpoint: &str) -> Result<Url, EpmError> {
    let trimmed = endpoint.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate).map_err(|e| EpmError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().is_none() {
        return Err(EpmError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(url)
}
