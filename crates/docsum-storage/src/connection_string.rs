//! Azure Storage connection string parsing
//!
//! Connection strings are `;`-separated `Key=Value` pairs, e.g.
//! `DefaultEndpointsProtocol=https;AccountName=acct;AccountKey=...;EndpointSuffix=core.windows.net`.
//! Values may themselves contain `=` (base64 keys, SAS tokens), so each pair is split
//! on its first `=` only.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::traits::{StorageError, StorageResult};

const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";
const EMULATOR_ACCOUNT: &str = "devstoreaccount1";
const EMULATOR_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// How requests to the account are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageCredential {
    AccountKey(String),
    SharedAccessSignature(String),
    /// Well-known development key, handled by the emulator settings of the client.
    Emulator,
}

/// Parsed Azure Storage connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    pub credential: StorageCredential,
    pub protocol: String,
    pub endpoint_suffix: String,
    /// Explicit `BlobEndpoint`, overriding the account-derived endpoint.
    pub blob_endpoint: Option<String>,
}

impl ConnectionString {
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("UseDevelopmentStorage=true")
            || raw.eq_ignore_ascii_case("UseDevelopmentStorage=true;")
        {
            return Ok(Self::emulator());
        }

        let mut account_name = None;
        let mut account_key = None;
        let mut sas = None;
        let mut protocol = None;
        let mut endpoint_suffix = None;
        let mut blob_endpoint = None;

        for pair in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                StorageError::ConfigError(
                    "Malformed connection string segment (expected Key=Value)".to_string(),
                )
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => account_name = Some(value),
                "accountkey" => account_key = Some(value),
                "sharedaccesssignature" => sas = Some(value),
                "defaultendpointsprotocol" => protocol = Some(value.to_ascii_lowercase()),
                "endpointsuffix" => endpoint_suffix = Some(value),
                "blobendpoint" => blob_endpoint = Some(value.trim_end_matches('/').to_string()),
                "usedevelopmentstorage" if value.eq_ignore_ascii_case("true") => {
                    return Ok(Self::emulator());
                }
                // Queue/Table/File endpoints and unknown keys are irrelevant here.
                _ => {}
            }
        }

        let account_name = account_name.filter(|s| !s.is_empty()).ok_or_else(|| {
            StorageError::ConfigError("Connection string is missing AccountName".to_string())
        })?;

        let credential = match (account_key, sas) {
            (Some(key), _) if !key.is_empty() => StorageCredential::AccountKey(key),
            (_, Some(sas)) if !sas.is_empty() => {
                StorageCredential::SharedAccessSignature(sas.trim_start_matches('?').to_string())
            }
            _ => {
                return Err(StorageError::ConfigError(
                    "Connection string needs AccountKey or SharedAccessSignature".to_string(),
                ))
            }
        };

        let protocol = protocol.unwrap_or_else(|| "https".to_string());
        if protocol != "https" && protocol != "http" {
            return Err(StorageError::ConfigError(format!(
                "Unsupported DefaultEndpointsProtocol: {}",
                protocol
            )));
        }

        Ok(ConnectionString {
            account_name,
            credential,
            protocol,
            endpoint_suffix: endpoint_suffix.unwrap_or_else(|| DEFAULT_ENDPOINT_SUFFIX.to_string()),
            blob_endpoint,
        })
    }

    fn emulator() -> Self {
        ConnectionString {
            account_name: EMULATOR_ACCOUNT.to_string(),
            credential: StorageCredential::Emulator,
            protocol: "http".to_string(),
            endpoint_suffix: DEFAULT_ENDPOINT_SUFFIX.to_string(),
            blob_endpoint: Some(EMULATOR_BLOB_ENDPOINT.to_string()),
        }
    }

    pub fn is_emulator(&self) -> bool {
        self.credential == StorageCredential::Emulator
    }

    /// Base URL of the blob service, without a trailing slash.
    pub fn blob_service_url(&self) -> String {
        match &self.blob_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "{}://{}.blob.{}",
                self.protocol, self.account_name, self.endpoint_suffix
            ),
        }
    }

    /// Raw SAS token (without the leading `?`) when the account is authorized by SAS.
    pub fn sas_token(&self) -> Option<&str> {
        match &self.credential {
            StorageCredential::SharedAccessSignature(sas) => Some(sas),
            _ => None,
        }
    }

    /// SAS token split into query pairs, as the Azure client expects them.
    pub fn sas_query_pairs(&self) -> Option<Vec<(String, String)>> {
        match &self.credential {
            StorageCredential::SharedAccessSignature(sas) => Some(
                sas.split('&')
                    .filter(|p| !p.is_empty())
                    .map(|pair| match pair.split_once('=') {
                        Some((k, v)) => (
                            k.to_string(),
                            urlencoding::decode(v)
                                .map(|v| v.into_owned())
                                .unwrap_or_else(|_| v.to_string()),
                        ),
                        None => (pair.to_string(), String::new()),
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

// Secrets never reach logs or test output.
impl Debug for StorageCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageCredential::AccountKey(_) => f.write_str("AccountKey(<redacted>)"),
            StorageCredential::SharedAccessSignature(_) => {
                f.write_str("SharedAccessSignature(<redacted>)")
            }
            StorageCredential::Emulator => f.write_str("Emulator"),
        }
    }
}

impl Debug for ConnectionString {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("credential", &self.credential)
            .field("blob_service_url", &self.blob_service_url())
            .finish()
    }
}
