use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const CHAIN_NAME_MIN_LEN: usize = 3;
pub const CHAIN_NAME_MAX_LEN: usize = 30;

/// A chain name that is safe to embed in remote shell commands.
///
/// Only lowercase ASCII letters, digits and inner hyphens are accepted, so a
/// `ChainName` can never carry shell metacharacters, whitespace or a leading
/// `-` that a remote tool would read as an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChainName(String);

impl ChainName {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match check(raw) {
            None => Ok(Self(raw.to_string())),
            Some(reason) => Err(CoreError::InvalidChainName(reason.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns the first rule the name breaks, worded for the submitter.
pub(crate) fn check(raw: &str) -> Option<&'static str> {
    if raw.is_empty() {
        return Some("Chain name is required");
    }
    if !raw
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Some("Chain name can only contain lowercase letters, numbers, and hyphens");
    }
    if raw.len() < CHAIN_NAME_MIN_LEN || raw.len() > CHAIN_NAME_MAX_LEN {
        return Some("Chain name must be 3-30 characters");
    }
    if raw.starts_with('-') || raw.ends_with('-') {
        return Some("Chain name cannot start or end with a hyphen");
    }
    None
}

impl fmt::Display for ChainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChainName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ChainName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        ChainName::parse(&raw).map_err(serde::de::Error::custom)
    }
}
