// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Wire types of the secrets API. Field names are part of the wire contract.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl ObjectMetadata {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
        }
    }
}

/// A secret-storage backend.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Keeper {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMetadata,
    #[serde(default)]
    pub spec: KeeperSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeeperSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub keeper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<KeeperAws>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KeeperAws {
    #[serde(default)]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assume_role: Option<KeeperAwsAssumeRole>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeeperAwsAssumeRole {
    #[serde(rename = "assumeRoleArn", default)]
    pub assume_role_arn: String,
    #[serde(rename = "externalID", default)]
    pub external_id: String,
}

/// A secret value, or a reference to one, stored by a keeper.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecureValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub metadata: ObjectMetadata,
    #[serde(default)]
    pub spec: SecureValueSpec,
    #[serde(default)]
    pub status: SecureValueStatus,
}

#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SecureValueSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Identities allowed to decrypt the value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decrypters: Vec<String>,
}

impl fmt::Debug for SecureValueSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureValueSpec")
            .field("description", &self.description)
            .field("value", &self.value.as_ref().map(|_| "[REDACTED]"))
            .field("reference", &self.reference)
            .field("decrypters", &self.decrypters)
            .finish()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SecureValueStatus {
    /// Name of the keeper holding the value
    #[serde(default)]
    pub keeper: String,
}
