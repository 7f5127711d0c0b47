// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant namespace derivation.
//!
//! Organization tenants live in `default` (org 1) or `org-<id>`, cloud stacks
//! in `stacks-<id>`. The two forms never overlap.

use crate::constants::namespace::{DEFAULT_ORG, ORG_PREFIX, STACK_PREFIX};
use crate::error::{Error, Result};
use std::fmt;

/// A tenant namespace. Only constructible through the formatter, so a scoped
/// client can never be bound to an arbitrary string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Format the namespace of `tenant_id`, in organization mode if `org_mode` is set.
    pub fn format(tenant_id: i64, org_mode: bool) -> Self {
        if org_mode {
            Self::org(tenant_id)
        } else {
            Self::cloud(tenant_id)
        }
    }

    pub fn org(org_id: i64) -> Self {
        if org_id == 1 {
            Namespace(DEFAULT_ORG.to_string())
        } else {
            Namespace(format!("{}{}", ORG_PREFIX, org_id))
        }
    }

    pub fn cloud(stack_id: i64) -> Self {
        Namespace(format!("{}{}", STACK_PREFIX, stack_id))
    }

    /// Pick the namespace for a client configured with an org id and/or a stack id.
    ///
    /// The org id usually defaults to 1, so a positive stack id wins over it.
    pub fn for_client(org_id: i64, stack_id: i64) -> Result<Self> {
        if stack_id > 0 {
            Ok(Self::cloud(stack_id))
        } else if org_id > 0 {
            Ok(Self::org(org_id))
        } else {
            Err(Error::Config(
                "Expected either Grafana org ID (for local Grafana) or Grafana stack ID (for Grafana Cloud) to be set"
                    .to_string(),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Namespace {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
