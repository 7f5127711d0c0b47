// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace prefixes used by the namespace formatter
pub mod namespace {
    /// Namespace of the default organization (org id 1)
    pub const DEFAULT_ORG: &str = "default";
    pub const ORG_PREFIX: &str = "org-";
    pub const STACK_PREFIX: &str = "stacks-";
}

/// Secrets API wire constants
pub mod secrets {
    /// API group and version, as path segments
    pub const API_PATH: [&str; 3] = ["apis", "secret.grafana.app", "v1beta1"];
    pub const KEEPERS: &str = "keepers";
    pub const SECURE_VALUES: &str = "securevalues";
    pub const ACTIVATE: &str = "activate";
}

/// Default HTTP transport policy
pub mod transport {
    /// Retries after the first attempt
    pub const DEFAULT_RETRIES: u32 = 3;
    /// Overall deadline for one call, retries included
    pub const DEFAULT_TIMEOUT_SECS: u64 = 90;
    pub const RETRY_WAIT_MIN_MILLIS: u64 = 1_000;
    pub const RETRY_WAIT_MAX_MILLIS: u64 = 30_000;
}

/// Environment variables read by `Config::from_env`
pub mod env {
    pub const URL: &str = "GRAFANA_URL";
    pub const AUTH: &str = "GRAFANA_AUTH";
    pub const ORG_ID: &str = "GRAFANA_ORG_ID";
    pub const STACK_ID: &str = "GRAFANA_STACK_ID";
    pub const HTTP_HEADERS: &str = "GRAFANA_HTTP_HEADERS";
    pub const USER_AGENT: &str = "GRAFANA_USER_AGENT";
}
