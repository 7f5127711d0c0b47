// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::env;
use crate::error::Error;
use crate::namespace::Namespace;
use crate::secrets::client::parse_headers;
use crate::secrets::SecretsClient;
use anyhow::{bail, Context, Result};
use http::header::{HeaderValue, USER_AGENT};
use secrecy::SecretString;
use std::collections::HashMap;

const ANONYMOUS: &str = "anonymous";

/// How requests to the API server authenticate
#[derive(Debug)]
pub enum Credentials {
    Anonymous,
    Token(SecretString),
    Basic { username: String, password: SecretString },
}

impl Credentials {
    /// `user:pass` is basic auth, `anonymous` (or nothing) means no credentials,
    /// anything else is an API token.
    pub fn parse(auth: &str) -> Self {
        if auth.is_empty() || auth == ANONYMOUS {
            return Credentials::Anonymous;
        }
        match auth.split_once(':') {
            Some((username, password)) => Credentials::Basic {
                username: username.to_string(),
                password: SecretString::from(password.to_string()),
            },
            None => Credentials::Token(SecretString::from(auth.to_string())),
        }
    }
}

/// Client configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    pub url: String,
    pub credentials: Credentials,
    pub org_id: Option<i64>,
    pub stack_id: Option<i64>,
    /// Extra headers sent with every request
    pub http_headers: HashMap<String, String>,
    pub user_agent: Option<String>,
}

fn parse_id(name: &str, value: Option<String>) -> Result<Option<i64>> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            v.trim()
                .parse::<i64>()
                .with_context(|| format!("{} must be an integer, got {:?}", name, v))
        })
        .transpose()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(env::URL)
            .filter(|v| !v.is_empty())
            .with_context(|| format!("{} environment variable not set", env::URL))?;
        let credentials = Credentials::parse(&lookup(env::AUTH).unwrap_or_default());
        let org_id = parse_id(env::ORG_ID, lookup(env::ORG_ID))?;
        let stack_id = parse_id(env::STACK_ID, lookup(env::STACK_ID))?;

        if matches!(credentials, Credentials::Token(_)) && org_id.is_some_and(|id| id > 1) {
            bail!("org_id is only supported with basic auth. API keys are already org-scoped");
        }

        let http_headers = match lookup(env::HTTP_HEADERS).filter(|v| !v.is_empty()) {
            Some(raw) => serde_json::from_str(&raw).with_context(|| {
                format!("{} must be a JSON object of strings", env::HTTP_HEADERS)
            })?,
            None => HashMap::new(),
        };

        Ok(Config {
            url,
            credentials,
            org_id,
            stack_id,
            http_headers,
            user_agent: lookup(env::USER_AGENT).filter(|v| !v.is_empty()),
        })
    }

    /// The tenant namespace this configuration targets. A stack id wins over an org id.
    pub fn namespace(&self) -> crate::error::Result<Namespace> {
        Namespace::for_client(self.org_id.unwrap_or(1), self.stack_id.unwrap_or(0))
    }

    /// Build a secrets client bound to [`Config::namespace`].
    pub fn secrets_client(&self) -> crate::error::Result<SecretsClient> {
        let mut builder = SecretsClient::builder(self.url.clone(), self.namespace()?)
            .default_headers(self.http_headers.clone());
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        builder = match &self.credentials {
            Credentials::Anonymous => builder,
            Credentials::Token(token) => builder.token(token.clone()),
            Credentials::Basic { username, password } => {
                builder.basic_auth(username.clone(), password.clone())
            }
        };
        builder.build()
    }

    /// Object-model client settings for the configured API server, tenant
    /// namespace and credentials.
    pub fn kube_config(&self) -> crate::error::Result<kube::Config> {
        let cluster_url = self
            .url
            .parse::<http::Uri>()
            .map_err(|e| Error::Config(format!("invalid {} {:?}: {}", env::URL, self.url, e)))?;

        let mut config = kube::Config::new(cluster_url);
        config.default_namespace = self.namespace()?.to_string();
        match &self.credentials {
            Credentials::Anonymous => {}
            Credentials::Token(token) => config.auth_info.token = Some(token.clone()),
            Credentials::Basic { username, password } => {
                config.auth_info.username = Some(username.clone());
                config.auth_info.password = Some(password.clone());
            }
        }

        config.headers = parse_headers(&self.http_headers)?;
        if let Some(user_agent) = &self.user_agent {
            let value = HeaderValue::from_str(user_agent)
                .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?;
            config.headers.push((USER_AGENT, value));
        }
        Ok(config)
    }

    /// Build the object-model client used by the resource registry.
    pub fn kube_client(&self) -> crate::error::Result<kube::Client> {
        Ok(kube::Client::try_from(self.kube_config()?)?)
    }
}
