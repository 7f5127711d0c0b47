// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use bytes::Bytes;
use thiserror::Error;

/// Boxed error produced by an HTTP transport.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to parse secrets API url: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("failed to marshal request body: {0}")]
    Marshal(#[source] serde_json::Error),

    #[error("failed to unmarshal response body: {0}")]
    Unmarshal(#[source] serde_json::Error),

    #[error("failed to do request: {0}")]
    Transport(#[source] BoxError),

    /// Non-2xx response. `body` holds the raw response bytes, unparsed.
    #[error("status: {status} body: {}", String::from_utf8_lossy(.body))]
    HttpStatus { status: u16, body: Bytes },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("no client registered for kind {0:?}")]
    UnregisteredKind(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),

    #[error("watch error: {0}")]
    Watch(String),

    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to {action} {kind} {name:?}: {source}")]
    Resource {
        action: &'static str,
        kind: String,
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    /// Wrap this error with the action, kind and name of the resource it concerns.
    pub fn context(
        self,
        action: &'static str,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Error::Resource {
            action,
            kind: kind.into(),
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any `Resource` wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Resource { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Error::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.root(), Error::Conflict(_))
    }

    /// HTTP status carried by the root cause, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::NotFound(_) => Some(404),
            Error::Conflict(_) => Some(409),
            Error::Kube(kube::Error::Api(resp)) => Some(resp.code),
            _ => None,
        }
    }
}

impl From<kube::Error> for Error {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => Error::NotFound(resp.message),
            kube::Error::Api(resp) if resp.code == 409 => Error::Conflict(resp.message),
            other => Error::Kube(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
