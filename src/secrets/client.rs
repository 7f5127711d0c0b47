// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! JSON-over-HTTP client for keepers and secure values.

use crate::constants::secrets::{ACTIVATE, API_PATH, KEEPERS, SECURE_VALUES};
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::secrets::transport::{RetryingTransport, Transport};
use crate::secrets::types::{Keeper, SecureValue};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, Method, Request, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};
use url::Url;

const KEEPER: &str = "keeper";
const SECURE_VALUE: &str = "secure value";

pub struct SecretsClientBuilder {
    url: String,
    namespace: Namespace,
    token: Option<SecretString>,
    basic_auth: Option<(String, SecretString)>,
    transport: Option<Arc<dyn Transport>>,
    user_agent: Option<String>,
    default_headers: HashMap<String, String>,
}

impl SecretsClientBuilder {
    /// Bearer token. Takes precedence over basic auth when both are set.
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.basic_auth = Some((username.into(), password));
        self
    }

    /// Replace the default retrying transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Headers added to every request before the client's own headers.
    pub fn default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    pub fn build(self) -> Result<SecretsClient> {
        let base_url = Url::parse(&self.url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }

        let mut default_headers = HeaderMap::new();
        for (name, value) in parse_headers(&self.default_headers)? {
            default_headers.append(name, value);
        }

        let user_agent = self
            .user_agent
            .filter(|ua| !ua.is_empty())
            .map(|ua| HeaderValue::from_str(&ua))
            .transpose()
            .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?;

        let authorization = match (&self.token, &self.basic_auth) {
            (Some(token), _) => Some(format!("Bearer {}", token.expose_secret())),
            (None, Some((username, password))) => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", username, password.expose_secret()))
            )),
            (None, None) => None,
        }
        .map(|value| {
            HeaderValue::from_str(&value).map(|mut v| {
                v.set_sensitive(true);
                v
            })
        })
        .transpose()
        .map_err(|_| Error::Config("credentials contain invalid header characters".to_string()))?;

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(RetryingTransport::default()));

        Ok(SecretsClient {
            base_url,
            namespace: self.namespace,
            authorization,
            user_agent,
            default_headers,
            transport,
        })
    }
}

/// Client for the `secret.grafana.app` API.
///
/// All configuration is fixed at construction, so one instance can be shared
/// across tasks.
#[derive(Clone)]
pub struct SecretsClient {
    base_url: Url,
    namespace: Namespace,
    authorization: Option<HeaderValue>,
    user_agent: Option<HeaderValue>,
    default_headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for SecretsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretsClient")
            .field("base_url", &self.base_url.as_str())
            .field("namespace", &self.namespace)
            .field("authenticated", &self.authorization.is_some())
            .finish()
    }
}

/// Validate free-form header pairs.
pub(crate) fn parse_headers(
    headers: &HashMap<String, String>,
) -> Result<Vec<(HeaderName, HeaderValue)>> {
    headers
        .iter()
        .map(|(name, value)| {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid value for header {}: {}", name, e)))?;
            Ok((name, value))
        })
        .collect()
}

fn resource_path<'a>(
    namespace: &'a Namespace,
    resource: &'a str,
    name: Option<&'a str>,
    action: Option<&'a str>,
) -> Vec<&'a str> {
    let mut segments: Vec<&'a str> = API_PATH.to_vec();
    segments.extend(["namespaces", namespace.as_str(), resource]);
    segments.extend(name);
    segments.extend(action);
    segments
}

impl SecretsClient {
    /// Start building a client for the API at `url`, bound by default to `namespace`.
    pub fn builder(url: impl Into<String>, namespace: Namespace) -> SecretsClientBuilder {
        SecretsClientBuilder {
            url: url.into(),
            namespace,
            token: None,
            basic_auth: None,
            transport: None,
            user_agent: None,
            default_headers: HashMap::new(),
        }
    }

    /// The namespace this client was configured for.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::UrlParse(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Run one request and return the response if its status is 2xx.
    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<Response<Bytes>>
    where
        B: Serialize + ?Sized,
    {
        let body = match body {
            Some(body) => Bytes::from(serde_json::to_vec(body).map_err(Error::Marshal)?),
            None => Bytes::new(),
        };

        let url = self.url_for(segments)?;
        let mut request = Request::new(body);
        *request.method_mut() = method;
        *request.uri_mut() = url
            .as_str()
            .parse()
            .map_err(|e| Error::Config(format!("failed to create request: {}", e)))?;

        let headers = request.headers_mut();
        for (name, value) in &self.default_headers {
            headers.append(name.clone(), value.clone());
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(user_agent) = &self.user_agent {
            headers.insert(USER_AGENT, user_agent.clone());
        }
        if let Some(authorization) = &self.authorization {
            headers.insert(AUTHORIZATION, authorization.clone());
        }

        debug!("{} {}", request.method(), url.path());
        let response = self.transport.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: response.into_body(),
            });
        }
        Ok(response)
    }

    async fn request_json<B, R>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(method, segments, body).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(Error::Unmarshal(serde::de::Error::custom(
                "expected a response body, got 204 No Content",
            )));
        }
        serde_json::from_slice(response.body()).map_err(Error::Unmarshal)
    }

    #[instrument(skip(self, keeper), fields(namespace = %namespace, name = %keeper.metadata.name))]
    pub async fn create_keeper(&self, namespace: &Namespace, keeper: &Keeper) -> Result<Keeper> {
        let path = resource_path(namespace, KEEPERS, None, None);
        self.request_json(Method::POST, &path, Some(keeper))
            .await
            .map_err(|e| e.context("create", KEEPER, &keeper.metadata.name))
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn get_keeper(&self, namespace: &Namespace, name: &str) -> Result<Keeper> {
        let path = resource_path(namespace, KEEPERS, Some(name), None);
        self.request_json::<(), _>(Method::GET, &path, None)
            .await
            .map_err(|e| e.context("get", KEEPER, name))
    }

    #[instrument(skip(self, keeper), fields(namespace = %namespace))]
    pub async fn update_keeper(
        &self,
        namespace: &Namespace,
        name: &str,
        keeper: &Keeper,
    ) -> Result<Keeper> {
        let path = resource_path(namespace, KEEPERS, Some(name), None);
        self.request_json(Method::PUT, &path, Some(keeper))
            .await
            .map_err(|e| e.context("update", KEEPER, name))
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn delete_keeper(&self, namespace: &Namespace, name: &str) -> Result<()> {
        let path = resource_path(namespace, KEEPERS, Some(name), None);
        self.send::<()>(Method::DELETE, &path, None)
            .await
            .map(drop)
            .map_err(|e| e.context("delete", KEEPER, name))
    }

    /// Ask the server to make the keeper active. Whether the transition is
    /// legal is for the server to decide.
    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn activate_keeper(&self, namespace: &Namespace, name: &str) -> Result<()> {
        let path = resource_path(namespace, KEEPERS, Some(name), Some(ACTIVATE));
        self.send(Method::POST, &path, Some(&serde_json::Map::new()))
            .await
            .map(drop)
            .map_err(|e| e.context("activate", KEEPER, name))
    }

    #[instrument(skip(self, secure_value), fields(namespace = %namespace, name = %secure_value.metadata.name))]
    pub async fn create_secure_value(
        &self,
        namespace: &Namespace,
        secure_value: &SecureValue,
    ) -> Result<SecureValue> {
        let path = resource_path(namespace, SECURE_VALUES, None, None);
        self.request_json(Method::POST, &path, Some(secure_value))
            .await
            .map_err(|e| e.context("create", SECURE_VALUE, &secure_value.metadata.name))
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn get_secure_value(&self, namespace: &Namespace, name: &str) -> Result<SecureValue> {
        let path = resource_path(namespace, SECURE_VALUES, Some(name), None);
        self.request_json::<(), _>(Method::GET, &path, None)
            .await
            .map_err(|e| e.context("get", SECURE_VALUE, name))
    }

    /// Replace the secure value. There is no partial update.
    #[instrument(skip(self, secure_value), fields(namespace = %namespace))]
    pub async fn update_secure_value(
        &self,
        namespace: &Namespace,
        name: &str,
        secure_value: &SecureValue,
    ) -> Result<SecureValue> {
        let path = resource_path(namespace, SECURE_VALUES, Some(name), None);
        self.request_json(Method::PUT, &path, Some(secure_value))
            .await
            .map_err(|e| e.context("update", SECURE_VALUE, name))
    }

    #[instrument(skip(self), fields(namespace = %namespace))]
    pub async fn delete_secure_value(&self, namespace: &Namespace, name: &str) -> Result<()> {
        let path = resource_path(namespace, SECURE_VALUES, Some(name), None);
        self.send::<()>(Method::DELETE, &path, None)
            .await
            .map(drop)
            .map_err(|e| e.context("delete", SECURE_VALUE, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::types::{
        KeeperAws, KeeperSpec, ObjectMetadata, SecureValueSpec, SecureValueStatus,
    };
    use crate::test_utils::MockTransport;

    const BASE: &str = "http://localhost:3000";
    const KEEPERS_PATH: &str = "/apis/secret.grafana.app/v1beta1/namespaces/org-5/keepers";
    const SECURE_VALUES_PATH: &str = "/apis/secret.grafana.app/v1beta1/namespaces/org-5/securevalues";

    fn make_client(transport: &MockTransport) -> SecretsClient {
        SecretsClient::builder(BASE, Namespace::org(5))
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap()
    }

    fn aws_keeper() -> Keeper {
        Keeper {
            metadata: ObjectMetadata::named("aws1"),
            spec: KeeperSpec {
                keeper_type: Some("aws".to_string()),
                aws: Some(KeeperAws {
                    region: "us-east-1".to_string(),
                    assume_role: None,
                }),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(
            &self,
            _serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot encode"))
        }
    }

    #[tokio::test]
    async fn test_create_keeper_echo() {
        let keeper = aws_keeper();
        let echo = serde_json::to_string(&keeper).unwrap();
        let transport = MockTransport::new().on("POST", KEEPERS_PATH, 201, &echo);
        let client = make_client(&transport);

        let created = client.create_keeper(&Namespace::org(5), &keeper).await.unwrap();

        assert_eq!(created, keeper);
        let request = &transport.requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(request.json(), serde_json::to_value(&keeper).unwrap());
    }

    #[tokio::test]
    async fn test_get_secure_value_not_found_keeps_raw_body() {
        let body = r#"{"message":"not found"}"#;
        let transport = MockTransport::new().on("GET", &format!("{}/db", SECURE_VALUES_PATH), 404, body);
        let client = make_client(&transport);

        let err = client
            .get_secure_value(&Namespace::org(5), "db")
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains(body));
        assert!(text.starts_with("failed to get secure value \"db\""));
        assert!(matches!(err.root(), Error::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_delete_keeper_no_content() {
        let transport = MockTransport::new().on("DELETE", &format!("{}/aws1", KEEPERS_PATH), 204, "");
        let client = make_client(&transport);

        client.delete_keeper(&Namespace::org(5), "aws1").await.unwrap();

        assert!(transport.requests()[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_activate_keeper_posts_empty_object() {
        let path = format!("{}/aws1/activate", KEEPERS_PATH);
        let transport = MockTransport::new().on("POST", &path, 200, r#"{"status":"ok"}"#);
        let client = make_client(&transport);

        client.activate_keeper(&Namespace::org(5), "aws1").await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.path, path);
        assert_eq!(request.json(), serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_update_secure_value_replaces_whole_object() {
        let path = format!("{}/db", SECURE_VALUES_PATH);
        let sv = SecureValue {
            metadata: ObjectMetadata::named("db"),
            spec: SecureValueSpec {
                value: Some("hunter2".to_string()),
                decrypters: vec!["grafana".to_string()],
                ..Default::default()
            },
            status: SecureValueStatus {
                keeper: "aws1".to_string(),
            },
            ..Default::default()
        };
        let transport = MockTransport::new().on("PUT", &path, 200, &serde_json::to_string(&sv).unwrap());
        let client = make_client(&transport);

        let updated = client
            .update_secure_value(&Namespace::org(5), "db", &sv)
            .await
            .unwrap();

        assert_eq!(updated.status.keeper, "aws1");
        assert_eq!(transport.requests()[0].method, "PUT");
    }

    #[tokio::test]
    async fn test_marshal_failure_sends_nothing() {
        let transport = MockTransport::new();
        let client = make_client(&transport);
        let namespace = Namespace::org(5);
        let path = resource_path(&namespace, KEEPERS, None, None);

        let err = client
            .send(Method::POST, &path, Some(&Unserializable))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Marshal(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_never_decoded() {
        let echo = serde_json::to_string(&aws_keeper()).unwrap();
        let transport = MockTransport::new().on("GET", &format!("{}/aws1", KEEPERS_PATH), 400, &echo);
        let client = make_client(&transport);

        let err = client.get_keeper(&Namespace::org(5), "aws1").await.unwrap_err();

        assert!(matches!(err.root(), Error::HttpStatus { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_error_body_is_kept_raw() {
        let body = Bytes::from_static(b"upstream \xff\xfe failure");
        let transport = MockTransport::new().on_raw(
            "GET",
            &format!("{}/aws1", KEEPERS_PATH),
            502,
            body.clone(),
        );
        let client = make_client(&transport);

        let err = client.get_keeper(&Namespace::org(5), "aws1").await.unwrap_err();

        match err.root() {
            Error::HttpStatus { status, body: raw } => {
                assert_eq!(*status, 502);
                assert_eq!(raw, &body);
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_body_is_unmarshal_error() {
        let transport = MockTransport::new().on("GET", &format!("{}/aws1", KEEPERS_PATH), 200, "<html>");
        let client = make_client(&transport);

        let err = client.get_keeper(&Namespace::org(5), "aws1").await.unwrap_err();

        assert!(matches!(err.root(), Error::Unmarshal(_)));
    }

    #[tokio::test]
    async fn test_no_content_when_body_expected_is_unmarshal_error() {
        let transport = MockTransport::new().on("POST", KEEPERS_PATH, 204, "");
        let client = make_client(&transport);

        let err = client
            .create_keeper(&Namespace::org(5), &aws_keeper())
            .await
            .unwrap_err();

        assert!(matches!(err.root(), Error::Unmarshal(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_wrapped() {
        let client = make_client(&MockTransport::new());

        let err = client.get_keeper(&Namespace::org(5), "aws1").await.unwrap_err();

        assert!(matches!(err.root(), Error::Transport(_)));
        assert!(err.to_string().starts_with("failed to get keeper \"aws1\""));
    }

    #[tokio::test]
    async fn test_bearer_wins_over_basic_auth() {
        let transport = MockTransport::new().on("DELETE", &format!("{}/aws1", KEEPERS_PATH), 204, "");
        let client = SecretsClient::builder(BASE, Namespace::org(5))
            .basic_auth("admin", SecretString::from("admin".to_string()))
            .token(SecretString::from("glsa_abc".to_string()))
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap();

        client.delete_keeper(&Namespace::org(5), "aws1").await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer glsa_abc");
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[tokio::test]
    async fn test_basic_auth_without_token() {
        let transport = MockTransport::new().on("DELETE", &format!("{}/aws1", KEEPERS_PATH), 204, "");
        let client = SecretsClient::builder(BASE, Namespace::org(5))
            .basic_auth("admin", SecretString::from("secret".to_string()))
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap();

        client.delete_keeper(&Namespace::org(5), "aws1").await.unwrap();

        assert_eq!(
            transport.requests()[0].headers.get(AUTHORIZATION).unwrap(),
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[tokio::test]
    async fn test_anonymous_sends_no_authorization() {
        let transport = MockTransport::new().on("DELETE", &format!("{}/aws1", KEEPERS_PATH), 204, "");
        let client = make_client(&transport);

        client.delete_keeper(&Namespace::org(5), "aws1").await.unwrap();

        assert!(transport.requests()[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_header_order() {
        let transport = MockTransport::new().on("DELETE", &format!("{}/aws1", KEEPERS_PATH), 204, "");
        let client = SecretsClient::builder(BASE, Namespace::org(5))
            .default_headers(HashMap::from([
                ("Content-Type".to_string(), "text/plain".to_string()),
                ("X-Tenant".to_string(), "blue".to_string()),
            ]))
            .user_agent("tenant-resources/0.1")
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap();

        client.delete_keeper(&Namespace::org(5), "aws1").await.unwrap();

        let headers = &transport.requests()[0].headers;
        assert_eq!(headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get("x-tenant").unwrap(), "blue");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "tenant-resources/0.1");
    }

    #[tokio::test]
    async fn test_base_path_and_names_are_joined_per_segment() {
        let path = "/grafana/apis/secret.grafana.app/v1beta1/namespaces/stacks-9/keepers/a%2Fb";
        let transport = MockTransport::new().on("DELETE", path, 204, "");
        let client = SecretsClient::builder("http://localhost:3000/grafana/", Namespace::cloud(9))
            .transport(Arc::new(transport.clone()))
            .build()
            .unwrap();

        client.delete_keeper(client.namespace(), "a/b").await.unwrap();

        assert_eq!(transport.requests()[0].path, path);
    }

    #[test]
    fn test_malformed_url_fails_construction() {
        let err = SecretsClient::builder("not a url", Namespace::org(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));

        let err = SecretsClient::builder("mailto:ops@example.com", Namespace::org(1))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));
    }

    #[test]
    fn test_invalid_default_header_fails_construction() {
        let err = SecretsClient::builder(BASE, Namespace::org(1))
            .default_headers(HashMap::from([("bad header".to_string(), "x".to_string())]))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
