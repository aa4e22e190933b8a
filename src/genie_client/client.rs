use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Result;
use crate::error::{ConfigError, Error, GenieError};

use super::api::{ApiErrorBody, Envelope, body_preview};

const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct GenieClient {
    http: reqwest::Client,
    base: Url,
}

impl GenieClient {
    /// Build a `GenieClient` authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not HTTPS while `insecure_http` is
    /// off, if the key cannot be sent as a header, or if the underlying HTTP
    /// client fails to build.
    pub fn new(
        base: Url,
        api_key: &SecretString,
        timeout: Duration,
        connect_timeout: Duration,
        insecure_http: bool,
    ) -> Result<Self> {
        if base.scheme() != "https" && !insecure_http {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "opsgenie.url",
                message: "only https URLs are accepted without --insecure".to_string(),
            }));
        }
        if base.cannot_be_a_base() {
            return Err(Error::Config(ConfigError::InvalidField {
                field: "opsgenie.url",
                message: "URL cannot be used as a base".to_string(),
            }));
        }

        let mut auth = HeaderValue::from_str(&format!("GenieKey {}", api_key.expose_secret()))
            .map_err(|err| ConfigError::InvalidField {
                field: "opsgenie.api_key",
                message: err.to_string(),
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .user_agent(concat!("genie-datasource/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30));

        if !insecure_http {
            builder = builder.https_only(true);
        }

        let http = builder
            .build()
            .map_err(|err| GenieError::Client { source: err })?;

        Ok(Self { http, base })
    }

    fn endpoint(&self, segments: &[&str], query: &[(&'static str, String)]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GenieError::Path(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// GET an endpoint and return the `data` member of its body.
    ///
    /// One request per call: failures go straight back to the caller.
    pub(super) async fn get<T>(
        &self,
        segments: &[&str],
        query: &[(&'static str, String)],
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.endpoint(segments, query)?;
        let path = url.path().to_string();
        let correlation_id = Uuid::now_v7().to_string();
        let started = Instant::now();

        match self.send::<T>(&url, &correlation_id).await {
            Ok((data, request_id)) => {
                debug!(
                    %path,
                    %correlation_id,
                    request_id = request_id.as_deref().unwrap_or("-"),
                    latency_ms = started.elapsed().as_millis(),
                    "opsgenie call succeeded"
                );
                Ok(data)
            }
            Err(err) => {
                debug!(
                    %path,
                    %correlation_id,
                    latency_ms = started.elapsed().as_millis(),
                    error = %err,
                    "opsgenie call failed"
                );
                Err(err.into())
            }
        }
    }

    async fn send<T>(
        &self,
        url: &Url,
        correlation_id: &str,
    ) -> std::result::Result<(T, Option<String>), GenieError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .http
            .get(url.clone())
            .header(CORRELATION_HEADER, correlation_id)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ApiErrorBody>(&body) {
                Ok(api) if status.is_client_error() => GenieError::Api {
                    status,
                    message: api.describe(),
                },
                _ => GenieError::HttpStatus { status },
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_slice(&body).map_err(|err| GenieError::Json {
                message: format!(
                    "error decoding response body: {err}; body preview: {}",
                    body_preview(&body)
                ),
            })?;

        envelope
            .data
            .map(|data| (data, envelope.request_id))
            .ok_or(GenieError::MissingField { field: "data" })
    }
}

#[cfg(test)]
mod tests {
    use super::GenieClient;
    use secrecy::SecretString;
    use std::time::Duration;
    use url::Url;

    fn client(base: &str, insecure: bool) -> crate::Result<GenieClient> {
        let base = match Url::parse(base) {
            Ok(url) => url,
            Err(err) => panic!("bad fixture url: {err}"),
        };
        GenieClient::new(
            base,
            &SecretString::from("key"),
            Duration::from_secs(1),
            Duration::from_secs(1),
            insecure,
        )
    }

    #[test]
    fn plain_http_requires_insecure_flag() {
        assert!(client("http://localhost:8080", false).is_err());
        assert!(client("http://localhost:8080", true).is_ok());
    }

    #[test]
    fn endpoint_encodes_path_segments_and_query() {
        let client = match client("https://api.opsgenie.com/", false) {
            Ok(client) => client,
            Err(err) => panic!("client: {err}"),
        };
        let url = match client.endpoint(
            &["v1", "incidents", "a/b", "associated-alert-ids"],
            &[("identifierType", "id".to_string())],
        ) {
            Ok(url) => url,
            Err(err) => panic!("endpoint: {err}"),
        };
        assert_eq!(
            url.as_str(),
            "https://api.opsgenie.com/v1/incidents/a%2Fb/associated-alert-ids?identifierType=id"
        );
    }
}
