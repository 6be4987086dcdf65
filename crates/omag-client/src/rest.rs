use std::time::Duration;

use omag_core::OmagError;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic connector to an OMAG server platform.
///
/// Request URLs are built from templates whose `{}` segments are filled, in order,
/// from the supplied parameters. Each parameter is percent-encoded as a single path
/// segment, so server names and qualified names may contain `/`, spaces or `#`.
///
/// Failures reported by the platform come back as [`OmagError::Remote`] carrying the
/// exception class, status code and parameter name from the FFDC response body.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    platform_url: Url,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl RestClient {
    pub fn new(platform_url: &str) -> Result<Self, OmagError> {
        Self::with_timeout(platform_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(platform_url: &str, timeout: Duration) -> Result<Self, OmagError> {
        let parsed = Url::parse(platform_url).map_err(|e| {
            OmagError::invalid_parameter("platform_url", format!("'{platform_url}': {e}"))
        })?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(OmagError::invalid_parameter(
                "platform_url",
                format!("'{platform_url}' is not an http(s) URL"),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("omag-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| OmagError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            platform_url: parsed,
            api_key: None,
            timeout_secs: timeout.as_secs(),
        })
    }

    /// Send the platform API key as a bearer token on every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn platform_url(&self) -> &str {
        self.platform_url.as_str().trim_end_matches('/')
    }

    /// Fill `template` with `params` and append `query`.
    pub fn url(
        &self,
        template: &str,
        params: &[&str],
        query: &[(&str, String)],
    ) -> Result<Url, OmagError> {
        let mut url = self.platform_url.clone();
        let mut params = params.iter();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                OmagError::invalid_parameter("platform_url", "the platform URL cannot take a path")
            })?;
            segments.pop_if_empty();
            for segment in template.split('/').filter(|s| !s.is_empty()) {
                if segment != "{}" {
                    segments.push(segment);
                    continue;
                }
                let value = params.next().ok_or_else(|| {
                    OmagError::invalid_parameter(
                        "url_template",
                        format!("not enough parameters for {template}"),
                    )
                })?;
                if value.trim().is_empty() {
                    return Err(OmagError::invalid_parameter(
                        "url_template",
                        format!("empty path parameter for {template}"),
                    ));
                }
                // `.` and `..` are dropped when pushed, which would shift the route.
                if matches!(*value, "." | "..") {
                    return Err(OmagError::invalid_parameter(
                        "url_template",
                        format!("'{value}' cannot be sent as a path parameter of {template}"),
                    ));
                }
                segments.push(value);
            }
        }
        if params.next().is_some() {
            return Err(OmagError::invalid_parameter(
                "url_template",
                format!("too many parameters for {template}"),
            ));
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    pub async fn get<R: DeserializeOwned>(&self, url: Url) -> Result<R, OmagError> {
        self.send(Method::GET, url, None::<&()>).await
    }

    pub async fn post<B, R>(&self, url: Url, body: Option<&B>) -> Result<R, OmagError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::POST, url, body).await
    }

    pub async fn put<B, R>(&self, url: Url, body: &B) -> Result<R, OmagError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.send(Method::PUT, url, Some(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, url: Url) -> Result<R, OmagError> {
        self.send(Method::DELETE, url, None::<&()>).await
    }

    async fn send<B, R>(&self, method: Method, url: Url, body: Option<&B>) -> Result<R, OmagError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        tracing::debug!(%method, %url, "Calling OMAG platform");
        let mut request: RequestBuilder = self.client.request(method, url.clone());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                OmagError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                OmagError::NetworkError(format!("Connection to {url} failed: {e}"))
            } else {
                OmagError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_body(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| OmagError::HttpError(format!("Failed to parse response from {url}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Response bodies shared by the service clients
// ---------------------------------------------------------------------------

/// Body of a request that returns nothing but its status.
pub(crate) type Void = serde::de::IgnoredAny;

#[derive(Deserialize)]
pub(crate) struct GuidResponse {
    pub guid: uuid::Uuid,
}

#[derive(Deserialize)]
pub(crate) struct ElementResponse<T> {
    pub element: T,
}

#[derive(Deserialize)]
pub(crate) struct ElementsResponse<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

#[derive(Deserialize)]
pub(crate) struct ServerListResponse {
    pub server_list: Vec<String>,
}

#[derive(Deserialize)]
struct FfdcResponse {
    message: String,
    related_http_code: Option<u16>,
    exception_class_name: String,
    #[serde(default)]
    parameter_name: Option<String>,
}

/// Rebuild the platform's error from a failed response.
fn error_from_body(status: u16, body: &str) -> OmagError {
    match serde_json::from_str::<FfdcResponse>(body) {
        Ok(ffdc) => OmagError::Remote {
            http_code: ffdc.related_http_code.unwrap_or(status),
            exception_class_name: ffdc.exception_class_name,
            parameter_name: ffdc.parameter_name,
            message: ffdc.message,
        },
        Err(_) => OmagError::HttpError(format!("HTTP {status}: {body}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> RestClient {
        RestClient::new(url).unwrap()
    }

    #[test]
    fn test_url_fills_segments_in_order() {
        let url = client("http://localhost:9443")
            .url(
                "/open-metadata/admin-services/users/{}/servers/{}/configuration",
                &["garygeeke", "cocoMDS1"],
                &[],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9443/open-metadata/admin-services/users/garygeeke/servers/cocoMDS1/configuration"
        );
    }

    #[test]
    fn test_url_encodes_each_parameter() {
        let url = client("http://localhost:9443/")
            .url("/metadata-sources/by-name/{}", &["hr db/primary #1"], &[])
            .unwrap();
        assert_eq!(
            url.path(),
            "/metadata-sources/by-name/hr%20db%2Fprimary%20%231"
        );
    }

    #[test]
    fn test_url_keeps_platform_path_prefix() {
        let url = client("https://example.com/egeria")
            .url("/servers/{}/instance", &["cocoMDS1"], &[])
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/egeria/servers/cocoMDS1/instance");
    }

    #[test]
    fn test_url_appends_query() {
        let url = client("http://localhost:9443")
            .url(
                "/databases/by-search-string",
                &[],
                &[("start_from", "0".to_string()), ("page_size", "10".to_string())],
            )
            .unwrap();
        assert_eq!(url.query(), Some("start_from=0&page_size=10"));
    }

    #[test]
    fn test_url_parameter_count_checked() {
        let c = client("http://localhost:9443");
        let err = c.url("/users/{}/servers/{}", &["u"], &[]).unwrap_err();
        assert_eq!(err.parameter_name(), Some("url_template"));
        assert!(c.url("/users/{}", &["u", "extra"], &[]).is_err());
        assert!(c.url("/users/{}", &[" "], &[]).is_err());
    }

    #[test]
    fn test_url_rejects_dot_segments() {
        let c = client("http://localhost:9443");
        for name in [".", ".."] {
            let err = c
                .url("/servers/{}/metadata-sources/by-name/{}", &["cocoMDS1", name], &[])
                .unwrap_err();
            assert_eq!(err.parameter_name(), Some("url_template"));
        }
        let url = c
            .url("/metadata-sources/by-name/{}", &["..hr.db"], &[])
            .unwrap();
        assert_eq!(url.path(), "/metadata-sources/by-name/..hr.db");
    }

    #[test]
    fn test_platform_url_must_be_http() {
        assert!(RestClient::new("not a url").is_err());
        assert!(RestClient::new("ftp://example.com").is_err());
        assert_eq!(client("http://localhost:9443/").platform_url(), "http://localhost:9443");
    }

    #[test]
    fn test_error_from_ffdc_body() {
        let body = r#"{
            "error": "invalid_parameter",
            "message": "Invalid value for parameter database_guid: bad",
            "related_http_code": 400,
            "exception_class_name": "InvalidParameterException",
            "action_description": "Correct the request parameters and retry",
            "parameter_name": "database_guid"
        }"#;
        let err = error_from_body(400, body);
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.exception_class_name(), "InvalidParameterException");
        assert_eq!(err.parameter_name(), Some("database_guid"));
    }

    #[test]
    fn test_error_from_other_body() {
        let err = error_from_body(502, "Bad Gateway");
        assert!(matches!(err, OmagError::HttpError(ref m) if m == "HTTP 502: Bad Gateway"));
    }
}
