//! # 📡 THE HTTP SESSION CLIENT
//!
//! 🎬 INT. CORPORATE NETWORK: A PROXY SITS BETWEEN US AND JIRA. IT ALWAYS HAS.
//!
//! A tiny JSON-over-HTTP layer for talking to the ticketing system:
//! - every request says `Accept` + `Content-Type: application/json; charset=UTF-8`
//! - cookies from a login ride along as ONE `Cookie` header, `;`-joined, order kept
//! - the proxy is decided once, at construction, and never again
//! - callers choose: get the status code back, or get an [`HttpError`] for non-2xx
//!
//! No retries. No backoff. One shot per call, like a penalty kick. 🦆

use reqwest::header::{ACCEPT, CONTENT_TYPE, COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Method, Proxy};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::app_config::AppConfig;

pub const JSON_MEDIA_TYPE: &str = "application/json; charset=UTF-8";
const COOKIE_SEPARATOR: char = ';';

/// 💀 Everything that can go wrong between "here's a body" and "here's a T".
///
/// 🧠 Knowledge graph:
/// - `Build`: the client itself never came to be (usually a proxy URL reqwest refused)
/// - `Serialize` / `Deserialize`: JSON on the way out / on the way back in
/// - `Transport`: no response at all. DNS, refused connection, proxy said no.
/// - `Status`: a response arrived and it was not 2xx. The body rides along for the post-mortem.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build the HTTP client")]
    Build(#[source] reqwest::Error),

    #[error("failed to serialize the request body for url=\"{url}\"")]
    Serialize {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP {method} request to url=\"{url}\" never got a response")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {method} request to url=\"{url}\" returned status {status}: {body}")]
    Status {
        method: Method,
        url: String,
        status: u16,
        body: String,
    },

    #[error("response from url=\"{url}\" is not the JSON we expected")]
    Deserialize {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HttpError {
    /// 🔢 The HTTP status, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 🚇 An explicit HTTP proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpProxy {
    pub host: String,
    pub port: u16,
}

impl HttpProxy {
    /// 🎯 Both halves or nothing. A host without a port (or vice versa) means no proxy.
    pub fn resolve(host: Option<&str>, port: Option<u16>) -> Option<Self> {
        match (host, port) {
            (Some(host), Some(port)) => {
                info!("🚇 Using HTTP proxy '{}:{}'", host, port);
                Some(Self {
                    host: host.to_string(),
                    port,
                })
            }
            _ => {
                info!(
                    "🚫 No HTTP proxy has been configured by setting both 'proxy_host' and 'proxy_port'"
                );
                None
            }
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// 📬 A fully buffered response.
///
/// Jira answers are small, so the whole body is read into memory before anyone
/// looks at the status. Streaming would be a flex with nobody watching.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 🧳 A reqwest client plus the proxy decision it was built with.
///
/// Cheap to clone (reqwest's client is an `Arc` inside). The "session" part
/// lives with the caller: [`HttpSessionClient::post_login`] hands back the
/// cookies, and every later call takes them as an argument. No cookie jar, no
/// hidden state, no surprises at 3 AM.
#[derive(Debug, Clone)]
pub struct HttpSessionClient {
    client: reqwest::Client,
    proxy: Option<HttpProxy>,
}

impl HttpSessionClient {
    /// 🚀 Build the client, resolving the proxy from `config` exactly once.
    pub fn new(config: &AppConfig) -> Result<Self, HttpError> {
        let proxy = HttpProxy::resolve(config.proxy_host.as_deref(), config.proxy_port);

        let builder = reqwest::Client::builder();
        let builder = match &proxy {
            Some(the_proxy) => builder.proxy(Proxy::all(the_proxy.url()).map_err(HttpError::Build)?),
            // 🔒 no proxy means NO proxy, not "whatever HTTP_PROXY says today"
            None => builder.no_proxy(),
        };
        let client = builder.build().map_err(HttpError::Build)?;

        Ok(Self { client, proxy })
    }

    pub fn proxy(&self) -> Option<&HttpProxy> {
        self.proxy.as_ref()
    }

    /// 📡 The one request to rule them all. Everything else is a thin wrapper.
    ///
    /// With `error_on_non_2xx` set, anything outside 200..300 becomes
    /// [`HttpError::Status`]. Without it, the caller gets the response and the
    /// responsibility.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        cookies: &[String],
        error_on_non_2xx: bool,
    ) -> Result<HttpResponse, HttpError> {
        let the_payload = serde_json::to_vec(body).map_err(|source| HttpError::Serialize {
            url: url.to_string(),
            source,
        })?;

        let mut the_request = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .header(CONTENT_TYPE, JSON_MEDIA_TYPE)
            .body(the_payload);

        if !cookies.is_empty() {
            the_request = the_request.header(COOKIE, join_cookies(cookies));
        }

        let the_response = the_request
            .send()
            .await
            .map_err(|source| HttpError::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        let status = the_response.status().as_u16();
        let headers = the_response.headers().clone();
        let body = the_response
            .text()
            .await
            .map_err(|source| HttpError::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            })?;

        debug!(
            "📡 Executed HTTP request with url=\"{}\", method={}, http_status_code={}",
            url, method, status
        );

        let the_response = HttpResponse {
            status,
            headers,
            body,
        };
        if error_on_non_2xx && !the_response.is_success() {
            return Err(HttpError::Status {
                method,
                url: url.to_string(),
                status,
                body: the_response.body,
            });
        }
        Ok(the_response)
    }

    /// 📮 POST and hand back the status code, whatever it is.
    pub async fn post_for_status<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        cookies: &[String],
    ) -> Result<u16, HttpError> {
        self.request_for_status(Method::POST, url, body, cookies).await
    }

    /// ✏️ PUT and hand back the status code, whatever it is.
    pub async fn put_for_status<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        cookies: &[String],
    ) -> Result<u16, HttpError> {
        self.request_for_status(Method::PUT, url, body, cookies).await
    }

    /// 📦 POST, insist on a 2xx, and deserialize the body as `T`.
    pub async fn post_for_object<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        cookies: &[String],
    ) -> Result<T, HttpError> {
        let the_response = self.request(Method::POST, url, body, cookies, true).await?;
        serde_json::from_str(&the_response.body).map_err(|source| HttpError::Deserialize {
            url: url.to_string(),
            source,
        })
    }

    /// 🍪 POST a login and collect the session cookies, attributes stripped.
    pub async fn post_login<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Vec<String>, HttpError> {
        let the_response = self.request(Method::POST, url, body, &[], true).await?;
        Ok(session_cookies(&the_response.headers))
    }

    async fn request_for_status<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        cookies: &[String],
    ) -> Result<u16, HttpError> {
        let the_response = self.request(method.clone(), url, body, cookies, false).await?;
        if !the_response.is_success() {
            // 💀 the caller only gets a number back, so the response body gets logged here or never
            error!(
                "💀 Failed HTTP {} request to url=\"{}\", body={}, responseContent={}",
                method,
                url,
                serde_json::to_string(body).unwrap_or_default(),
                the_response.body
            );
        }
        Ok(the_response.status)
    }
}

/// 🍪 `["a=1", "b=2"]` → `"a=1;b=2"`
pub fn join_cookies(cookies: &[String]) -> String {
    cookies.join(&COOKIE_SEPARATOR.to_string())
}

/// 🍪 Every `Set-Cookie` value, in header order, cut at the first `;`.
///
/// Values with non-ASCII bytes are kept (lossily decoded) so the order of the
/// cookies we send back matches the order the server handed them out.
pub fn session_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .map(|cookie| match cookie.split_once(COOKIE_SEPARATOR) {
            Some((name_value, _attributes)) => name_value.to_string(),
            None => cookie.to_string(),
        })
        .collect()
}
