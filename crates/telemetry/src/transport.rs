// HTTP transport seam. Delivery and notification logic talk to the wire
// through the `Transport` trait so tests can script responses without a
// network; `HttpTransport` is the production implementation over
// reqwest + rustls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Client, header};
use url::Url;

use crate::error::TransportError;

pub const DEFAULT_USER_AGENT: &str = concat!("thermolink/", env!("CARGO_PKG_VERSION"));

/// Root CA anchoring the telemetry endpoint's certificate chain, as shipped
/// on the original device (DigiCert High Assurance EV Root CA). Configuration
/// data: callers may inject a different anchor when the authority is
/// reissued.
pub const DEFAULT_TRUST_ANCHOR_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIDxTCCAq2gAwIBAgIQAqxcJmoLQJuPC3nyrkYldzANBgkqhkiG9w0BAQUFADBs
MQswCQYDVQQGEwJVUzEVMBMGA1UEChMMRGlnaUNlcnQgSW5jMRkwFwYDVQQLExB3
d3cuZGlnaWNlcnQuY29tMSswKQYDVQQDEyJEaWdpQ2VydCBIaWdoIEFzc3VyYW5j
ZSBFViBSb290IENBMB4XDTA2MTExMDAwMDAwMFoXDTMxMTExMDAwMDAwMFowbDEL
MAkGA1UEBhMCVVMxFTATBgNVBAoTDERpZ2lDZXJ0IEluYzEZMBcGA1UECxMQd3d3
LmRpZ2ljZXJ0LmNvbTErMCkGA1UEAxMiRGlnaUNlcnQgSGlnaCBBc3N1cmFuY2Ug
RVYgUm9vdCBDQTCCASIwDQYJKoZIhvcNAQEBBQADggEPADCCAQoCggEBAMbM5XPm
+9S75S0tMqbf5YE/yc0lSbZxKsPVlDRnogocsF9ppkCxxLeyj9CYpKlBWTrT3JTW
PNt0OKRKzE0lgvdKpVMSOO7zSW1xkX5jtqumX8OkhPhPYlG++MXs2ziS4wblCJEM
xChBVfvLWokVfnHoNb9Ncgk9vjo4UFt3MRuNs8ckRZqnrG0AFFoEt7oT61EKmEFB
Ik5lYYeBQVCmeVyJ3hlKV9Uu5l0cUyx+mM0aBhakaHPQNAQTXKFx01p8VdteZOE3
hzBWBOURtCmAEvF5OYiiAhF8J2a3iLd48soKqDirCmTCv2ZdlYTBoSUeh10aUAsg
EsxBu24LUTi4S8sCAwEAAaNjMGEwDgYDVR0PAQH/BAQDAgGGMA8GA1UdEwEB/wQF
MAMBAf8wHQYDVR0OBBYEFLE+w2kD+L9HAdSYJhoIAu9jZCvDMB8GA1UdIwQYMBaA
FLE+w2kD+L9HAdSYJhoIAu9jZCvDMA0GCSqGSIb3DQEBBQUAA4IBAQAcGgaX3Nec
nzyIZgYIVyHbIUf4KmeqvxgydkAQV8GK83rZEWWONfqe/EW1ntlMMUu4kehDLI6z
eM7b41N5cdblIZQB2lWHmiRk9opmzN6cN82oNLFpmyPInngiK3BD41VHMWEZ71jF
hS9OMPagMRYjyOfiZRYzy78aG6A9+MpeizGLYAiJLQwGXFK3xPkKmNEVX58Svnw2
Yzi9RKR/5CYrCsSXaQ3pjOLAEFe4yHYSkVXySGnYvCoCWw9E1CAx2/S6cCZdkGCe
vEsXCS+0yx5DaMkHJ8HSXPfqIbloEpw8nL+e/IBcm2PN7EeqJSdnoDfzAIJ9VNep
+OkuE6N36B9K
-----END CERTIFICATE-----
";

/// Options for building the production HTTP transport.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Overall timeout for one request/response exchange. Must stay bounded:
    /// a stuck request blocks the tick cycle until this elapses.
    pub timeout: Duration,

    /// Connection timeout (time to establish the initial connection).
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

/// One HTTP exchange as the delivery logic sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a pre-built `application/x-www-form-urlencoded` body.
    async fn post_form(&self, url: &Url, body: String) -> Result<WireResponse, TransportError>;

    /// Plain GET, used by the notification channel.
    async fn get(&self, url: &Url) -> Result<WireResponse, TransportError>;
}

/// Production transport. Each instance owns one reqwest client, so exactly
/// one TLS trust configuration is active per endpoint it serves.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Client that trusts exactly the injected CA anchor. The handshake fails
    /// closed when the presented chain does not reach the anchor; no insecure
    /// fallback path exists.
    pub fn pinned(
        trust_anchor_pem: &[u8],
        options: &TransportOptions,
    ) -> Result<Self, TransportError> {
        let anchor = Certificate::from_pem(trust_anchor_pem)
            .map_err(|e| TransportError::tls(format!("invalid trust anchor: {e}")))?;
        let client = Self::builder(options)
            .tls_built_in_root_certs(false)
            .add_root_certificate(anchor)
            .build()?;
        Ok(Self { client })
    }

    /// Client backed by the standard webpki root store, for endpoints whose
    /// chain is not pinned.
    pub fn with_webpki_roots(options: &TransportOptions) -> Result<Self, TransportError> {
        let client = Self::builder(options).build()?;
        Ok(Self { client })
    }

    fn builder(options: &TransportOptions) -> reqwest::ClientBuilder {
        Client::builder()
            .user_agent(&options.user_agent)
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
    }

    fn classify(error: reqwest::Error) -> TransportError {
        if error.is_connect() {
            TransportError::connect(error.to_string())
        } else if error.is_timeout() {
            TransportError::timeout(error.to_string())
        } else {
            TransportError::Network { source: error }
        }
    }

    async fn read_response(response: reqwest::Response) -> WireResponse {
        let status = response.status().as_u16();
        // An unreadable body degrades to empty rather than failing the exchange.
        let body = response.text().await.unwrap_or_default();
        WireResponse { status, body }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &Url, body: String) -> Result<WireResponse, TransportError> {
        let response = self
            .client
            .post(url.clone())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(Self::classify)?;
        Ok(Self::read_response(response).await)
    }

    async fn get(&self, url: &Url) -> Result<WireResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(Self::classify)?;
        Ok(Self::read_response(response).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_accepts_the_default_anchor() {
        let transport =
            HttpTransport::pinned(DEFAULT_TRUST_ANCHOR_PEM.as_bytes(), &TransportOptions::default());
        assert!(transport.is_ok());
    }

    #[test]
    fn pinned_rejects_garbage_anchors() {
        let result = HttpTransport::pinned(b"not a certificate", &TransportOptions::default());
        assert!(matches!(result, Err(TransportError::Tls { .. })));
    }

    #[test]
    fn default_options_keep_timeouts_bounded() {
        let options = TransportOptions::default();
        assert!(!options.timeout.is_zero());
        assert!(!options.connect_timeout.is_zero());
    }
}
