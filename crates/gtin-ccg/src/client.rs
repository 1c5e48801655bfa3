//! # CCG Client
//!
//! HTTPS transport for the `ccgConsGTIN` operation.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CcgClient::query                                 │
//! │                                                                         │
//! │  Credential (PKCS#12) ──► reqwest::Identity ──► reqwest::Client         │
//! │                                                  ├─ IPv4 only           │
//! │                                                  ├─ connect timeout     │
//! │                                                  └─ total timeout (+20s)│
//! │                                                                         │
//! │  envelope::build(gtin) ──POST──► SVRS endpoint                          │
//! │                                      │                                  │
//! │                     ┌────────────────┼────────────────┐                 │
//! │                     ▼                ▼                ▼                 │
//! │              transport error     HTTP != 200       HTTP 200             │
//! │              ConnectionFailed    CcgError::http    response::parse      │
//! │              / Timeout           (0→52, 500→89)                         │
//! │                                                                         │
//! │  Every exchange is handed to the DebugRecorder (no-op unless enabled).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt::Write as _;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::{Duration, Instant};

use gtin_core::{Credential, LookupFailure, LookupResult, RemoteLookup};
use reqwest::header::{ACCEPT_ENCODING, CONTENT_TYPE};
use reqwest::{Identity, StatusCode};
use tracing::{debug, info, warn};

use crate::config::CcgConfig;
use crate::debug::DebugRecorder;
use crate::envelope;
use crate::error::{CcgError, CcgResult, CODE_TLS};
use crate::response;

// =============================================================================
// Certificate Loading
// =============================================================================

/// Reads a PFX file into a [`Credential`].
///
/// The bundle is opened once with `password` so a wrong password or a
/// corrupt file is reported here instead of at the first lookup.
pub async fn load_pfx(path: impl AsRef<Path>, password: &str) -> CcgResult<Credential> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CcgError::CertificateLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    identity(&bytes, password)?;
    debug!(path = %path.display(), size = bytes.len(), "Client certificate loaded");

    Ok(Credential::from_pkcs12(bytes, password))
}

fn identity(pkcs12_der: &[u8], password: &str) -> CcgResult<Identity> {
    Identity::from_pkcs12_der(pkcs12_der, password).map_err(|e| CcgError::Certificate(e.to_string()))
}

// =============================================================================
// Client
// =============================================================================

/// Client for the CCG GTIN lookup service.
#[derive(Debug, Clone)]
pub struct CcgClient {
    config: CcgConfig,
    recorder: DebugRecorder,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl CcgClient {
    /// Creates a client from a validated configuration.
    pub fn new(config: CcgConfig) -> CcgResult<Self> {
        config.validate()?;
        let recorder = DebugRecorder::new(config.debug.dir.clone());
        if let Some(dir) = recorder.dir() {
            info!(dir = %dir.display(), "CCG debug capture enabled");
        }
        Ok(CcgClient {
            connect_timeout: config.connect_timeout(),
            request_timeout: config.request_timeout(),
            config,
            recorder,
        })
    }

    /// Client using [`CcgConfig::load`].
    pub fn from_env() -> CcgResult<Self> {
        Self::new(CcgConfig::load(None)?)
    }

    pub fn config(&self) -> &CcgConfig {
        &self.config
    }

    /// Queries the service for `gtin`, authenticating with `credential`.
    pub async fn query(&self, gtin: &str, credential: &Credential) -> CcgResult<LookupResult> {
        let identity = identity(credential.pkcs12_der(), credential.password())?;
        let http = self.http_client(Some(identity))?;
        self.send(&http, gtin).await
    }

    fn http_client(&self, identity: Option<Identity>) -> CcgResult<reqwest::Client> {
        let service = &self.config.service;
        let mut builder = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .danger_accept_invalid_certs(service.accept_invalid_certs)
            .gzip(true);

        if service.ipv4_only {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }
        if let Some(identity) = identity {
            builder = builder.identity(identity);
        }

        builder.build().map_err(|e| CcgError::Tls {
            code: CODE_TLS,
            message: e.to_string(),
        })
    }

    async fn send(&self, http: &reqwest::Client, gtin: &str) -> CcgResult<LookupResult> {
        let endpoint = self.config.endpoint();
        let body = envelope::build(gtin);
        let content_type = envelope::content_type();
        let request_dump = format!(
            "Accept-Encoding: gzip,deflate\nContent-Type: {}\nContent-Length: {}\n{}",
            content_type,
            body.len(),
            body
        );

        info!(gtin, endpoint, "Querying CCG");
        let started = Instant::now();

        let sent = http
            .post(endpoint)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT_ENCODING, "gzip,deflate")
            .body(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => return Err(self.transport_failure(gtin, e, &request_dump, "").await),
        };

        let status = response.status();
        let mut response_dump = format!("{:?} {}\n", response.version(), status);
        for (name, value) in response.headers() {
            let _ = writeln!(
                response_dump,
                "{}: {}",
                name,
                String::from_utf8_lossy(value.as_bytes())
            );
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Err(self
                    .transport_failure(gtin, e, &request_dump, &response_dump)
                    .await)
            }
        };
        response_dump.push_str(text.trim());

        info!(
            gtin,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "CCG responded"
        );
        self.recorder
            .record(envelope::OPERATION, &request_dump, &response_dump)
            .await;

        if status != StatusCode::OK {
            let err = CcgError::http(status.as_u16());
            warn!(gtin, error = %err, "CCG returned an error status");
            return Err(err);
        }

        let result = response::parse(text.trim())?;
        debug!(
            gtin,
            status_code = %result.status_code,
            success = result.success,
            "CCG response parsed"
        );
        Ok(result)
    }

    /// Logs and captures a failed exchange, returning the classified error.
    async fn transport_failure(
        &self,
        gtin: &str,
        err: reqwest::Error,
        request_dump: &str,
        response_dump: &str,
    ) -> CcgError {
        let err = CcgError::from_transport(err, self.connect_timeout, self.request_timeout);
        warn!(gtin, error = %err, "CCG request failed");
        self.recorder
            .record(envelope::OPERATION, request_dump, response_dump)
            .await;
        err
    }
}

impl RemoteLookup for CcgClient {
    async fn consult(&self, gtin: &str, credential: &Credential) -> Result<LookupResult, LookupFailure> {
        self.query(gtin, credential).await.map_err(LookupFailure::from)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    const FOUND: &str = r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope"><soap:Body><ccgConsGTINResponse xmlns="http://www.portalfiscal.inf.br/nfe/wsdl/ccgConsGtin"><nfeResultMsg><retConsGTIN versao="1.00" xmlns="http://www.portalfiscal.inf.br/nfe"><cStat>9490</cStat><xMotivo>Consulta realizada com sucesso</xMotivo><xProd>BISCOITO RECHEADO 140G</xProd><NCM>19053100</NCM><CEST>1705100</CEST></retConsGTIN></nfeResultMsg></ccgConsGTINResponse></soap:Body></soap:Envelope>"#;

    fn client_for(server: &MockServer) -> CcgClient {
        CcgClient::new(CcgConfig::with_endpoint(server.url("/ws/ccgConsGTIN/ccgConsGTIN.asmx"))).unwrap()
    }

    async fn send(client: &CcgClient, gtin: &str) -> CcgResult<LookupResult> {
        let http = client.http_client(None).unwrap();
        client.send(&http, gtin).await
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = CcgConfig::default();
        config.service.timeout_secs = 0;
        assert!(CcgClient::new(config).is_err());
    }

    #[test]
    fn test_client_keeps_config_timeouts() {
        let mut config = CcgConfig::with_endpoint("https://ccg.example.test/ws");
        config.service.timeout_secs = 5;
        let client = CcgClient::new(config).unwrap();
        assert_eq!(client.config().endpoint(), "https://ccg.example.test/ws");
        assert_eq!(client.connect_timeout, Duration::from_secs(5));
        assert_eq!(client.request_timeout, Duration::from_secs(25));
    }

    #[tokio::test]
    async fn test_found() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/ws/ccgConsGTIN/ccgConsGTIN.asmx")
                .header("content-type", envelope::content_type())
                .body_includes("<GTIN>7890142547852</GTIN>");
            then.status(200)
                .header("content-type", "application/soap+xml; charset=utf-8")
                .body(FOUND);
        });

        let result = send(&client_for(&server), "7890142547852").await.unwrap();
        mock.assert();
        assert!(result.success);
        assert_eq!(result.product_description.as_deref(), Some("BISCOITO RECHEADO 140G"));
        assert_eq!(result.ncm_code.as_deref(), Some("19053100"));
        assert_eq!(result.cest_code.as_deref(), Some("1705100"));
    }

    #[tokio::test]
    async fn test_server_error_is_remapped() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(500).body("server error");
        });

        let err = send(&client_for(&server), "7890142547852").await.unwrap_err();
        mock.assert_calls(1);
        match err {
            CcgError::Http {
                status,
                code,
                description,
            } => {
                assert_eq!(status, 500);
                assert_eq!(code, 89);
                assert_eq!(description, "Internal Server Error");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_forbidden_keeps_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(403);
        });

        let failure: LookupFailure = send(&client_for(&server), "7890142547852")
            .await
            .unwrap_err()
            .into();
        assert_eq!(failure.code, 403);
        assert!(failure.message.contains("Forbidden"));
    }

    #[tokio::test]
    async fn test_garbage_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).body("<html>maintenance</html>");
        });

        assert!(matches!(
            send(&client_for(&server), "7890142547852").await,
            Err(CcgError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // bind then drop to get a port nobody listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = CcgClient::new(CcgConfig::with_endpoint(format!("http://127.0.0.1:{port}/ccg"))).unwrap();

        let failure: LookupFailure = send(&client, "7890142547852").await.unwrap_err().into();
        assert_eq!(failure.kind, gtin_core::FailureKind::Connection);
        assert_eq!(failure.code, crate::error::CODE_CONNECT);
    }

    #[tokio::test]
    async fn test_tls_handshake_failure_is_tls() {
        // plain HTTP server behind an https:// endpoint
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200).body(FOUND);
        });
        let endpoint = format!("https://127.0.0.1:{}/ccg", server.port());
        let client = CcgClient::new(CcgConfig::with_endpoint(endpoint)).unwrap();

        let err = send(&client, "7890142547852").await.unwrap_err();
        assert!(
            matches!(err, CcgError::Tls { code: CODE_TLS, .. }),
            "unexpected {err:?}"
        );
        assert_eq!(err.to_string().matches("https://127.0.0.1").count(), 1);

        let failure: LookupFailure = err.into();
        assert_eq!(failure.kind, gtin_core::FailureKind::Tls);
        assert_eq!(failure.code, CODE_TLS);
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).delay(Duration::from_secs(3)).body(FOUND);
        });
        let mut client = client_for(&server);
        client.request_timeout = Duration::from_millis(300);

        let err = send(&client, "7890142547852").await.unwrap_err();
        assert!(
            matches!(err, CcgError::Timeout(limit) if limit == Duration::from_millis(300)),
            "unexpected {err:?}"
        );

        let failure: LookupFailure = err.into();
        assert_eq!(failure.kind, gtin_core::FailureKind::Connection);
        assert_eq!(failure.code, crate::error::CODE_TIMEOUT);
    }

    #[tokio::test]
    async fn test_truncated_body_is_captured() {
        use std::io::{Read, Write};

        // announces 500 bytes, sends a handful, hangs up
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut seen = Vec::new();
            let mut buf = [0u8; 4096];
            while !String::from_utf8_lossy(&seen).contains("</soap:Envelope>") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 500\r\n\r\n<soap:Envelope>")
                .unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let mut config = CcgConfig::with_endpoint(format!("http://127.0.0.1:{port}/ccg"));
        config.debug.dir = Some(dir.path().to_path_buf());
        let client = CcgClient::new(config).unwrap();

        let err = send(&client, "7890142547852").await.unwrap_err();
        server.join().unwrap();
        assert!(
            matches!(err, CcgError::ConnectionFailed { .. }),
            "unexpected {err:?}"
        );

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        let response = std::fs::read_to_string(dir.path().join(&names[1])).unwrap();
        assert!(response.contains("200 OK"));
        assert!(response.contains("content-length: 500"));
    }

    #[tokio::test]
    async fn test_debug_capture() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST);
            then.status(200).body(FOUND);
        });
        let dir = tempfile::tempdir().unwrap();
        let mut config = CcgConfig::with_endpoint(server.url("/ccg"));
        config.debug.dir = Some(dir.path().to_path_buf());
        let client = CcgClient::new(config).unwrap();

        send(&client, "7890142547852").await.unwrap();

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("_ccgConsGTIN_request.txt"));
        assert!(names[1].ends_with("_ccgConsGTIN_response.txt"));

        let request = std::fs::read_to_string(dir.path().join(&names[0])).unwrap();
        assert!(request.contains("Content-Type: application/soap+xml"));
        assert!(request.contains("<GTIN>7890142547852</GTIN>"));
        let response = std::fs::read_to_string(dir.path().join(&names[1])).unwrap();
        assert!(response.contains("200 OK"));
        assert!(response.contains("<cStat>9490</cStat>"));
    }

    #[tokio::test]
    async fn test_bad_certificate_never_reaches_server() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST);
            then.status(200).body(FOUND);
        });

        let credential = Credential::from_pkcs12(b"not a pfx".to_vec(), "secret");
        let err = client_for(&server)
            .query("7890142547852", &credential)
            .await
            .unwrap_err();
        assert!(matches!(err, CcgError::Certificate(_)));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_load_pfx_errors() {
        let missing = load_pfx("/nonexistent/cert.pfx", "x").await;
        assert!(matches!(missing, Err(CcgError::CertificateLoad { .. })));

        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"garbage").unwrap();
        assert!(matches!(
            load_pfx(file.path(), "x").await,
            Err(CcgError::Certificate(_))
        ));
    }
}
