// ABOUTME: HTTP implementation of the platform API traits.
// ABOUTME: One hyper http1 connection per call; JSON bodies, line-framed logs.

use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{BodyExt, BodyStream, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::path::Path;
use tokio::net::TcpStream;

use super::error::ApiError;
use super::traits::{
    AppConfiguration, BuildOps, ClusterOps, DeployRequest, DeployResponse, DnsOps, EnvOps,
    EnvRecord, LogLine, LogStream, SourceOps, StageRequest, StageResponse, StagingStatus,
    UnitManifest, WorkloadOps,
};
use crate::types::{AppRef, BlobId, StageId};
use async_trait::async_trait;

/// Client for the platform control-plane API.
///
/// Opens a fresh http1 connection per request; the orchestrator's call rate
/// is low enough that pooling would buy nothing.
#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    host: String,
    port: u16,
}

impl HttpPlatformClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    async fn connect(
        &self,
        operation: &'static str,
    ) -> Result<http1::SendRequest<Full<Bytes>>, ApiError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: format!("failed to connect to {}:{}: {}", self.host, self.port, e),
            })?;

        let io = TokioIo::new(stream);
        let (sender, conn) = http1::handshake::<_, Full<Bytes>>(io)
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: format!("HTTP handshake failed: {}", e),
            })?;

        // Drive the connection until the response (and body) are done.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!("api connection closed with error: {}", e);
            }
        });

        Ok(sender)
    }

    async fn send(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> Result<(StatusCode, Bytes), ApiError> {
        let mut sender = self.connect(operation).await?;

        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Host", format!("{}:{}", self.host, self.port))
            .header("Content-Type", content_type)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| ApiError::Malformed {
                operation,
                message: format!("failed to build request: {}", e),
            })?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: format!("failed to read response: {}", e),
            })?
            .to_bytes();

        Ok((status, bytes))
    }

    /// Send a request and fail on any non-2xx answer, carrying the response
    /// body as the error message.
    async fn call(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<Bytes, ApiError> {
        let payload = match body {
            Some(value) => serde_json::to_vec(value).map_err(|e| ApiError::Malformed {
                operation,
                message: format!("failed to encode request: {}", e),
            })?,
            None => Vec::new(),
        };

        let (status, bytes) = self
            .send(operation, method, path, "application/json", payload)
            .await?;
        check_status(operation, status, bytes)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        method: Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> Result<T, ApiError> {
        let bytes = self.call(operation, method, path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed {
            operation,
            message: format!("failed to decode response: {}", e),
        })
    }

    fn app_path(&self, app: &AppRef, suffix: &str) -> String {
        format!(
            "/v1/namespaces/{}/applications/{}{}",
            urlencoding::encode(&app.namespace),
            app.name,
            suffix
        )
    }
}

fn check_status(
    operation: &'static str,
    status: StatusCode,
    bytes: Bytes,
) -> Result<Bytes, ApiError> {
    if status.is_success() {
        return Ok(bytes);
    }
    Err(ApiError::Status {
        operation,
        status: status.as_u16(),
        message: String::from_utf8_lossy(&bytes).trim().to_string(),
    })
}

// Wire-only shapes. The public types in api::traits stay free of endpoint
// details.

#[derive(Serialize)]
struct ApplyManifestBody<'a> {
    namespace: &'a str,
    values: &'a std::collections::BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct NamespaceItem {
    name: String,
}

#[derive(Deserialize)]
struct NamespaceList {
    items: Vec<NamespaceItem>,
}

#[derive(Deserialize)]
struct ReadyBody {
    ready: bool,
}

#[derive(Deserialize)]
struct LoadBalancerBody {
    address: Option<String>,
}

#[derive(Serialize)]
struct CreateAppBody<'a> {
    name: &'a str,
    configuration: &'a AppConfiguration,
}

#[derive(Serialize)]
struct StageBody<'a> {
    blob: &'a BlobId,
    builder_image: String,
}

#[derive(Serialize)]
struct ImportGitBody<'a> {
    url: &'a str,
    revision: &'a str,
}

#[derive(Deserialize)]
struct BlobBody {
    blob: BlobId,
}

#[async_trait]
impl ClusterOps for HttpPlatformClient {
    async fn apply_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError> {
        let path = format!("/v1/sys/units/{}", manifest.component);
        let body = ApplyManifestBody {
            namespace: manifest.namespace,
            values: &manifest.values,
        };
        self.call("apply manifest", Method::POST, &path, Some(&body))
            .await?;
        Ok(())
    }

    async fn delete_manifest(&self, manifest: &UnitManifest) -> Result<(), ApiError> {
        let path = format!("/v1/sys/units/{}", manifest.component);
        self.call("delete manifest", Method::DELETE, &path, None::<&()>)
            .await?;
        Ok(())
    }

    async fn namespace_exists(&self, name: &str) -> Result<bool, ApiError> {
        let path = format!("/v1/sys/namespaces/{}", urlencoding::encode(name));
        match self
            .call("namespace lookup", Method::GET, &path, None::<&()>)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list_namespaces(&self, label_selector: &str) -> Result<Vec<String>, ApiError> {
        let path = format!(
            "/v1/sys/namespaces?labelSelector={}",
            urlencoding::encode(label_selector)
        );
        let list: NamespaceList = self
            .call_json("namespace list", Method::GET, &path, None::<&()>)
            .await?;
        Ok(list.items.into_iter().map(|item| item.name).collect())
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ApiError> {
        let path = format!("/v1/sys/namespaces/{}", urlencoding::encode(name));
        self.call("namespace delete", Method::DELETE, &path, None::<&()>)
            .await?;
        Ok(())
    }

    async fn workload_ready(&self, namespace: &str, selector: &str) -> Result<bool, ApiError> {
        let path = format!(
            "/v1/sys/ready?namespace={}&selector={}",
            urlencoding::encode(namespace),
            urlencoding::encode(selector)
        );
        let body: ReadyBody = self
            .call_json("readiness check", Method::GET, &path, None::<&()>)
            .await?;
        Ok(body.ready)
    }

    async fn load_balancer_address(
        &self,
        namespace: &str,
        service: &str,
    ) -> Result<Option<String>, ApiError> {
        let path = format!(
            "/v1/sys/loadbalancer?namespace={}&service={}",
            urlencoding::encode(namespace),
            urlencoding::encode(service)
        );
        let body: LoadBalancerBody = self
            .call_json("loadbalancer lookup", Method::GET, &path, None::<&()>)
            .await?;
        Ok(body.address)
    }
}

#[async_trait]
impl WorkloadOps for HttpPlatformClient {
    async fn app_create(&self, app: &AppRef, config: &AppConfiguration) -> Result<(), ApiError> {
        let path = format!(
            "/v1/namespaces/{}/applications",
            urlencoding::encode(&app.namespace)
        );
        let body = CreateAppBody {
            name: app.name.as_str(),
            configuration: config,
        };
        self.call("application create", Method::POST, &path, Some(&body))
            .await?;
        Ok(())
    }

    async fn app_update(&self, app: &AppRef, config: &AppConfiguration) -> Result<(), ApiError> {
        let path = self.app_path(app, "");
        self.call("application update", Method::PUT, &path, Some(config))
            .await?;
        Ok(())
    }

    async fn app_deploy(&self, request: &DeployRequest) -> Result<DeployResponse, ApiError> {
        let path = self.app_path(&request.app, "/deploy");
        self.call_json("application deploy", Method::POST, &path, Some(request))
            .await
    }

    async fn app_running(&self, app: &AppRef) -> Result<bool, ApiError> {
        let path = self.app_path(app, "/running");
        let body: ReadyBody = self
            .call_json("application readiness", Method::GET, &path, None::<&()>)
            .await?;
        Ok(body.ready)
    }

    async fn app_delete(&self, app: &AppRef) -> Result<(), ApiError> {
        let path = self.app_path(app, "");
        self.call("application delete", Method::DELETE, &path, None::<&()>)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SourceOps for HttpPlatformClient {
    async fn upload(&self, app: &AppRef, archive: &Path) -> Result<BlobId, ApiError> {
        let payload = tokio::fs::read(archive)
            .await
            .map_err(|e| ApiError::Transport {
                operation: "source upload",
                message: format!("failed to read archive {}: {}", archive.display(), e),
            })?;

        let path = self.app_path(app, "/store");
        let (status, bytes) = self
            .send(
                "source upload",
                Method::POST,
                &path,
                "application/octet-stream",
                payload,
            )
            .await?;
        let bytes = check_status("source upload", status, bytes)?;
        let body: BlobBody = serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed {
            operation: "source upload",
            message: format!("failed to decode response: {}", e),
        })?;
        Ok(body.blob)
    }

    async fn import_git(
        &self,
        app: &AppRef,
        url: &str,
        revision: &str,
    ) -> Result<BlobId, ApiError> {
        let path = self.app_path(app, "/import-git");
        let body = ImportGitBody { url, revision };
        let resp: BlobBody = self
            .call_json("git import", Method::POST, &path, Some(&body))
            .await?;
        Ok(resp.blob)
    }
}

#[async_trait]
impl BuildOps for HttpPlatformClient {
    async fn app_stage(&self, request: &StageRequest) -> Result<StageResponse, ApiError> {
        let path = self.app_path(&request.app, "/stage");
        let body = StageBody {
            blob: &request.blob,
            builder_image: request.builder_image.to_string(),
        };
        self.call_json("staging submit", Method::POST, &path, Some(&body))
            .await
    }

    async fn staging_status(
        &self,
        app: &AppRef,
        id: &StageId,
    ) -> Result<StagingStatus, ApiError> {
        let path = format!(
            "/v1/namespaces/{}/staging/{}",
            urlencoding::encode(&app.namespace),
            id
        );
        self.call_json("staging status", Method::GET, &path, None::<&()>)
            .await
    }

    async fn staging_logs(&self, app: &AppRef, id: &StageId) -> Result<LogStream, ApiError> {
        let operation = "staging logs";
        let mut sender = self.connect(operation).await?;

        let path = format!(
            "/v1/namespaces/{}/staging/{}/logs",
            urlencoding::encode(&app.namespace),
            id
        );
        let req = Request::builder()
            .method(Method::GET)
            .uri(&path)
            .header("Host", format!("{}:{}", self.host, self.port))
            .body(Full::new(Bytes::new()))
            .map_err(|e| ApiError::Malformed {
                operation,
                message: format!("failed to build request: {}", e),
            })?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ApiError::Transport {
                operation,
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let bytes = resp
                .into_body()
                .collect()
                .await
                .map(|b| b.to_bytes())
                .unwrap_or_default();
            check_status(operation, status, bytes)?;
            unreachable!("non-success status always errors");
        }

        Ok(Box::pin(log_lines(resp.into_body())))
    }
}

#[async_trait]
impl EnvOps for HttpPlatformClient {
    async fn env_load(&self, app: &AppRef) -> Result<EnvRecord, ApiError> {
        let path = self.app_path(app, "/environment");
        self.call_json("environment load", Method::GET, &path, None::<&()>)
            .await
    }

    async fn env_store(&self, app: &AppRef, record: &EnvRecord) -> Result<(), ApiError> {
        let path = self.app_path(app, "/environment");
        self.call("environment store", Method::PUT, &path, Some(record))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DnsOps for HttpPlatformClient {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, ApiError> {
        super::traits::SystemDns.lookup_ipv4(host).await
    }
}

/// Turn a line-framed log response body into a stream of [`LogLine`]s.
///
/// Each line is a JSON log event; anything that fails to parse is passed
/// through verbatim so a mid-stream server hiccup never loses output.
fn log_lines(body: Incoming) -> impl futures::Stream<Item = Result<LogLine, ApiError>> + Send {
    struct State {
        frames: BodyStream<Incoming>,
        buffer: String,
        pending: VecDeque<LogLine>,
        failed: bool,
    }

    let state = State {
        frames: BodyStream::new(body),
        buffer: String::new(),
        pending: VecDeque::new(),
        failed: false,
    };

    futures::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(line) = st.pending.pop_front() {
                return Some((Ok(line), st));
            }
            if st.failed {
                return None;
            }
            match st.frames.next().await {
                None => {
                    let rest = st.buffer.trim().to_string();
                    st.buffer.clear();
                    st.failed = true;
                    if rest.is_empty() {
                        return None;
                    }
                    return Some((Ok(parse_log_line(&rest)), st));
                }
                Some(Err(e)) => {
                    st.failed = true;
                    return Some((
                        Err(ApiError::Transport {
                            operation: "staging logs",
                            message: e.to_string(),
                        }),
                        st,
                    ));
                }
                Some(Ok(frame)) => {
                    if let Ok(data) = frame.into_data() {
                        st.buffer.push_str(&String::from_utf8_lossy(&data));
                        while let Some(pos) = st.buffer.find('\n') {
                            let line: String = st.buffer.drain(..=pos).collect();
                            let line = line.trim();
                            if !line.is_empty() {
                                st.pending.push_back(parse_log_line(line));
                            }
                        }
                    }
                }
            }
        }
    })
}

fn parse_log_line(line: &str) -> LogLine {
    serde_json::from_str(line).unwrap_or_else(|_| LogLine {
        source: "staging".to_string(),
        text: line.to_string(),
    })
}
