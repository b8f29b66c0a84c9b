//! One framed connection to a downstream service.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use lexgate_core::{CallMetadata, RpcCode, RpcError, RpcRequest, RpcResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

/// Dial target for one downstream service.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// `host:port` of the downstream service.
    pub addr: String,
    /// Wrap the connection in TLS using the platform trust store.
    pub tls: bool,
    pub connect_timeout: Duration,
    /// Deadline for a full request/response exchange.
    pub call_timeout: Duration,
}

type BoxedStream = Box<dyn DuplexStream>;

trait DuplexStream: AsyncRead + AsyncWrite + Send + Unpin {}
impl<T: AsyncRead + AsyncWrite + Send + Unpin> DuplexStream for T {}

fn tls_connector() -> Result<TlsConnector, RpcError> {
    let mut roots = RootCertStore::empty();
    for cert in rustls_native_certs::load_native_certs().certs {
        roots
            .add(cert)
            .map_err(|e| RpcError::transport(format!("bad root certificate: {e}")))?;
    }
    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

/// A single multiplexing-free RPC connection: one call in flight at a time.
/// Concurrency comes from the pool holding several channels.
pub struct RpcChannel {
    framed: Framed<BoxedStream, LengthDelimitedCodec>,
    next_id: u64,
    call_timeout: Duration,
    broken: bool,
}

impl std::fmt::Debug for RpcChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChannel")
            .field("next_id", &self.next_id)
            .field("broken", &self.broken)
            .finish_non_exhaustive()
    }
}

impl RpcChannel {
    /// Dials the endpoint, optionally wrapping the stream in TLS.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the dial or TLS handshake fails or
    /// does not finish within the connect timeout.
    pub async fn connect(endpoint: &Endpoint) -> Result<RpcChannel, RpcError> {
        let dial = async {
            let tcp = TcpStream::connect(&endpoint.addr)
                .await
                .map_err(|e| RpcError::transport(format!("dial {}: {e}", endpoint.addr)))?;
            tcp.set_nodelay(true)
                .map_err(|e| RpcError::transport(format!("set_nodelay: {e}")))?;

            let stream: BoxedStream = if endpoint.tls {
                let host = endpoint.addr.split(':').next().unwrap_or(&endpoint.addr);
                let server_name = ServerName::try_from(host.to_string())
                    .map_err(|e| RpcError::transport(format!("bad server name {host}: {e}")))?;
                let tls = tls_connector()?
                    .connect(server_name, tcp)
                    .await
                    .map_err(|e| {
                        RpcError::transport(format!("tls handshake {}: {e}", endpoint.addr))
                    })?;
                Box::new(tls)
            } else {
                Box::new(tcp)
            };
            Ok(stream)
        };

        let stream = tokio::time::timeout(endpoint.connect_timeout, dial)
            .await
            .map_err(|_| RpcError::transport(format!("dial {}: timed out", endpoint.addr)))??;

        Ok(RpcChannel {
            framed: Framed::new(stream, LengthDelimitedCodec::new()),
            next_id: 0,
            call_timeout: endpoint.call_timeout,
            broken: false,
        })
    }

    /// Whether a transport failure poisoned this channel. Broken channels
    /// must not be returned to the pool.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Sends one request and awaits its response.
    ///
    /// # Errors
    ///
    /// Returns the remote's own [`RpcError`] when the downstream rejects
    /// the call, or a synthesized transport error (which also marks the
    /// channel broken) when the exchange itself fails.
    pub async fn call<Req, Resp>(
        &mut self,
        method: &str,
        metadata: CallMetadata,
        request: &Req,
    ) -> Result<Resp, RpcError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);

        let body = lexgate_core::rpc::encode_body(request)
            .map_err(|e| RpcError::new(RpcCode::Internal, format!("encode {method}: {e}")))?;
        let frame = lexgate_core::rpc::encode_frame(&RpcRequest {
            id,
            method: method.to_string(),
            metadata,
            body,
        })
        .map_err(|e| RpcError::new(RpcCode::Internal, format!("encode frame: {e}")))?;

        match tokio::time::timeout(self.call_timeout, self.exchange(frame)).await {
            Ok(Ok(response)) => {
                if response.id != id {
                    self.broken = true;
                    return Err(RpcError::transport(format!(
                        "{method}: response id {} does not match call id {id}",
                        response.id
                    )));
                }
                if let Some(err) = response.error {
                    return Err(err);
                }
                lexgate_core::rpc::decode_body(&response.body).map_err(|e| {
                    RpcError::new(RpcCode::Internal, format!("decode {method} response: {e}"))
                })
            }
            Ok(Err(err)) => {
                self.broken = true;
                Err(err)
            }
            Err(_) => {
                // The response may still arrive later and desynchronize the
                // stream, so the channel cannot be reused.
                self.broken = true;
                Err(RpcError::new(
                    RpcCode::DeadlineExceeded,
                    format!("{method}: deadline exceeded"),
                ))
            }
        }
    }

    async fn exchange(&mut self, frame: bytes::Bytes) -> Result<RpcResponse, RpcError> {
        self.framed
            .send(frame)
            .await
            .map_err(|e| RpcError::transport(format!("send frame: {e}")))?;

        let raw = self
            .framed
            .next()
            .await
            .ok_or_else(|| RpcError::transport("connection closed by remote"))?
            .map_err(|e| RpcError::transport(format!("read frame: {e}")))?;

        lexgate_core::rpc::decode_frame(&raw)
            .map_err(|e| RpcError::transport(format!("malformed response frame: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgate_core::rpc::{decode_frame, encode_body, encode_frame};
    use tokio::net::TcpListener;

    fn endpoint(addr: String) -> Endpoint {
        Endpoint {
            addr,
            tls: false,
            connect_timeout: Duration::from_secs(1),
            call_timeout: Duration::from_secs(1),
        }
    }

    async fn serve_one<F>(listener: TcpListener, reply: F)
    where
        F: FnOnce(RpcRequest) -> RpcResponse + Send + 'static,
    {
        let (socket, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(socket, LengthDelimitedCodec::new());
        let raw = framed.next().await.unwrap().unwrap();
        let request: RpcRequest = decode_frame(&raw).unwrap();
        let response = reply(request);
        framed.send(encode_frame(&response).unwrap()).await.unwrap();
    }

    #[tokio::test]
    async fn call_round_trips_a_typed_body() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(serve_one(listener, |req| {
            assert_eq!(req.method, "echo.Echo");
            RpcResponse {
                id: req.id,
                body: req.body,
                error: None,
            }
        }));

        let mut channel = RpcChannel::connect(&endpoint(addr)).await.unwrap();
        let out: Vec<u32> = channel
            .call("echo.Echo", CallMetadata::default(), &vec![1_u32, 2, 3])
            .await
            .unwrap();
        assert_eq!(out, vec![1, 2, 3]);
        assert!(!channel.is_broken());
    }

    #[tokio::test]
    async fn remote_error_is_returned_without_breaking_the_channel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(serve_one(listener, |req| RpcResponse {
            id: req.id,
            body: Vec::new(),
            error: Some(RpcError::new(RpcCode::NotFound, "no such user")),
        }));

        let mut channel = RpcChannel::connect(&endpoint(addr)).await.unwrap();
        let err = channel
            .call::<_, ()>("user.GetUser", CallMetadata::default(), &())
            .await
            .unwrap_err();
        assert_eq!(err.code, RpcCode::NotFound);
        assert!(!channel.is_broken());
    }

    #[tokio::test]
    async fn closed_connection_marks_the_channel_broken() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let mut channel = RpcChannel::connect(&endpoint(addr)).await.unwrap();
        let err = channel
            .call::<_, ()>("user.GetUser", CallMetadata::default(), &())
            .await
            .unwrap_err();
        assert_eq!(err.code, RpcCode::Unavailable);
        assert!(channel.is_broken());
    }

    #[tokio::test]
    async fn slow_remote_hits_the_call_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let mut ep = endpoint(addr);
        ep.call_timeout = Duration::from_millis(50);
        let mut channel = RpcChannel::connect(&ep).await.unwrap();
        let err = channel
            .call::<_, ()>("user.GetUser", CallMetadata::default(), &())
            .await
            .unwrap_err();
        assert_eq!(err.code, RpcCode::DeadlineExceeded);
        assert!(channel.is_broken());
    }

    #[tokio::test]
    async fn mismatched_response_id_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        tokio::spawn(serve_one(listener, |_| RpcResponse {
            id: 999,
            body: encode_body(&()).unwrap(),
            error: None,
        }));

        let mut channel = RpcChannel::connect(&endpoint(addr)).await.unwrap();
        let err = channel
            .call::<_, ()>("user.GetUser", CallMetadata::default(), &())
            .await
            .unwrap_err();
        assert_eq!(err.code, RpcCode::Unavailable);
        assert!(channel.is_broken());
    }
}
