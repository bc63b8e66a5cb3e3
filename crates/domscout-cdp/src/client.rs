//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, CdpRequest, CdpResponse};
use crate::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type PendingMap = Arc<Mutex<HashMap<u64, PendingRequest>>>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Pending request waiting for response.
pub(crate) struct PendingRequest {
    pub tx: oneshot::Sender<Result<Value, CdpError>>,
}

/// Request/response plumbing shared by the client and its page sessions.
#[derive(Clone)]
pub(crate) struct Transport {
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    pending: PendingMap,
    request_id: Arc<AtomicU64>,
}

impl Transport {
    /// Send a command and wait for its response.
    pub(crate) async fn send(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(|s| s.to_string()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(REQUEST_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// CDP client for a browser.
///
/// Owns the browser-level WebSocket; page sessions are multiplexed over it
/// with flattened session ids.
pub struct CdpClient {
    transport: Transport,
    /// Background task handle.
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&http_endpoint)?;

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Found browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = tokio::spawn(Self::receive_loop(ws_source, pending.clone()));

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            transport: Transport {
                ws_tx: Arc::new(tokio::sync::Mutex::new(ws_sink)),
                pending,
                request_id: Arc::new(AtomicU64::new(1)),
            },
            recv_task,
        })
    }

    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => dispatch(&text, &pending),
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        // Dropping the senders fails every waiting call with SessionClosed.
        pending.lock().clear();
    }

    /// Send a browser-level CDP command and wait for the response.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport.send(method, params, None).await
    }

    /// Open a blank tab and attach to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        let result = self
            .call("Target.createTarget", Some(json!({"url": "about:blank"})))
            .await?;

        let target_id = result["targetId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing targetId".to_string()))?;
        debug!("Created target {}", target_id);

        self.attach_page(target_id).await
    }

    /// Attach to an existing page.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(target_id.to_string(), session_id, self.transport.clone());
        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

/// Route one incoming text frame: complete the matching request, or log an event.
fn dispatch(text: &str, pending: &PendingMap) {
    trace!("CDP recv: {}", text);

    let resp = match serde_json::from_str::<CdpResponse>(text) {
        Ok(resp) => resp,
        Err(e) => {
            warn!("Failed to parse CDP message: {}", e);
            return;
        }
    };

    if let Some(id) = resp.id {
        let Some(req) = pending.lock().remove(&id) else {
            trace!("Response for unknown request {}", id);
            return;
        };
        let result = match resp.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(resp.result.unwrap_or(Value::Null)),
        };
        let _ = req.tx.send(result);
    } else if let Some(method) = resp.method {
        if method == "Target.detachedFromTarget" || method == "Inspector.detached" {
            debug!("CDP {} (session {:?})", method, resp.session_id);
        } else {
            trace!("CDP event {} (session {:?})", method, resp.session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_with(id: u64) -> (PendingMap, oneshot::Receiver<Result<Value, CdpError>>) {
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (tx, rx) = oneshot::channel();
        pending.lock().insert(id, PendingRequest { tx });
        (pending, rx)
    }

    #[test]
    fn test_dispatch_completes_request() {
        let (pending, mut rx) = pending_with(3);
        dispatch(r#"{"id": 3, "result": {"nodeIds": [5, 6]}}"#, &pending);

        let value = rx.try_recv().unwrap().unwrap();
        assert_eq!(value["nodeIds"][1], 6);
        assert!(pending.lock().is_empty());
    }

    #[test]
    fn test_dispatch_maps_protocol_error() {
        let (pending, mut rx) = pending_with(9);
        dispatch(
            r#"{"id": 9, "error": {"code": -32000, "message": "Could not find node with given id"}}"#,
            &pending,
        );

        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, CdpError::Protocol { code: -32000, .. }));
    }

    #[test]
    fn test_dispatch_null_result() {
        let (pending, mut rx) = pending_with(1);
        dispatch(r#"{"id": 1}"#, &pending);
        assert_eq!(rx.try_recv().unwrap().unwrap(), Value::Null);
    }

    #[test]
    fn test_dispatch_ignores_events_and_garbage() {
        let (pending, mut rx) = pending_with(2);
        dispatch(r#"{"method": "Page.loadEventFired", "params": {}}"#, &pending);
        dispatch("not json", &pending);
        dispatch(r#"{"id": 77, "result": {}}"#, &pending);

        assert!(rx.try_recv().is_err());
        assert_eq!(pending.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint() {
        let result = CdpClient::connect("http://127.0.0.1:1").await;
        assert!(matches!(result, Err(CdpError::ChromeNotAvailable(_))));
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let result = CdpClient::connect("not a url").await;
        assert!(matches!(result, Err(CdpError::ConnectionFailed(_))));
    }
}
