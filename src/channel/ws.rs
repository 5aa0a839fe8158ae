//! WebSocket kernel channel.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

use super::{ChannelError, ChannelResult, KernelChannel};
use crate::config::Config;
use crate::protocol::{ExecuteRequest, KernelMessage};

/// Kernel channel over a WebSocket connection.
pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    recv_timeout: Duration,
}

impl WsChannel {
    /// Dial the kernel's channel endpoint, carrying the same authorization
    /// credential used for HTTP calls.
    ///
    /// `recv_timeout` bounds each blocking receive, not the whole session.
    pub async fn connect(
        config: &Config,
        kernel_id: &str,
        session_id: &str,
        recv_timeout: Duration,
    ) -> ChannelResult<Self> {
        let url = config.channels_url(kernel_id, session_id);

        let mut request =
            url.clone()
                .into_client_request()
                .map_err(|e| ChannelError::Connect {
                    url: url.clone(),
                    message: e.to_string(),
                })?;
        let auth = config
            .authorization()
            .parse()
            .map_err(|_| ChannelError::Connect {
                url: url.clone(),
                message: "invalid authorization header".to_string(),
            })?;
        request.headers_mut().insert("Authorization", auth);

        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| ChannelError::Connect {
                url: url.clone(),
                message: e.to_string(),
            })?;

        debug!(kernel_id, session_id, "kernel channel opened");
        Ok(Self {
            stream,
            recv_timeout,
        })
    }
}

#[async_trait]
impl KernelChannel for WsChannel {
    async fn send(&mut self, request: &ExecuteRequest) -> ChannelResult<()> {
        let json =
            serde_json::to_string(request).map_err(|e| ChannelError::Protocol(e.to_string()))?;
        self.stream
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))
    }

    async fn recv(&mut self) -> ChannelResult<KernelMessage> {
        loop {
            let frame = tokio::time::timeout(self.recv_timeout, self.stream.next())
                .await
                .map_err(|_| ChannelError::RecvTimeout(self.recv_timeout))?;

            match frame {
                None => return Err(ChannelError::Closed),
                Some(Err(e)) => return Err(ChannelError::Transport(e.to_string())),
                Some(Ok(Message::Text(text))) => {
                    return KernelMessage::parse(text.as_str())
                        .map_err(|e| ChannelError::Protocol(e.to_string()));
                }
                Some(Ok(Message::Close(_))) => return Err(ChannelError::Closed),
                // Ping/pong and binary keepalive frames carry no kernel message.
                Some(Ok(_)) => continue,
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "websocket close failed");
        }
    }
}
