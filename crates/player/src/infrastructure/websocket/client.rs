//! Tokio driver for [`GameSession`].
//!
//! A single spawned task owns the WebSocket, the handshake in flight, the retry
//! timer and the session itself. [`SessionHandle`]s talk to it over a command
//! channel, so every input is processed to completion before the next one.

use std::future::{pending, Future};
use std::pin::Pin;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use ballot_shared::{ClientMessage, ServerMessage};

use super::core::Directive;
use super::session::GameSession;
use crate::application::{ExecutiveChoice, PlayerAction};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::infrastructure::messaging::{ConnectionStateObserver, EventBus, LifecycleEvent};
use crate::state::GameStateStore;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Handshake = Pin<Box<dyn Future<Output = Result<WsStream, tungstenite::Error>> + Send>>;
type Reply<T> = oneshot::Sender<Result<T, ClientError>>;

enum SessionCommand {
    Connect {
        game_id: String,
        player_name: String,
        reply: Reply<()>,
    },
    Send {
        message: ClientMessage,
        reply: Reply<()>,
    },
    Perform {
        action: PlayerAction,
        reply: Reply<()>,
    },
    Choose {
        choice: ExecutiveChoice,
        reply: Reply<()>,
    },
    Disconnect {
        reply: Reply<()>,
    },
    Shutdown,
}

/// Cloneable handle to a running session task.
///
/// Subscriber surfaces are shared with the task, so handlers registered here
/// run on the task as frames and lifecycle events arrive.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    messages: EventBus<ServerMessage>,
    lifecycle: EventBus<LifecycleEvent>,
    store: GameStateStore,
    observer: ConnectionStateObserver,
}

impl SessionHandle {
    /// Spawn the session task. Must be called within a tokio runtime.
    pub fn spawn(config: ClientConfig) -> Self {
        let session = GameSession::new(config);
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = Self {
            commands: tx,
            messages: session.messages().clone(),
            lifecycle: session.lifecycle().clone(),
            store: session.store().clone(),
            observer: session.observer().clone(),
        };

        let driver = Driver {
            session,
            commands: rx,
            stream: None,
            handshake: None,
            retry: None,
        };
        tokio::spawn(driver.run());

        handle
    }

    pub fn messages(&self) -> &EventBus<ServerMessage> {
        &self.messages
    }

    pub fn lifecycle(&self) -> &EventBus<LifecycleEvent> {
        &self.lifecycle
    }

    pub fn store(&self) -> &GameStateStore {
        &self.store
    }

    pub fn observer(&self) -> &ConnectionStateObserver {
        &self.observer
    }

    /// Start connecting. Returns once the handshake is under way, not when it
    /// completes; watch the lifecycle bus for `Connected`.
    pub async fn connect(&self, game_id: &str, player_name: &str) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Connect {
            game_id: game_id.to_string(),
            player_name: player_name.to_string(),
            reply,
        })
        .await
    }

    pub async fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Send { message, reply }).await
    }

    /// Authorize against the current snapshot, then send.
    pub async fn perform(&self, action: PlayerAction) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Perform { action, reply }).await
    }

    pub async fn choose_executive(&self, choice: ExecutiveChoice) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Choose { choice, reply }).await
    }

    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.request(|reply| SessionCommand::Disconnect { reply }).await
    }

    /// Disconnect and stop the task. Later requests fail with `SessionClosed`.
    pub fn shutdown(&self) {
        let _ = self.commands.send(SessionCommand::Shutdown);
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> SessionCommand,
    ) -> Result<T, ClientError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| ClientError::SessionClosed)?;
        response.await.map_err(|_| ClientError::SessionClosed)?
    }
}

struct Driver {
    session: GameSession,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    stream: Option<WsStream>,
    handshake: Option<Handshake>,
    retry: Option<(u32, Pin<Box<Sleep>>)>,
}

impl Driver {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                frame = next_frame(&mut self.stream) => self.handle_frame(frame).await,
                result = finish_handshake(&mut self.handshake) => {
                    self.handshake = None;
                    self.handle_handshake(result).await;
                }
                attempt = retry_elapsed(&mut self.retry) => {
                    self.retry = None;
                    let directives = self.session.handle_retry_elapsed(attempt);
                    let _ = self.apply(directives).await;
                }
            }
        }

        let directives = self.session.disconnect();
        let _ = self.apply(directives).await;
        tracing::debug!("Session task stopped");
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Connect {
                game_id,
                player_name,
                reply,
            } => {
                let result = self.session.connect(&game_id, &player_name);
                self.complete(result, reply).await;
            }
            SessionCommand::Send { message, reply } => {
                let result = self.session.send(&message);
                self.complete(result, reply).await;
            }
            SessionCommand::Perform { action, reply } => {
                let result = self.session.perform(action);
                self.complete(result, reply).await;
            }
            SessionCommand::Choose { choice, reply } => {
                let result = self.session.choose_executive(choice);
                self.complete(result, reply).await;
            }
            SessionCommand::Disconnect { reply } => {
                let directives = self.session.disconnect();
                self.complete(Ok(directives), reply).await;
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn complete(&mut self, result: Result<Vec<Directive>, ClientError>, reply: Reply<()>) {
        let outcome = match result {
            Ok(directives) => self.apply(directives).await,
            Err(e) => Err(e),
        };
        // The caller may have stopped waiting.
        let _ = reply.send(outcome);
    }

    async fn handle_frame(&mut self, frame: Option<Result<Message, tungstenite::Error>>) {
        match frame {
            Some(Ok(Message::Text(text))) => {
                self.session.handle_frame(&text);
            }
            Some(Ok(Message::Close(close))) => {
                tracing::debug!(?close, "Server sent close frame");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                self.stream = None;
                let directives = self.session.handle_transport_error(e.to_string());
                let _ = self.apply(directives).await;
                let directives = self.session.handle_closed();
                let _ = self.apply(directives).await;
            }
            None => {
                self.stream = None;
                let directives = self.session.handle_closed();
                let _ = self.apply(directives).await;
            }
        }
    }

    async fn handle_handshake(&mut self, result: Result<WsStream, tungstenite::Error>) {
        match result {
            Ok(stream) => {
                self.stream = Some(stream);
                let directives = self.session.handle_open();
                let _ = self.apply(directives).await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "WebSocket handshake failed");
                let directives = self.session.handle_transport_error(e.to_string());
                let _ = self.apply(directives).await;
                let directives = self.session.handle_closed();
                let _ = self.apply(directives).await;
            }
        }
    }

    /// Carry out directives in order. Reports the first transmission failure.
    async fn apply(&mut self, directives: Vec<Directive>) -> Result<(), ClientError> {
        let mut outcome = Ok(());
        for directive in directives {
            match directive {
                Directive::OpenTransport(url) => {
                    let handshake: Handshake = Box::pin(open(url));
                    self.handshake = Some(handshake);
                }
                Directive::CloseTransport => {
                    self.handshake = None;
                    if let Some(mut stream) = self.stream.take() {
                        if let Err(e) = stream.close(None).await {
                            tracing::debug!(error = %e, "Error closing WebSocket");
                        }
                    }
                }
                Directive::ScheduleRetry { attempt, delay } => {
                    self.retry = Some((attempt, Box::pin(tokio::time::sleep(delay))));
                }
                Directive::CancelRetry => {
                    self.retry = None;
                }
                Directive::Transmit(text) => {
                    let Some(stream) = self.stream.as_mut() else {
                        tracing::warn!("Dropping outbound frame without a transport");
                        outcome = outcome.and(Err(ClientError::NotConnected));
                        continue;
                    };
                    if let Err(e) = stream.send(Message::Text(text)).await {
                        // The read half reports the close.
                        tracing::warn!(error = %e, "Failed to send frame");
                        outcome = outcome.and(Err(ClientError::NotConnected));
                    }
                }
            }
        }
        outcome
    }
}

async fn open(url: Url) -> Result<WsStream, tungstenite::Error> {
    let (stream, _) = connect_async(url.as_str()).await?;
    Ok(stream)
}

async fn next_frame(stream: &mut Option<WsStream>) -> Option<Result<Message, tungstenite::Error>> {
    match stream {
        Some(stream) => stream.next().await,
        None => pending().await,
    }
}

async fn finish_handshake(
    handshake: &mut Option<Handshake>,
) -> Result<WsStream, tungstenite::Error> {
    match handshake {
        Some(handshake) => handshake.await,
        None => pending().await,
    }
}

async fn retry_elapsed(retry: &mut Option<(u32, Pin<Box<Sleep>>)>) -> u32 {
    match retry {
        Some((attempt, sleep)) => {
            sleep.as_mut().await;
            *attempt
        }
        None => pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReconnectPolicy;
    use crate::infrastructure::messaging::{ConnectionState, LifecycleKind};
    use crate::infrastructure::testing::fixtures::*;
    use ballot_shared::{MessageKind, Phase};
    use serde_json::Value;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    type ServerStream = WebSocketStream<TcpStream>;

    const WAIT: Duration = Duration::from_secs(5);

    fn config(addr: SocketAddr, delay_ms: u64, max_attempts: u32) -> ClientConfig {
        ClientConfig {
            ws_host: addr.to_string(),
            api_base: Url::parse(&format!("http://{addr}")).expect("url"),
            secure: false,
            reconnect: ReconnectPolicy {
                delay: Duration::from_millis(delay_ms),
                max_attempts,
            },
        }
    }

    async fn listen() -> (TcpListener, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        (listener, addr)
    }

    /// Accept one WebSocket client, returning it with the requested path.
    async fn accept(listener: &TcpListener) -> (ServerStream, String) {
        let (tcp, _) = listener.accept().await.expect("accept");
        let path = Arc::new(Mutex::new(String::new()));
        let seen = Arc::clone(&path);
        let record = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            *seen.lock().expect("lock") = req.uri().path().to_string();
            Ok(resp)
        };
        let ws = tokio_tungstenite::accept_hdr_async(tcp, record)
            .await
            .expect("handshake");
        let path = path.lock().expect("lock").clone();
        (ws, path)
    }

    async fn next_json(ws: &mut ServerStream) -> Value {
        loop {
            let message = tokio::time::timeout(WAIT, ws.next())
                .await
                .expect("timely frame")
                .expect("open stream")
                .expect("frame");
            if let Message::Text(text) = message {
                return serde_json::from_str(&text).expect("json");
            }
        }
    }

    fn lifecycle_events(handle: &SessionHandle) -> mpsc::UnboundedReceiver<LifecycleEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        for kind in [
            LifecycleKind::Connected,
            LifecycleKind::Disconnected,
            LifecycleKind::Error,
            LifecycleKind::Reconnecting,
            LifecycleKind::ReconnectFailed,
        ] {
            let tx = tx.clone();
            handle.lifecycle().subscribe(kind, move |event| {
                let _ = tx.send(event.clone());
            });
        }
        rx
    }

    async fn wait_for(
        events: &mut mpsc::UnboundedReceiver<LifecycleEvent>,
        wanted: impl Fn(&LifecycleEvent) -> bool,
    ) -> Vec<LifecycleEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(WAIT, events.recv())
                .await
                .expect("timely event")
                .expect("bus alive");
            let done = wanted(&event);
            seen.push(event);
            if done {
                return seen;
            }
        }
    }

    #[tokio::test]
    async fn test_joins_and_receives_snapshot() {
        let (listener, addr) = listen().await;
        let handle = SessionHandle::spawn(config(addr, 50, 5));
        let mut events = lifecycle_events(&handle);

        let (snapshot_tx, mut snapshot_rx) = mpsc::unbounded_channel();
        handle.messages().subscribe(MessageKind::GameState, move |_| {
            let _ = snapshot_tx.send(());
        });

        handle.connect(GAME_ID, "Ann Lee").await.expect("connect");
        let (mut server, path) = accept(&listener).await;
        assert_eq!(path, format!("/ws/{GAME_ID}/Ann%20Lee"));

        wait_for(&mut events, |e| *e == LifecycleEvent::Connected).await;
        assert_eq!(
            next_json(&mut server).await,
            serde_json::json!({"action": "join_game", "payload": {}})
        );

        server
            .send(Message::Text(snapshot_frame("game_state", &lobby("Ann Lee", &FIVE))))
            .await
            .expect("send");
        tokio::time::timeout(WAIT, snapshot_rx.recv())
            .await
            .expect("timely snapshot")
            .expect("delivered");

        let snapshot = handle.store().current().expect("stored");
        assert_eq!(snapshot.phase, Phase::Lobby);

        handle.disconnect().await.expect("disconnect");
        assert_eq!(handle.observer().state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_send_before_connect_fails() {
        let (_listener, addr) = listen().await;
        let handle = SessionHandle::spawn(config(addr, 50, 5));

        let err = handle
            .send(ClientMessage::GetGameState {})
            .await
            .expect_err("idle");
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_reconnects_after_server_close() {
        let (listener, addr) = listen().await;
        let handle = SessionHandle::spawn(config(addr, 20, 5));
        let mut events = lifecycle_events(&handle);

        handle.connect(GAME_ID, "alice").await.expect("connect");
        let (mut server, _) = accept(&listener).await;
        next_json(&mut server).await;
        server.close(None).await.expect("close");
        drop(server);

        let seen =
            wait_for(&mut events, |e| matches!(e, LifecycleEvent::Reconnecting { .. })).await;
        assert!(seen.contains(&LifecycleEvent::Disconnected));
        assert_eq!(
            seen.last(),
            Some(&LifecycleEvent::Reconnecting {
                attempt: 1,
                delay: Duration::from_millis(20)
            })
        );

        let (mut again, _) = accept(&listener).await;
        assert_eq!(next_json(&mut again).await["action"], "join_game");
        wait_for(&mut events, |e| *e == LifecycleEvent::Connected).await;
        assert_eq!(handle.observer().reconnect_attempt(), 0);

        handle.shutdown();
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        // Nothing listens here once the listener is dropped.
        let (listener, addr) = listen().await;
        drop(listener);

        let handle = SessionHandle::spawn(config(addr, 10, 2));
        let mut events = lifecycle_events(&handle);
        handle.connect(GAME_ID, "alice").await.expect("connect");

        let seen = wait_for(&mut events, |e| *e == LifecycleEvent::ReconnectFailed).await;
        let attempts: Vec<u32> = seen
            .iter()
            .filter_map(|e| match e {
                LifecycleEvent::Reconnecting { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .collect();
        assert_eq!(attempts, vec![1, 2]);
        assert_eq!(handle.observer().state(), ConnectionState::Failed);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_disconnect_cancels_pending_retry() {
        let (listener, addr) = listen().await;
        let handle = SessionHandle::spawn(config(addr, 200, 5));
        let mut events = lifecycle_events(&handle);

        handle.connect(GAME_ID, "alice").await.expect("connect");
        let (mut server, _) = accept(&listener).await;
        next_json(&mut server).await;
        server.close(None).await.expect("close");
        drop(server);

        wait_for(&mut events, |e| matches!(e, LifecycleEvent::Reconnecting { .. })).await;
        handle.disconnect().await.expect("disconnect");

        let retried = tokio::time::timeout(Duration::from_millis(500), listener.accept()).await;
        assert!(retried.is_err(), "no reconnect after disconnect");
        assert_eq!(handle.observer().state(), ConnectionState::Idle);
    }

    #[tokio::test]
    async fn test_requests_fail_after_shutdown() {
        let (_listener, addr) = listen().await;
        let handle = SessionHandle::spawn(config(addr, 50, 5));
        handle.shutdown();

        // The task drains the channel before the sender notices.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let err = handle.disconnect().await.expect_err("stopped");
        assert!(matches!(err, ClientError::SessionClosed));
    }
}
