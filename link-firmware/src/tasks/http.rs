// HTTP Server Tasks - Steuerseite, Aktions-Routen, Status und WebSocket
use alloc::string::String;
use core::future::pending;

use defmt::{info, warn};
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use embassy_time::Duration;
use link_core::{ChangeSource, ClientCommand, ControlRequest, SharedState};
use picoserve::response::{IntoResponse, Response, StatusCode, WebSocketUpgrade, ws};
use picoserve::{io::embedded_io_async, routing::get};

use crate::config::*;
use crate::web::{DIRECTION_HTML, SPEED_HTML};
use crate::{RequestSender, SnapshotChannel, SnapshotSubscriber};

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<WebSocketHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                Response::new(
                    StatusCode::new(503),
                    "Service Unavailable: Too many WebSocket connections",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// Device 1: HTTP Server Task
///
/// - `GET /`               Steuerseite
/// - `GET /changeInterval` Intervall einen Schritt verkürzen (204)
/// - `GET /remote`         `On` an das Partner-Gerät senden (204)
/// - `GET /status`         Zustand als JSON
/// - `GET /ws`             LED-Index bei jedem Schritt
///
/// **Task Pool:** wird `HTTP_TASK_COUNT`x gespawnt (Seite + WebSocket gleichzeitig)
#[embassy_executor::task(pool_size = 4)]
pub async fn speed_http_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    state: &'static SharedState,
    snapshots: &'static SnapshotChannel,
    requests: RequestSender,
) {
    info!("HTTP: Speed server task {} starting on port {}...", task_id, HTTP_PORT);

    let app = picoserve::Router::new()
        .route("/", get(|| serve_html(SPEED_HTML)))
        .route(
            "/changeInterval",
            get(move || async move {
                info!("HTTP: Change interval requested");
                requests.send(ControlRequest::ChangeInterval).await;
                Response::new(StatusCode::new(204), "")
            }),
        )
        .route(
            "/remote",
            get(move || async move {
                info!("HTTP: Remote trigger requested");
                requests.send(ControlRequest::NotifyPeer).await;
                Response::new(StatusCode::new(204), "")
            }),
        )
        .route("/status", get(move || serve_status(state)))
        .route(
            "/ws",
            get(move |upgrade: WebSocketUpgrade| async move {
                upgrade_websocket(upgrade, snapshots, None)
            }),
        );

    let config = server_config();
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);
    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Speed server task {} ended", task_id);
}

/// Device 2: HTTP Server Task
///
/// - `GET /`               Steuerseite
/// - `GET /toggleLEDs`     Laufrichtung umkehren (200 text/plain)
/// - `GET /simulateRemote` `On` an das Partner-Gerät senden (200 text/plain)
/// - `GET /status`         Zustand als JSON
/// - `GET /ws`             Pin-Zustände bei jedem Schritt, nimmt `TOGGLE` an
#[embassy_executor::task(pool_size = 4)]
pub async fn direction_http_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    state: &'static SharedState,
    snapshots: &'static SnapshotChannel,
    requests: RequestSender,
) {
    info!(
        "HTTP: Direction server task {} starting on port {}...",
        task_id, HTTP_PORT
    );

    let app = picoserve::Router::new()
        .route("/", get(|| serve_html(DIRECTION_HTML)))
        .route(
            "/toggleLEDs",
            get(move || async move {
                info!("HTTP: Direction toggle requested");
                requests
                    .send(ControlRequest::ToggleDirection(ChangeSource::Web))
                    .await;
                plain_text("LED direction toggled.")
            }),
        )
        .route(
            "/simulateRemote",
            get(move || async move {
                info!("HTTP: Simulated remote button press");
                requests.send(ControlRequest::NotifyPeer).await;
                plain_text("Simulated remote button press.")
            }),
        )
        .route("/status", get(move || serve_status(state)))
        .route(
            "/ws",
            get(move |upgrade: WebSocketUpgrade| async move {
                upgrade_websocket(upgrade, snapshots, Some(requests))
            }),
        );

    let config = server_config();
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    let server = picoserve::Server::new(&app, &config, &mut http_buffer);
    let _ = server
        .listen_and_serve(task_id, *stack, HTTP_PORT, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Direction server task {} ended", task_id);
}

/// Gemeinsame Timeouts beider Server
fn server_config() -> picoserve::Config<Duration> {
    picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive()
}

/// Serviert eine eingebettete HTML-Seite
async fn serve_html(page: &'static str) -> impl IntoResponse {
    Response::new(StatusCode::OK, page).with_header("Content-Type", "text/html; charset=utf-8")
}

fn plain_text(body: &'static str) -> impl IntoResponse {
    Response::new(StatusCode::OK, body).with_header("Content-Type", "text/plain; charset=utf-8")
}

/// Serialisiert `SharedState::status()` als JSON
async fn serve_status(state: &'static SharedState) -> impl IntoResponse {
    let status = state.status();
    let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];

    let json = serde_json_core::to_slice(&status, &mut json_buffer)
        .ok()
        .and_then(|n| core::str::from_utf8(&json_buffer[..n]).ok());

    match json {
        Some(json) => Response::new(StatusCode::OK, String::from(json))
            .with_header("Content-Type", "application/json"),
        None => {
            warn!("HTTP: Status serialization failed");
            Response::new(
                StatusCode::new(500),
                String::from("Status serialization failed"),
            )
            .with_header("Content-Type", "text/plain; charset=utf-8")
        }
    }
}

/// Erstellt einen Subscriber für die neue Verbindung
///
/// Sind alle Subscriber-Slots belegt, läuft der nächste Upgrade auf dem
/// letzten freien HTTP-Task und bekommt HTTP 503 statt Panic.
fn upgrade_websocket(
    upgrade: WebSocketUpgrade,
    snapshots: &'static SnapshotChannel,
    requests: Option<RequestSender>,
) -> WebSocketResponse {
    info!("HTTP: WebSocket upgrade requested");

    match snapshots.subscriber() {
        Ok(subscriber) => WebSocketResponse::Upgrade(upgrade.on_upgrade(WebSocketHandler {
            subscriber,
            requests,
        })),
        Err(_) => {
            info!(
                "HTTP: No subscriber slots available ({} in use), sending HTTP 503",
                MAX_WEBSOCKET_CLIENTS
            );
            WebSocketResponse::ServiceUnavailable
        }
    }
}

/// WebSocket-Handler State
///
/// `requests` ist nur auf Device 2 gesetzt; dort schaltet `TOGGLE` die Richtung um.
struct WebSocketHandler {
    subscriber: SnapshotSubscriber,
    requests: Option<RequestSender>,
}

impl ws::WebSocketCallback for WebSocketHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        mut self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        info!("HTTP: WebSocket connection established");

        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        let close_reason = loop {
            // Gleichzeitig auf Browser-Nachrichten und LED-Snapshots warten
            match select(
                rx.next_message(&mut buffer, pending()),
                self.subscriber.next_message_pure(),
            )
            .await
            {
                Either::First(ws_result) => match ws_result?.ignore_never_b() {
                    Ok(ws::Message::Text(data)) => match (ClientCommand::try_from(data), self.requests) {
                        (Ok(command), Some(requests)) => {
                            info!("HTTP: WebSocket command {}", command);
                            requests.send(ControlRequest::from(command)).await;
                        }
                        _ => {
                            info!("HTTP: Ignoring text message: {} bytes", data.len());
                        }
                    },
                    Ok(ws::Message::Binary(data)) => {
                        info!(
                            "HTTP: Received binary message: {} bytes (ignored)",
                            data.len()
                        );
                    }
                    Ok(ws::Message::Ping(data)) => {
                        tx.send_pong(data).await?;
                    }
                    Ok(ws::Message::Pong(_)) => {}
                    Ok(ws::Message::Close(_reason)) => {
                        info!("HTTP: WebSocket close received");
                        break None;
                    }
                    Err(error) => {
                        warn!("HTTP: WebSocket error");
                        break Some((error.code(), "WebSocket Error"));
                    }
                },
                Either::Second(snapshot) => {
                    tx.send_text(snapshot.frame().as_str()).await?;
                }
            }
        };

        info!("HTTP: WebSocket connection closed");
        tx.close(close_reason).await
    }
}
