// Library-Root: Hardware-Anbindung und Tasks beider Geräte
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

extern crate alloc;

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von link-core
pub use link_core::{
    ClientCommand, ControlRequest, Node, NodeEvent, NodeKind, SharedState, Snapshot, ToggleCommand,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

use crate::config::{MAX_WEBSOCKET_CLIENTS, REQUEST_QUEUE_SIZE};

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Statt:  Publisher<'static, NoopRawMutex, Snapshot, 2, 10, 1>
// Nutze:  SnapshotPublisher

/// PubSubChannel für LED-Snapshots (Main-Loop → WebSocket-Clients)
/// - 2: Nachrichten-Kapazität im Queue
/// - MAX_WEBSOCKET_CLIENTS: Subscriber (eine pro WebSocket-Verbindung, HTTP-Tasks - 1)
/// - 1: Publisher (Main-Loop)
pub type SnapshotChannel = PubSubChannel<NoopRawMutex, Snapshot, 2, MAX_WEBSOCKET_CLIENTS, 1>;

/// Publisher für LED-Snapshots
pub type SnapshotPublisher =
    Publisher<'static, NoopRawMutex, Snapshot, 2, MAX_WEBSOCKET_CLIENTS, 1>;

/// Subscriber für LED-Snapshots
pub type SnapshotSubscriber =
    Subscriber<'static, NoopRawMutex, Snapshot, 2, MAX_WEBSOCKET_CLIENTS, 1>;

/// Channel für Steuer-Requests (HTTP/WebSocket → Main-Loop)
pub type RequestChannel = Channel<NoopRawMutex, ControlRequest, REQUEST_QUEUE_SIZE>;

/// Sender für Steuer-Requests
pub type RequestSender = Sender<'static, NoopRawMutex, ControlRequest, REQUEST_QUEUE_SIZE>;

/// Receiver für Steuer-Requests (nur der Main-Loop)
pub type RequestReceiver = Receiver<'static, NoopRawMutex, ControlRequest, REQUEST_QUEUE_SIZE>;
