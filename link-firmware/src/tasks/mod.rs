// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (HTTP → Main-Loop, Main-Loop → WebSocket).

pub mod control;
pub mod http;
pub mod wifi;

// Re-export Tasks für einfachen Import
pub use control::{NodePeripherals, direction_control_task, speed_control_task};
pub use http::{direction_http_task, speed_http_task};
pub use wifi::{access_point_task, dhcp_server_task, net_task};
