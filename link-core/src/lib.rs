//! Link Core - Platform-agnostic Logic and Traits
//!
//! Diese Crate enthält KEINE Hardware-Dependencies.
//! Sie definiert das Leitungs-Protokoll, die Zustandsautomaten und die
//! Node-Logik beider Geräte.

#![no_std]

pub mod animator;
pub mod link;
pub mod logic;
pub mod node;
pub mod state;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use animator::LedAnimator;
pub use link::{CommandLink, LinkConfig, Parity};
pub use logic::{SpeedProfile, next_interval, status_color};
pub use node::{DirectionNode, Node, NodeError, NodeResult, SpeedNode};
pub use state::{ButtonLatch, ButtonMode, DirectionFlag, PhaseCell, SharedState, SpeedSetting};
pub use traits::{CommandHandler, LedBank, LedError, LinkError, SerialPort, SmartLedWriter};
pub use types::{
    ChangeSource, ClientCommand, ControlRequest, Direction, Frame, LED_COUNT, LedPattern,
    LedPhase, LinkEvent, NodeEvent, NodeKind, NodeStatus, Snapshot, ToggleCommand,
    UnknownCommand,
};
