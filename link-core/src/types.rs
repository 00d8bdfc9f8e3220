//! Core Types für die Zwei-Geräte-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

use core::fmt;

/// Anzahl der Anzeige-LEDs pro Gerät
pub const LED_COUNT: usize = 3;

/// Schaltzustand aller Anzeige-LEDs (`true` = HIGH)
pub type LedPattern = [bool; LED_COUNT];

/// Maximale Länge eines WebSocket-Frames (`"1,0,0"` = 5 Zeichen)
pub const FRAME_CAPACITY: usize = 8;

/// Text-Frame für WebSocket-Pushes
pub type Frame = heapless::String<FRAME_CAPACITY>;

/// Kommando auf der seriellen Leitung zwischen den beiden Geräten
///
/// Wird als einzelnes, ungerahmtes Byte übertragen.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToggleCommand {
    /// Gegenstelle soll reagieren (Speed-Step bzw. Richtungswechsel)
    On = 0x14,
    /// Quittung auf `On`
    SuccessfullyReceived = 0x28,
}

impl From<ToggleCommand> for u8 {
    fn from(command: ToggleCommand) -> Self {
        command as u8
    }
}

/// Unbekanntes Byte auf der Leitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnknownCommand(pub u8);

impl TryFrom<u8> for ToggleCommand {
    type Error = UnknownCommand;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x14 => Ok(Self::On),
            0x28 => Ok(Self::SuccessfullyReceived),
            other => Err(UnknownCommand(other)),
        }
    }
}

/// Position der LED-Rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedPhase {
    #[default]
    First,
    Second,
    Third,
}

impl LedPhase {
    pub const fn index(self) -> usize {
        match self {
            LedPhase::First => 0,
            LedPhase::Second => 1,
            LedPhase::Third => 2,
        }
    }

    /// Phase zu Index; Werte >= 3 werden zyklisch abgebildet
    pub const fn from_index(index: usize) -> Self {
        match index % LED_COUNT {
            0 => LedPhase::First,
            1 => LedPhase::Second,
            _ => LedPhase::Third,
        }
    }

    /// Nächste Phase: First → Second → Third → First
    pub const fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Gespiegelte Phase (Index `2 - i`) für Rückwärts-Lauf
    pub const fn mirrored(self) -> Self {
        Self::from_index(LED_COUNT - 1 - self.index())
    }

    /// Muster mit genau einer leuchtenden LED
    pub fn pattern(self) -> LedPattern {
        let mut pattern = [false; LED_COUNT];
        pattern[self.index()] = true;
        pattern
    }
}

/// Laufrichtung der LED-Rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub const fn from_reversed(reversed: bool) -> Self {
        if reversed {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }

    pub const fn is_reversed(self) -> bool {
        matches!(self, Direction::Reverse)
    }

    pub const fn toggled(self) -> Self {
        Self::from_reversed(!self.is_reversed())
    }

    /// Bildet die Animator-Phase auf die tatsächlich leuchtende LED ab
    pub const fn apply(self, phase: LedPhase) -> LedPhase {
        match self {
            Direction::Forward => phase,
            Direction::Reverse => phase.mirrored(),
        }
    }
}

/// Zustands-Snapshot für WebSocket-Clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// Index der leuchtenden LED als Dezimalzahl (`"0"`..`"2"`)
    Phase(LedPhase),
    /// Alle Pin-Zustände komma-getrennt (`"0,1,0"`)
    Pins(LedPattern),
}

impl Snapshot {
    /// Rendert den Snapshot als Text-Frame
    pub fn frame(&self) -> Frame {
        use core::fmt::Write;

        let mut frame = Frame::new();
        // Passt immer: längster Frame ist "x,x,x"
        let _ = write!(frame, "{}", self);
        frame
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Snapshot::Phase(phase) => write!(f, "{}", phase.index()),
            Snapshot::Pins(pins) => {
                for (i, on) in pins.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(if *on { "1" } else { "0" })?;
                }
                Ok(())
            }
        }
    }
}

/// Text-Kommando vom Browser über WebSocket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClientCommand {
    Toggle,
}

impl TryFrom<&str> for ClientCommand {
    type Error = ();

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        match text {
            "TOGGLE" => Ok(Self::Toggle),
            _ => Err(()),
        }
    }
}

/// Auslöser einer Zustandsänderung (für Logs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChangeSource {
    Button,
    Web,
    WebSocket,
    Peer,
}

/// Auftrag vom Web-Gateway an den Main-Loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlRequest {
    /// Blink-Intervall um einen Schritt verkürzen
    ChangeInterval,
    /// Laufrichtung umkehren
    ToggleDirection(ChangeSource),
    /// `On` an das Partner-Gerät senden
    NotifyPeer,
}

impl From<ClientCommand> for ControlRequest {
    fn from(command: ClientCommand) -> Self {
        match command {
            ClientCommand::Toggle => ControlRequest::ToggleDirection(ChangeSource::WebSocket),
        }
    }
}

/// Welches der beiden Geräte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// Gerät 1: Button-Hold verkürzt das Intervall
    Speed,
    /// Gerät 2: Button kehrt die Laufrichtung um
    Direction,
}

/// Status-Abfrage für `GET /status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeStatus {
    pub node: NodeKind,
    pub phase: u8,
    pub interval_ms: u32,
    pub reversed: bool,
}

/// Ergebnis eines Polls auf der seriellen Leitung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// `On` empfangen und an den Handler übergeben
    Dispatched {
        command: ToggleCommand,
        reply: Option<ToggleCommand>,
    },
    /// Byte gelesen und verworfen (inkl. Quittungen)
    Discarded(u8),
}

/// Was ein Poll-Schritt eines Nodes bewirkt hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEvent {
    IntervalChanged {
        interval_ms: u32,
        source: ChangeSource,
    },
    DirectionChanged {
        direction: Direction,
        source: ChangeSource,
    },
    LedsAdvanced(Snapshot),
    CommandSent(ToggleCommand),
    Link(LinkEvent),
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for Snapshot {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Snapshot::Phase(phase) => defmt::write!(fmt, "Phase({})", phase.index()),
            Snapshot::Pins(pins) => {
                defmt::write!(fmt, "Pins({}, {}, {})", pins[0], pins[1], pins[2])
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for NodeEvent {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            NodeEvent::IntervalChanged {
                interval_ms,
                source,
            } => defmt::write!(fmt, "IntervalChanged {{ {} ms, {} }}", interval_ms, source),
            NodeEvent::DirectionChanged { direction, source } => {
                defmt::write!(fmt, "DirectionChanged {{ {}, {} }}", direction, source)
            }
            NodeEvent::LedsAdvanced(snapshot) => defmt::write!(fmt, "LedsAdvanced({})", snapshot),
            NodeEvent::CommandSent(command) => defmt::write!(fmt, "CommandSent({})", command),
            NodeEvent::Link(event) => defmt::write!(fmt, "Link({})", event),
        }
    }
}
