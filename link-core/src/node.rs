//! Node-Controller: die Geräte-Logik beider Geräte
//!
//! Ein Node besitzt seine LEDs, seine serielle Leitung und den Animator und
//! liest/schreibt den geteilten Zustand. Der Main-Loop der Firmware ruft die
//! Poll-Methoden in fester Reihenfolge auf:
//! `poll_button` → `poll_leds` → `handle_request` (je Web-Auftrag) → `poll_link`.

use crate::animator::LedAnimator;
use crate::link::CommandLink;
use crate::state::SharedState;
use crate::traits::{CommandHandler, LedBank, LedError, LinkError, SerialPort};
use crate::types::{
    ChangeSource, ControlRequest, LinkEvent, NodeEvent, NodeKind, Snapshot, ToggleCommand,
};

/// Fehler eines Poll-Schritts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeError {
    Led(LedError),
    Link(LinkError),
}

impl From<LedError> for NodeError {
    fn from(error: LedError) -> Self {
        NodeError::Led(error)
    }
}

impl From<LinkError> for NodeError {
    fn from(error: LinkError) -> Self {
        NodeError::Link(error)
    }
}

pub type NodeResult = Result<Option<NodeEvent>, NodeError>;

/// Gemeinsame Schnittstelle beider Geräte für den Main-Loop
pub trait Node {
    fn kind(&self) -> NodeKind;

    /// Öffnet die serielle Leitung und setzt die Start-LEDs
    fn start(&mut self) -> Result<(), NodeError>;

    /// Wertet den Button-Latch aus; `button_low` ist der aktuelle Pegel
    fn poll_button(&mut self, now_ms: u64, button_low: bool) -> NodeResult;

    /// Schaltet die LED-Rotation weiter, falls fällig
    fn poll_leds(&mut self, now_ms: u64) -> NodeResult;

    /// Führt einen Auftrag vom Web-Gateway aus
    fn handle_request(&mut self, request: ControlRequest) -> NodeResult;

    /// Verarbeitet höchstens ein Byte von der seriellen Leitung
    fn poll_link(&mut self) -> NodeResult;
}

// ============================================================================
// Device 1: Speed Node
// ============================================================================

/// `On` vom Partner zählt wie ein Button-Hold und wird quittiert
pub struct SpeedLinkHandler<'a> {
    state: &'a SharedState,
}

impl CommandHandler for SpeedLinkHandler<'_> {
    fn on_command(&mut self, command: ToggleCommand) -> Option<ToggleCommand> {
        match command {
            ToggleCommand::On => {
                self.state.button.request_hold();
                Some(ToggleCommand::SuccessfullyReceived)
            }
            ToggleCommand::SuccessfullyReceived => None,
        }
    }
}

/// Device 1: Hold (≥ `hold_ms`) verkürzt das Blink-Intervall
pub struct SpeedNode<'a, B: LedBank, P: SerialPort> {
    state: &'a SharedState,
    leds: B,
    link: CommandLink<P, SpeedLinkHandler<'a>>,
    animator: LedAnimator,
    hold_ms: u32,
}

impl<'a, B: LedBank, P: SerialPort> SpeedNode<'a, B, P> {
    pub fn new(state: &'a SharedState, leds: B, port: P, hold_ms: u32) -> Self {
        Self {
            state,
            leds,
            link: CommandLink::new(port, SpeedLinkHandler { state }),
            animator: LedAnimator::new(),
            hold_ms,
        }
    }

    pub fn leds(&self) -> &B {
        &self.leds
    }
}

impl<B: LedBank, P: SerialPort> Node for SpeedNode<'_, B, P> {
    fn kind(&self) -> NodeKind {
        NodeKind::Speed
    }

    fn start(&mut self) -> Result<(), NodeError> {
        self.link.init()?;
        let phase = self.animator.phase();
        self.state.phase.set(phase);
        self.leds.show(phase.pattern())?;
        Ok(())
    }

    fn poll_button(&mut self, now_ms: u64, button_low: bool) -> NodeResult {
        if !self
            .state
            .button
            .poll_hold(now_ms as u32, button_low, self.hold_ms)
        {
            return Ok(None);
        }
        Ok(Some(NodeEvent::IntervalChanged {
            interval_ms: self.state.speed.step_down(),
            source: ChangeSource::Button,
        }))
    }

    fn poll_leds(&mut self, now_ms: u64) -> NodeResult {
        let Some(phase) = self.animator.poll(now_ms, self.state.speed.interval_ms()) else {
            return Ok(None);
        };
        self.state.phase.set(phase);
        self.leds.show(phase.pattern())?;
        Ok(Some(NodeEvent::LedsAdvanced(Snapshot::Phase(phase))))
    }

    fn handle_request(&mut self, request: ControlRequest) -> NodeResult {
        match request {
            ControlRequest::ChangeInterval => Ok(Some(NodeEvent::IntervalChanged {
                interval_ms: self.state.speed.step_down(),
                source: ChangeSource::Web,
            })),
            ControlRequest::NotifyPeer => {
                self.link.send(ToggleCommand::On)?;
                Ok(Some(NodeEvent::CommandSent(ToggleCommand::On)))
            }
            ControlRequest::ToggleDirection(_) => Ok(None),
        }
    }

    fn poll_link(&mut self) -> NodeResult {
        Ok(self.link.poll()?.map(NodeEvent::Link))
    }
}

// ============================================================================
// Device 2: Direction Node
// ============================================================================

/// `On` vom Partner kehrt die Richtung um, ohne Quittung
pub struct DirectionLinkHandler<'a> {
    state: &'a SharedState,
}

impl CommandHandler for DirectionLinkHandler<'_> {
    fn on_command(&mut self, command: ToggleCommand) -> Option<ToggleCommand> {
        if command == ToggleCommand::On {
            self.state.direction.toggle();
        }
        None
    }
}

/// Device 2: Button (Flanke) kehrt die Richtung um und benachrichtigt den Partner
pub struct DirectionNode<'a, B: LedBank, P: SerialPort> {
    state: &'a SharedState,
    leds: B,
    link: CommandLink<P, DirectionLinkHandler<'a>>,
    animator: LedAnimator,
    button_low: bool,
}

impl<'a, B: LedBank, P: SerialPort> DirectionNode<'a, B, P> {
    pub fn new(state: &'a SharedState, leds: B, port: P) -> Self {
        Self {
            state,
            leds,
            link: CommandLink::new(port, DirectionLinkHandler { state }),
            animator: LedAnimator::new(),
            button_low: false,
        }
    }

    pub fn leds(&self) -> &B {
        &self.leds
    }
}

impl<B: LedBank, P: SerialPort> Node for DirectionNode<'_, B, P> {
    fn kind(&self) -> NodeKind {
        NodeKind::Direction
    }

    fn start(&mut self) -> Result<(), NodeError> {
        self.link.init()?;
        let phase = self.animator.phase();
        self.state.phase.set(phase);
        self.leds.show(phase.pattern())?;
        Ok(())
    }

    fn poll_button(&mut self, _now_ms: u64, button_low: bool) -> NodeResult {
        self.button_low = button_low;
        let presses = self.state.button.take_presses();
        if presses == 0 {
            return Ok(None);
        }
        // Richtung wurde bereits im ISR umgekehrt; ein `On` pro Flanke
        for _ in 0..presses {
            self.link.send(ToggleCommand::On)?;
        }
        Ok(Some(NodeEvent::DirectionChanged {
            direction: self.state.direction.get(),
            source: ChangeSource::Button,
        }))
    }

    fn poll_leds(&mut self, now_ms: u64) -> NodeResult {
        let Some(phase) = self.animator.poll(now_ms, self.state.speed.interval_ms()) else {
            return Ok(None);
        };
        // Gedrückter Button invertiert die Anzeige-Richtung
        let mut direction = self.state.direction.get();
        if self.button_low {
            direction = direction.toggled();
        }
        let lit = direction.apply(phase);
        let pattern = lit.pattern();

        self.state.phase.set(lit);
        self.leds.show(pattern)?;
        Ok(Some(NodeEvent::LedsAdvanced(Snapshot::Pins(pattern))))
    }

    fn handle_request(&mut self, request: ControlRequest) -> NodeResult {
        match request {
            ControlRequest::ToggleDirection(source) => Ok(Some(NodeEvent::DirectionChanged {
                direction: self.state.direction.toggle(),
                source,
            })),
            ControlRequest::NotifyPeer => {
                self.link.send(ToggleCommand::On)?;
                Ok(Some(NodeEvent::CommandSent(ToggleCommand::On)))
            }
            ControlRequest::ChangeInterval => Ok(None),
        }
    }

    fn poll_link(&mut self) -> NodeResult {
        match self.link.poll()? {
            // Handler hat die Richtung bereits umgekehrt
            Some(LinkEvent::Dispatched {
                command: ToggleCommand::On,
                ..
            }) => Ok(Some(NodeEvent::DirectionChanged {
                direction: self.state.direction.get(),
                source: ChangeSource::Peer,
            })),
            event => Ok(event.map(NodeEvent::Link)),
        }
    }
}
