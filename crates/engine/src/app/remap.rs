use tracing::{info, warn};

use super::actions::{ActionMap, ActionSlot, Rebind};
use super::input::{RawInputState, ScanCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemapState {
    #[default]
    Idle,
    AwaitingSourceSlot,
    AwaitingNewKey(ActionSlot),
}

impl RemapState {
    pub fn is_active(self) -> bool {
        !matches!(self, RemapState::Idle)
    }
}

/// What a single remap update did. Exactly one is produced per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemapOutcome {
    /// Idle and the toggle key was not pressed.
    Inactive,
    Started,
    /// Toggle pressed while active. `abandoned` is the slot that was selected
    /// but never rebound.
    Stopped { abandoned: Option<ActionSlot> },
    /// Active, but no qualifying key went down this tick.
    Waiting,
    SlotSelected { slot: ActionSlot, source: ScanCode },
    UnusedKey(ScanCode),
    Rebound(Rebind),
    /// The selected slot no longer exists in the map; selection was dropped.
    SlotMissing { slot: ActionSlot },
}

/// Live rebinding state machine. While active it consumes raw key edges
/// instead of the action map:
///
/// - toggle press: `Idle -> AwaitingSourceSlot`, or any active state `-> Idle`
///   (a cancel, never a commit)
/// - key bound to slot `s` in `AwaitingSourceSlot` selects `s`
/// - any key in `AwaitingNewKey(s)` rebinds `s` and returns to
///   `AwaitingSourceSlot`
///
/// Only the lowest just-pressed scancode is considered per tick, and the
/// toggle key is never selectable or bindable.
#[derive(Debug, Clone)]
pub struct RemapController {
    state: RemapState,
    toggle_key: ScanCode,
}

impl RemapController {
    pub fn new(toggle_key: ScanCode) -> Self {
        Self {
            state: RemapState::Idle,
            toggle_key,
        }
    }

    pub fn state(&self) -> RemapState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn toggle_key(&self) -> ScanCode {
        self.toggle_key
    }

    pub fn update(&mut self, raw: &RawInputState, map: &mut ActionMap) -> RemapOutcome {
        if raw.just_pressed(self.toggle_key) {
            return self.toggle();
        }

        match self.state {
            RemapState::Idle => RemapOutcome::Inactive,
            RemapState::AwaitingSourceSlot => {
                let Some(code) = raw.first_just_pressed_excluding(self.toggle_key) else {
                    return RemapOutcome::Waiting;
                };
                match map.slot_for_source(code) {
                    Some(slot) => {
                        info!(key = %code, slot = slot.0, "remap_slot_selected");
                        self.state = RemapState::AwaitingNewKey(slot);
                        RemapOutcome::SlotSelected { slot, source: code }
                    }
                    None => {
                        warn!(key = %code, "remap_unused_key");
                        RemapOutcome::UnusedKey(code)
                    }
                }
            }
            RemapState::AwaitingNewKey(slot) => {
                let Some(code) = raw.first_just_pressed_excluding(self.toggle_key) else {
                    return RemapOutcome::Waiting;
                };
                self.state = RemapState::AwaitingSourceSlot;
                match map.rebind(slot, code) {
                    Ok(rebind) => {
                        let displaced_slot = rebind.displaced.map(|displaced| displaced.0);
                        info!(
                            slot = slot.0,
                            previous = ?rebind.previous,
                            key = %code,
                            ?displaced_slot,
                            "remap_rebound"
                        );
                        RemapOutcome::Rebound(rebind)
                    }
                    Err(error) => {
                        warn!(error = %error, "remap_slot_missing");
                        RemapOutcome::SlotMissing { slot }
                    }
                }
            }
        }
    }

    fn toggle(&mut self) -> RemapOutcome {
        match self.state {
            RemapState::Idle => {
                self.state = RemapState::AwaitingSourceSlot;
                info!(toggle_key = %self.toggle_key, "remap_started");
                RemapOutcome::Started
            }
            RemapState::AwaitingSourceSlot => {
                self.state = RemapState::Idle;
                info!("remap_stopped");
                RemapOutcome::Stopped { abandoned: None }
            }
            RemapState::AwaitingNewKey(slot) => {
                self.state = RemapState::Idle;
                info!(abandoned_slot = slot.0, "remap_stopped");
                RemapOutcome::Stopped {
                    abandoned: Some(slot),
                }
            }
        }
    }
}
