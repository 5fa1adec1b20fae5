use thiserror::Error;

use super::input::{RawInputState, ScanCode};

/// Logical gameplay input channel, decoupled from the physical key that drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionSlot(pub u8);

impl ActionSlot {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Resolved level of an action. Keyboard bindings only produce `Level(0 | 1)`;
/// `Analog` is reserved for axis-style sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionLevel {
    Level(i32),
    Analog(f32),
}

impl Default for ActionLevel {
    fn default() -> Self {
        ActionLevel::Level(0)
    }
}

impl ActionLevel {
    pub fn is_active(self) -> bool {
        match self {
            ActionLevel::Level(value) => value != 0,
            ActionLevel::Analog(value) => value != 0.0,
        }
    }

    /// Magnitude as a float; integer levels convert directly.
    pub fn as_f32(self) -> f32 {
        match self {
            ActionLevel::Level(value) => value as f32,
            ActionLevel::Analog(value) => value,
        }
    }

    fn from_pressed(pressed: bool) -> Self {
        ActionLevel::Level(i32::from(pressed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionValue {
    pub slot: ActionSlot,
    pub level: ActionLevel,
}

/// Source-key to action-slot entry. `source == None` means unbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub source: Option<ScanCode>,
    pub slot: ActionSlot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebind {
    pub slot: ActionSlot,
    pub previous: Option<ScanCode>,
    pub source: ScanCode,
    /// Slot that lost `source` so the new binding could take it.
    pub displaced: Option<ActionSlot>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionMapError {
    #[error("action map has no bindings")]
    Empty,
    #[error("binding {position} feeds slot {found}, expected slot {position}")]
    NonContiguousSlot { position: usize, found: u8 },
    #[error("more than 256 bindings")]
    TooManySlots,
    #[error("slots {first} and {second} are both bound to {key}")]
    DuplicateSource {
        key: ScanCode,
        first: u8,
        second: u8,
    },
    #[error("slot {slot} does not exist")]
    UnknownSlot { slot: u8 },
}

/// Ordered binding table. Slot `i` lives at position `i`, and no two bindings
/// share a bound source key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionMap {
    bindings: Vec<Binding>,
}

impl ActionMap {
    pub fn new(bindings: Vec<Binding>) -> Result<Self, ActionMapError> {
        if bindings.is_empty() {
            return Err(ActionMapError::Empty);
        }
        if bindings.len() > u8::MAX as usize + 1 {
            return Err(ActionMapError::TooManySlots);
        }
        for (position, binding) in bindings.iter().enumerate() {
            if binding.slot.index() != position {
                return Err(ActionMapError::NonContiguousSlot {
                    position,
                    found: binding.slot.0,
                });
            }
            let Some(source) = binding.source else {
                continue;
            };
            if let Some(earlier) = bindings[..position]
                .iter()
                .find(|other| other.source == Some(source))
            {
                return Err(ActionMapError::DuplicateSource {
                    key: source,
                    first: earlier.slot.0,
                    second: binding.slot.0,
                });
            }
        }
        Ok(Self { bindings })
    }

    /// Builds slots `0..sources.len()` in order.
    pub fn from_sources(sources: &[Option<ScanCode>]) -> Result<Self, ActionMapError> {
        let mut bindings = Vec::with_capacity(sources.len());
        for (index, source) in sources.iter().enumerate() {
            let slot = u8::try_from(index).map_err(|_| ActionMapError::TooManySlots)?;
            bindings.push(Binding {
                source: *source,
                slot: ActionSlot(slot),
            });
        }
        Self::new(bindings)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn binding(&self, slot: ActionSlot) -> Option<&Binding> {
        self.bindings.get(slot.index())
    }

    pub fn slot_for_source(&self, source: ScanCode) -> Option<ActionSlot> {
        self.bindings
            .iter()
            .find(|binding| binding.source == Some(source))
            .map(|binding| binding.slot)
    }

    /// Points `slot` at `source`. Any other slot already driven by `source` is
    /// unbound in the same call, so uniqueness holds on return.
    pub fn rebind(&mut self, slot: ActionSlot, source: ScanCode) -> Result<Rebind, ActionMapError> {
        if slot.index() >= self.bindings.len() {
            return Err(ActionMapError::UnknownSlot { slot: slot.0 });
        }

        let previous = self.bindings[slot.index()].source.replace(source);
        let mut displaced = None;
        for other in self.bindings.iter_mut() {
            if other.slot != slot && other.source == Some(source) {
                other.source = None;
                displaced = Some(other.slot);
            }
        }

        Ok(Rebind {
            slot,
            previous,
            source,
            displaced,
        })
    }

    pub fn unbind(&mut self, slot: ActionSlot) -> Result<Option<ScanCode>, ActionMapError> {
        self.bindings
            .get_mut(slot.index())
            .map(|binding| binding.source.take())
            .ok_or(ActionMapError::UnknownSlot { slot: slot.0 })
    }

    /// Pure function of the binding table and `raw`'s current-frame flags.
    /// Unbound slots resolve to `Level(0)`.
    pub fn resolve(&self, raw: &RawInputState) -> Vec<ActionValue> {
        self.bindings
            .iter()
            .map(|binding| ActionValue {
                slot: binding.slot,
                level: ActionLevel::from_pressed(
                    binding.source.is_some_and(|source| raw.is_down(source)),
                ),
            })
            .collect()
    }
}

/// Current and previous generation of resolved actions, mirroring the raw
/// input double buffer.
#[derive(Debug, Clone)]
pub struct ActionFrame {
    current: Vec<ActionValue>,
    previous: Vec<ActionValue>,
}

impl ActionFrame {
    pub fn new(slot_count: usize) -> Self {
        let values = (0..slot_count)
            .map(|index| ActionValue {
                slot: ActionSlot(index as u8),
                level: ActionLevel::default(),
            })
            .collect::<Vec<_>>();
        Self {
            current: values.clone(),
            previous: values,
        }
    }

    pub fn for_map(map: &ActionMap) -> Self {
        Self::new(map.len())
    }

    pub fn begin_frame(&mut self) {
        self.previous.clone_from(&self.current);
    }

    pub fn store(&mut self, values: Vec<ActionValue>) {
        debug_assert_eq!(values.len(), self.current.len());
        self.current = values;
    }

    /// Carries last frame's values forward unchanged.
    pub fn freeze(&mut self) {
        self.current.clone_from(&self.previous);
    }

    pub fn current(&self) -> &[ActionValue] {
        &self.current
    }

    pub fn previous(&self) -> &[ActionValue] {
        &self.previous
    }

    pub fn value(&self, slot: ActionSlot) -> Option<ActionValue> {
        self.current.get(slot.index()).copied()
    }

    pub fn level(&self, slot: ActionSlot) -> ActionLevel {
        self.current
            .get(slot.index())
            .map(|value| value.level)
            .unwrap_or_default()
    }

    pub fn is_active(&self, slot: ActionSlot) -> bool {
        self.level(slot).is_active()
    }

    pub fn was_active(&self, slot: ActionSlot) -> bool {
        self.previous
            .get(slot.index())
            .is_some_and(|value| value.level.is_active())
    }

    pub fn just_activated(&self, slot: ActionSlot) -> bool {
        self.is_active(slot) && !self.was_active(slot)
    }

    pub fn just_deactivated(&self, slot: ActionSlot) -> bool {
        !self.is_active(slot) && self.was_active(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_slot_map() -> ActionMap {
        ActionMap::from_sources(&[Some(ScanCode::A), Some(ScanCode::B)]).expect("map")
    }

    fn raw_with_down(codes: &[ScanCode]) -> RawInputState {
        let mut raw = RawInputState::new();
        raw.begin_frame();
        for code in codes {
            raw.apply_event(*code, true);
        }
        raw
    }

    fn levels(values: &[ActionValue]) -> Vec<ActionLevel> {
        values.iter().map(|value| value.level).collect()
    }

    fn assert_sources_unique(map: &ActionMap) {
        let bindings = map.bindings();
        for (index, binding) in bindings.iter().enumerate() {
            let Some(source) = binding.source else {
                continue;
            };
            assert!(
                bindings[index + 1..]
                    .iter()
                    .all(|other| other.source != Some(source)),
                "{source} bound twice in {bindings:?}"
            );
        }
    }

    #[test]
    fn resolve_reports_pressed_binding_only() {
        let map = two_slot_map();
        let raw = raw_with_down(&[ScanCode::B]);

        let values = map.resolve(&raw);

        assert_eq!(values[0].slot, ActionSlot(0));
        assert_eq!(values[1].slot, ActionSlot(1));
        assert_eq!(
            levels(&values),
            vec![ActionLevel::Level(0), ActionLevel::Level(1)]
        );
    }

    #[test]
    fn unbound_slot_resolves_to_zero_even_if_old_key_is_down() {
        let mut map = two_slot_map();
        map.unbind(ActionSlot(0)).expect("slot 0");
        let raw = raw_with_down(&[ScanCode::A]);

        let values = map.resolve(&raw);

        assert_eq!(values[0].level, ActionLevel::Level(0));
    }

    #[test]
    fn resolve_is_deterministic_for_identical_inputs() {
        let map = two_slot_map();
        let raw = raw_with_down(&[ScanCode::A, ScanCode::C]);

        assert_eq!(map.resolve(&raw), map.resolve(&raw));
        assert_eq!(map.resolve(&raw), map.clone().resolve(&raw.clone()));
    }

    #[test]
    fn rebind_collision_clears_previous_owner() {
        let mut map = two_slot_map();

        let rebind = map.rebind(ActionSlot(1), ScanCode::A).expect("rebind");

        assert_eq!(rebind.previous, Some(ScanCode::B));
        assert_eq!(rebind.displaced, Some(ActionSlot(0)));
        assert_eq!(map.bindings()[0].source, None);
        assert_eq!(map.bindings()[1].source, Some(ScanCode::A));
    }

    #[test]
    fn rebind_to_own_key_displaces_nothing() {
        let mut map = two_slot_map();

        let rebind = map.rebind(ActionSlot(0), ScanCode::A).expect("rebind");

        assert_eq!(rebind.displaced, None);
        assert_eq!(map, two_slot_map());
    }

    #[test]
    fn rebind_rejects_unknown_slot() {
        let mut map = two_slot_map();
        assert_eq!(
            map.rebind(ActionSlot(7), ScanCode::C),
            Err(ActionMapError::UnknownSlot { slot: 7 })
        );
        assert_eq!(map, two_slot_map());
    }

    #[test]
    fn sources_stay_unique_across_rebind_sequences() {
        let mut map = ActionMap::from_sources(&[
            Some(ScanCode::LEFT),
            Some(ScanCode::RIGHT),
            Some(ScanCode::DOWN),
            Some(ScanCode::UP),
        ])
        .expect("map");
        let keys = [
            ScanCode::A,
            ScanCode::LEFT,
            ScanCode::UP,
            ScanCode::B,
            ScanCode::RIGHT,
        ];

        // Linear congruential walk so the sequence is fixed but not trivially ordered.
        let mut seed = 17u32;
        for _ in 0..500 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let slot = ActionSlot(((seed >> 8) % 4) as u8);
            let key = keys[((seed >> 16) as usize) % keys.len()];
            map.rebind(slot, key).expect("rebind");
            assert_sources_unique(&map);
            assert_eq!(map.binding(slot).and_then(|binding| binding.source), Some(key));
        }
    }

    #[test]
    fn construction_rejects_duplicate_sources() {
        let error = ActionMap::from_sources(&[Some(ScanCode::A), None, Some(ScanCode::A)])
            .expect_err("duplicate");
        assert_eq!(
            error,
            ActionMapError::DuplicateSource {
                key: ScanCode::A,
                first: 0,
                second: 2,
            }
        );
    }

    #[test]
    fn construction_allows_multiple_unbound_slots() {
        let map = ActionMap::from_sources(&[None, None, Some(ScanCode::A)]).expect("map");
        assert_eq!(map.len(), 3);
        assert_eq!(map.slot_for_source(ScanCode::A), Some(ActionSlot(2)));
    }

    #[test]
    fn construction_rejects_gaps_and_empty_tables() {
        assert_eq!(ActionMap::new(Vec::new()), Err(ActionMapError::Empty));
        let gap = ActionMap::new(vec![
            Binding {
                source: Some(ScanCode::A),
                slot: ActionSlot(0),
            },
            Binding {
                source: Some(ScanCode::B),
                slot: ActionSlot(2),
            },
        ]);
        assert_eq!(
            gap,
            Err(ActionMapError::NonContiguousSlot {
                position: 1,
                found: 2
            })
        );
    }

    #[test]
    fn action_frame_tracks_edges_across_generations() {
        let map = two_slot_map();
        let mut frame = ActionFrame::for_map(&map);

        frame.begin_frame();
        frame.store(map.resolve(&raw_with_down(&[ScanCode::A])));
        assert!(frame.just_activated(ActionSlot(0)));
        assert!(!frame.is_active(ActionSlot(1)));

        frame.begin_frame();
        frame.store(map.resolve(&raw_with_down(&[ScanCode::A])));
        assert!(frame.is_active(ActionSlot(0)));
        assert!(!frame.just_activated(ActionSlot(0)));

        frame.begin_frame();
        frame.store(map.resolve(&raw_with_down(&[])));
        assert!(frame.just_deactivated(ActionSlot(0)));
    }

    #[test]
    fn freeze_carries_previous_values_forward() {
        let map = two_slot_map();
        let mut frame = ActionFrame::for_map(&map);
        frame.begin_frame();
        frame.store(map.resolve(&raw_with_down(&[ScanCode::B])));

        frame.begin_frame();
        frame.store(map.resolve(&raw_with_down(&[ScanCode::A])));
        frame.freeze();

        assert!(frame.is_active(ActionSlot(1)));
        assert!(!frame.is_active(ActionSlot(0)));
        assert_eq!(frame.current(), frame.previous());
    }

    #[test]
    fn analog_levels_report_activity() {
        assert!(ActionLevel::Analog(0.25).is_active());
        assert!(!ActionLevel::Analog(0.0).is_active());
        assert!(ActionLevel::Level(-1).is_active());
        assert_eq!(ActionLevel::default(), ActionLevel::Level(0));
    }

    #[test]
    fn level_for_missing_slot_defaults_to_zero() {
        let frame = ActionFrame::new(1);
        assert_eq!(frame.level(ActionSlot(9)), ActionLevel::Level(0));
        assert!(!frame.was_active(ActionSlot(9)));
    }

    #[test]
    fn level_magnitude_and_value_lookup() {
        assert_eq!(ActionLevel::Level(1).as_f32(), 1.0);
        assert_eq!(ActionLevel::Analog(-0.5).as_f32(), -0.5);

        let frame = ActionFrame::new(2);
        assert_eq!(
            frame.value(ActionSlot(1)),
            Some(ActionValue {
                slot: ActionSlot(1),
                level: ActionLevel::Level(0),
            })
        );
        assert_eq!(frame.value(ActionSlot(2)), None);
    }
}
