/// Size of the physical key-code space. Matches the USB HID usage page range
/// the platform adapter translates into.
pub const KEY_CODE_SPACE: usize = 512;

/// Physical key identifier, independent of keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanCode(u16);

impl ScanCode {
    pub const A: ScanCode = ScanCode(4);
    pub const B: ScanCode = ScanCode(5);
    pub const C: ScanCode = ScanCode(6);
    pub const D: ScanCode = ScanCode(7);
    pub const E: ScanCode = ScanCode(8);
    pub const F: ScanCode = ScanCode(9);
    pub const G: ScanCode = ScanCode(10);
    pub const H: ScanCode = ScanCode(11);
    pub const I: ScanCode = ScanCode(12);
    pub const J: ScanCode = ScanCode(13);
    pub const K: ScanCode = ScanCode(14);
    pub const L: ScanCode = ScanCode(15);
    pub const M: ScanCode = ScanCode(16);
    pub const N: ScanCode = ScanCode(17);
    pub const O: ScanCode = ScanCode(18);
    pub const P: ScanCode = ScanCode(19);
    pub const Q: ScanCode = ScanCode(20);
    pub const R: ScanCode = ScanCode(21);
    pub const S: ScanCode = ScanCode(22);
    pub const T: ScanCode = ScanCode(23);
    pub const U: ScanCode = ScanCode(24);
    pub const V: ScanCode = ScanCode(25);
    pub const W: ScanCode = ScanCode(26);
    pub const X: ScanCode = ScanCode(27);
    pub const Y: ScanCode = ScanCode(28);
    pub const Z: ScanCode = ScanCode(29);
    pub const DIGIT_1: ScanCode = ScanCode(30);
    pub const DIGIT_2: ScanCode = ScanCode(31);
    pub const DIGIT_3: ScanCode = ScanCode(32);
    pub const DIGIT_4: ScanCode = ScanCode(33);
    pub const DIGIT_5: ScanCode = ScanCode(34);
    pub const DIGIT_6: ScanCode = ScanCode(35);
    pub const DIGIT_7: ScanCode = ScanCode(36);
    pub const DIGIT_8: ScanCode = ScanCode(37);
    pub const DIGIT_9: ScanCode = ScanCode(38);
    pub const DIGIT_0: ScanCode = ScanCode(39);
    pub const RETURN: ScanCode = ScanCode(40);
    pub const ESCAPE: ScanCode = ScanCode(41);
    pub const BACKSPACE: ScanCode = ScanCode(42);
    pub const TAB: ScanCode = ScanCode(43);
    pub const SPACE: ScanCode = ScanCode(44);
    pub const F1: ScanCode = ScanCode(58);
    pub const F2: ScanCode = ScanCode(59);
    pub const F3: ScanCode = ScanCode(60);
    pub const F4: ScanCode = ScanCode(61);
    pub const F5: ScanCode = ScanCode(62);
    pub const F6: ScanCode = ScanCode(63);
    pub const F7: ScanCode = ScanCode(64);
    pub const F8: ScanCode = ScanCode(65);
    pub const F9: ScanCode = ScanCode(66);
    pub const F10: ScanCode = ScanCode(67);
    pub const F11: ScanCode = ScanCode(68);
    pub const F12: ScanCode = ScanCode(69);
    pub const RIGHT: ScanCode = ScanCode(79);
    pub const LEFT: ScanCode = ScanCode(80);
    pub const DOWN: ScanCode = ScanCode(81);
    pub const UP: ScanCode = ScanCode(82);
    pub const LEFT_CTRL: ScanCode = ScanCode(224);
    pub const LEFT_SHIFT: ScanCode = ScanCode(225);
    pub const LEFT_ALT: ScanCode = ScanCode(226);
    pub const RIGHT_CTRL: ScanCode = ScanCode(228);
    pub const RIGHT_SHIFT: ScanCode = ScanCode(229);
    pub const RIGHT_ALT: ScanCode = ScanCode(230);

    /// Returns `None` when `raw` falls outside the key-code space.
    pub const fn new(raw: u16) -> Option<Self> {
        if (raw as usize) < KEY_CODE_SPACE {
            Some(Self(raw))
        } else {
            None
        }
    }

    pub const fn raw(self) -> u16 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One platform input event, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(ScanCode),
    KeyUp(ScanCode),
    Quit,
}

/// Per-scancode "currently down" flags, double-buffered against the previous
/// frame so edges can be derived instead of stored.
///
/// `down_prev` is only ever written by [`RawInputState::begin_frame`].
#[derive(Debug, Clone)]
pub struct RawInputState {
    down: Box<[bool]>,
    down_prev: Box<[bool]>,
}

impl Default for RawInputState {
    fn default() -> Self {
        Self::new()
    }
}

impl RawInputState {
    pub fn new() -> Self {
        Self {
            down: vec![false; KEY_CODE_SPACE].into_boxed_slice(),
            down_prev: vec![false; KEY_CODE_SPACE].into_boxed_slice(),
        }
    }

    pub fn begin_frame(&mut self) {
        self.down_prev.copy_from_slice(&self.down);
    }

    pub fn apply_event(&mut self, code: ScanCode, pressed: bool) {
        self.down[code.index()] = pressed;
    }

    pub fn is_down(&self, code: ScanCode) -> bool {
        self.down[code.index()]
    }

    pub fn was_down(&self, code: ScanCode) -> bool {
        self.down_prev[code.index()]
    }

    pub fn just_pressed(&self, code: ScanCode) -> bool {
        self.is_down(code) && !self.was_down(code)
    }

    pub fn just_released(&self, code: ScanCode) -> bool {
        !self.is_down(code) && self.was_down(code)
    }

    /// Lowest scancode that went down this frame, skipping `excluded`.
    pub fn first_just_pressed_excluding(&self, excluded: ScanCode) -> Option<ScanCode> {
        self.just_pressed_codes().find(|code| *code != excluded)
    }

    /// Scancodes that went down this frame, in ascending order.
    pub fn just_pressed_codes(&self) -> impl Iterator<Item = ScanCode> + '_ {
        self.down
            .iter()
            .zip(self.down_prev.iter())
            .enumerate()
            .filter(|(_, (now, before))| **now && !**before)
            .map(|(index, _)| ScanCode(index as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(state: &mut RawInputState, events: &[(ScanCode, bool)]) {
        state.begin_frame();
        for (code, pressed) in events {
            state.apply_event(*code, *pressed);
        }
    }

    #[test]
    fn scancode_rejects_out_of_range_values() {
        assert_eq!(ScanCode::new(4), Some(ScanCode::A));
        assert_eq!(ScanCode::new(KEY_CODE_SPACE as u16 - 1).map(ScanCode::raw), Some(511));
        assert_eq!(ScanCode::new(KEY_CODE_SPACE as u16), None);
    }

    #[test]
    fn press_is_edge_triggered_for_single_tick() {
        let mut state = RawInputState::new();

        tick(&mut state, &[(ScanCode::A, true)]);
        assert!(state.is_down(ScanCode::A));
        assert!(state.just_pressed(ScanCode::A));

        tick(&mut state, &[]);
        assert!(state.is_down(ScanCode::A));
        assert!(!state.just_pressed(ScanCode::A));
    }

    #[test]
    fn release_is_edge_triggered_for_single_tick() {
        let mut state = RawInputState::new();
        tick(&mut state, &[(ScanCode::B, true)]);

        tick(&mut state, &[(ScanCode::B, false)]);
        assert!(state.just_released(ScanCode::B));
        assert!(!state.just_pressed(ScanCode::B));

        tick(&mut state, &[]);
        assert!(!state.just_released(ScanCode::B));
    }

    #[test]
    fn duplicate_key_down_is_idempotent() {
        let mut once = RawInputState::new();
        tick(&mut once, &[(ScanCode::C, true)]);

        let mut twice = RawInputState::new();
        tick(&mut twice, &[(ScanCode::C, true), (ScanCode::C, true)]);

        assert_eq!(once.down, twice.down);
        assert_eq!(once.down_prev, twice.down_prev);
        assert!(twice.just_pressed(ScanCode::C));
    }

    #[test]
    fn repeated_down_on_held_key_produces_no_new_edge() {
        let mut state = RawInputState::new();
        tick(&mut state, &[(ScanCode::UP, true)]);
        tick(&mut state, &[(ScanCode::UP, true)]);

        assert!(!state.just_pressed(ScanCode::UP));
    }

    #[test]
    fn press_and_release_within_one_tick_leaves_no_edge() {
        let mut state = RawInputState::new();
        tick(&mut state, &[(ScanCode::D, true), (ScanCode::D, false)]);

        assert!(!state.is_down(ScanCode::D));
        assert!(!state.just_pressed(ScanCode::D));
        assert!(!state.just_released(ScanCode::D));
    }

    #[test]
    fn begin_frame_snapshots_end_of_previous_frame() {
        let mut state = RawInputState::new();
        tick(&mut state, &[(ScanCode::E, true), (ScanCode::F, true)]);
        tick(&mut state, &[(ScanCode::F, false)]);

        assert!(state.was_down(ScanCode::E));
        assert!(state.was_down(ScanCode::F));
        assert!(!state.is_down(ScanCode::F));
    }

    #[test]
    fn first_just_pressed_prefers_lowest_code_and_skips_excluded() {
        let mut state = RawInputState::new();
        tick(
            &mut state,
            &[(ScanCode::UP, true), (ScanCode::Q, true), (ScanCode::Z, true)],
        );

        assert_eq!(
            state.first_just_pressed_excluding(ScanCode::ESCAPE),
            Some(ScanCode::Q)
        );
        assert_eq!(
            state.first_just_pressed_excluding(ScanCode::Q),
            Some(ScanCode::Z)
        );
        let codes = state.just_pressed_codes().collect::<Vec<_>>();
        assert_eq!(codes, vec![ScanCode::Q, ScanCode::Z, ScanCode::UP]);
    }

    #[test]
    fn held_keys_are_not_reported_as_just_pressed() {
        let mut state = RawInputState::new();
        tick(&mut state, &[(ScanCode::A, true)]);
        tick(&mut state, &[(ScanCode::B, true)]);

        assert_eq!(
            state.first_just_pressed_excluding(ScanCode::Q),
            Some(ScanCode::B)
        );
    }

    #[test]
    fn edges_match_a_reference_model_across_random_event_walks() {
        let keys = [ScanCode::A, ScanCode::B, ScanCode::LEFT, ScanCode::SPACE];
        let mut state = RawInputState::new();
        let mut model_prev = [false; 4];
        let mut model_down = [false; 4];

        // Linear congruential walk; duplicate downs and stray ups are both exercised.
        let mut seed = 91u32;
        for _ in 0..400 {
            model_prev = model_down;
            state.begin_frame();
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let event_count = (seed >> 24) % 4;
            for _ in 0..event_count {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let index = ((seed >> 8) as usize) % keys.len();
                let pressed = (seed >> 16) & 1 == 1;
                state.apply_event(keys[index], pressed);
                model_down[index] = pressed;
            }

            for (index, code) in keys.iter().enumerate() {
                let (before, now) = (model_prev[index], model_down[index]);
                assert_eq!(state.is_down(*code), now);
                assert_eq!(state.was_down(*code), before);
                assert_eq!(state.just_pressed(*code), now && !before);
                assert_eq!(state.just_released(*code), !now && before);
            }
            let expected_first = keys
                .iter()
                .enumerate()
                .filter(|(index, _)| model_down[*index] && !model_prev[*index])
                .map(|(_, code)| *code)
                .min();
            assert_eq!(state.just_pressed_codes().next(), expected_first);
        }
    }
}
