use std::fmt;

use winit::keyboard::{KeyCode, PhysicalKey};

use super::input::ScanCode;

const KEY_TABLE: &[(KeyCode, u16, &str)] = &[
    (KeyCode::KeyA, 4, "A"),
    (KeyCode::KeyB, 5, "B"),
    (KeyCode::KeyC, 6, "C"),
    (KeyCode::KeyD, 7, "D"),
    (KeyCode::KeyE, 8, "E"),
    (KeyCode::KeyF, 9, "F"),
    (KeyCode::KeyG, 10, "G"),
    (KeyCode::KeyH, 11, "H"),
    (KeyCode::KeyI, 12, "I"),
    (KeyCode::KeyJ, 13, "J"),
    (KeyCode::KeyK, 14, "K"),
    (KeyCode::KeyL, 15, "L"),
    (KeyCode::KeyM, 16, "M"),
    (KeyCode::KeyN, 17, "N"),
    (KeyCode::KeyO, 18, "O"),
    (KeyCode::KeyP, 19, "P"),
    (KeyCode::KeyQ, 20, "Q"),
    (KeyCode::KeyR, 21, "R"),
    (KeyCode::KeyS, 22, "S"),
    (KeyCode::KeyT, 23, "T"),
    (KeyCode::KeyU, 24, "U"),
    (KeyCode::KeyV, 25, "V"),
    (KeyCode::KeyW, 26, "W"),
    (KeyCode::KeyX, 27, "X"),
    (KeyCode::KeyY, 28, "Y"),
    (KeyCode::KeyZ, 29, "Z"),
    (KeyCode::Digit1, 30, "1"),
    (KeyCode::Digit2, 31, "2"),
    (KeyCode::Digit3, 32, "3"),
    (KeyCode::Digit4, 33, "4"),
    (KeyCode::Digit5, 34, "5"),
    (KeyCode::Digit6, 35, "6"),
    (KeyCode::Digit7, 36, "7"),
    (KeyCode::Digit8, 37, "8"),
    (KeyCode::Digit9, 38, "9"),
    (KeyCode::Digit0, 39, "0"),
    (KeyCode::Enter, 40, "Return"),
    (KeyCode::Escape, 41, "Escape"),
    (KeyCode::Backspace, 42, "Backspace"),
    (KeyCode::Tab, 43, "Tab"),
    (KeyCode::Space, 44, "Space"),
    (KeyCode::Minus, 45, "-"),
    (KeyCode::Equal, 46, "="),
    (KeyCode::BracketLeft, 47, "["),
    (KeyCode::BracketRight, 48, "]"),
    (KeyCode::Backslash, 49, "\\"),
    (KeyCode::Semicolon, 51, ";"),
    (KeyCode::Quote, 52, "'"),
    (KeyCode::Backquote, 53, "`"),
    (KeyCode::Comma, 54, ","),
    (KeyCode::Period, 55, "."),
    (KeyCode::Slash, 56, "/"),
    (KeyCode::CapsLock, 57, "CapsLock"),
    (KeyCode::F1, 58, "F1"),
    (KeyCode::F2, 59, "F2"),
    (KeyCode::F3, 60, "F3"),
    (KeyCode::F4, 61, "F4"),
    (KeyCode::F5, 62, "F5"),
    (KeyCode::F6, 63, "F6"),
    (KeyCode::F7, 64, "F7"),
    (KeyCode::F8, 65, "F8"),
    (KeyCode::F9, 66, "F9"),
    (KeyCode::F10, 67, "F10"),
    (KeyCode::F11, 68, "F11"),
    (KeyCode::F12, 69, "F12"),
    (KeyCode::PrintScreen, 70, "PrintScreen"),
    (KeyCode::ScrollLock, 71, "ScrollLock"),
    (KeyCode::Pause, 72, "Pause"),
    (KeyCode::Insert, 73, "Insert"),
    (KeyCode::Home, 74, "Home"),
    (KeyCode::PageUp, 75, "PageUp"),
    (KeyCode::Delete, 76, "Delete"),
    (KeyCode::End, 77, "End"),
    (KeyCode::PageDown, 78, "PageDown"),
    (KeyCode::ArrowRight, 79, "Right"),
    (KeyCode::ArrowLeft, 80, "Left"),
    (KeyCode::ArrowDown, 81, "Down"),
    (KeyCode::ArrowUp, 82, "Up"),
    (KeyCode::NumLock, 83, "Numlock"),
    (KeyCode::NumpadDivide, 84, "Keypad /"),
    (KeyCode::NumpadMultiply, 85, "Keypad *"),
    (KeyCode::NumpadSubtract, 86, "Keypad -"),
    (KeyCode::NumpadAdd, 87, "Keypad +"),
    (KeyCode::NumpadEnter, 88, "Keypad Enter"),
    (KeyCode::Numpad1, 89, "Keypad 1"),
    (KeyCode::Numpad2, 90, "Keypad 2"),
    (KeyCode::Numpad3, 91, "Keypad 3"),
    (KeyCode::Numpad4, 92, "Keypad 4"),
    (KeyCode::Numpad5, 93, "Keypad 5"),
    (KeyCode::Numpad6, 94, "Keypad 6"),
    (KeyCode::Numpad7, 95, "Keypad 7"),
    (KeyCode::Numpad8, 96, "Keypad 8"),
    (KeyCode::Numpad9, 97, "Keypad 9"),
    (KeyCode::Numpad0, 98, "Keypad 0"),
    (KeyCode::NumpadDecimal, 99, "Keypad ."),
    (KeyCode::ControlLeft, 224, "Left Ctrl"),
    (KeyCode::ShiftLeft, 225, "Left Shift"),
    (KeyCode::AltLeft, 226, "Left Alt"),
    (KeyCode::SuperLeft, 227, "Left GUI"),
    (KeyCode::ControlRight, 228, "Right Ctrl"),
    (KeyCode::ShiftRight, 229, "Right Shift"),
    (KeyCode::AltRight, 230, "Right Alt"),
    (KeyCode::SuperRight, 231, "Right GUI"),
];

/// Translates a winit physical key into the engine scancode space.
/// Keys without a table entry return `None` and are ignored by the loop.
pub fn scancode_from_physical_key(key: PhysicalKey) -> Option<ScanCode> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    KEY_TABLE
        .iter()
        .find(|(candidate, _, _)| *candidate == code)
        .and_then(|(_, raw, _)| ScanCode::new(*raw))
}

pub fn scancode_name(code: ScanCode) -> Option<&'static str> {
    KEY_TABLE
        .iter()
        .find(|(_, raw, _)| *raw == code.raw())
        .map(|(_, _, name)| *name)
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match scancode_name(*self) {
            Some(name) => write!(f, "{name} ({})", self.raw()),
            None => write!(f, "scancode {}", self.raw()),
        }
    }
}
