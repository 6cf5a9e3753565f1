//! Conversion des événements clavier Winit vers les types Servo.
//!
//! Seules les touches utiles à la navigation et à l'édition de formulaires
//! sont traduites ; le reste devient `Unidentified`.

use servo::{Code, Key, KeyState, KeyboardEvent, Location, Modifiers, NamedKey};
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{
    Key as WinitKey, KeyCode, KeyLocation as WinitKeyLocation, ModifiersState,
    NamedKey as WinitNamedKey, PhysicalKey,
};

/// Convertit un `KeyEvent` Winit + état des modificateurs en `KeyboardEvent` Servo.
pub fn keyboard_event_from_winit(key_event: &KeyEvent, state: ModifiersState) -> KeyboardEvent {
    KeyboardEvent::new_without_event(
        key_state_from_winit(key_event.state),
        key_from_winit(&key_event.logical_key),
        code_from_winit(&key_event.physical_key),
        location_from_winit(key_event.location),
        modifiers_from_winit(state),
        false,
        false,
    )
}

fn key_state_from_winit(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Down,
        ElementState::Released => KeyState::Up,
    }
}

/// Associe des variantes de même nom entre deux enums.
macro_rules! same_name {
    ($value:expr, $from:ident => $to:ident, [$($name:ident),* $(,)?], $fallback:expr) => {
        match $value {
            $($from::$name => $to::$name,)*
            _ => $fallback,
        }
    };
}

#[allow(deprecated)]
fn key_from_winit(logical_key: &WinitKey) -> Key {
    let named_key = match logical_key {
        WinitKey::Named(named_key) => *named_key,
        WinitKey::Character(string) => return Key::Character(string.to_string()),
        WinitKey::Unidentified(_) | WinitKey::Dead(_) => {
            return Key::Named(NamedKey::Unidentified);
        }
    };

    // Space est un caractère côté DOM.
    if named_key == WinitNamedKey::Space {
        return Key::Character(" ".to_string());
    }

    Key::Named(same_name!(
        named_key,
        WinitNamedKey => NamedKey,
        [
            Alt, AltGraph, CapsLock, Control, Fn, Meta, NumLock, Shift, Super,
            Enter, Tab, ArrowDown, ArrowLeft, ArrowRight, ArrowUp, End, Home,
            PageDown, PageUp, Backspace, Clear, Copy, Cut, Delete, Insert, Paste,
            Redo, Undo, ContextMenu, Escape, Pause, PrintScreen,
            BrowserBack, BrowserForward, BrowserHome, BrowserRefresh,
            BrowserSearch, BrowserStop,
            F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
        ],
        NamedKey::Unidentified
    ))
}

fn location_from_winit(location: WinitKeyLocation) -> Location {
    match location {
        WinitKeyLocation::Left => Location::Left,
        WinitKeyLocation::Numpad => Location::Numpad,
        WinitKeyLocation::Right => Location::Right,
        WinitKeyLocation::Standard => Location::Standard,
    }
}

#[allow(deprecated)]
fn code_from_winit(physical_key: &PhysicalKey) -> Code {
    let key_code = match physical_key {
        PhysicalKey::Code(key_code) => *key_code,
        PhysicalKey::Unidentified(_) => return Code::Unidentified,
    };

    match key_code {
        KeyCode::SuperLeft => Code::MetaLeft,
        KeyCode::SuperRight => Code::MetaRight,
        other => same_name!(
            other,
            KeyCode => Code,
            [
                Backquote, Backslash, BracketLeft, BracketRight, Comma, Equal, Minus,
                Period, Quote, Semicolon, Slash,
                Digit0, Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7,
                Digit8, Digit9,
                KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK,
                KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV,
                KeyW, KeyX, KeyY, KeyZ,
                AltLeft, AltRight, Backspace, CapsLock, ContextMenu, ControlLeft,
                ControlRight, Enter, ShiftLeft, ShiftRight, Space, Tab,
                Delete, End, Home, Insert, PageDown, PageUp,
                ArrowDown, ArrowLeft, ArrowRight, ArrowUp,
                NumLock, Numpad0, Numpad1, Numpad2, Numpad3, Numpad4, Numpad5,
                Numpad6, Numpad7, Numpad8, Numpad9, NumpadAdd, NumpadDecimal,
                NumpadDivide, NumpadEnter, NumpadMultiply, NumpadSubtract,
                Escape, PrintScreen, ScrollLock, Pause,
                F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
            ],
            Code::Unidentified
        ),
    }
}

fn modifiers_from_winit(mods: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::CONTROL, mods.control_key());
    modifiers.set(Modifiers::SHIFT, mods.shift_key());
    modifiers.set(Modifiers::ALT, mods.alt_key());
    modifiers.set(Modifiers::META, mods.super_key());
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_state() {
        assert_eq!(key_state_from_winit(ElementState::Pressed), KeyState::Down);
        assert_eq!(key_state_from_winit(ElementState::Released), KeyState::Up);
    }

    #[test]
    fn test_character_key() {
        let key = WinitKey::Character("é".into());
        assert_eq!(key_from_winit(&key), Key::Character("é".to_string()));
    }

    #[test]
    fn test_named_editing_keys() {
        for (winit, servo) in [
            (WinitNamedKey::Enter, NamedKey::Enter),
            (WinitNamedKey::Backspace, NamedKey::Backspace),
            (WinitNamedKey::ArrowLeft, NamedKey::ArrowLeft),
            (WinitNamedKey::F5, NamedKey::F5),
        ] {
            assert_eq!(key_from_winit(&WinitKey::Named(winit)), Key::Named(servo));
        }
    }

    #[test]
    fn test_space_maps_to_character() {
        let key = WinitKey::Named(WinitNamedKey::Space);
        assert_eq!(key_from_winit(&key), Key::Character(" ".to_string()));
    }

    #[test]
    fn test_unmapped_named_key_is_unidentified() {
        let key = WinitKey::Named(WinitNamedKey::AudioVolumeUp);
        assert_eq!(key_from_winit(&key), Key::Named(NamedKey::Unidentified));
    }

    #[test]
    fn test_codes() {
        assert_eq!(code_from_winit(&PhysicalKey::Code(KeyCode::KeyL)), Code::KeyL);
        assert_eq!(
            code_from_winit(&PhysicalKey::Code(KeyCode::SuperLeft)),
            Code::MetaLeft
        );
        let unidentified = PhysicalKey::Unidentified(winit::keyboard::NativeKeyCode::Unidentified);
        assert_eq!(code_from_winit(&unidentified), Code::Unidentified);
    }

    #[test]
    fn test_location() {
        assert_eq!(location_from_winit(WinitKeyLocation::Numpad), Location::Numpad);
    }

    #[test]
    fn test_modifiers() {
        let result = modifiers_from_winit(ModifiersState::CONTROL | ModifiersState::SUPER);
        assert!(result.contains(Modifiers::CONTROL));
        assert!(result.contains(Modifiers::META));
        assert!(!result.contains(Modifiers::SHIFT));
    }
}
