use std::fmt;

pub const KEY_COUNT: usize = 16;

/// State of the 16-key hex pad. Written by the frontend between cycles, only read by the interpreter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pressed_keys: [bool; KEY_COUNT],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys wrap at 16, so any register value is a valid index.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.pressed_keys[(key & 0xF) as usize]
    }

    pub fn press_key(&mut self, key: u8) {
        self.set_key(key, true);
    }

    pub fn release_key(&mut self, key: u8) {
        self.set_key(key, false);
    }

    pub fn set_key(&mut self, key: u8, pressed: bool) {
        self.pressed_keys[(key & 0xF) as usize] = pressed;
    }

    pub fn clear(&mut self) {
        self.pressed_keys = [false; KEY_COUNT];
    }

    /// Lowest-numbered key that is currently held down.
    pub fn first_pressed(&self) -> Option<u8> {
        self.pressed_keys.iter().position(|k| *k).map(|key| key as u8)
    }
}

impl fmt::Display for Keyboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pressed_keys.map(|k| if k { "o" } else { " " }).join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pressed() {
        let mut keyboard = Keyboard::new();

        let key: u8 = 0x4;
        keyboard.pressed_keys[key as usize] = true;

        assert!(keyboard.is_pressed(key));
        assert!(keyboard.is_pressed(0x14));
    }

    #[test]
    fn test_press_and_release() {
        let mut keyboard = Keyboard::new();

        let key: u8 = 0xA;
        keyboard.press_key(key);
        assert!(keyboard.pressed_keys[key as usize]);

        keyboard.release_key(key);
        assert!(!keyboard.pressed_keys[key as usize]);
    }

    #[test]
    fn test_first_pressed() {
        let mut keyboard = Keyboard::new();
        assert_eq!(keyboard.first_pressed(), None);

        keyboard.press_key(0xC);
        keyboard.press_key(0x3);

        assert_eq!(keyboard.first_pressed(), Some(0x3));
    }

    #[test]
    fn test_clear() {
        let mut keyboard = Keyboard::new();

        for key in 0..16 {
            keyboard.press_key(key);
        }

        keyboard.clear();

        for key in 0..16 {
            assert!(!keyboard.is_pressed(key));
        }
        assert_eq!(keyboard.first_pressed(), None);
    }

    #[test]
    fn test_display() {
        let mut keyboard = Keyboard::new();
        keyboard.press_key(0x0);
        keyboard.press_key(0xF);

        assert_eq!(keyboard.to_string(), format!("o{}o", " ".repeat(14)));
    }
}
