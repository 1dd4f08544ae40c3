use crate::terminal::KeyCode;

/// A single-key drive command understood by the remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveCommand {
    Forward,
    Back,
    Left,
    Right,
    Stop,
}

/// Letter keys (matched case-insensitively) and space
const DRIVE_KEYS: [(u8, DriveCommand); 5] = [
    (b'i', DriveCommand::Forward),
    (b'm', DriveCommand::Back),
    (b'j', DriveCommand::Left),
    (b'k', DriveCommand::Right),
    (b' ', DriveCommand::Stop),
];

impl DriveCommand {
    /// Map a decoded key to its drive command, if it has one
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::ArrowUp => Some(DriveCommand::Forward),
            KeyCode::ArrowDown => Some(DriveCommand::Back),
            KeyCode::ArrowLeft => Some(DriveCommand::Left),
            KeyCode::ArrowRight => Some(DriveCommand::Right),
            KeyCode::Char(byte) => {
                let byte = byte.to_ascii_lowercase();
                DRIVE_KEYS
                    .iter()
                    .find(|(key, _)| *key == byte)
                    .map(|(_, cmd)| *cmd)
            }
            _ => None,
        }
    }

    /// Bytes sent to the device, unframed
    pub fn wire(self) -> &'static [u8] {
        match self {
            DriveCommand::Forward => b"F",
            DriveCommand::Back => b"B",
            DriveCommand::Left => b"LL",
            DriveCommand::Right => b"RR",
            DriveCommand::Stop => b"SS",
        }
    }

    /// Name shown in the dispatch log
    pub fn name(self) -> &'static str {
        match self {
            DriveCommand::Forward => "FORWARD",
            DriveCommand::Back => "BACK",
            DriveCommand::Left => "LEFT",
            DriveCommand::Right => "RIGHT",
            DriveCommand::Stop => "STOP",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_keys_ignore_case() {
        assert_eq!(DriveCommand::from_key(KeyCode::Char(b'i')), Some(DriveCommand::Forward));
        assert_eq!(DriveCommand::from_key(KeyCode::Char(b'I')), Some(DriveCommand::Forward));
        assert_eq!(DriveCommand::from_key(KeyCode::Char(b'M')), Some(DriveCommand::Back));
        assert_eq!(DriveCommand::from_key(KeyCode::Char(b' ')), Some(DriveCommand::Stop));
        assert_eq!(DriveCommand::from_key(KeyCode::Char(b'x')), None);
    }

    #[test]
    fn test_arrow_keys() {
        assert_eq!(DriveCommand::from_key(KeyCode::ArrowUp), Some(DriveCommand::Forward));
        assert_eq!(DriveCommand::from_key(KeyCode::ArrowDown), Some(DriveCommand::Back));
        assert_eq!(DriveCommand::from_key(KeyCode::ArrowLeft), Some(DriveCommand::Left));
        assert_eq!(DriveCommand::from_key(KeyCode::ArrowRight), Some(DriveCommand::Right));
        assert_eq!(DriveCommand::from_key(KeyCode::Enter), None);
    }

    #[test]
    fn test_wire_bytes() {
        assert_eq!(DriveCommand::Forward.wire(), b"F");
        assert_eq!(DriveCommand::Right.wire(), b"RR");
        assert_eq!(DriveCommand::Stop.name(), "STOP");
    }
}
