//! Mood command identifiers from the control channel
//!
//! The control channel carries single-byte command ids. This crate maps
//! them to [`Mood`] and nothing more; which face belongs to which mood is
//! decided by whoever holds the image assets.

// Command IDs: controller → face display
pub const CMD_CALM: u8 = 0x30;
pub const CMD_BLINK: u8 = 0x31;
pub const CMD_ANGRY: u8 = 0x32;
pub const CMD_HAPPY: u8 = 0x33;
pub const CMD_SAD: u8 = 0x34;

/// Number of distinct moods
pub const MOOD_COUNT: usize = 5;

/// Errors from decoding a mood command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoodError {
    /// Byte is not a known command id
    UnknownCommand(u8),
}

/// Face selected by the control channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mood {
    Calm = CMD_CALM,
    Blink = CMD_BLINK,
    Angry = CMD_ANGRY,
    Happy = CMD_HAPPY,
    Sad = CMD_SAD,
}

impl Mood {
    /// All moods in command-id order
    pub const ALL: [Mood; MOOD_COUNT] = [
        Mood::Calm,
        Mood::Blink,
        Mood::Angry,
        Mood::Happy,
        Mood::Sad,
    ];

    /// Parse a command id
    pub fn from_u8(value: u8) -> Result<Self, MoodError> {
        match value {
            CMD_CALM => Ok(Mood::Calm),
            CMD_BLINK => Ok(Mood::Blink),
            CMD_ANGRY => Ok(Mood::Angry),
            CMD_HAPPY => Ok(Mood::Happy),
            CMD_SAD => Ok(Mood::Sad),
            other => Err(MoodError::UnknownCommand(other)),
        }
    }

    /// The command id for this mood
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Dense index in `0..MOOD_COUNT`, for table lookups
    pub fn index(self) -> usize {
        (self as u8 - CMD_CALM) as usize
    }
}

impl TryFrom<u8> for Mood {
    type Error = MoodError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Mood::from_u8(value)
    }
}
