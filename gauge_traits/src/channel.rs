//! Logical slider channels.

use std::fmt;

/// One of the six slider sensors on the exhibit panel.
///
/// The discriminant is the channel's slot in every per-channel array and in
/// the persisted profile record, so the order must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Shower = 0,
    Toilet = 1,
    Sink = 2,
    Dishes = 3,
    Laundry = 4,
    Lawn = 5,
}

impl Channel {
    pub const COUNT: usize = 6;

    pub const ALL: [Channel; Channel::COUNT] = [
        Channel::Shower,
        Channel::Toilet,
        Channel::Sink,
        Channel::Dishes,
        Channel::Laundry,
        Channel::Lawn,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Channel::Shower => "shower",
            Channel::Toilet => "toilet",
            Channel::Sink => "sink",
            Channel::Dishes => "dishes",
            Channel::Laundry => "laundry",
            Channel::Lawn => "lawn",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
