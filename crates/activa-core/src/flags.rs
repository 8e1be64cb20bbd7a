//! Packed boolean columns
//!
//! Keys and events store their booleans in a single byte. The domain
//! structs expose named `bool` fields; these sets only exist at the
//! storage boundary.

use bitflags::bitflags;

bitflags! {
    /// Flags stored on an activation key.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyFlags: u8 {
        const FEATURED = 1 << 0;
        const FREE_FOR_OPEN_SOURCE = 1 << 1;
    }
}

bitflags! {
    /// Flags stored on an activation event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u8 {
        const DONATION_AFFIRMED = 1 << 0;
    }
}

impl KeyFlags {
    /// Pack the two key booleans.
    pub fn pack(featured: bool, free_for_open_source: bool) -> Self {
        let mut flags = KeyFlags::empty();
        flags.set(KeyFlags::FEATURED, featured);
        flags.set(KeyFlags::FREE_FOR_OPEN_SOURCE, free_for_open_source);
        flags
    }
}
