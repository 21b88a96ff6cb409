//! Price tiers a ticket may be issued in.

pub const LOW: i32 = 15;
pub const MID: i32 = 30;
pub const HIGH: i32 = 50;

pub const ALLOWED_SECTIONS: [i32; 3] = [LOW, MID, HIGH];

pub fn is_allowed(section: i32) -> bool {
    ALLOWED_SECTIONS.contains(&section)
}
