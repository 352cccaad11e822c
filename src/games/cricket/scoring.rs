//! Mark and overflow arithmetic for a single cricket dart.

use super::types::{CRICKET_NUMBERS, MARKS_TO_CLOSE};

pub fn is_cricket_number(segment: u8) -> bool {
    CRICKET_NUMBERS.contains(&segment)
}

/// Points per overflow mark. The bull is worth 25, every other number its face value.
pub fn point_value(number: u8) -> u32 {
    number as u32
}

/// Split `add` marks into the part that fills remaining room and the overflow.
/// A number that is already closed has no room, so everything overflows.
///
/// Returns `(applied, overflow)`.
pub fn split_marks(current: u8, add: u8) -> (u8, u8) {
    let room = MARKS_TO_CLOSE.saturating_sub(current);
    let applied = add.min(room);
    (applied, add - applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cricket_numbers() {
        assert!(is_cricket_number(15));
        assert!(is_cricket_number(20));
        assert!(is_cricket_number(25));
        assert!(!is_cricket_number(14));
        assert!(!is_cricket_number(0));
    }

    #[test]
    fn test_split_marks() {
        assert_eq!(split_marks(0, 1), (1, 0));
        assert_eq!(split_marks(0, 3), (3, 0));
        assert_eq!(split_marks(2, 3), (1, 2));
        assert_eq!(split_marks(3, 2), (0, 2));
    }

    #[test]
    fn test_point_values() {
        assert_eq!(point_value(25), 25);
        assert_eq!(point_value(17), 17);
    }
}
