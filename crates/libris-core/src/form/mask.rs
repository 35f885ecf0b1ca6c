//! Input masks
//!
//! Pattern characters: `9` accepts a digit, `a` a letter, `*` a letter or a
//! digit. Every other character is a literal that is inserted automatically.
//! Applying a mask to already-masked text leaves it unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Digit,
    Letter,
    Alphanumeric,
}

impl Slot {
    fn of(c: char) -> Option<Self> {
        match c {
            '9' => Some(Slot::Digit),
            'a' => Some(Slot::Letter),
            '*' => Some(Slot::Alphanumeric),
            _ => None,
        }
    }

    fn accepts(self, c: char) -> bool {
        match self {
            Slot::Digit => c.is_ascii_digit(),
            Slot::Letter => c.is_alphabetic(),
            Slot::Alphanumeric => c.is_alphanumeric(),
        }
    }
}

/// Input mask pattern, e.g. `"(99) 999-99-99"` or `"aa 9999999"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mask {
    pattern: String,
}

impl Mask {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Format raw input against the pattern
    ///
    /// Characters that do not fit the next slot are dropped; input beyond the
    /// pattern is truncated; literals are emitted only while input remains.
    pub fn apply(&self, raw: &str) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut input = raw.chars().peekable();

        for p in self.pattern.chars() {
            if input.peek().is_none() {
                break;
            }
            match Slot::of(p) {
                Some(slot) => loop {
                    match input.next() {
                        Some(c) if slot.accepts(c) => {
                            out.push(c);
                            break;
                        }
                        Some(_) => continue,
                        None => return out,
                    }
                },
                None => {
                    out.push(p);
                    if input.peek() == Some(&p) {
                        input.next();
                    }
                }
            }
        }
        out
    }

    /// Whether masked text fills every slot of the pattern
    pub fn is_complete(&self, masked: &str) -> bool {
        masked.chars().count() == self.pattern.chars().count()
    }

    /// Slot characters only, with literals removed
    pub fn unmask(&self, masked: &str) -> String {
        masked
            .chars()
            .zip(self.pattern.chars())
            .filter(|(_, p)| Slot::of(*p).is_some())
            .map(|(c, _)| c)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> Mask {
        Mask::new("(99) 999-99-99")
    }

    #[test]
    fn test_apply_phone() {
        assert_eq!(phone().apply("901234567"), "(90) 123-45-67");
        assert_eq!(phone().apply("9012"), "(90) 12");
        assert_eq!(phone().apply(""), "");
    }

    #[test]
    fn test_apply_drops_invalid_and_truncates() {
        assert_eq!(phone().apply("90x1234567999"), "(90) 123-45-67");
        assert_eq!(phone().apply("abc"), "(");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let once = phone().apply("90123");
        assert_eq!(phone().apply(&once), once);
        let full = phone().apply("901234567");
        assert_eq!(phone().apply(&full), full);
    }

    #[test]
    fn test_letters_and_alphanumerics() {
        let passport = Mask::new("aa 9999999");
        assert_eq!(passport.apply("AB1234567"), "AB 1234567");
        assert_eq!(passport.apply("1AB"), "AB");
        assert_eq!(Mask::new("***-***").apply("a1b2c3"), "a1b-2c3");
    }

    #[test]
    fn test_complete_and_unmask() {
        let masked = phone().apply("901234567");
        assert!(phone().is_complete(&masked));
        assert!(!phone().is_complete("(90) 12"));
        assert_eq!(phone().unmask(&masked), "901234567");
    }
}
