//! Ordinal labels used in diagnostics

use std::fmt;

/// 1-based position of a step, displayed as "1st", "2nd", "3rd", ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ordinal(pub usize);

impl Ordinal {
    /// Ordinal of the step at a 0-based index
    pub fn from_index(index: usize) -> Self {
        Ordinal(index + 1)
    }

    pub fn position(self) -> usize {
        self.0
    }

    fn suffix(self) -> &'static str {
        // 11, 12 and 13 (and 111, 212, ...) always take "th"
        if (11..=13).contains(&(self.0 % 100)) {
            return "th";
        }
        match self.0 % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.suffix())
    }
}

/// Format a position as an ordinal string
pub fn ordinal(position: usize) -> String {
    Ordinal(position).to_string()
}
