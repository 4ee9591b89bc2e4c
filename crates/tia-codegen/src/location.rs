//! Where a trace call is inserted

use std::fmt::{self, Display, Formatter};

/// Position of a trace call within a behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceInjectionLocation {
    /// Before the body runs
    Entry,
    /// After the body completes
    Exit,
}

impl TraceInjectionLocation {
    /// Both locations, in insertion order
    pub const ALL: [Self; 2] = [Self::Entry, Self::Exit];

    /// Label used in console output
    #[must_use]
    pub const fn print_name(self) -> &'static str {
        match self {
            Self::Entry => "Entering",
            Self::Exit => "Exiting",
        }
    }

    /// Method name of the logger call
    #[must_use]
    pub const fn logging_name(self) -> &'static str {
        match self {
            Self::Entry => "entering",
            Self::Exit => "exiting",
        }
    }
}

impl Display for TraceInjectionLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.logging_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(TraceInjectionLocation::Entry.print_name(), "Entering");
        assert_eq!(TraceInjectionLocation::Entry.logging_name(), "entering");
        assert_eq!(TraceInjectionLocation::Exit.print_name(), "Exiting");
        assert_eq!(TraceInjectionLocation::Exit.logging_name(), "exiting");
        assert_eq!(TraceInjectionLocation::ALL[0], TraceInjectionLocation::Entry);
    }
}
