/// Logical presentation targets

use std::fmt;

/// One logical presentation target
///
/// The console backend drives two of them (TV and the handheld companion
/// display); the desktop backend drives exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Surface {
    /// TV output / desktop window
    Primary,
    /// Handheld companion display (console only)
    Secondary,
}

impl Surface {
    /// Every surface, in allocation order
    pub const ALL: [Surface; 2] = [Surface::Primary, Surface::Secondary];

    /// Slot of this surface inside a render target collection
    pub fn index(self) -> usize {
        match self {
            Surface::Primary => 0,
            Surface::Secondary => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Surface::Primary => "TV",
            Surface::Secondary => "DRC",
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
