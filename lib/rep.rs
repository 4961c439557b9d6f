//! Representation, propagation-mode, and reporting-phase tags.

use std::fmt;

/// The basis in which a wavefunction, operator, or observable is expressed.
///
/// `Rep` behaves as a two-bit set: `None` is the empty set (no preference),
/// `Both` is the union of `Pos` and `Mom`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rep {
    /// No preference.
    None,
    /// Position space.
    Pos,
    /// Momentum space.
    Mom,
    /// Position and momentum space.
    Both,
}

impl Rep {
    fn bits(self) -> u8 {
        match self {
            Self::None => 0b00,
            Self::Pos => 0b01,
            Self::Mom => 0b10,
            Self::Both => 0b11,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::None,
            0b01 => Self::Pos,
            0b10 => Self::Mom,
            _ => Self::Both,
        }
    }

    /// Return `true` if `self` and `other` share a basis.
    pub fn intersects(self, other: Self) -> bool {
        self.bits() & other.bits() != 0
    }

    /// Return the complement of `self` with respect to [`Rep::Both`].
    ///
    /// ```
    /// use splitstep::Rep;
    /// assert_eq!(Rep::Pos.inverse(), Rep::Mom);
    /// assert_eq!(Rep::Both.inverse(), Rep::None);
    /// ```
    pub fn inverse(self) -> Self { Self::from_bits(!self.bits()) }

    /// Return the union of `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self::from_bits(self.bits() | other.bits())
    }

    /// Return `true` if `self` is a single, concrete basis.
    pub fn is_concrete(self) -> bool { matches!(self, Self::Pos | Self::Mom) }
}

/// Propagation mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Imaginary-time relaxation toward the lowest state in the initial
    /// state's symmetry sector.
    Imag,
    /// Real-time evolution.
    Real,
}

impl Mode {
    /// Short name, also used as the configuration section name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Imag => "IM",
            Self::Real => "RE",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase of a run in which a reporting window is produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum When {
    /// Once, before any step.
    AtStart,
    /// After every step inside the main loop.
    During,
    /// Once, after the terminal step.
    AtEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_semantics() {
        assert!(Rep::Both.intersects(Rep::Pos));
        assert!(Rep::Both.intersects(Rep::Mom));
        assert!(!Rep::None.intersects(Rep::Pos));
        assert!(!Rep::Pos.intersects(Rep::Mom));
        assert_eq!(Rep::Pos.union(Rep::Mom), Rep::Both);
        assert_eq!(Rep::None.union(Rep::Mom), Rep::Mom);
        assert_eq!(Rep::Mom.inverse(), Rep::Pos);
        assert_eq!(Rep::None.inverse(), Rep::Both);
    }

    #[test]
    fn concrete() {
        assert!(Rep::Pos.is_concrete());
        assert!(Rep::Mom.is_concrete());
        assert!(!Rep::None.is_concrete());
        assert!(!Rep::Both.is_concrete());
    }
}
