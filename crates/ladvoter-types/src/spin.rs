//! Spin encoding shared by every crate.
//!
//! Binary lattices hold `+1`/`-1`. Non-binary lattices hold opinion ids
//! starting at `1`, one per site at initialization. The value `0` is
//! reserved for an empty site on diluted lattices and never denotes an
//! opinion.

/// The opinion held by a site, or [`VACANT`].
pub type Spin = i32;

/// Marker for a site with no agent.
pub const VACANT: Spin = 0;

/// The positive binary opinion.
pub const SPIN_UP: Spin = 1;

/// The negative binary opinion.
pub const SPIN_DOWN: Spin = -1;

/// Return `true` if the spin belongs to an agent.
pub const fn is_occupied(spin: Spin) -> bool {
    spin != VACANT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacancy_is_not_an_opinion() {
        assert!(!is_occupied(VACANT));
        assert!(is_occupied(SPIN_UP));
        assert!(is_occupied(SPIN_DOWN));
        assert!(is_occupied(17));
    }
}
