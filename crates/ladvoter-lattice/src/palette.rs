//! Snapshot color classification.
//!
//! Renderers receive one palette index per site. Convinced agents
//! (conviction at least [`SNAPSHOT_CONVICTION`]) get the saturated shade of
//! their opinion, the others the light one.

use ladvoter_types::{OpinionMode, SPIN_UP};

use crate::state::LatticeState;

/// Conviction at which a site is drawn in the saturated shade.
pub const SNAPSHOT_CONVICTION: f64 = 1.0;

/// RGB value of every palette index.
pub const PALETTE: [u32; 8] = [
    0x00_00_00, 0xFF_FF_FF, 0x33_34_34, 0xC2_C2_C2, 0xFF_00_00, 0x00_00_FF, 0xFF_45_45, 0x81_C2_EF,
];

/// Palette entry of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SiteColor {
    /// Vacant site.
    Black = 0,
    /// Background.
    White = 1,
    /// Convinced agent of a non-binary lattice.
    DarkGray = 2,
    /// Unconvinced agent of a non-binary lattice.
    LightGray = 3,
    /// Convinced `+1` agent.
    Red = 4,
    /// Convinced `-1` agent.
    Blue = 5,
    /// Unconvinced `+1` agent.
    LightRed = 6,
    /// Unconvinced `-1` agent.
    LightBlue = 7,
}

impl SiteColor {
    /// Palette index.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// RGB value, `0xRRGGBB`.
    // Every discriminant is below `PALETTE.len()`.
    #[allow(clippy::indexing_slicing)]
    pub const fn rgb(self) -> u32 {
        PALETTE[self as usize]
    }
}

/// Color of `site`, a pure function of its spin and conviction.
pub fn classify(state: &LatticeState, site: usize) -> SiteColor {
    if !state.is_occupied(site) {
        return SiteColor::Black;
    }
    let convinced = state.certainty(site) >= SNAPSHOT_CONVICTION;
    match (state.mode(), state.spin(site) == SPIN_UP, convinced) {
        (OpinionMode::NonBinary, _, true) => SiteColor::DarkGray,
        (OpinionMode::NonBinary, _, false) => SiteColor::LightGray,
        (OpinionMode::Binary, true, true) => SiteColor::Red,
        (OpinionMode::Binary, true, false) => SiteColor::LightRed,
        (OpinionMode::Binary, false, true) => SiteColor::Blue,
        (OpinionMode::Binary, false, false) => SiteColor::LightBlue,
    }
}

/// Color of every site, row-major.
pub fn palette_frame(state: &LatticeState) -> Vec<SiteColor> {
    (0..state.site_count())
        .map(|site| classify(state, site))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Topology;
    use ladvoter_types::{SPIN_DOWN, VACANT};

    #[test]
    fn binary_colors_follow_spin_and_conviction() {
        let mut state = LatticeState::from_spins(
            Topology::new(2).unwrap(),
            OpinionMode::Binary,
            vec![SPIN_UP, SPIN_DOWN, VACANT, SPIN_UP],
        )
        .unwrap();
        state.set_certainty(0, 1.0);
        state.set_certainty(1, 2.5);

        let frame = palette_frame(&state);
        assert_eq!(
            frame,
            vec![SiteColor::Red, SiteColor::Blue, SiteColor::Black, SiteColor::LightRed]
        );
        assert_eq!(SiteColor::Blue.rgb(), 0x00_00_FF);
        assert_eq!(SiteColor::LightRed.index(), 6);
    }

    #[test]
    fn non_binary_uses_gray_shades() {
        let mut state = LatticeState::from_spins(
            Topology::new(2).unwrap(),
            OpinionMode::NonBinary,
            vec![1, 2, 3, VACANT],
        )
        .unwrap();
        state.set_certainty(2, 1.5);
        assert_eq!(classify(&state, 0), SiteColor::LightGray);
        assert_eq!(classify(&state, 2), SiteColor::DarkGray);
        assert_eq!(classify(&state, 3), SiteColor::Black);
    }
}
