//! Outer-hull tracing of a non-spanning cluster.
//!
//! The walker follows the cluster boundary clockwise with the left-hand
//! rule: from the incoming heading it tries a left turn, then straight on,
//! then a right turn, and finally going back. Every rejected move records
//! the exterior site it hit; the perimeter is the number of distinct such
//! sites.
//!
//! The enclosed area is accumulated along the walk from a running height
//! `y` (started at `10 L` so it stays positive) and the table in
//! [`area_delta`]. Holes inside the cluster are counted as area.
//!
//! The walk starts from the top-left-most site of the cluster. When the
//! root sits on the top row the cluster may wrap through the periodic
//! border, so the start is first moved up through the bottom rows and then
//! left while it stays inside the cluster.

// The walk stays on the unfolded window around the cluster.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_lattice::Topology;

use crate::error::ClusterError;

/// Walking direction. The discriminants are the turn arithmetic: a left
/// turn adds one, a right turn adds three, modulo four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Heading {
    /// Towards the previous row.
    Up = 0,
    /// Towards the previous column.
    Left = 1,
    /// Towards the next row.
    Down = 2,
    /// Towards the next column.
    Right = 3,
}

impl Heading {
    const ALL: [Self; 4] = [Self::Up, Self::Left, Self::Down, Self::Right];

    /// Quarter turn counter-clockwise.
    pub const fn turn_left(self) -> Self {
        Self::ALL[(self as usize + 1) % 4]
    }

    /// Quarter turn clockwise.
    pub const fn turn_right(self) -> Self {
        Self::ALL[(self as usize + 3) % 4]
    }

    /// Neighbor of `site` in this heading.
    pub fn step(self, topology: &Topology, site: usize) -> usize {
        match self {
            Self::Up => topology.up(site),
            Self::Left => topology.left(site),
            Self::Down => topology.down(site),
            Self::Right => topology.right(site),
        }
    }
}

/// Area contribution of a step taken in `current` after a step in
/// `previous`, at height `height`.
pub const fn area_delta(previous: Heading, current: Heading, height: i64) -> i64 {
    use Heading::{Down, Left, Right, Up};
    match (previous, current) {
        (Up | Right, Up) | (Up, Left) | (Left | Down, Down) | (Down, Right) => 0,
        (Up | Right, Down | Right) => height + 1,
        (Left | Down, Up | Left) => -height,
        (Left, Right) | (Right, Left) => 1,
    }
}

/// Pick the next heading by the left-hand rule.
///
/// Candidates are tried in the order left, straight, right, back relative
/// to `incoming`; `accept` reports whether the neighbor in that heading is
/// inside the cluster. Returns `None` if all four are rejected.
pub fn next_heading(
    incoming: Heading,
    mut accept: impl FnMut(Heading) -> bool,
) -> Option<Heading> {
    let mut heading = incoming.turn_left();
    for _ in 0..4 {
        if accept(heading) {
            return Some(heading);
        }
        heading = heading.turn_right();
    }
    None
}

/// Area and perimeter of a cluster's outer hull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HullGeometry {
    /// Sites enclosed by the hull, holes included.
    pub area: usize,
    /// Distinct exterior sites adjacent to the hull.
    pub perimeter: usize,
}

/// Boundary tracer with a reusable exterior-site buffer.
#[derive(Debug, Clone, Default)]
pub struct HullWalker {
    visited: Vec<usize>,
}

impl HullWalker {
    /// Empty walker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hull of the cluster rooted at `root` with `size` sites.
    ///
    /// Clusters of one and two sites get their known geometry (`1/4` and
    /// `2/6`) without walking. The caller must not pass a spanning cluster.
    pub fn measure(
        &mut self,
        topology: &Topology,
        labels: &[usize],
        root: usize,
        size: usize,
    ) -> Result<HullGeometry, ClusterError> {
        match size {
            0 => Err(ClusterError::NotARoot(root)),
            1 => Ok(HullGeometry {
                area: 1,
                perimeter: 4,
            }),
            2 => Ok(HullGeometry {
                area: 2,
                perimeter: 6,
            }),
            _ => self.walk(topology, labels, root),
        }
    }

    /// Trace the outer hull of the cluster containing `root`.
    pub fn walk(
        &mut self,
        topology: &Topology,
        labels: &[usize],
        root: usize,
    ) -> Result<HullGeometry, ClusterError> {
        let degenerate = |reason: &str| ClusterError::DegenerateHull {
            root,
            reason: reason.to_owned(),
        };
        let label = labels[root];
        let inside = |site: usize| labels[site] == label;

        let start = start_site(topology, labels, root)
            .ok_or_else(|| degenerate("cluster wraps a whole row or column"))?;
        let Ok(side) = i64::try_from(topology.side()) else {
            return Err(degenerate("lattice too large"));
        };

        self.visited.clear();
        let mut y = 10 * side;
        let mut area = y + 1;

        let right = topology.right(start);
        let down = topology.down(start);
        // Two branches leave the start site when the walk must pass it once
        // before stopping.
        let mut endpoint = !(inside(right) && inside(down) && !inside(topology.down(right)));

        let (mut heading, mut site) = if inside(right) {
            self.visited.push(topology.up(start));
            (Heading::Right, right)
        } else if inside(down) {
            self.visited.push(right);
            y -= 1;
            (Heading::Down, down)
        } else {
            return Err(degenerate("start site has no outgoing branch"));
        };
        let mut previous = heading;

        let max_steps = 4 * topology.site_count() + 4;
        let mut steps = 0;
        while site != start || (!endpoint && heading != Heading::Up) {
            steps += 1;
            if steps > max_steps {
                return Err(degenerate("walk did not close"));
            }
            if site == start {
                endpoint = true;
            }

            let here = site;
            let visited = &mut self.visited;
            heading = next_heading(heading, |h| {
                let target = h.step(topology, here);
                let ok = inside(target);
                if !ok {
                    visited.push(target);
                }
                ok
            })
            .ok_or_else(|| degenerate("isolated site on the walk"))?;

            area += area_delta(previous, heading, y);
            site = heading.step(topology, site);
            match heading {
                Heading::Up => y += 1,
                Heading::Down => y -= 1,
                Heading::Left | Heading::Right => {}
            }
            previous = heading;
        }

        if heading == Heading::Left {
            area -= y;
        }

        for h in [Heading::Right, Heading::Left, Heading::Down, Heading::Up] {
            let target = h.step(topology, site);
            if !inside(target) {
                self.visited.push(target);
            }
        }

        self.visited.sort_unstable();
        self.visited.dedup();

        let Ok(area) = usize::try_from(area) else {
            return Err(degenerate("negative enclosed area"));
        };
        Ok(HullGeometry {
            area,
            perimeter: self.visited.len(),
        })
    }
}

/// Top-left-most site of the cluster, following it through the periodic
/// borders. `None` if the cluster fills a whole row or column.
fn start_site(topology: &Topology, labels: &[usize], root: usize) -> Option<usize> {
    let side = topology.side();
    let label = labels[root];
    let mut start = root;

    if start < side {
        let mut row_start = topology.up(0);
        let mut rows = 0;
        while let Some(column) = (0..side).find(|&c| labels[row_start + c] == label) {
            rows += 1;
            if rows > side {
                return None;
            }
            start = row_start + column;
            row_start = topology.up(row_start);
        }
    }

    let mut columns = 0;
    while labels[topology.left(start)] == label {
        columns += 1;
        if columns > side {
            return None;
        }
        start = topology.left(start);
    }
    Some(start)
}
