//! Spanning test on the periodic lattice.

// Rows and columns are read from labels of length N.
#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use ladvoter_lattice::Topology;
use ladvoter_types::PercolationClass;

/// Classify the cluster rooted at `root` from a compressed label array.
///
/// The cluster spans one axis when every column contains one of its
/// sites, the other when every row does. Each axis test stops at the
/// first line that misses the cluster.
pub fn percolation_class(topology: &Topology, labels: &[usize], root: usize) -> PercolationClass {
    let side = topology.side();
    let n = topology.site_count();

    let every_column = (0..side).all(|column| {
        (column..n)
            .step_by(side)
            .any(|site| labels[site] == root)
    });
    let every_row = (0..n)
        .step_by(side)
        .all(|start| labels[start..start + side].contains(&root));

    PercolationClass::from_axes(every_column, every_row)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_touches_every_row_and_column() {
        let t = Topology::new(3).unwrap();
        // Sites 0, 4, 8 labeled 0; everything else its own label.
        let labels = vec![0, 1, 2, 3, 0, 5, 6, 7, 0];
        assert_eq!(percolation_class(&t, &labels, 0), PercolationClass::Percolating);
    }

    #[test]
    fn single_row_spans_one_axis() {
        let t = Topology::new(3).unwrap();
        let labels = vec![0, 1, 2, 3, 3, 3, 6, 7, 8];
        assert_eq!(percolation_class(&t, &labels, 3), PercolationClass::Spanning);
    }

    #[test]
    fn compact_blob_does_not_span() {
        let t = Topology::new(4).unwrap();
        let mut labels: Vec<usize> = (0..16).collect();
        labels[1] = 0;
        labels[4] = 0;
        labels[5] = 0;
        assert_eq!(percolation_class(&t, &labels, 0), PercolationClass::None);
    }
}
