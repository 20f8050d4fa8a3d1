//! Chain slots of the plane-sum encoding.
//!
//! Column `j` of a system with unit capacity `r_j` owns `r_j` consecutive
//! diagonal positions `base, ..., base + r_j - 1` and two chains of enabled
//! cells over them:
//!
//! ```text
//! positive:  (base + p, base + p)
//! negative:  (base + (p - 1 mod r_j), base + p)
//! ```
//!
//! Every slot also gets a plane (third coordinate). Planes are handed out by a
//! first-fit scan over the constraint rows: row `i` takes `|A[i, j]|` free
//! slots from the positive chain when `A[i, j] > 0` and from the negative
//! chain otherwise. Slots left over land on the overflow plane `nrows`.

use log::trace;
use nalgebra::DMatrix;
use std::ops::Range;

/// Which of the two chains of a column a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainKind {
    /// Carries the variable's value
    Positive,
    /// Carries the complement `U - y`
    Negative,
}

/// One slot of a chain: its owner and its first two tensor coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainSlot {
    /// Column of the constraint matrix owning the slot
    pub column: usize,
    /// Chain the slot belongs to
    pub kind: ChainKind,
    /// Position within the chain
    pub position: usize,
    /// First tensor coordinate
    pub row: usize,
    /// Second tensor coordinate
    pub col: usize,
}

/// Arena of all chain slots, ordered column by column, positive chain first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLayout {
    slots: Vec<ChainSlot>,
    capacities: Vec<usize>,
    /// Index of the first slot of each column
    starts: Vec<usize>,
}

impl ChainLayout {
    /// Lay out the chains for the given column capacities.
    pub fn new(capacities: Vec<usize>) -> Self {
        let total: usize = capacities.iter().sum();
        let mut slots = Vec::with_capacity(2 * total);
        let mut starts = Vec::with_capacity(capacities.len());
        let mut base = 0;

        for (column, &r) in capacities.iter().enumerate() {
            starts.push(slots.len());
            for position in 0..r {
                slots.push(ChainSlot {
                    column,
                    kind: ChainKind::Positive,
                    position,
                    row: base + position,
                    col: base + position,
                });
            }
            for position in 0..r {
                slots.push(ChainSlot {
                    column,
                    kind: ChainKind::Negative,
                    position,
                    row: base + (position + r - 1) % r,
                    col: base + position,
                });
            }
            base += r;
        }

        Self {
            slots,
            capacities,
            starts,
        }
    }

    /// All slots in enabled-cell order.
    pub fn slots(&self) -> &[ChainSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Unit capacity of every column.
    pub fn capacities(&self) -> &[usize] {
        &self.capacities
    }

    /// Sum of all capacities, i.e. the number of diagonal positions.
    pub fn total_capacity(&self) -> usize {
        self.capacities.iter().sum()
    }

    /// Slot indices of one chain.
    pub fn chain_range(&self, column: usize, kind: ChainKind) -> Range<usize> {
        let r = self.capacities[column];
        let start = match kind {
            ChainKind::Positive => self.starts[column],
            ChainKind::Negative => self.starts[column] + r,
        };
        start..start + r
    }

    /// Assign a plane to every slot by the first-fit scan over the rows of `a`.
    ///
    /// `a` must have one column per capacity and every capacity must cover the
    /// positive and negative mass of its column.
    pub fn assign_planes(&self, a: &DMatrix<i64>) -> Vec<usize> {
        let overflow = a.nrows();
        let mut planes: Vec<Option<usize>> = vec![None; self.slots.len()];

        for i in 0..a.nrows() {
            for j in 0..a.ncols() {
                let value = a[(i, j)];
                if value == 0 {
                    continue;
                }
                let kind = if value > 0 {
                    ChainKind::Positive
                } else {
                    ChainKind::Negative
                };
                let mut remaining = value.unsigned_abs();
                for slot in self.chain_range(j, kind) {
                    if remaining == 0 {
                        break;
                    }
                    if planes[slot].is_none() {
                        planes[slot] = Some(i);
                        remaining -= 1;
                    }
                }
                debug_assert_eq!(remaining, 0, "chain of column {} too short", j);
                trace!("row {} column {}: {} slot(s) on the {:?} chain", i, j, value.abs(), kind);
            }
        }

        planes
            .into_iter()
            .map(|plane| plane.unwrap_or(overflow))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_unit_chains_share_diagonal() {
        let layout = ChainLayout::new(vec![1, 1]);
        let cells: Vec<(usize, usize)> = layout.slots().iter().map(|s| (s.row, s.col)).collect();
        assert_eq!(cells, vec![(0, 0), (0, 0), (1, 1), (1, 1)]);
        assert_eq!(layout.len(), 4);
    }

    #[test]
    fn test_negative_chain_wraps() {
        let layout = ChainLayout::new(vec![1, 3]);
        let neg: Vec<(usize, usize)> = layout
            .chain_range(1, ChainKind::Negative)
            .map(|s| (layout.slots()[s].row, layout.slots()[s].col))
            .collect();
        assert_eq!(neg, vec![(3, 1), (1, 2), (2, 3)]);

        let pos: Vec<usize> = layout
            .chain_range(1, ChainKind::Positive)
            .map(|s| layout.slots()[s].position)
            .collect();
        assert_eq!(pos, vec![0, 1, 2]);
        assert_eq!(layout.total_capacity(), 4);
    }

    #[test]
    fn test_first_fit_assignment() {
        // column 0: +1, +1, -1 -> r = 2
        let a = DMatrix::from_row_slice(3, 1, &[1, 1, -1]);
        let layout = ChainLayout::new(vec![2]);
        let planes = layout.assign_planes(&a);
        // positive slots take rows 0 and 1, negative slot 0 takes row 2
        assert_eq!(planes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_multi_unit_coefficient() {
        let a = DMatrix::from_row_slice(2, 2, &[2, -1, -1, 1]);
        let layout = ChainLayout::new(vec![2, 1]);
        let planes = layout.assign_planes(&a);
        // column 0: pos [0, 0], neg [1, overflow]; column 1: pos [1], neg [0]
        assert_eq!(planes, vec![0, 0, 1, 2, 1, 0]);
    }
}
