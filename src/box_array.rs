use core::ops::Index;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::index_space::{IndexSpace, IntVect};




/// An ordered collection of index spaces: the valid regions of the patches
/// at one refinement level. A patch is identified by its position in the
/// array, and the entries are never modified after construction.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxArray<const D: usize> {
    boxes: Vec<IndexSpace<D>>,
}

impl<const D: usize> BoxArray<D> {
    /// Build a box array, rejecting empty boxes and boxes of mixed centering.
    ///
    pub fn new(boxes: Vec<IndexSpace<D>>) -> Result<Self> {
        if let Some(first) = boxes.first() {
            for (n, b) in boxes.iter().enumerate() {
                if b.is_empty() {
                    return Err(Error::InvalidBox(format!("box {} is empty", n)));
                }
                if b.centering() != first.centering() {
                    return Err(Error::InvalidBox(format!("box {} has a different centering", n)));
                }
            }
        }
        Ok(Self { boxes })
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexSpace<D>> {
        self.boxes.iter()
    }

    /// Return a box array with every box coarsened by `ratio`. The patch
    /// numbering is preserved.
    ///
    pub fn coarsen(&self, ratio: IntVect<D>) -> Self {
        Self { boxes: self.boxes.iter().map(|b| b.coarsen(ratio)).collect() }
    }

    pub fn refine(&self, ratio: IntVect<D>) -> Self {
        Self { boxes: self.boxes.iter().map(|b| b.refine(ratio)).collect() }
    }

    /// Return the index of the first patch containing the given index, if
    /// one exists.
    ///
    pub fn patch_containing_point(&self, index: IntVect<D>) -> Option<usize> {
        self.boxes.iter().position(|b| b.contains(index))
    }
}

impl<const D: usize> Index<usize> for BoxArray<D> {
    type Output = IndexSpace<D>;

    fn index(&self, n: usize) -> &IndexSpace<D> {
        &self.boxes[n]
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::BoxArray;
    use crate::index_space::{range, Centering};

    #[test]
    fn coarsened_boxes_use_floor_division() {
        let fine = BoxArray::new(vec![range([0], [7]), range([8], [15])]).unwrap();
        let coarse = fine.coarsen([2]);
        assert_eq!(coarse[0], range([0], [3]));
        assert_eq!(coarse[1], range([4], [7]));
        assert_eq!(coarse.refine([2]), fine);
    }

    #[test]
    fn empty_or_mixed_boxes_are_rejected() {
        assert!(BoxArray::new(vec![range([0, 0], [-1, 3])]).is_err());
        assert!(BoxArray::new(vec![range([0], [3]), range([4], [7]).with_centering(Centering::Node)]).is_err());
        assert!(BoxArray::<2>::new(vec![]).unwrap().is_empty());
    }

    #[test]
    fn point_queries_find_the_first_patch() {
        let grids = BoxArray::new(vec![range([0, 0], [3, 3]), range([4, 0], [7, 3])]).unwrap();
        assert_eq!(grids.patch_containing_point([5, 1]), Some(1));
        assert_eq!(grids.patch_containing_point([3, 3]), Some(0));
        assert_eq!(grids.patch_containing_point([8, 1]), None);
    }
}
