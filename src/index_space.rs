use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::orientation::{Orientation, Side};




/// An integer vector in `D` dimensions: an index, an offset, or a per-axis
/// refinement ratio.
pub type IntVect<const D: usize> = [i64; D];




/**
 * Whether the indexes of a space label cells or the nodes at cell corners.
 * This only changes how the space is coarsened and refined.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Centering {
    Cell,
    Node,
}

impl Default for Centering {
    fn default() -> Self {
        Centering::Cell
    }
}




/**
 * Represents a rectangular region in a discrete `D`-dimensional index space.
 * Both bounds are inclusive, so a space with `lo[i] == hi[i] + 1` on some
 * axis is empty. The index type is signed 64-bit integer.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSpace<const D: usize> {
    #[serde(with = "crate::array")]
    lo: IntVect<D>,
    #[serde(with = "crate::array")]
    hi: IntVect<D>,
    centering: Centering,
}




// ============================================================================
impl<const D: usize> IndexSpace<D> {


    /**
     * Create a cell-centered index space. Panics if the space has negative
     * volume; use `try_new` to get an error instead.
     */
    pub fn new(lo: IntVect<D>, hi: IntVect<D>) -> Self {
        match Self::try_new(lo, hi) {
            Ok(space) => space,
            Err(e) => panic!("{}", e),
        }
    }


    pub fn try_new(lo: IntVect<D>, hi: IntVect<D>) -> Result<Self> {
        for axis in 0..D {
            if lo[axis] > hi[axis] + 1 {
                return Err(Error::InvalidBox(format!(
                    "index space {:?}..={:?} has negative volume on axis {}", lo, hi, axis)));
            }
        }
        Ok(Self { lo, hi, centering: Centering::Cell })
    }


    pub fn with_centering(self, centering: Centering) -> Self {
        Self { centering, ..self }
    }


    pub fn centering(&self) -> Centering {
        self.centering
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn lo(&self) -> IntVect<D> {
        self.lo
    }


    /**
     * Return the maximum index (inclusive).
     */
    pub fn hi(&self) -> IntVect<D> {
        self.hi
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> [usize; D] {
        let mut dim = [0; D];

        for axis in 0..D {
            dim[axis] = (self.hi[axis] - self.lo[axis] + 1) as usize;
        }
        dim
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        self.dim().iter().product()
    }


    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the number of indexes along the longest axis.
     */
    pub fn longside(&self) -> usize {
        self.dim().iter().copied().max().unwrap_or(0)
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: IntVect<D>) -> bool {
        (0..D).all(|axis| self.lo[axis] <= index[axis] && index[axis] <= self.hi[axis])
    }


    /**
     * Determine whether another index space is a subset of this one. The
     * empty space is a subset of every space.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.is_empty() || (0..D).all(|axis| self.lo[axis] <= other.lo[axis] && other.hi[axis] <= self.hi[axis])
    }


    /**
     * Return the overlap of two index spaces, or `None` if they do not
     * overlap.
     */
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let mut lo = self.lo;
        let mut hi = self.hi;

        for axis in 0..D {
            lo[axis] = lo[axis].max(other.lo[axis]);
            hi[axis] = hi[axis].min(other.hi[axis]);

            if lo[axis] > hi[axis] {
                return None;
            }
        }
        Some(Self { lo, hi, centering: self.centering })
    }


    /**
     * Expand this index space by the given number of elements on each axis.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        let mut result = *self;

        for axis in 0..D {
            result = result.extend_axis(axis, delta);
        }
        result
    }


    /**
     * Expand this index space by the given number of elements on both ends of
     * one axis.
     */
    pub fn extend_axis(&self, axis: usize, delta: i64) -> Self {
        let mut result = *self;
        result.lo[axis] -= delta;
        result.hi[axis] += delta;
        result
    }


    /**
     * Return a copy of this index space with the range on one axis replaced.
     */
    pub fn with_range(&self, axis: usize, lo: i64, hi: i64) -> Self {
        let mut result = *self;
        result.lo[axis] = lo;
        result.hi[axis] = hi;
        result
    }


    /**
     * Translate this index space by the given offset.
     */
    pub fn shift(&self, offset: IntVect<D>) -> Self {
        let mut result = *self;

        for axis in 0..D {
            result.lo[axis] += offset[axis];
            result.hi[axis] += offset[axis];
        }
        result
    }


    /**
     * Map this index space to a coarser one, where every coarse index stands
     * for `ratio[axis]` indexes on each axis of this one. Cell indexes are
     * coarsened with floor division; a node-centered high bound is rounded
     * up so the coarse space still contains every fine node.
     */
    pub fn coarsen(&self, ratio: IntVect<D>) -> Self {
        let mut result = *self;

        for axis in 0..D {
            let r = ratio[axis];
            result.lo[axis] = self.lo[axis].div_euclid(r);
            result.hi[axis] = match self.centering {
                Centering::Cell => self.hi[axis].div_euclid(r),
                Centering::Node => {
                    if self.hi[axis].rem_euclid(r) == 0 {
                        self.hi[axis].div_euclid(r)
                    } else {
                        self.hi[axis].div_euclid(r) + 1
                    }
                }
            };
        }
        result
    }


    /**
     * Increase the resolution of this index space by the given ratio. This
     * is the inverse of `coarsen` for spaces aligned to the ratio.
     */
    pub fn refine(&self, ratio: IntVect<D>) -> Self {
        let mut result = *self;

        for axis in 0..D {
            let r = ratio[axis];
            result.lo[axis] = self.lo[axis] * r;
            result.hi[axis] = match self.centering {
                Centering::Cell => (self.hi[axis] + 1) * r - 1,
                Centering::Node => self.hi[axis] * r,
            };
        }
        result
    }


    /**
     * Return the index of the outermost layer of this space on the given
     * face. Two spaces share a face location when this value agrees.
     */
    pub fn face_index(&self, face: Orientation<D>) -> i64 {
        match face.side() {
            Side::Low => self.lo[face.axis()],
            Side::High => self.hi[face.axis()],
        }
    }


    /**
     * Return the slab of `len` indexes just outside the given face, spanning
     * this space on the other axes.
     */
    pub fn adjacent_cells(&self, face: Orientation<D>, len: i64) -> Self {
        let axis = face.axis();

        match face.side() {
            Side::Low => self.with_range(axis, self.lo[axis] - len, self.lo[axis] - 1),
            Side::High => self.with_range(axis, self.hi[axis] + 1, self.hi[axis] + len),
        }
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: IntVect<D>) -> usize {
        let dim = self.dim();
        let mut offset = 0;

        for axis in 0..D {
            offset = offset * dim[axis] + (index[axis] - self.lo[axis]) as usize;
        }
        offset
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> IndexIter<D> {
        IndexIter {
            space: *self,
            next: if self.is_empty() { None } else { Some(self.lo) },
        }
    }
}




// ============================================================================
impl<const D: usize> IntoIterator for &IndexSpace<D> {
    type Item = IntVect<D>;
    type IntoIter = IndexIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}




/**
 * Row-major iterator over the indexes of an `IndexSpace`.
 */
#[derive(Clone, Debug)]
pub struct IndexIter<const D: usize> {
    space: IndexSpace<D>,
    next: Option<IntVect<D>>,
}

impl<const D: usize> Iterator for IndexIter<D> {
    type Item = IntVect<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut index = current;
        let mut axis = D;

        self.next = loop {
            if axis == 0 {
                break None;
            }
            axis -= 1;

            if index[axis] < self.space.hi[axis] {
                index[axis] += 1;
                break Some(index);
            }
            index[axis] = self.space.lo[axis];
        };
        Some(current)
    }
}




/**
 * Less imposing factory function to construct a cell-centered index space.
 */
pub fn range<const D: usize>(lo: IntVect<D>, hi: IntVect<D>) -> IndexSpace<D> {
    IndexSpace::new(lo, hi)
}
