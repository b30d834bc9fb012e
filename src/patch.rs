use serde::{Deserialize, Serialize};
use crate::index_space::{IndexSpace, IntVect};




/**
 * A patch is a mapping from a rectangular index space to associated field
 * values. The mapping is backed by a dense array in row-major order, with
 * the `num_comp` components of each index stored contiguously, so the slice
 * of all components at one index is cheap to obtain.
 *
 * Patches are used for field data (including ghost zones), for the coverage
 * mask, and for the per-face boundary arrays. Access outside the index space
 * or component range panics: it is a programming error, not a recoverable
 * condition.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch<T, const D: usize> {
    space: IndexSpace<D>,
    num_comp: usize,
    data: Vec<T>,
}




impl<T: Copy, const D: usize> Patch<T, D> {




    /**
     * Generate a patch covering the given index space, with every value set
     * to `value`.
     */
    pub fn new(space: IndexSpace<D>, num_comp: usize, value: T) -> Self {
        Self {
            space,
            num_comp,
            data: vec![value; space.len() * num_comp],
        }
    }




    /**
     * Generate a patch covering the given index space, with values defined
     * from a closure of the index and component.
     */
    pub fn from_function<F>(space: IndexSpace<D>, num_comp: usize, f: F) -> Self
    where
        F: Fn(IntVect<D>, usize) -> T
    {
        Self {
            space,
            num_comp,
            data: space.iter().flat_map(|index| (0..num_comp).map(move |c| (index, c))).map(|(i, c)| f(i, c)).collect()
        }
    }


    pub fn index_space(&self) -> &IndexSpace<D> {
        &self.space
    }


    pub fn num_comp(&self) -> usize {
        self.num_comp
    }


    pub fn data(&self) -> &[T] {
        &self.data
    }


    pub fn get(&self, index: IntVect<D>, comp: usize) -> T {
        self.get_slice(index)[comp]
    }


    pub fn set(&mut self, index: IntVect<D>, comp: usize, value: T) {
        self.get_slice_mut(index)[comp] = value
    }


    /**
     * Return all the components stored at the given index.
     */
    pub fn get_slice(&self, index: IntVect<D>) -> &[T] {
        let n = self.offset(index);
        &self.data[n..n + self.num_comp]
    }


    pub fn get_slice_mut(&mut self, index: IntVect<D>) -> &mut [T] {
        let n = self.offset(index);
        &mut self.data[n..n + self.num_comp]
    }


    pub fn fill(&mut self, value: T) {
        for x in &mut self.data {
            *x = value
        }
    }


    /**
     * Set components `start..start + count` to `value` everywhere.
     */
    pub fn fill_comps(&mut self, start: usize, count: usize, value: T) {
        self.validate_comps(start, count);

        for slice in self.data.chunks_exact_mut(self.num_comp) {
            for x in &mut slice[start..start + count] {
                *x = value
            }
        }
    }




    /**
     * Copy components `src_comp..src_comp + count` of `src` into components
     * starting at `dst_comp` of this patch, at every index where the two
     * patches overlap. Returns the overlap, if there was one.
     */
    pub fn copy_intersection(&mut self, src: &Self, src_comp: usize, dst_comp: usize, count: usize) -> Option<IndexSpace<D>> {
        let region = self.space.intersect(&src.space)?;
        self.copy_region(src, &region, src_comp, dst_comp, count);
        Some(region)
    }




    /**
     * Copy components over the given region, which must be contained in both
     * patches.
     */
    pub fn copy_region(&mut self, src: &Self, region: &IndexSpace<D>, src_comp: usize, dst_comp: usize, count: usize) {
        self.copy_region_shifted(src, region, [0; D], src_comp, dst_comp, count)
    }




    /**
     * Copy components over the given region from `src`, reading each value
     * at `index - shift` in the source. This is how periodic images are
     * copied.
     */
    pub fn copy_region_shifted(
        &mut self,
        src: &Self,
        region: &IndexSpace<D>,
        shift: IntVect<D>,
        src_comp: usize,
        dst_comp: usize,
        count: usize)
    {
        src.validate_comps(src_comp, count);
        self.validate_comps(dst_comp, count);

        for index in region.iter() {
            let mut source = index;

            for axis in 0..D {
                source[axis] -= shift[axis];
            }
            let s = src.get_slice(source);
            self.get_slice_mut(index)[dst_comp..dst_comp + count].copy_from_slice(&s[src_comp..src_comp + count]);
        }
    }




    /**
     * Return a read-only view of components `start..start + count`.
     */
    pub fn view(&self, start: usize, count: usize) -> ArrayView<'_, T, D> {
        self.validate_comps(start, count);
        ArrayView { space: self.space, stride: self.num_comp, start, count, data: &self.data }
    }


    /**
     * Return a mutable view of components `start..start + count`.
     */
    pub fn view_mut(&mut self, start: usize, count: usize) -> ArrayViewMut<'_, T, D> {
        self.validate_comps(start, count);
        ArrayViewMut { space: self.space, stride: self.num_comp, start, count, data: &mut self.data }
    }


    fn offset(&self, index: IntVect<D>) -> usize {
        self.validate_index(index);
        self.space.row_major_offset(index) * self.num_comp
    }


    fn validate_index(&self, index: IntVect<D>) {
        if !self.space.contains(index) {
            panic!("index {:?} out of range on patch {:?}..={:?}",
                index,
                self.space.lo(),
                self.space.hi());
        }
    }


    fn validate_comps(&self, start: usize, count: usize) {
        if start + count > self.num_comp {
            panic!("components {}..{} out of range on patch with {} components",
                start,
                start + count,
                self.num_comp);
        }
    }
}




/**
 * A bounds-checked view of a component range of a patch. The view carries
 * its index space, and components are numbered from zero within the view.
 */
#[derive(Clone, Copy, Debug)]
pub struct ArrayView<'a, T, const D: usize> {
    space: IndexSpace<D>,
    stride: usize,
    start: usize,
    count: usize,
    data: &'a [T],
}

impl<'a, T: Copy, const D: usize> ArrayView<'a, T, D> {

    pub fn index_space(&self) -> &IndexSpace<D> {
        &self.space
    }

    pub fn num_comp(&self) -> usize {
        self.count
    }

    pub fn get(&self, index: IntVect<D>, comp: usize) -> T {
        self.data[element(&self.space, self.stride, self.start, self.count, index, comp)]
    }

    /// Return the value at `index`, or `None` if the index is outside the
    /// view.
    pub fn try_get(&self, index: IntVect<D>, comp: usize) -> Option<T> {
        if self.space.contains(index) {
            Some(self.get(index, comp))
        } else {
            None
        }
    }
}




/**
 * The mutable counterpart of `ArrayView`.
 */
#[derive(Debug)]
pub struct ArrayViewMut<'a, T, const D: usize> {
    space: IndexSpace<D>,
    stride: usize,
    start: usize,
    count: usize,
    data: &'a mut [T],
}

impl<'a, T: Copy, const D: usize> ArrayViewMut<'a, T, D> {

    pub fn index_space(&self) -> &IndexSpace<D> {
        &self.space
    }

    pub fn num_comp(&self) -> usize {
        self.count
    }

    pub fn get(&self, index: IntVect<D>, comp: usize) -> T {
        self.data[element(&self.space, self.stride, self.start, self.count, index, comp)]
    }

    pub fn set(&mut self, index: IntVect<D>, comp: usize, value: T) {
        self.data[element(&self.space, self.stride, self.start, self.count, index, comp)] = value
    }
}




// ============================================================================
fn element<const D: usize>(space: &IndexSpace<D>, stride: usize, start: usize, count: usize, index: IntVect<D>, comp: usize) -> usize {
    if !space.contains(index) {
        panic!("index {:?} out of range on view {:?}..={:?}", index, space.lo(), space.hi());
    }
    if comp >= count {
        panic!("component {} out of range on view with {} components", comp, count);
    }
    space.row_major_offset(index) * stride + start + comp
}
