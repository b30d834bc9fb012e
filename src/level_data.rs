use rayon::prelude::*;
use crate::box_array::BoxArray;
use crate::geometry::Geometry;
use crate::index_space::{IndexSpace, IntVect};
use crate::patch::Patch;

/// Field data on every patch of one refinement level. Each patch array
/// covers its valid box extended by `num_ghost` guard zones on every axis.
///
/// Boundary synthesis reads this container but never writes it. Filling the
/// guard zones ([`LevelData::fill_boundary`] and
/// [`LevelData::fill_physical`]) is the caller's job, and must be done
/// before boundary values are synthesized from it.
///
#[derive(Clone, Debug)]
pub struct LevelData<const D: usize> {
    grids: BoxArray<D>,
    num_comp: usize,
    num_ghost: usize,
    patches: Vec<Patch<f64, D>>,
}

impl<const D: usize> LevelData<D> {
    /// Allocate zero-valued field data over the given grids.
    ///
    pub fn new(grids: BoxArray<D>, num_comp: usize, num_ghost: usize) -> Self {
        let patches = grids
            .iter()
            .map(|b| Patch::new(b.extend_all(num_ghost as i64), num_comp, 0.0))
            .collect();
        Self { grids, num_comp, num_ghost, patches }
    }

    /// Allocate field data with values (including guard zones) defined by a
    /// closure of the index and component.
    ///
    pub fn from_function<F>(grids: BoxArray<D>, num_comp: usize, num_ghost: usize, f: F) -> Self
    where
        F: Fn(IntVect<D>, usize) -> f64 + Sync,
    {
        let patches = grids
            .iter()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|b| Patch::from_function(b.extend_all(num_ghost as i64), num_comp, &f))
            .collect();
        Self { grids, num_comp, num_ghost, patches }
    }

    pub fn box_array(&self) -> &BoxArray<D> {
        &self.grids
    }

    pub fn num_comp(&self) -> usize {
        self.num_comp
    }

    pub fn num_ghost(&self) -> usize {
        self.num_ghost
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// The valid (non-guard) region of patch `n`.
    ///
    pub fn valid_box(&self, n: usize) -> &IndexSpace<D> {
        &self.grids[n]
    }

    pub fn patch(&self, n: usize) -> &Patch<f64, D> {
        &self.patches[n]
    }

    pub fn patch_mut(&mut self, n: usize) -> &mut Patch<f64, D> {
        &mut self.patches[n]
    }

    pub fn patches(&self) -> &[Patch<f64, D>] {
        &self.patches
    }

    pub fn set_val(&mut self, value: f64) {
        for patch in &mut self.patches {
            patch.fill(value)
        }
    }

    /// Return the components stored at `index`, preferring a patch whose
    /// valid region contains it and falling back to guard zones. Returns
    /// `None` if no patch array covers the index.
    ///
    pub fn locate(&self, index: IntVect<D>) -> Option<&[f64]> {
        self.grids
            .patch_containing_point(index)
            .or_else(|| self.patches.iter().position(|p| p.index_space().contains(index)))
            .map(|n| self.patches[n].get_slice(index))
    }

    /// Fill guard zone values of every patch from the valid regions of the
    /// other patches at this level, including their periodic images. Guard
    /// zones with no valid data behind them are not touched.
    ///
    pub fn fill_boundary(&mut self, geom: &Geometry<D>) {
        let grids = &self.grids;
        let sources = &self.patches;
        let num_comp = self.num_comp;

        let filled: Vec<_> = sources
            .par_iter()
            .enumerate()
            .map(|(n, patch)| {
                let mut patch = patch.clone();
                let grown = *patch.index_space();

                for (m, valid) in grids.iter().enumerate() {
                    let mut shifts = geom.periodic_shifts(&grown, valid);

                    if m != n {
                        shifts.push([0; D]);
                    }
                    for shift in shifts {
                        if let Some(region) = grown.intersect(&valid.shift(shift)) {
                            patch.copy_region_shifted(&sources[m], &region, shift, 0, 0, num_comp);
                        }
                    }
                }
                patch
            })
            .collect();

        self.patches = filled;
    }

    /// Fill guard zones lying outside the domain across a non-periodic axis
    /// using the `boundary_value` closure, which receives the index and the
    /// slice of components to write.
    ///
    pub fn fill_physical<G>(&mut self, geom: &Geometry<D>, boundary_value: G)
    where
        G: Fn(IntVect<D>, &mut [f64]) + Sync,
    {
        self.patches.par_iter_mut().for_each(|patch| {
            let space = *patch.index_space();

            for index in space.iter().filter(|&index| geom.is_outside_physical(index)) {
                boundary_value(index, patch.get_slice_mut(index))
            }
        });
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::LevelData;
    use crate::box_array::BoxArray;
    use crate::geometry::Geometry;
    use crate::index_space::range;

    fn two_patches() -> BoxArray<1> {
        BoxArray::new(vec![range([0], [7]), range([8], [15])]).unwrap()
    }

    #[test]
    fn fill_boundary_copies_neighbor_valid_data() {
        let geom = Geometry::unit(range([0], [15])).unwrap();
        let mut level = LevelData::from_function(two_patches(), 1, 2, |[i], _| i as f64);
        level.patch_mut(0).set([8], 0, -1.0);
        level.patch_mut(1).set([7], 0, -1.0);
        level.fill_boundary(&geom);
        assert_eq!(level.patch(0).get([8], 0), 8.0);
        assert_eq!(level.patch(1).get([7], 0), 7.0);
    }

    #[test]
    fn fill_boundary_wraps_periodic_axes() {
        let geom = Geometry::new(range([0], [15]), [true], [1.0]).unwrap();
        let mut level = LevelData::new(two_patches(), 1, 1);
        for n in 0..2 {
            let valid = *level.valid_box(n);
            for [i] in valid.iter() {
                level.patch_mut(n).set([i], 0, i as f64);
            }
        }
        level.fill_boundary(&geom);
        assert_eq!(level.patch(0).get([-1], 0), 15.0);
        assert_eq!(level.patch(1).get([16], 0), 0.0);
    }

    #[test]
    fn fill_physical_only_touches_zones_outside_the_domain() {
        let geom = Geometry::unit(range([0], [15])).unwrap();
        let mut level = LevelData::new(two_patches(), 1, 1);
        level.fill_physical(&geom, |_, slice| slice[0] = 5.0);
        assert_eq!(level.patch(0).get([-1], 0), 5.0);
        assert_eq!(level.patch(0).get([8], 0), 0.0);
        assert_eq!(level.patch(1).get([16], 0), 5.0);
        assert_eq!(level.locate([16]), Some(&[5.0][..]));
        assert_eq!(level.locate([20]), None);
    }
}
