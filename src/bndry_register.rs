use log::debug;
use serde::{Deserialize, Serialize};
use crate::box_array::BoxArray;
use crate::error::{check_components, Error, Result};
use crate::geometry::Geometry;
use crate::index_space::{IndexSpace, IntVect};
use crate::level_data::LevelData;
use crate::orientation::{FaceArray, Orientation, Side};
use crate::patch::Patch;

/// Per patch, per face, a thin multi-component array around the face of each
/// patch in a box array. The arrays span `out_rad` cells outside and
/// `in_rad` cells inside each face, and extend `extent_rad` cells past the
/// face on the transverse axes.
///
/// A register with radii `(0, 1, 0)` on the fine grids is the boundary value
/// store of a level. A register with radii `(0, 1, 2)` on the coarsened fine
/// grids holds the coarse data that coarse-fine interpolation reads.
///
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BndryRegister<const D: usize> {
    grids: BoxArray<D>,
    num_comp: usize,
    in_rad: i64,
    out_rad: i64,
    extent_rad: i64,
    regs: Vec<FaceArray<Patch<f64, D>, D>>,
}

impl<const D: usize> BndryRegister<D> {
    pub fn new(grids: BoxArray<D>, num_comp: usize, in_rad: i64, out_rad: i64, extent_rad: i64) -> Self {
        let regs = grids
            .iter()
            .map(|valid| FaceArray::from_fn(|face| {
                Patch::new(Self::face_box(valid, face, in_rad, out_rad, extent_rad), num_comp, 0.0)
            }))
            .collect();

        Self { grids, num_comp, in_rad, out_rad, extent_rad, regs }
    }

    /// The register of coarse data for the patches in `fine_grids`, refined
    /// by `ratio` relative to the coarse level. It is keyed by the coarsened
    /// fine boxes, with the patch numbering of `fine_grids`.
    ///
    pub fn coarse_register(fine_grids: &BoxArray<D>, ratio: IntVect<D>, num_comp: usize) -> Self {
        Self::new(fine_grids.coarsen(ratio), num_comp, 0, 1, 2)
    }

    /// Return the index space of the register for one face of a patch.
    ///
    pub fn face_box(valid: &IndexSpace<D>, face: Orientation<D>, in_rad: i64, out_rad: i64, extent_rad: i64) -> IndexSpace<D> {
        let axis = face.axis();
        let at = valid.face_index(face);

        let mut space = match face.side() {
            Side::Low => valid.with_range(axis, at - out_rad, at + in_rad - 1),
            Side::High => valid.with_range(axis, at - in_rad + 1, at + out_rad),
        };

        for other in (0..D).filter(|&other| other != axis) {
            space = space.extend_axis(other, extent_rad);
        }
        space
    }

    pub fn box_array(&self) -> &BoxArray<D> {
        &self.grids
    }

    pub fn num_comp(&self) -> usize {
        self.num_comp
    }

    pub fn radii(&self) -> (i64, i64, i64) {
        (self.in_rad, self.out_rad, self.extent_rad)
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    pub fn get(&self, face: Orientation<D>, patch: usize) -> &Patch<f64, D> {
        &self.regs[patch][face]
    }

    pub fn get_mut(&mut self, face: Orientation<D>, patch: usize) -> &mut Patch<f64, D> {
        &mut self.regs[patch][face]
    }

    /// The face arrays of every patch, for per-patch iteration.
    ///
    pub(crate) fn patches_mut(&mut self) -> &mut [FaceArray<Patch<f64, D>, D>] {
        &mut self.regs
    }

    pub fn set_val(&mut self, value: f64) {
        for faces in &mut self.regs {
            for (_, reg) in faces.iter_mut() {
                reg.fill(value)
            }
        }
    }

    /// Copy coarse field data into the register arrays of the given faces.
    /// Each register cell takes its value from the coarse patch whose valid
    /// region contains it, or failing that from a coarse patch's guard zones,
    /// and is left alone where there is no coarse data at all.
    ///
    /// Interpolation reads the cells one coarse cell past the ends of each
    /// face, so those must be covered unless they lie beyond a non-periodic
    /// edge of the coarse domain `geom`, where no stencil reaches. Fails if
    /// one of them is missing, leaving the register partly written.
    ///
    pub fn restrict<I>(
        &mut self,
        coarse: &LevelData<D>,
        geom: &Geometry<D>,
        src_comp: usize,
        dst_comp: usize,
        num_comp: usize,
        faces: I) -> Result<()>
    where
        I: IntoIterator<Item = Orientation<D>>,
    {
        check_components(src_comp, num_comp, coarse.num_comp())?;
        check_components(dst_comp, num_comp, self.num_comp)?;

        let faces: Vec<_> = faces.into_iter().collect();
        let (in_rad, out_rad, extent_rad) = self.radii();
        let mut skipped = 0;

        for (n, regs) in self.regs.iter_mut().enumerate() {
            let valid = &self.grids[n];

            for &face in &faces {
                let required = Self::face_box(valid, face, in_rad, out_rad, extent_rad.min(1));
                let reg = &mut regs[face];
                let space = *reg.index_space();

                for index in space.iter() {
                    match coarse.locate(index) {
                        Some(source) => {
                            reg.get_slice_mut(index)[dst_comp..dst_comp + num_comp]
                                .copy_from_slice(&source[src_comp..src_comp + num_comp]);
                        }
                        None if required.contains(index) && !geom.is_outside_physical(index) => {
                            return Err(Error::MissingCoarseData { patch: n, face: face.to_string() });
                        }
                        None => skipped += 1,
                    }
                }
            }
        }
        debug!(
            "restricted {} components onto {} faces of {} patches ({} cells without coarse data)",
            num_comp,
            faces.len(),
            self.regs.len(),
            skipped);
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::index_space::range;
    use crate::orientation::faces;

    #[test]
    fn face_boxes_follow_the_radii() {
        let valid = range([4, 4], [7, 7]);
        let xlo = BndryRegister::face_box(&valid, Orientation::low(0), 0, 1, 0);
        let xhi = BndryRegister::face_box(&valid, Orientation::high(0), 1, 1, 2);
        assert_eq!(xlo, range([3, 4], [3, 7]));
        assert_eq!(xhi, range([7, 2], [8, 9]));
    }

    #[test]
    fn coarse_register_is_keyed_by_coarsened_boxes() {
        let fine = BoxArray::new(vec![range([0, 0], [7, 7]), range([8, 0], [15, 7])]).unwrap();
        let reg = BndryRegister::coarse_register(&fine, [2, 2], 1);
        assert_eq!(reg.box_array()[1], range([4, 0], [7, 3]));
        assert_eq!(*reg.get(Orientation::low(0), 1).index_space(), range([3, -2], [3, 5]));
    }

    #[test]
    fn restrict_copies_valid_then_guard_data() {
        let geom = Geometry::unit(range([0, 0], [7, 7])).unwrap();
        let coarse_grids = BoxArray::new(vec![range([0, 0], [7, 7])]).unwrap();
        let coarse = LevelData::from_function(coarse_grids, 2, 2, |[i, j], c| (10 * i + j + 1000 * c as i64) as f64);

        let fine = BoxArray::new(vec![range([4, 4], [11, 11])]).unwrap();
        let mut reg = BndryRegister::coarse_register(&fine, [2, 2], 1);
        reg.restrict(&coarse, &geom, 1, 0, 1, faces::<2>()).unwrap();

        let xlo = reg.get(Orientation::low(0), 0);
        assert_eq!(*xlo.index_space(), range([1, 0], [1, 7]));
        assert_eq!(xlo.get([1, 0], 0), 1010.0);
        assert_eq!(xlo.get([1, 7], 0), 1017.0);
    }

    #[test]
    fn restrict_fails_without_coarse_coverage() {
        let geom = Geometry::unit(range([0, 0], [15, 15])).unwrap();
        let coarse_grids = BoxArray::new(vec![range([0, 0], [7, 7])]).unwrap();
        let coarse = LevelData::new(coarse_grids, 1, 0);

        let fine = BoxArray::new(vec![range([0, 0], [15, 15])]).unwrap();
        let mut reg = BndryRegister::coarse_register(&fine, [2, 2], 1);
        assert!(reg.restrict(&coarse, &geom, 0, 0, 1, vec![Orientation::low(0)]).is_ok());

        let result = reg.restrict(&coarse, &geom, 0, 0, 1, vec![Orientation::high(0)]);
        assert!(matches!(result, Err(Error::MissingCoarseData { patch: 0, .. })));
        assert!(reg.restrict(&coarse, &geom, 0, 0, 2, vec![]).is_err());
    }

    #[test]
    fn patch_on_the_domain_edge_needs_one_guard_zone() {
        let geom = Geometry::unit(range([0, 0], [15, 15])).unwrap();
        let coarse_grids = BoxArray::new(vec![range([0, 0], [15, 15])]).unwrap();
        let coarse = LevelData::from_function(coarse_grids, 1, 1, |[i, j], _| (10 * i + j) as f64);

        let fine = BoxArray::new(vec![range([0, 8], [7, 15])]).unwrap();
        let mut reg = BndryRegister::coarse_register(&fine, [2, 2], 1);
        reg.set_val(-1.0);
        reg.restrict(&coarse, &geom, 0, 0, 1, faces::<2>()).unwrap();

        let ylo = reg.get(Orientation::low(1), 0);
        assert_eq!(*ylo.index_space(), range([-2, 3], [5, 3]));
        assert_eq!(ylo.get([-2, 3], 0), -1.0);
        assert_eq!(ylo.get([-1, 3], 0), -7.0);
        assert_eq!(ylo.get([5, 3], 0), 53.0);
    }

    #[test]
    fn periodic_edge_requires_the_wrapped_coarse_cells() {
        let geom = Geometry::new(range([0, 0], [15, 15]), [true, false], [1.0, 1.0]).unwrap();
        let coarse_grids = BoxArray::new(vec![range([0, 0], [15, 15])]).unwrap();
        let fine = BoxArray::new(vec![range([0, 8], [7, 15])]).unwrap();
        let mut reg = BndryRegister::coarse_register(&fine, [2, 2], 1);

        let shallow = LevelData::new(coarse_grids.clone(), 1, 0);
        let result = reg.restrict(&shallow, &geom, 0, 0, 1, vec![Orientation::low(1)]);
        assert!(matches!(result, Err(Error::MissingCoarseData { patch: 0, .. })));

        let mut ghosted = LevelData::from_function(coarse_grids, 1, 1, |[i, _], _| i as f64);
        ghosted.fill_boundary(&geom);
        reg.restrict(&ghosted, &geom, 0, 0, 1, vec![Orientation::low(1)]).unwrap();
        assert_eq!(reg.get(Orientation::low(1), 0).get([-1, 3], 0), 15.0);
    }
}
