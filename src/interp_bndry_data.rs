//! The level boundary-data coordinator.
//!
//! [`InterpBndryData`] fills the boundary value store of a level, for use by
//! a linear operator, from either the level's own ghost-filled field data or
//! from a coarse boundary register plus the fine field. Every cell of the
//! requested components of the store is written exactly once per call, so
//! both entry points are idempotent.

use std::sync::OnceLock;
use log::{debug, trace};
use rayon::prelude::*;
use crate::bc::BcRec;
use crate::bndry_data::{BndryData, FaceRoute};
use crate::bndry_register::BndryRegister;
use crate::box_array::BoxArray;
use crate::descriptor::{InterpKind, StateDescriptor};
use crate::error::{check_components, Error, Result};
use crate::geometry::Geometry;
use crate::index_space::IntVect;
use crate::interp::{coarse_stencil, scratch_len, InterpArgs, KernelTable, Scratch};
use crate::level_data::LevelData;
use crate::mask::NOT_COVERED;
use crate::orientation::{faces, FaceArray};




/// Boundary data of one level, with the means to synthesize it from
/// same-level or coarse-level field data.
///
pub struct InterpBndryData<const D: usize> {
    data: BndryData<D>,
    interp: InterpKind,
    kernels: OnceLock<KernelTable<D>>,
}

impl<const D: usize> InterpBndryData<D> {
    /// Boundary data using the default (quadratic) interpolation.
    ///
    pub fn new(grids: BoxArray<D>, num_comp: usize, geom: Geometry<D>) -> Self {
        Self::with_interp(grids, num_comp, geom, InterpKind::default())
    }

    pub fn with_interp(grids: BoxArray<D>, num_comp: usize, geom: Geometry<D>, interp: InterpKind) -> Self {
        Self {
            data: BndryData::new(grids, num_comp, geom),
            interp,
            kernels: OnceLock::new(),
        }
    }

    /// Boundary data for every component of a kind of state data, using the
    /// descriptor's default interpolator.
    ///
    pub fn from_descriptor(grids: BoxArray<D>, geom: Geometry<D>, desc: &StateDescriptor<D>) -> Self {
        Self::with_interp(grids, desc.num_comp(), geom, desc.interp())
    }

    pub fn interp(&self) -> InterpKind {
        self.interp
    }

    pub fn bndry_data(&self) -> &BndryData<D> {
        &self.data
    }

    pub fn bndry_values(&self) -> &BndryRegister<D> {
        self.data.bndry_values()
    }

    /// Fill components `bndry_start..bndry_start + num_comp` of the store
    /// from components starting at `field_start` of a field on the same
    /// grids, without interpolation. Every face, physical or not, takes the
    /// field's ghost values just outside it, so the field's same-level,
    /// periodic and physical ghost fills must have been done.
    ///
    pub fn set_bndry_values(
        &mut self,
        field: &LevelData<D>,
        field_start: usize,
        bndry_start: usize,
        num_comp: usize,
        bc: &BcRec<D>) -> Result<()>
    {
        self.validate_field(field, field_start, bndry_start, num_comp)?;
        self.data.set_bndry_conds(bc, [1; D], bndry_start, num_comp)?;

        self.data.bndry.patches_mut().par_iter_mut().enumerate().for_each(|(n, regs)| {
            for (_, reg) in regs.iter_mut() {
                reg.copy_intersection(field.patch(n), field_start, bndry_start, num_comp);
            }
        });

        debug!("set {} components on {} patches from same-level data", num_comp, field.len());
        Ok(())
    }

    /// Fill components `bndry_start..bndry_start + num_comp` of the store at
    /// a coarse-fine level. Faces on the domain edge across a non-periodic
    /// axis take the fine field's physical ghost values. On every other face
    /// the cells not covered by a same-level patch are interpolated from the
    /// coarse register (read from component `crse_start`), and the remaining
    /// cells take the fine field's ghost values, which must hold the
    /// same-level and periodic exchange.
    ///
    pub fn set_bndry_values_cf(
        &mut self,
        crse: &BndryRegister<D>,
        crse_start: usize,
        fine: &LevelData<D>,
        fine_start: usize,
        bndry_start: usize,
        num_comp: usize,
        ratio: IntVect<D>,
        bc: &BcRec<D>) -> Result<()>
    {
        if let Some(axis) = (0..D).find(|&axis| ratio[axis] < 1) {
            return Err(Error::InvalidRatio { axis, ratio: ratio[axis] });
        }
        self.validate_field(fine, fine_start, bndry_start, num_comp)?;
        self.validate_coarse(crse, crse_start, num_comp, ratio)?;
        self.data.set_bndry_conds(bc, ratio, bndry_start, num_comp)?;

        let interp = self.interp;
        let kernels = self.kernels.get_or_init(|| KernelTable::new(interp));
        let routes = self.data.face_routes();
        let grids = &self.data.grids;
        let masks = &self.data.masks;

        // Fill coarse-fine cells by interpolation, and physical faces from
        // the fine field's physical ghost zones.
        self.data.bndry.patches_mut().par_iter_mut().enumerate().for_each_init(Scratch::new, |scratch, (n, regs)| {
            let fine_box = grids[n];
            let coarse_box = fine_box.coarsen(ratio);
            scratch.reserve(scratch_len(&coarse_box));

            for (face, reg) in regs.iter_mut() {
                trace!("patch {} face {}: {:?}", n, face, routes[n][face]);

                match routes[n][face] {
                    FaceRoute::CoarseFine => {
                        let args = InterpArgs {
                            output: reg.view_mut(bndry_start, num_comp),
                            fine_box,
                            coarse_box,
                            num_comp,
                            ratio,
                            not_covered: NOT_COVERED,
                            mask: masks.get(face, n).view(0, 1),
                            coarse: crse.get(face, n).view(crse_start, num_comp),
                        };
                        let kernel = kernels.get(face);
                        debug_assert_eq!(kernel.face(), face);
                        kernel.interpolate(args, scratch.as_mut_slice());
                    }
                    FaceRoute::Physical => {
                        reg.copy_intersection(fine.patch(n), fine_start, bndry_start, num_comp);
                    }
                }
            }
        });

        // Only once every patch is interpolated: the cells of coarse-fine
        // faces covered by a same-level patch take the fine ghost values.
        self.data.bndry.patches_mut().par_iter_mut().enumerate().for_each(|(n, regs)| {
            let source = fine.patch(n);

            for (face, reg) in regs.iter_mut() {
                if routes[n][face] != FaceRoute::CoarseFine {
                    continue;
                }
                let mask = masks.get(face, n);
                let space = *reg.index_space();

                for index in space.iter().filter(|&index| mask.get(index, 0) != NOT_COVERED) {
                    reg.get_slice_mut(index)[bndry_start..bndry_start + num_comp]
                        .copy_from_slice(&source.get_slice(index)[fine_start..fine_start + num_comp]);
                }
            }
        });

        let (cf, physical) = count_routes(&routes);
        debug!(
            "set {} components on {} patches at ratio {:?} ({:?}): {} coarse-fine faces, {} physical faces",
            num_comp,
            routes.len(),
            ratio,
            kernels.kind(),
            cf,
            physical);
        Ok(())
    }

    fn validate_field(&self, field: &LevelData<D>, field_start: usize, bndry_start: usize, num_comp: usize) -> Result<()> {
        if field.box_array() != &self.data.grids {
            return Err(Error::GridMismatch("field grids differ from the boundary data grids".to_string()));
        }
        for n in 0..field.len() {
            if *field.patch(n).index_space() != self.data.grids[n].extend_all(field.num_ghost() as i64) {
                return Err(Error::PatchBoxMismatch { patch: n });
            }
        }
        if field.num_ghost() < 1 {
            return Err(Error::InsufficientGhost { required: 1, available: field.num_ghost() });
        }
        check_components(field_start, num_comp, field.num_comp())?;
        check_components(bndry_start, num_comp, self.data.num_comp)
    }

    fn validate_coarse(&self, crse: &BndryRegister<D>, crse_start: usize, num_comp: usize, ratio: IntVect<D>) -> Result<()> {
        if crse.box_array() != &self.data.grids.coarsen(ratio) {
            return Err(Error::GridMismatch(format!(
                "coarse register is not keyed by the fine grids coarsened by {:?}",
                ratio)));
        }
        check_components(crse_start, num_comp, crse.num_comp())?;

        for (n, fine_box) in self.data.grids.iter().enumerate() {
            for face in faces::<D>().filter(|&face| self.data.face_route(n, face) == FaceRoute::CoarseFine) {
                let needed = coarse_stencil(self.interp, face, fine_box, ratio);

                if !crse.get(face, n).index_space().contains_space(&needed) {
                    return Err(Error::MissingCoarseData { patch: n, face: face.to_string() });
                }
            }
        }
        Ok(())
    }
}




// ============================================================================
fn count_routes<const D: usize>(routes: &[FaceArray<FaceRoute, D>]) -> (usize, usize) {
    let all = routes.iter().flat_map(|faces| faces.values());
    all.fold((0, 0), |(cf, physical), route| match route {
        FaceRoute::CoarseFine => (cf + 1, physical),
        FaceRoute::Physical => (cf, physical + 1),
    })
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::bc::BcType;
    use crate::index_space::range;
    use crate::mask::COVERED;
    use crate::orientation::Orientation;

    const RATIO: [i64; 2] = [2, 2];

    fn fine_grids() -> BoxArray<2> {
        BoxArray::new(vec![range([8, 8], [15, 15]), range([16, 8], [23, 15])]).unwrap()
    }

    fn fine_geom() -> Geometry<2> {
        Geometry::unit(range([0, 0], [31, 31])).unwrap()
    }

    fn coarse_level() -> LevelData<2> {
        let grids = BoxArray::new(vec![range([0, 0], [15, 15])]).unwrap();
        LevelData::from_function(grids, 1, 1, |[i, j], _| (i * i + 3 * j) as f64)
    }

    fn fine_level() -> LevelData<2> {
        let mut fine = LevelData::from_function(fine_grids(), 1, 1, |_, _| -7.0);
        fine.fill_boundary(&fine_geom());
        fine
    }

    fn coarse_register() -> BndryRegister<2> {
        let mut crse = BndryRegister::coarse_register(&fine_grids(), RATIO, 1);
        let crse_geom = Geometry::unit(range([0, 0], [15, 15])).unwrap();
        crse.restrict(&coarse_level(), &crse_geom, 0, 0, 1, faces::<2>()).unwrap();
        crse
    }

    fn run(ibd: &mut InterpBndryData<2>) {
        let bc = BcRec::uniform(BcType::ExtDir);
        ibd.set_bndry_values_cf(&coarse_register(), 0, &fine_level(), 0, 0, 1, RATIO, &bc).unwrap();
    }

    #[test]
    fn every_store_cell_is_written() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        ibd.data.bndry.set_val(f64::NAN);
        run(&mut ibd);

        for n in 0..2 {
            for face in faces::<2>() {
                assert!(ibd.bndry_values().get(face, n).data().iter().all(|x| x.is_finite()));
            }
        }
    }

    #[test]
    fn covered_cells_take_same_level_values() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        run(&mut ibd);

        let shared = ibd.bndry_values().get(Orientation::high(0), 0);
        assert!(shared.data().iter().all(|&x| x == -7.0));

        let open = ibd.bndry_values().get(Orientation::low(0), 0);
        assert!(open.data().iter().all(|&x| x != -7.0));
    }

    #[test]
    fn masking_a_face_covered_keeps_coarse_data_out() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        ibd.data.masks.get_mut(Orientation::low(1), 0).fill(COVERED);
        run(&mut ibd);

        let ylo = ibd.bndry_values().get(Orientation::low(1), 0);
        assert!(ylo.data().iter().all(|&x| x == -7.0));
    }

    #[test]
    fn repeated_calls_give_identical_stores() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        run(&mut ibd);
        let first = ibd.bndry_values().clone();
        run(&mut ibd);

        for n in 0..2 {
            for face in faces::<2>() {
                assert_eq!(first.get(face, n), ibd.bndry_values().get(face, n));
            }
        }
    }

    #[test]
    fn coarse_fine_faces_record_the_coarse_cell_location() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        run(&mut ibd);
        let cond = ibd.bndry_data().bndry_condition(0, Orientation::low(0), 0).unwrap();
        assert_eq!(cond.location, 1.0);
    }

    #[test]
    fn misaligned_coarse_register_is_rejected() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        let crse = BndryRegister::coarse_register(&fine_grids(), [4, 4], 1);
        let bc = BcRec::uniform(BcType::ExtDir);
        let result = ibd.set_bndry_values_cf(&crse, 0, &fine_level(), 0, 0, 1, RATIO, &bc);
        assert!(matches!(result, Err(Error::GridMismatch(_))));

        let result = ibd.set_bndry_values_cf(&coarse_register(), 0, &fine_level(), 0, 0, 1, [0, 2], &bc);
        assert_eq!(result, Err(Error::InvalidRatio { axis: 0, ratio: 0 }));
    }

    #[test]
    fn shallow_coarse_register_is_reported_missing() {
        let mut ibd = InterpBndryData::new(fine_grids(), 1, fine_geom());
        let crse = BndryRegister::new(fine_grids().coarsen(RATIO), 1, 0, 1, 0);
        let bc = BcRec::uniform(BcType::ExtDir);
        let result = ibd.set_bndry_values_cf(&crse, 0, &fine_level(), 0, 0, 1, RATIO, &bc);
        assert!(matches!(result, Err(Error::MissingCoarseData { patch: 0, .. })));
    }
}
