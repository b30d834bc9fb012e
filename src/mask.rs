use log::info;
use rayon::prelude::*;
use crate::box_array::BoxArray;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::orientation::{faces, FaceArray, Orientation};
use crate::patch::Patch;




/// Mask value of a boundary cell occupied by the valid region of another
/// patch of the same level (or its periodic image). Coarse data must not be
/// used there.
pub const COVERED: i32 = 0;

/// Mask value of a boundary cell with no patch of the level behind it: a
/// coarse-fine interface cell.
pub const NOT_COVERED: i32 = 1;

/// Mask value of a boundary cell outside a non-periodic domain.
pub const OUTSIDE_DOMAIN: i32 = 2;




/**
 * Per patch, per face, an integer array over the cells just outside the
 * face recording whether each one is covered by the level's grids. The face
 * arrays reach one cell past the ends of the face on the transverse axes,
 * so that interpolation stencils can look beyond the face corners.
 */
#[derive(Clone, Debug)]
pub struct CoverageMask<const D: usize> {
    masks: Vec<FaceArray<Patch<i32, D>, D>>,
}




// ============================================================================
impl<const D: usize> CoverageMask<D> {


    /**
     * Return the index space of the mask for one face of a patch.
     */
    pub fn face_box(valid: &IndexSpace<D>, face: Orientation<D>) -> IndexSpace<D> {
        let mut space = valid.adjacent_cells(face, 1);

        for axis in (0..D).filter(|&axis| axis != face.axis()) {
            space = space.extend_axis(axis, 1);
        }
        space
    }


    /**
     * Build the mask of every face of every patch. Rebuilding from the same
     * grids and geometry gives the same mask.
     */
    pub fn build(grids: &BoxArray<D>, geom: &Geometry<D>) -> Self {
        let masks: Vec<_> = grids
            .iter()
            .collect::<Vec<_>>()
            .par_iter()
            .map(|valid| FaceArray::from_fn(|face| Self::build_face(grids, geom, valid, face)))
            .collect();

        info!("built coverage mask for {} patches", masks.len());
        Self { masks }
    }


    fn build_face(grids: &BoxArray<D>, geom: &Geometry<D>, valid: &IndexSpace<D>, face: Orientation<D>) -> Patch<i32, D> {
        let space = Self::face_box(valid, face);
        let domain = geom.domain();
        let mut mask = Patch::new(space, 1, OUTSIDE_DOMAIN);

        let inside = geom
            .periodic_shifts(&space, domain)
            .into_iter()
            .chain(std::iter::once([0; D]))
            .filter_map(|shift| space.intersect(&domain.shift(shift)));

        for region in inside.collect::<Vec<_>>() {
            fill_region(&mut mask, &region, NOT_COVERED)
        }

        for grid in grids.iter() {
            let images = geom
                .periodic_shifts(&space, grid)
                .into_iter()
                .chain(std::iter::once([0; D]));

            for shift in images {
                if let Some(region) = space.intersect(&grid.shift(shift)) {
                    fill_region(&mut mask, &region, COVERED)
                }
            }
        }
        mask
    }


    pub fn len(&self) -> usize {
        self.masks.len()
    }


    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }


    pub fn get(&self, face: Orientation<D>, patch: usize) -> &Patch<i32, D> {
        &self.masks[patch][face]
    }


    pub fn get_mut(&mut self, face: Orientation<D>, patch: usize) -> &mut Patch<i32, D> {
        &mut self.masks[patch][face]
    }


    /**
     * Count the cells with the given mask value on every face of a patch.
     */
    pub fn count(&self, patch: usize, value: i32) -> usize {
        faces::<D>()
            .map(|face| self.get(face, patch).data().iter().filter(|&&m| m == value).count())
            .sum()
    }
}




// ============================================================================
fn fill_region<const D: usize>(mask: &mut Patch<i32, D>, region: &IndexSpace<D>, value: i32) {
    for index in region.iter() {
        mask.set(index, 0, value)
    }
}
