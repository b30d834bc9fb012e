use log::trace;
use crate::bc::{BcRec, BoundaryCondition, LinOpBc};
use crate::box_array::BoxArray;
use crate::error::{check_components, Error, Result};
use crate::geometry::Geometry;
use crate::index_space::IntVect;
use crate::bndry_register::BndryRegister;
use crate::mask::CoverageMask;
use crate::orientation::{faces, FaceArray, Orientation};




/**
 * How the boundary values of a patch face are obtained.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceRoute {
    /// The face is interior to the domain, or on a periodic axis: its values
    /// come from coarse data where no same-level patch covers it.
    CoarseFine,

    /// The face lies on the domain edge across a non-periodic axis: its
    /// values come from the physical boundary fill of the field.
    Physical,
}




/**
 * Boundary data of one level: for every patch face, the coverage mask, the
 * boundary value store, and the condition a linear operator applies there.
 */
#[derive(Clone, Debug)]
pub struct BndryData<const D: usize> {
    pub(crate) grids: BoxArray<D>,
    pub(crate) geom: Geometry<D>,
    pub(crate) num_comp: usize,
    pub(crate) masks: CoverageMask<D>,
    pub(crate) bndry: BndryRegister<D>,
    pub(crate) conditions: Vec<FaceArray<Vec<Option<LinOpBc>>, D>>,
}




// ============================================================================
impl<const D: usize> BndryData<D> {


    /**
     * Allocate boundary data with `num_comp` components over the given grids,
     * and build the coverage mask.
     */
    pub fn new(grids: BoxArray<D>, num_comp: usize, geom: Geometry<D>) -> Self {
        let masks = CoverageMask::build(&grids, &geom);
        let bndry = BndryRegister::new(grids.clone(), num_comp, 0, 1, 0);
        let conditions = grids
            .iter()
            .map(|_| FaceArray::from_fn(|_| vec![None; num_comp]))
            .collect();

        Self { grids, geom, num_comp, masks, bndry, conditions }
    }


    pub fn box_array(&self) -> &BoxArray<D> {
        &self.grids
    }


    pub fn geometry(&self) -> &Geometry<D> {
        &self.geom
    }


    pub fn num_comp(&self) -> usize {
        self.num_comp
    }


    pub fn masks(&self) -> &CoverageMask<D> {
        &self.masks
    }


    /**
     * The boundary value store: one array of cells just outside each face of
     * each patch.
     */
    pub fn bndry_values(&self) -> &BndryRegister<D> {
        &self.bndry
    }


    /**
     * Return the route taken by a face of a patch. A face is physical when
     * it coincides with the domain face of the same orientation and that
     * axis is not periodic.
     */
    pub fn face_route(&self, patch: usize, face: Orientation<D>) -> FaceRoute {
        let valid = &self.grids[patch];
        let domain = self.geom.domain();

        if valid.face_index(face) == domain.face_index(face) && !self.geom.is_periodic(face.axis()) {
            FaceRoute::Physical
        } else {
            FaceRoute::CoarseFine
        }
    }


    /**
     * The routes of every face of every patch.
     */
    pub fn face_routes(&self) -> Vec<FaceArray<FaceRoute, D>> {
        (0..self.grids.len())
            .map(|n| FaceArray::from_fn(|face| self.face_route(n, face)))
            .collect()
    }


    /**
     * The condition recorded for one component on a patch face, or `None`
     * if no boundary values have been set for that component yet.
     */
    pub fn bndry_condition(&self, patch: usize, face: Orientation<D>, comp: usize) -> Option<LinOpBc> {
        self.conditions[patch][face][comp]
    }


    /**
     * Record the operator condition of components `start..start + count` on
     * every patch face. Physical faces map the component's boundary type and
     * apply on the face itself; coarse-fine faces are Dirichlet, applied at
     * the center of the coarse cell across the face, `ratio` fine cells
     * away. Fails without recording anything if a physical face carries a
     * boundary type with no operator meaning there.
     */
    pub fn set_bndry_conds(&mut self, bc: &BcRec<D>, ratio: IntVect<D>, start: usize, count: usize) -> Result<()> {
        check_components(start, count, self.num_comp)?;

        let dx = self.geom.cell_size();
        let mut resolved = Vec::with_capacity(self.grids.len());

        for n in 0..self.grids.len() {
            let mut faces_bc = Vec::with_capacity(2 * D);

            for face in faces::<D>() {
                let axis = face.axis();
                let condition = match self.face_route(n, face) {
                    FaceRoute::Physical => {
                        let kind = bc.kind(face);
                        let condition = BoundaryCondition::from_physical(kind).ok_or_else(|| Error::UnsupportedBoundary {
                            patch: n,
                            face: face.to_string(),
                            kind: format!("{:?}", kind),
                        })?;
                        LinOpBc { condition, location: 0.0 }
                    }
                    FaceRoute::CoarseFine => LinOpBc {
                        condition: BoundaryCondition::Dirichlet,
                        location: 0.5 * ratio[axis] as f64 * dx[axis],
                    },
                };
                trace!("patch {} face {}: {:?}", n, face, condition);
                faces_bc.push((face, condition));
            }
            resolved.push(faces_bc);
        }

        for (n, faces_bc) in resolved.into_iter().enumerate() {
            for (face, condition) in faces_bc {
                for comp in start..start + count {
                    self.conditions[n][face][comp] = Some(condition);
                }
            }
        }
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::bc::BcType;
    use crate::index_space::range;

    fn level(periodic: [bool; 2]) -> BndryData<2> {
        let grids = BoxArray::new(vec![range([0, 0], [7, 7]), range([8, 0], [15, 7])]).unwrap();
        let geom = Geometry::new(range([0, 0], [15, 15]), periodic, [0.5, 0.25]).unwrap();
        BndryData::new(grids, 2, geom)
    }

    #[test]
    fn faces_on_the_domain_edge_are_physical() {
        let data = level([false, false]);
        assert_eq!(data.face_route(0, Orientation::low(0)), FaceRoute::Physical);
        assert_eq!(data.face_route(0, Orientation::high(0)), FaceRoute::CoarseFine);
        assert_eq!(data.face_route(0, Orientation::low(1)), FaceRoute::Physical);
        assert_eq!(data.face_route(0, Orientation::high(1)), FaceRoute::CoarseFine);
        assert_eq!(data.face_route(1, Orientation::high(0)), FaceRoute::Physical);
    }

    #[test]
    fn periodic_domain_edges_are_coarse_fine() {
        let data = level([true, false]);
        assert_eq!(data.face_route(0, Orientation::low(0)), FaceRoute::CoarseFine);
        assert_eq!(data.face_route(1, Orientation::high(0)), FaceRoute::CoarseFine);
        assert_eq!(data.face_route(1, Orientation::low(1)), FaceRoute::Physical);
    }

    #[test]
    fn conditions_follow_the_route() {
        let mut data = level([false, false]);
        let bc = BcRec::new([BcType::ExtDir, BcType::ReflectEven], [BcType::ReflectOdd, BcType::FoExtrap]);
        data.set_bndry_conds(&bc, [2, 2], 1, 1).unwrap();

        let xlo = data.bndry_condition(0, Orientation::low(0), 1).unwrap();
        let ylo = data.bndry_condition(0, Orientation::low(1), 1).unwrap();
        let xhi = data.bndry_condition(0, Orientation::high(0), 1).unwrap();
        let yhi = data.bndry_condition(0, Orientation::high(1), 1).unwrap();

        assert_eq!(xlo, LinOpBc { condition: BoundaryCondition::Dirichlet, location: 0.0 });
        assert_eq!(ylo, LinOpBc { condition: BoundaryCondition::Neumann, location: 0.0 });
        assert_eq!(xhi, LinOpBc { condition: BoundaryCondition::Dirichlet, location: 0.5 });
        assert_eq!(yhi, LinOpBc { condition: BoundaryCondition::Dirichlet, location: 0.25 });
        assert_eq!(data.bndry_condition(1, Orientation::high(0), 1).unwrap().condition, BoundaryCondition::ReflectOdd);
        assert_eq!(data.bndry_condition(0, Orientation::low(0), 0), None);
    }

    #[test]
    fn interior_type_on_a_physical_face_is_rejected() {
        let mut data = level([false, false]);
        let result = data.set_bndry_conds(&BcRec::uniform(BcType::IntDir), [1, 1], 0, 2);
        assert!(matches!(result, Err(Error::UnsupportedBoundary { patch: 0, .. })));
        assert_eq!(data.bndry_condition(0, Orientation::high(0), 0), None);
        assert!(data.set_bndry_conds(&BcRec::uniform(BcType::ExtDir), [1, 1], 1, 2).is_err());
    }

    #[test]
    fn store_arrays_sit_just_outside_each_face() {
        let data = level([false, false]);
        let xhi = data.bndry_values().get(Orientation::high(0), 1);
        assert_eq!(*xhi.index_space(), range([16, 0], [16, 7]));
        assert_eq!(xhi.num_comp(), 2);
        assert_eq!(data.face_routes()[1][Orientation::high(0)], FaceRoute::Physical);
    }
}
