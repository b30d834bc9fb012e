//! Read-only metadata about the fields stored on a level: how many ghost
//! zones they carry, their per-component boundary condition records, and
//! which coarse-to-fine interpolation to use at coarse-fine interfaces.

use serde::{Deserialize, Serialize};
use crate::bc::BcRec;
use crate::error::{check_components, Error, Result};
use crate::index_space::Centering;




/// Selects the interpolation kernel used to fill coarse-fine faces.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpKind {
    PiecewiseConstant,
    Quadratic,
}

impl Default for InterpKind {
    fn default() -> Self {
        InterpKind::Quadratic
    }
}




/// Temporal centering of the stored data.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCenter {
    Point,
    Interval,
}




/// Whether a component is filled on its own or as part of a group of
/// components that must be filled together (e.g. the components of a
/// vector field).
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grouping {
    Standalone,
    GroupMember { ordinal: usize, group_size: usize },
}

impl Grouping {
    /// Whether this component leads its group; standalone components lead a
    /// group of one.
    pub fn is_leader(&self) -> bool {
        match self {
            Grouping::Standalone => true,
            Grouping::GroupMember { ordinal, .. } => *ordinal == 0,
        }
    }

    pub fn group_size(&self) -> usize {
        match self {
            Grouping::Standalone => 1,
            Grouping::GroupMember { group_size, .. } => *group_size,
        }
    }
}




#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentDesc<const D: usize> {
    pub name: String,
    pub bc: BcRec<D>,
    pub interp: Option<InterpKind>,
    pub grouping: Grouping,
}




/// Attributes of one kind of state data (e.g. the conserved variables),
/// shared by every level.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDescriptor<const D: usize> {
    ident: usize,
    centering: Centering,
    time_center: TimeCenter,
    num_ghost: usize,
    interp: InterpKind,
    extrap: bool,
    store_in_checkpoint: bool,
    components: Vec<ComponentDesc<D>>,
}

impl<const D: usize> StateDescriptor<D> {
    /// Create a descriptor whose components are all unnamed, standalone, use
    /// the default interpolator, and carry `default_bc`.
    ///
    pub fn new(
        ident: usize,
        centering: Centering,
        time_center: TimeCenter,
        num_ghost: usize,
        num_comp: usize,
        interp: InterpKind,
        default_bc: BcRec<D>) -> Self
    {
        let components = (0..num_comp)
            .map(|n| ComponentDesc {
                name: format!("comp{}", n),
                bc: default_bc.clone(),
                interp: None,
                grouping: Grouping::Standalone,
            })
            .collect();

        Self {
            ident,
            centering,
            time_center,
            num_ghost,
            interp,
            extrap: false,
            store_in_checkpoint: true,
            components,
        }
    }

    pub fn with_extrap(mut self, extrap: bool) -> Self {
        self.extrap = extrap;
        self
    }

    pub fn with_store_in_checkpoint(mut self, store: bool) -> Self {
        self.store_in_checkpoint = store;
        self
    }

    /// Set the details of one component. An `interp` of `None` means the
    /// descriptor's default interpolator.
    ///
    pub fn set_component(&mut self, comp: usize, name: &str, bc: BcRec<D>, interp: Option<InterpKind>) -> Result<()> {
        check_components(comp, 1, self.num_comp())?;
        self.components[comp] = ComponentDesc {
            name: name.to_string(),
            bc,
            interp,
            grouping: Grouping::Standalone,
        };
        Ok(())
    }

    /// Set the details of a group of consecutive components starting at
    /// `start`, which are then filled together.
    ///
    pub fn set_component_group(&mut self, start: usize, names: &[&str], bcs: &[BcRec<D>], interp: Option<InterpKind>) -> Result<()> {
        if names.len() != bcs.len() {
            return Err(Error::ComponentRange { start, count: names.len(), available: bcs.len() });
        }
        check_components(start, names.len(), self.num_comp())?;

        let group_size = names.len();

        for (ordinal, (name, bc)) in names.iter().zip(bcs).enumerate() {
            self.components[start + ordinal] = ComponentDesc {
                name: name.to_string(),
                bc: bc.clone(),
                interp,
                grouping: Grouping::GroupMember { ordinal, group_size },
            };
        }
        Ok(())
    }

    pub fn reset_component_bc(&mut self, comp: usize, bc: BcRec<D>) -> Result<()> {
        check_components(comp, 1, self.num_comp())?;
        self.components[comp].bc = bc;
        Ok(())
    }

    pub fn ident(&self) -> usize {
        self.ident
    }

    pub fn centering(&self) -> Centering {
        self.centering
    }

    pub fn time_center(&self) -> TimeCenter {
        self.time_center
    }

    pub fn num_comp(&self) -> usize {
        self.components.len()
    }

    pub fn num_ghost(&self) -> usize {
        self.num_ghost
    }

    pub fn extrap(&self) -> bool {
        self.extrap
    }

    pub fn store_in_checkpoint(&self) -> bool {
        self.store_in_checkpoint
    }

    /// The default interpolator.
    ///
    pub fn interp(&self) -> InterpKind {
        self.interp
    }

    /// The interpolator of one component.
    ///
    pub fn interp_for(&self, comp: usize) -> InterpKind {
        self.components[comp].interp.unwrap_or(self.interp)
    }

    pub fn name(&self, comp: usize) -> &str {
        &self.components[comp].name
    }

    pub fn bc(&self, comp: usize) -> &BcRec<D> {
        &self.components[comp].bc
    }

    pub fn grouping(&self, comp: usize) -> Grouping {
        self.components[comp].grouping
    }

    /// Whether `start..start + count` is a valid component range.
    ///
    pub fn in_range(&self, start: usize, count: usize) -> bool {
        start + count <= self.num_comp()
    }

    /// Whether every component in the range uses the same interpolator.
    ///
    pub fn identical_interps(&self, start: usize, count: usize) -> bool {
        self.same_interps(start, count).len() <= 1
    }

    /// Split the component range into maximal contiguous runs that share an
    /// interpolator, as `(start, count)` pairs.
    ///
    pub fn same_interps(&self, start: usize, count: usize) -> Vec<(usize, usize)> {
        let mut runs: Vec<(usize, usize)> = Vec::new();

        for comp in start..(start + count).min(self.num_comp()) {
            match runs.last_mut() {
                Some((s, n)) if self.interp_for(*s) == self.interp_for(comp) => *n += 1,
                _ => runs.push((comp, 1)),
            }
        }
        runs
    }
}




/// The descriptors of every kind of state data, addressed by index.
///
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DescriptorList<const D: usize> {
    descriptors: Vec<StateDescriptor<D>>,
}

impl<const D: usize> DescriptorList<D> {
    pub fn new() -> Self {
        Self { descriptors: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.descriptors.clear()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Put a descriptor at `index`, replacing any descriptor already there.
    /// The list grows by appending; `index` may not skip positions.
    ///
    pub fn add_descriptor(&mut self, index: usize, desc: StateDescriptor<D>) -> Result<()> {
        if index < self.descriptors.len() {
            self.descriptors[index] = desc;
        } else if index == self.descriptors.len() {
            self.descriptors.push(desc);
        } else {
            return Err(Error::ComponentRange { start: index, count: 1, available: self.descriptors.len() });
        }
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&StateDescriptor<D>> {
        self.descriptors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut StateDescriptor<D>> {
        self.descriptors.get_mut(index)
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::bc::BcType;

    fn descriptor() -> StateDescriptor<2> {
        StateDescriptor::new(0, Centering::Cell, TimeCenter::Point, 1, 4, InterpKind::Quadratic, BcRec::uniform(BcType::FoExtrap))
    }

    #[test]
    fn groups_record_ordinal_and_size() {
        let mut desc = descriptor();
        let bc = BcRec::uniform(BcType::ReflectOdd);
        desc.set_component_group(1, &["vx", "vy"], &[bc.clone(), bc], None).unwrap();
        assert_eq!(desc.grouping(0), Grouping::Standalone);
        assert_eq!(desc.grouping(1), Grouping::GroupMember { ordinal: 0, group_size: 2 });
        assert_eq!(desc.grouping(2), Grouping::GroupMember { ordinal: 1, group_size: 2 });
        assert!(desc.grouping(1).is_leader());
        assert!(!desc.grouping(2).is_leader());
        assert_eq!(desc.name(2), "vy");
        assert!(desc.set_component_group(3, &["a", "b"], &[desc.bc(0).clone(), desc.bc(0).clone()], None).is_err());
    }

    #[test]
    fn interpolator_runs_are_contiguous() {
        let mut desc = descriptor();
        desc.set_component(2, "rho", BcRec::uniform(BcType::ExtDir), Some(InterpKind::PiecewiseConstant)).unwrap();
        assert_eq!(desc.same_interps(0, 4), vec![(0, 2), (2, 1), (3, 1)]);
        assert!(desc.identical_interps(0, 2));
        assert!(!desc.identical_interps(1, 2));
        assert!(desc.in_range(1, 3));
        assert!(!desc.in_range(2, 3));
    }

    #[test]
    fn descriptor_list_appends_in_order() {
        let mut list = DescriptorList::new();
        list.add_descriptor(0, descriptor()).unwrap();
        assert!(list.add_descriptor(2, descriptor()).is_err());
        list.add_descriptor(1, descriptor().with_extrap(true)).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.get(1).unwrap().extrap());
    }
}
