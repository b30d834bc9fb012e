use serde::{Deserialize, Serialize};
use crate::orientation::{Orientation, Side};




/// Physical boundary behavior of one field component on one face.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BcType {
    /// Odd reflection across the face (the value changes sign).
    ReflectOdd,
    /// Interior or periodic face; there is no physical condition.
    IntDir,
    /// Even reflection across the face.
    ReflectEven,
    /// First-order extrapolation (zero normal gradient).
    FoExtrap,
    /// Value prescribed externally (Dirichlet).
    ExtDir,
    /// Higher-order extrapolation.
    HoExtrap,
}




/// A boundary type with an optional prescribed value.
///
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BcFace {
    pub kind: BcType,
    pub value: Option<f64>,
}

impl From<BcType> for BcFace {
    fn from(kind: BcType) -> Self {
        Self { kind, value: None }
    }
}




/// The boundary condition record of one field component: a [`BcFace`] for
/// each of the `2 * D` faces of the domain.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BcRec<const D: usize> {
    #[serde(with = "crate::array")]
    lo: [BcFace; D],
    #[serde(with = "crate::array")]
    hi: [BcFace; D],
}

impl<const D: usize> BcRec<D> {
    pub fn new(lo: [BcType; D], hi: [BcType; D]) -> Self {
        Self {
            lo: lo.map(BcFace::from),
            hi: hi.map(BcFace::from),
        }
    }

    /// The same boundary type on every face.
    ///
    pub fn uniform(kind: BcType) -> Self {
        Self::new([kind; D], [kind; D])
    }

    pub fn face(&self, face: Orientation<D>) -> BcFace {
        match face.side() {
            Side::Low => self.lo[face.axis()],
            Side::High => self.hi[face.axis()],
        }
    }

    pub fn kind(&self, face: Orientation<D>) -> BcType {
        self.face(face).kind
    }

    pub fn value(&self, face: Orientation<D>) -> Option<f64> {
        self.face(face).value
    }

    pub fn set(&mut self, face: Orientation<D>, kind: BcType, value: Option<f64>) {
        let entry = match face.side() {
            Side::Low => &mut self.lo[face.axis()],
            Side::High => &mut self.hi[face.axis()],
        };
        *entry = BcFace { kind, value };
    }

    /// Builder-style variant of `set` for a prescribed value.
    ///
    pub fn with_value(mut self, face: Orientation<D>, kind: BcType, value: f64) -> Self {
        self.set(face, kind, Some(value));
        self
    }
}




/// The condition a linear operator sees on a patch face.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundaryCondition {
    Dirichlet,
    Neumann,
    ReflectOdd,
}

impl BoundaryCondition {
    /// Map a physical boundary type to the operator condition, or `None` if
    /// the type has no meaning on a physical face.
    ///
    pub fn from_physical(kind: BcType) -> Option<Self> {
        match kind {
            BcType::ExtDir => Some(Self::Dirichlet),
            BcType::FoExtrap | BcType::HoExtrap | BcType::ReflectEven => Some(Self::Neumann),
            BcType::ReflectOdd => Some(Self::ReflectOdd),
            BcType::IntDir => None,
        }
    }
}




/// A boundary condition together with the distance from the face at which
/// its boundary value applies, in physical units.
///
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinOpBc {
    pub condition: BoundaryCondition,
    pub location: f64,
}
