use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::index_space::{IndexSpace, IntVect};




/// The problem domain at one refinement level: its index space, which axes
/// wrap around periodically, and the physical cell size on each axis.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry<const D: usize> {
    domain: IndexSpace<D>,
    #[serde(with = "crate::array")]
    periodic: [bool; D],
    #[serde(with = "crate::array")]
    cell_size: [f64; D],
}

impl<const D: usize> Geometry<D> {
    pub fn new(domain: IndexSpace<D>, periodic: [bool; D], cell_size: [f64; D]) -> Result<Self> {
        if domain.is_empty() {
            return Err(Error::InvalidBox("the domain is empty".into()));
        }
        Ok(Self { domain, periodic, cell_size })
    }

    /// A domain with unit cell size and no periodic axes.
    ///
    pub fn unit(domain: IndexSpace<D>) -> Result<Self> {
        Self::new(domain, [false; D], [1.0; D])
    }

    pub fn domain(&self) -> &IndexSpace<D> {
        &self.domain
    }

    pub fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    pub fn is_any_periodic(&self) -> bool {
        self.periodic.iter().any(|&p| p)
    }

    pub fn cell_size(&self) -> [f64; D] {
        self.cell_size
    }

    /// Number of cells in one period along the given axis.
    ///
    pub fn period(&self, axis: usize) -> i64 {
        self.domain.dim()[axis] as i64
    }

    /// Return the geometry of the level refined by `ratio`.
    ///
    pub fn refine(&self, ratio: IntVect<D>) -> Self {
        let mut cell_size = self.cell_size;

        for axis in 0..D {
            cell_size[axis] /= ratio[axis] as f64
        }
        Self { domain: self.domain.refine(ratio), periodic: self.periodic, cell_size }
    }

    /// Return whether an index lies outside the domain across a non-periodic
    /// axis, i.e. in a region filled by a physical boundary condition.
    ///
    pub fn is_outside_physical(&self, index: IntVect<D>) -> bool {
        let (lo, hi) = (self.domain.lo(), self.domain.hi());
        (0..D).any(|axis| !self.periodic[axis] && (index[axis] < lo[axis] || index[axis] > hi[axis]))
    }

    /// Return the non-zero periodic shifts `s` for which `source` translated
    /// by `s` overlaps `target`. Only whole periods along periodic axes are
    /// considered, one period in either direction per axis.
    ///
    pub fn periodic_shifts(&self, target: &IndexSpace<D>, source: &IndexSpace<D>) -> Vec<IntVect<D>> {
        if !self.is_any_periodic() {
            return Vec::new();
        }
        let mut shifts = Vec::new();

        for code in 0..3usize.pow(D as u32) {
            let mut shift = [0; D];
            let mut digits = code;
            let mut admissible = true;

            for axis in 0..D {
                let step = (digits % 3) as i64 - 1;
                digits /= 3;

                if step != 0 && !self.periodic[axis] {
                    admissible = false;
                }
                shift[axis] = step * self.period(axis);
            }
            if admissible && shift != [0; D] && source.shift(shift).intersect(target).is_some() {
                shifts.push(shift)
            }
        }
        shifts
    }
}
