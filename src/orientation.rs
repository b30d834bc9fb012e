use core::fmt;
use core::ops::{Index, IndexMut};
use serde::{Deserialize, Serialize};




/// The low or high side of a box along one axis.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    Low,
    High,
}

impl Side {
    pub fn flip(self) -> Self {
        match self {
            Side::Low => Side::High,
            Side::High => Side::Low,
        }
    }

    /// Return -1 for the low side and +1 for the high side: the direction of
    /// the outward normal along the axis.
    pub fn sign(self) -> i64 {
        match self {
            Side::Low => -1,
            Side::High => 1,
        }
    }
}




/// One of the `2 * D` faces of a box in `D` dimensions. Faces are totally
/// ordered by axis, then side, which is also the order of their linear
/// index and the order in which [`faces`] yields them.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Orientation<const D: usize> {
    axis: usize,
    side: Side,
}

impl<const D: usize> Orientation<D> {
    pub fn new(axis: usize, side: Side) -> Self {
        assert!(axis < D, "axis {} out of range for dimension {}", axis, D);
        Self { axis, side }
    }

    /// Face on the low side of the given axis.
    pub fn low(axis: usize) -> Self {
        Self::new(axis, Side::Low)
    }

    /// Face on the high side of the given axis.
    pub fn high(axis: usize) -> Self {
        Self::new(axis, Side::High)
    }

    pub fn axis(self) -> usize {
        self.axis
    }

    pub fn side(self) -> Side {
        self.side
    }

    /// The face on the opposite side of the same axis.
    pub fn flip(self) -> Self {
        Self { axis: self.axis, side: self.side.flip() }
    }

    pub fn to_linear(self) -> usize {
        2 * self.axis + (self.side == Side::High) as usize
    }

    pub fn from_linear(linear: usize) -> Self {
        assert!(linear < 2 * D, "face index {} out of range for dimension {}", linear, D);
        Self {
            axis: linear / 2,
            side: if linear % 2 == 1 { Side::High } else { Side::Low },
        }
    }
}

impl<const D: usize> fmt::Display for Orientation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Low => "lo",
            Side::High => "hi",
        };
        match self.axis {
            0 => write!(f, "x{}", side),
            1 => write!(f, "y{}", side),
            2 => write!(f, "z{}", side),
            n => write!(f, "axis{}{}", n, side),
        }
    }
}




/// Iterator over the faces of a `D`-dimensional box, in face order.
///
#[derive(Clone, Debug)]
pub struct FaceIter<const D: usize> {
    next: usize,
}

impl<const D: usize> Iterator for FaceIter<D> {
    type Item = Orientation<D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= 2 * D {
            return None;
        }
        let face = Orientation::from_linear(self.next);
        self.next += 1;
        Some(face)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = 2 * D - self.next;
        (n, Some(n))
    }
}

impl<const D: usize> ExactSizeIterator for FaceIter<D> {}

/// Iterate over all faces in `D` dimensions.
///
pub fn faces<const D: usize>() -> FaceIter<D> {
    FaceIter { next: 0 }
}




/// A container holding one item per face, indexed by [`Orientation`].
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceArray<T, const D: usize> {
    items: Vec<T>,
}

impl<T, const D: usize> FaceArray<T, D> {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(Orientation<D>) -> T,
    {
        Self { items: faces::<D>().map(f).collect() }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Orientation<D>, &T)> {
        faces::<D>().zip(self.items.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Orientation<D>, &mut T)> {
        faces::<D>().zip(self.items.iter_mut())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T, const D: usize> Index<Orientation<D>> for FaceArray<T, D> {
    type Output = T;

    fn index(&self, face: Orientation<D>) -> &T {
        &self.items[face.to_linear()]
    }
}

impl<T, const D: usize> IndexMut<Orientation<D>> for FaceArray<T, D> {
    fn index_mut(&mut self, face: Orientation<D>) -> &mut T {
        &mut self.items[face.to_linear()]
    }
}
