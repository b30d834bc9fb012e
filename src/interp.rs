//! Coarse-to-fine interpolation of boundary values along a patch face.
//!
//! A kernel fills the fine cells just outside one face of a fine patch from
//! the coarse cells just outside the coarsened patch. Values vary only along
//! the transverse axes: the result stands for the coarse cell center in the
//! normal direction, and the operator using the boundary data accounts for
//! that through the boundary location. Kernels write a fine cell only where
//! the mask says it is not covered, and never modify the mask or the coarse
//! data.

use log::trace;
use crate::descriptor::InterpKind;
use crate::index_space::{IndexSpace, IntVect};
use crate::orientation::{FaceArray, Orientation};
use crate::patch::{ArrayView, ArrayViewMut};




/// Number of derivative terms stored per coarse face cell in `D` dimensions:
/// a slope and a curvature for every transverse axis, plus a mixed term for
/// every pair of transverse axes.
///
pub fn num_deriv(dim: usize) -> usize {
    let t = dim.saturating_sub(1);
    2 * t + t * t.saturating_sub(1) / 2
}

/// Scratch length needed to interpolate onto any face of a patch whose
/// coarsened box is `coarse_box`.
///
pub fn scratch_len<const D: usize>(coarse_box: &IndexSpace<D>) -> usize {
    let side = coarse_box.longside() + 2;
    side.pow(D.saturating_sub(1) as u32) * num_deriv(D)
}




/// A caller-owned buffer of derivative estimates, reused from one patch to
/// the next. It only ever grows.
///
#[derive(Debug, Default)]
pub struct Scratch {
    buf: Vec<f64>,
}

impl Scratch {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Make sure the buffer holds at least `len` values.
    ///
    pub fn reserve(&mut self, len: usize) {
        if len > self.buf.len() {
            trace!("growing interpolation scratch from {} to {}", self.buf.len(), len);
            self.buf.resize(len, 0.0);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.buf
    }
}




/// Everything a face kernel reads and writes. The views carry their own
/// index ranges; the mask view has a single component.
///
#[derive(Debug)]
pub struct InterpArgs<'a, const D: usize> {
    /// Boundary values to fill: the fine cells just outside the face.
    pub output: ArrayViewMut<'a, f64, D>,
    /// Valid box of the fine patch.
    pub fine_box: IndexSpace<D>,
    /// The fine box coarsened by `ratio`.
    pub coarse_box: IndexSpace<D>,
    pub num_comp: usize,
    pub ratio: IntVect<D>,
    /// Mask value marking fine cells that take coarse data.
    pub not_covered: i32,
    pub mask: ArrayView<'a, i32, D>,
    pub coarse: ArrayView<'a, f64, D>,
}




/// An interpolation kernel for one face orientation.
///
pub trait FaceKernel<const D: usize>: Send + Sync {
    /// The face this kernel fills.
    fn face(&self) -> Orientation<D>;

    /// Fill `args.output` at every not-covered cell. `scratch` holds at
    /// least `scratch_len(&args.coarse_box)` values.
    fn interpolate(&self, args: InterpArgs<'_, D>, scratch: &mut [f64]);
}




/// One kernel per face, built once for a given interpolation kind.
///
pub struct KernelTable<const D: usize> {
    kind: InterpKind,
    kernels: FaceArray<Box<dyn FaceKernel<D>>, D>,
}

impl<const D: usize> KernelTable<D> {
    pub fn new(kind: InterpKind) -> Self {
        let kernels = FaceArray::from_fn(|face| -> Box<dyn FaceKernel<D>> {
            match kind {
                InterpKind::PiecewiseConstant => Box::new(PiecewiseConstant { face }),
                InterpKind::Quadratic => Box::new(Quadratic { face }),
            }
        });
        Self { kind, kernels }
    }

    pub fn kind(&self) -> InterpKind {
        self.kind
    }

    pub fn get(&self, face: Orientation<D>) -> &dyn FaceKernel<D> {
        self.kernels[face].as_ref()
    }
}




// ============================================================================
/// Index of the coarse cell layer the face kernels read from: the coarse
/// cell containing the fine cells just outside the face.
fn coarse_normal_index<const D: usize>(face: Orientation<D>, fine_box: &IndexSpace<D>, ratio: IntVect<D>) -> i64 {
    let axis = face.axis();
    let fine = fine_box.face_index(face) + face.side().sign();
    fine.div_euclid(ratio[axis])
}

/// The coarse cells just outside the face, one per coarse transverse index.
pub(crate) fn coarse_face<const D: usize>(
    face: Orientation<D>,
    fine_box: &IndexSpace<D>,
    coarse_box: &IndexSpace<D>,
    ratio: IntVect<D>) -> IndexSpace<D>
{
    let n = coarse_normal_index(face, fine_box, ratio);
    coarse_box.with_range(face.axis(), n, n)
}

/// The coarse cells a kernel of the given kind may read for one face: the
/// coarse face cells, plus one cell past either end for the quadratic
/// stencil.
pub(crate) fn coarse_stencil<const D: usize>(
    kind: InterpKind,
    face: Orientation<D>,
    fine_box: &IndexSpace<D>,
    ratio: IntVect<D>) -> IndexSpace<D>
{
    let mut space = coarse_face(face, fine_box, &fine_box.coarsen(ratio), ratio);

    if kind == InterpKind::Quadratic {
        for axis in (0..D).filter(|&axis| axis != face.axis()) {
            space = space.extend_axis(axis, 1);
        }
    }
    space
}

/// The coarse cell containing a fine cell.
fn coarse_cell<const D: usize>(fine: IntVect<D>, ratio: IntVect<D>) -> IntVect<D> {
    let mut coarse = fine;

    for axis in 0..D {
        coarse[axis] = fine[axis].div_euclid(ratio[axis]);
    }
    coarse
}




/// Copies the value of the coarse cell under each fine cell.
///
pub struct PiecewiseConstant<const D: usize> {
    face: Orientation<D>,
}

impl<const D: usize> FaceKernel<D> for PiecewiseConstant<D> {
    fn face(&self) -> Orientation<D> {
        self.face
    }

    fn interpolate(&self, args: InterpArgs<'_, D>, _scratch: &mut [f64]) {
        let InterpArgs { mut output, fine_box, ratio, not_covered, mask, coarse, num_comp, .. } = args;
        let normal = coarse_normal_index(self.face, &fine_box, ratio);
        let space = *output.index_space();

        for index in space.iter().filter(|&index| mask.get(index, 0) == not_covered) {
            let mut c = coarse_cell(index, ratio);
            c[self.face.axis()] = normal;

            for n in 0..num_comp {
                output.set(index, n, coarse.get(c, n))
            }
        }
    }
}




/// Quadratic interpolation along the face from three coarse cells per
/// transverse axis, with a mixed term for each pair of transverse axes in 3D.
/// Where a neighboring coarse cell lies beyond a fine cell that is covered or
/// outside the domain, the estimate falls back to a one-sided slope, or to a
/// constant if neither neighbor can be used. Linear data is reproduced
/// exactly.
///
pub struct Quadratic<const D: usize> {
    face: Orientation<D>,
}

impl<const D: usize> Quadratic<D> {
    fn transverse_axes(&self) -> Vec<usize> {
        (0..D).filter(|&axis| axis != self.face.axis()).collect()
    }

    /// Whether the coarse neighbor of `c` one step along `axis` in direction
    /// `step` may be used: the fine cell just past the coarse cell on that
    /// side must be a coarse-fine cell, and the coarse data must exist.
    fn neighbor_usable(&self, args: &InterpArgs<'_, D>, c: IntVect<D>, axis: usize, step: i64) -> bool {
        let r = args.ratio[axis];
        let mut fine = [0; D];

        for a in 0..D {
            fine[a] = if a == self.face.axis() {
                args.fine_box.face_index(self.face) + self.face.side().sign()
            } else {
                (c[a] * args.ratio[a]).max(args.fine_box.lo()[a]).min(args.fine_box.hi()[a])
            };
        }
        fine[axis] = if step < 0 { c[axis] * r - 1 } else { (c[axis] + 1) * r };

        let mut neighbor = c;
        neighbor[axis] += step;

        args.mask.try_get(fine, 0) == Some(args.not_covered) && args.coarse.index_space().contains(neighbor)
    }

    /// Write the derivative terms of component `n` at coarse face cell `c`
    /// into `derivs`.
    fn derivatives(&self, args: &InterpArgs<'_, D>, axes: &[usize], c: IntVect<D>, n: usize, derivs: &mut [f64]) {
        let value = |offset: &[(usize, i64)]| {
            let mut index = c;
            for &(axis, step) in offset {
                index[axis] += step;
            }
            args.coarse.get(index, n)
        };
        let c0 = value(&[]);
        let mut usable = Vec::with_capacity(axes.len());

        for (t, &axis) in axes.iter().enumerate() {
            let lo = self.neighbor_usable(args, c, axis, -1);
            let hi = self.neighbor_usable(args, c, axis, 1);

            let (slope, curvature) = match (lo, hi) {
                (true, true) => {
                    let cl = value(&[(axis, -1)]);
                    let ch = value(&[(axis, 1)]);
                    (0.5 * (ch - cl), 0.5 * (ch - 2.0 * c0 + cl))
                }
                (false, true) => (value(&[(axis, 1)]) - c0, 0.0),
                (true, false) => (c0 - value(&[(axis, -1)]), 0.0),
                (false, false) => (0.0, 0.0),
            };
            derivs[2 * t] = slope;
            derivs[2 * t + 1] = curvature;
            usable.push(lo && hi);
        }

        let mut k = 2 * axes.len();

        for t0 in 0..axes.len() {
            for t1 in t0 + 1..axes.len() {
                let (a0, a1) = (axes[t0], axes[t1]);
                let corners = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
                let available = usable[t0] && usable[t1] && corners.iter().all(|&(s0, s1)| {
                    let mut index = c;
                    index[a0] += s0;
                    index[a1] += s1;
                    args.coarse.index_space().contains(index)
                });

                derivs[k] = if available {
                    0.25 * (value(&[(a0, 1), (a1, 1)])
                          - value(&[(a0, 1), (a1, -1)])
                          - value(&[(a0, -1), (a1, 1)])
                          + value(&[(a0, -1), (a1, -1)]))
                } else {
                    0.0
                };
                k += 1;
            }
        }
    }
}

impl<const D: usize> FaceKernel<D> for Quadratic<D> {
    fn face(&self) -> Orientation<D> {
        self.face
    }

    fn interpolate(&self, mut args: InterpArgs<'_, D>, scratch: &mut [f64]) {
        let axes = self.transverse_axes();
        let nd = num_deriv(D);
        let cface = coarse_face(self.face, &args.fine_box, &args.coarse_box, args.ratio);
        let normal = coarse_normal_index(self.face, &args.fine_box, args.ratio);
        let space = *args.output.index_space();

        assert!(scratch.len() >= cface.len() * nd, "interpolation scratch too small");

        for n in 0..args.num_comp {
            for c in cface.iter() {
                let k = cface.row_major_offset(c) * nd;
                self.derivatives(&args, &axes, c, n, &mut scratch[k..k + nd]);
            }

            for index in space.iter() {
                if args.mask.get(index, 0) != args.not_covered {
                    continue;
                }
                let mut c = coarse_cell(index, args.ratio);
                c[self.face.axis()] = normal;

                let k = cface.row_major_offset(c) * nd;
                let derivs = &scratch[k..k + nd];
                let mut result = args.coarse.get(c, n);
                let mut x = Vec::with_capacity(axes.len());

                for (t, &axis) in axes.iter().enumerate() {
                    let r = args.ratio[axis];
                    let xt = ((index[axis] - c[axis] * r) as f64 + 0.5) / r as f64 - 0.5;
                    result += derivs[2 * t] * xt + derivs[2 * t + 1] * xt * xt;
                    x.push(xt);
                }

                let mut m = 2 * axes.len();

                for t0 in 0..axes.len() {
                    for t1 in t0 + 1..axes.len() {
                        result += derivs[m] * x[t0] * x[t1];
                        m += 1;
                    }
                }
                args.output.set(index, n, result);
            }
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::index_space::range;
    use crate::mask::{COVERED, NOT_COVERED, OUTSIDE_DOMAIN};
    use crate::patch::Patch;

    struct Fixture {
        output: Patch<f64, 2>,
        mask: Patch<i32, 2>,
        coarse: Patch<f64, 2>,
        fine_box: IndexSpace<2>,
        ratio: IntVect<2>,
    }

    impl Fixture {
        /// Fine patch [0, 7]^2 at ratio 2, interpolating onto its x-low face.
        fn new<F: Fn(IntVect<2>) -> f64>(ratio: IntVect<2>, coarse: F) -> Self {
            let fine_box = range([0, 0], [7, 7]);
            let face = Orientation::low(0);
            let coarse_box = fine_box.coarsen(ratio);
            Self {
                output: Patch::new(fine_box.adjacent_cells(face, 1), 1, f64::NAN),
                mask: Patch::new(crate::mask::CoverageMask::face_box(&fine_box, face), 1, NOT_COVERED),
                coarse: Patch::from_function(coarse_box.adjacent_cells(face, 1).extend_axis(1, 2), 1, |i, _| coarse(i)),
                fine_box,
                ratio,
            }
        }

        fn run(&mut self, kind: InterpKind) {
            let table = KernelTable::<2>::new(kind);
            let face = Orientation::low(0);
            let coarse_box = self.fine_box.coarsen(self.ratio);
            let mut scratch = Scratch::new();
            scratch.reserve(scratch_len(&coarse_box));

            let args = InterpArgs {
                output: self.output.view_mut(0, 1),
                fine_box: self.fine_box,
                coarse_box,
                num_comp: 1,
                ratio: self.ratio,
                not_covered: NOT_COVERED,
                mask: self.mask.view(0, 1),
                coarse: self.coarse.view(0, 1),
            };
            table.get(face).interpolate(args, scratch.as_mut_slice());
        }
    }

    #[test]
    fn derivative_term_counts() {
        assert_eq!(num_deriv(1), 0);
        assert_eq!(num_deriv(2), 2);
        assert_eq!(num_deriv(3), 5);
        assert_eq!(scratch_len(&range([0, 0], [3, 1])), 12);
        assert_eq!(scratch_len(&range([0, 0, 0], [3, 1, 2])), 180);
    }

    #[test]
    fn scratch_only_grows() {
        let mut scratch = Scratch::new();
        scratch.reserve(10);
        scratch.reserve(4);
        assert_eq!(scratch.len(), 10);
    }

    #[test]
    fn linear_coarse_data_is_reproduced_exactly() {
        let mut fx = Fixture::new([2, 2], |[_, j]| 2.0 * j as f64 + 1.0);
        fx.run(InterpKind::Quadratic);

        for j in 0..8 {
            let y = (j as f64 + 0.5) / 2.0 - 0.5;
            assert!((fx.output.get([-1, j], 0) - (2.0 * y + 1.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn quadratic_coarse_data_is_reproduced() {
        let mut fx = Fixture::new([2, 2], |[_, j]| (j * j) as f64);
        fx.run(InterpKind::Quadratic);

        for j in 0..8 {
            let y = (j as f64 + 0.5) / 2.0 - 0.5;
            assert!((fx.output.get([-1, j], 0) - y * y).abs() < 1e-12);
        }
    }

    #[test]
    fn unit_ratio_copies_coarse_data() {
        for kind in [InterpKind::Quadratic, InterpKind::PiecewiseConstant] {
            let mut fx = Fixture::new([1, 1], |[i, j]| (i * 100 + j * j * j) as f64);
            fx.run(kind);

            for j in 0..8 {
                assert_eq!(fx.output.get([-1, j], 0), (-100 + j * j * j) as f64);
            }
        }
    }

    #[test]
    fn covered_cells_are_left_alone() {
        let mut fx = Fixture::new([2, 2], |[_, j]| j as f64);
        fx.mask.fill(COVERED);
        fx.run(InterpKind::Quadratic);
        assert!(fx.output.data().iter().all(|x| x.is_nan()));

        fx.mask.fill(NOT_COVERED);
        fx.mask.set([-1, 3], 0, COVERED);
        fx.run(InterpKind::PiecewiseConstant);
        assert!(fx.output.get([-1, 3], 0).is_nan());
        assert_eq!(fx.output.get([-1, 2], 0), 1.0);
    }

    #[test]
    fn ends_fall_back_to_one_sided_slopes() {
        let mut fx = Fixture::new([2, 2], |[_, j]| if j < 0 { 1000.0 } else { (j * j) as f64 });
        fx.mask.set([-1, -1], 0, OUTSIDE_DOMAIN);
        fx.run(InterpKind::Quadratic);

        // coarse cell 0: one-sided slope 1 - 0 toward cell 1, no curvature
        assert!((fx.output.get([-1, 0], 0) - (-0.25)).abs() < 1e-12);
        assert!((fx.output.get([-1, 1], 0) - 0.25).abs() < 1e-12);
        assert!(fx.output.data().iter().all(|x| x.abs() < 100.0));
    }

    #[test]
    fn kernels_do_not_mutate_their_inputs() {
        let mut fx = Fixture::new([2, 2], |[_, j]| j as f64);
        let mask = fx.mask.clone();
        let coarse = fx.coarse.clone();
        fx.run(InterpKind::Quadratic);
        assert_eq!(fx.mask, mask);
        assert_eq!(fx.coarse, coarse);
    }
}
