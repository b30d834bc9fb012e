use std::error;
use std::fmt;




/**
 * Error to represent a violated precondition of a boundary-data operation.
 * None of these are recoverable inside the library: the operation that
 * returned one has not written any usable boundary data.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    GridMismatch(String),
    PatchBoxMismatch { patch: usize },
    InvalidBox(String),
    InvalidRatio { axis: usize, ratio: i64 },
    ComponentRange { start: usize, count: usize, available: usize },
    InsufficientGhost { required: usize, available: usize },
    MissingCoarseData { patch: usize, face: String },
    UnsupportedBoundary { patch: usize, face: String, kind: String },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;

        match self {
            GridMismatch(what) => write!(fmt, "box arrays do not match: {}", what),
            PatchBoxMismatch { patch } => write!(fmt, "patch {} does not match its box array entry", patch),
            InvalidBox(what) => write!(fmt, "invalid box: {}", what),
            InvalidRatio { axis, ratio } => write!(fmt, "refinement ratio {} on axis {} is not positive", ratio, axis),
            ComponentRange { start, count, available } => write!(
                fmt,
                "components {}..{} out of range (have {})",
                start,
                start + count,
                available),
            InsufficientGhost { required, available } => write!(
                fmt,
                "field has {} ghost zones, {} required",
                available,
                required),
            MissingCoarseData { patch, face } => write!(fmt, "no coarse data covers face {} of patch {}", face, patch),
            UnsupportedBoundary { patch, face, kind } => write!(
                fmt,
                "boundary type {} is not supported on physical face {} of patch {}",
                kind,
                face,
                patch),
        }
    }
}

impl error::Error for Error {}




/// Result type returned by fallible operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;




/// Return an error unless `start..start + count` lies within `0..available`.
pub(crate) fn check_components(start: usize, count: usize, available: usize) -> Result<()> {
    if start + count > available {
        Err(Error::ComponentRange { start, count, available })
    } else {
        Ok(())
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn errors_display_their_context() {
        let e = Error::ComponentRange { start: 1, count: 2, available: 2 };
        assert_eq!(e.to_string(), "components 1..3 out of range (have 2)");

        let e = Error::MissingCoarseData { patch: 3, face: "ylo".to_string() };
        assert_eq!(e.to_string(), "no coarse data covers face ylo of patch 3");

        let boxed: Box<dyn error::Error> = Box::new(Error::InvalidRatio { axis: 1, ratio: 0 });
        assert_eq!(boxed.to_string(), "refinement ratio 0 on axis 1 is not positive");
    }

    #[test]
    fn component_ranges_are_checked() {
        assert!(check_components(0, 2, 2).is_ok());
        assert_eq!(check_components(2, 1, 2), Err(Error::ComponentRange { start: 2, count: 1, available: 2 }));
    }
}
