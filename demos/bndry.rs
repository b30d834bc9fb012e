use std::error::Error;
use clap::Parser;
use log::info;
use amrbndry::bc::{BcRec, BcType};
use amrbndry::bndry_register::BndryRegister;
use amrbndry::box_array::BoxArray;
use amrbndry::descriptor::{InterpKind, StateDescriptor, TimeCenter};
use amrbndry::geometry::Geometry;
use amrbndry::index_space::{range, Centering, IntVect};
use amrbndry::level_data::LevelData;
use amrbndry::orientation::faces;
use amrbndry::InterpBndryData;




#[derive(Debug, Parser)]
#[clap(version = "1.0", about = "Two-level coarse-fine boundary value synthesis")]
struct Opts {
    /// Number of coarse cells along each axis of the domain
    #[clap(short = 'n', long, default_value = "32")]
    coarse_cells: i64,

    /// Refinement ratio of the fine level
    #[clap(short = 'r', long, default_value = "2")]
    ratio: i64,

    /// Coarse-fine interpolation: quadratic or constant
    #[clap(short = 'i', long, default_value = "quadratic", parse(try_from_str = parse_interp))]
    interp: InterpKind,

    /// Make the x axis periodic
    #[clap(long)]
    periodic: bool,

    /// Log level: error, warn, info, debug or trace
    #[clap(short = 'l', long, default_value = "info")]
    log_level: log::Level,

    /// File to write the boundary value store to (CBOR)
    #[clap(short = 'o', long, default_value = "bndry.cbor")]
    output: String,
}

fn parse_interp(s: &str) -> Result<InterpKind, String> {
    match s {
        "quadratic" => Ok(InterpKind::Quadratic),
        "constant" => Ok(InterpKind::PiecewiseConstant),
        _ => Err(format!("unknown interpolation '{}'", s)),
    }
}




// ============================================================================
fn field(position: [f64; 2]) -> f64 {
    let [x, y] = position;
    1.0 + x * x + 0.5 * y
}

fn cell_center(geom: &Geometry<2>, index: IntVect<2>) -> [f64; 2] {
    let dx = geom.cell_size();
    [(index[0] as f64 + 0.5) * dx[0], (index[1] as f64 + 0.5) * dx[1]]
}




// ============================================================================
fn main() -> Result<(), Box<dyn Error>> {
    let opts = Opts::parse();
    simple_logger::init_with_level(opts.log_level)?;
    info!("{:?}", opts);

    let n = opts.coarse_cells;
    let ratio = [opts.ratio; 2];
    let h = 1.0 / n as f64;
    let crse_geom = Geometry::new(range([0, 0], [n - 1, n - 1]), [opts.periodic, false], [h, h])?;
    let fine_geom = crse_geom.refine(ratio);

    let crse_grids = BoxArray::new(vec![*crse_geom.domain()])?;
    let mut crse = LevelData::from_function(crse_grids, 1, 1, |i, _| field(cell_center(&crse_geom, i)));
    crse.fill_boundary(&crse_geom);

    let q = n * opts.ratio / 4;
    let fine_grids = BoxArray::new(vec![
        range([0, q], [2 * q - 1, 3 * q - 1]),
        range([2 * q, q], [3 * q - 1, 2 * q - 1]),
    ])?;
    let mut fine = LevelData::from_function(fine_grids.clone(), 1, 1, |i, _| field(cell_center(&fine_geom, i)));
    fine.fill_boundary(&fine_geom);
    fine.fill_physical(&fine_geom, |i, slice| slice[0] = field(cell_center(&fine_geom, i)));

    let mut register = BndryRegister::coarse_register(&fine_grids, ratio, 1);
    register.restrict(&crse, &crse_geom, 0, 0, 1, faces::<2>())?;

    let bc = BcRec::new([BcType::ExtDir, BcType::FoExtrap], [BcType::ExtDir, BcType::FoExtrap]);
    let desc = StateDescriptor::new(0, Centering::Cell, TimeCenter::Point, 1, 1, opts.interp, bc.clone());
    let mut ibd = InterpBndryData::from_descriptor(fine_grids, fine_geom.clone(), &desc);
    ibd.set_bndry_values_cf(&register, 0, &fine, 0, 0, 1, ratio, &bc)?;

    let store = ibd.bndry_values();

    for p in 0..store.len() {
        for face in faces::<2>() {
            let values = store.get(face, p).data();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            info!("patch {} {}: {} values in [{:.4}, {:.4}]", p, face, values.len(), lo, hi);
        }
    }

    let file = std::fs::File::create(&opts.output)?;
    let mut buffer = std::io::BufWriter::new(file);
    ciborium::ser::into_writer(store, &mut buffer).map_err(|e| format!("{:?}", e))?;
    info!("wrote {}", opts.output);
    Ok(())
}
