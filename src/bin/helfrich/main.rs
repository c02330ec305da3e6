//! Helfrich CLI - bending energy and forces of membrane meshes.
//!
//! Usage: helfrich <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `helfrich --help` for available commands. Set `RUST_LOG=debug` for
//! diagnostics such as folded triangle pairs.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use helfrich::algo::helfrich::{ForceOutput, ForceScheme, HelfrichForce, HelfrichOptions};
use helfrich::domain::{ParticleData, ParticleView, PeriodicBox};
use helfrich::io;
use helfrich::mesh::{primitives, MeshTopology, TriangleSoup, DEFAULT_BOND_TYPE};

#[derive(Parser)]
#[command(name = "helfrich")]
#[command(author, version, about = "Membrane bending energy CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report bending energy, forces and virial of a mesh
    Energy {
        /// Input mesh file
        input: PathBuf,

        #[command(flatten)]
        force: ForceArgs,
    },

    /// Write per-vertex positions, forces and energies as CSV
    Forces {
        /// Input mesh file
        input: PathBuf,

        /// Output CSV file
        output: PathBuf,

        #[command(flatten)]
        force: ForceArgs,
    },

    /// Report bending energy of a generated icosphere
    Sphere {
        /// Number of icosahedron subdivisions
        #[arg(short, long, default_value = "3")]
        subdivisions: usize,

        /// Sphere radius
        #[arg(short, long, default_value = "1.0")]
        radius: f64,

        #[command(flatten)]
        force: ForceArgs,
    },
}

#[derive(Args)]
struct ForceArgs {
    /// Bending modulus
    #[arg(short, long, default_value = "1.0")]
    kappa: f64,

    /// Edge length of a cubic periodic box (default: no periodicity)
    #[arg(long = "box", value_name = "L")]
    box_length: Option<f64>,

    /// Lower bound on triangle angle sines
    #[arg(long, default_value = "0.001")]
    min_sine: f64,

    /// Use the full four-vertex gradient instead of pair-local forces
    #[arg(long)]
    full_gradient: bool,

    /// Use single-threaded execution (for benchmarking)
    #[arg(long)]
    sequential: bool,
}

impl ForceArgs {
    fn options(&self) -> HelfrichOptions {
        let scheme = if self.full_gradient {
            ForceScheme::FullGradient
        } else {
            ForceScheme::PairLocal
        };
        HelfrichOptions::default()
            .with_parallel(!self.sequential)
            .with_min_sine(self.min_sine)
            .with_scheme(scheme)
    }

    fn periodic_box(&self) -> helfrich::Result<PeriodicBox> {
        match self.box_length {
            Some(l) => PeriodicBox::cube(l),
            None => Ok(PeriodicBox::open()),
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Energy { input, force } => {
            let soup = io::load(&input)?;
            println!("File: {}", input.display());
            cmd_energy(soup, &force)?;
        }

        Commands::Forces {
            input,
            output,
            force,
        } => {
            cmd_forces(&input, &output, &force)?;
        }

        Commands::Sphere {
            subdivisions,
            radius,
            force,
        } => {
            println!("Icosphere: {} subdivisions, radius {}", subdivisions, radius);
            cmd_energy(primitives::icosphere(subdivisions, radius), &force)?;
        }
    }

    Ok(())
}

/// Build topology, particles and force engine, then compute.
fn compute(
    soup: TriangleSoup,
    args: &ForceArgs,
) -> Result<(HelfrichForce, ParticleData, ForceOutput, usize), Box<dyn std::error::Error>> {
    let topology: MeshTopology = soup.to_topology()?;
    let particles = ParticleData::new(soup.positions);
    let bx = args.periodic_box()?;

    let mut engine = HelfrichForce::with_options(topology, args.options())?;
    if let Some(warning) = engine.set_params(DEFAULT_BOND_TYPE, args.kappa)? {
        eprintln!("Warning: {}", warning);
    }

    let mut output = ForceOutput::zeroed(particles.num_slots());
    let state = engine.compute(&particles, &bx, &mut output)?;
    Ok((engine, particles, output, state.folded_bonds().len()))
}

fn cmd_energy(soup: TriangleSoup, args: &ForceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let (engine, _, output, folded) = compute(soup, args)?;
    let volume = args.periodic_box()?.volume();
    let elapsed = start.elapsed();
    let topology = engine.topology();

    println!("Vertices: {}", topology.num_vertices());
    println!("Triangles: {}", topology.num_triangles());
    println!(
        "Bonds: {} ({} boundary)",
        topology.num_bonds(),
        topology.num_boundary_bonds()
    );
    if folded > 0 {
        println!("Folded bonds: {}", folded);
    }

    let net = output.net_force();
    let w = output.total_virial();
    println!("Bending energy: {:.10}", output.total_energy());
    println!("Max |F|: {:.6e}", output.max_force());
    println!("Net force: ({:.3e}, {:.3e}, {:.3e})", net.x, net.y, net.z);
    println!(
        "Virial (xx xy xz yy yz zz): {:.6e} {:.6e} {:.6e} {:.6e} {:.6e} {:.6e}",
        w[0], w[1], w[2], w[3], w[4], w[5]
    );
    if volume.is_finite() {
        println!("Virial pressure: {:.6e}", (w[0] + w[3] + w[5]) / (3.0 * volume));
    }
    println!("Computed in {:.2?}", elapsed);

    Ok(())
}

fn cmd_forces(
    input: &Path,
    output_path: &Path,
    args: &ForceArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let soup = io::load(input)?;
    println!("Loaded: {} vertices, {} triangles", soup.positions.len(), soup.faces.len());

    let (_, particles, output, _) = compute(soup, args)?;

    let mut writer = BufWriter::new(File::create(output_path)?);
    writeln!(writer, "tag,x,y,z,fx,fy,fz,energy")?;
    for slot in 0..output.len() {
        let tag = particles.tag(slot);
        let x = particles
            .position_of(tag)
            .ok_or_else(|| format!("vertex tag {} has no particle", tag))?;
        let f = output.force[slot];
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            tag,
            x.x,
            x.y,
            x.z,
            f.x,
            f.y,
            f.z,
            output.energy[slot]
        )?;
    }
    writer.flush()?;

    println!(
        "Saved: {} (bending energy {:.10})",
        output_path.display(),
        output.total_energy()
    );
    Ok(())
}
