//! Trellis CLI - board construction and simplification tool.
//!
//! Usage: trellis <COMMAND> [OPTIONS]
//!
//! Run `trellis --help` for available commands. Set `RUST_LOG=debug` to see
//! per-operation logging from the library.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};

use trellis::algo::relax::{relax_with_progress, RelaxOptions};
use trellis::algo::Progress;
use trellis::boards::{hex_board, square_board, tiling_board, PolygonBoardOptions, TilingUnit};
use trellis::layout::{EdgeState, LayoutBoard, SimplifyOptions};
use trellis::mesh::{validate, Board};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about = "Planar puzzle board CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display board information
    Info {
        #[command(flatten)]
        board: BoardArgs,
    },

    /// Collapse a solved board and relax the result
    Simplify {
        #[command(flatten)]
        board: BoardArgs,

        /// Maximum number of relaxation iterations
        #[arg(short, long, default_value = "400")]
        iterations: usize,

        /// Ideal edge length for relaxation
        #[arg(short = 'l', long, default_value = "1.0")]
        ideal_length: f64,

        /// Keep degree-2 vertices
        #[arg(long)]
        no_merge: bool,

        /// Let the total board area drift during relaxation
        #[arg(long)]
        free_area: bool,

        /// Use parallel force evaluation
        #[arg(long)]
        parallel: bool,
    },
}

#[derive(Args)]
struct BoardArgs {
    /// Board variant
    #[arg(short, long, value_enum, default_value = "square")]
    kind: BoardKind,

    /// Grid width (square boards)
    #[arg(long, default_value = "4")]
    width: usize,

    /// Grid height (square boards)
    #[arg(long, default_value = "4")]
    height: usize,

    /// Rings of cells (hex boards) or tiling cells per axis (tilings)
    #[arg(short, long, default_value = "3")]
    size: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BoardKind {
    /// Rectangular grid of unit squares
    Square,
    /// Hexagon of hexagonal cells
    Hex,
    /// Periodic equilateral triangles
    Triangular,
    /// Periodic rhombi, three per hexagon
    Rhombille,
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
        Commands::Info { board } => {
            cmd_info(&board)?;
        }

        Commands::Simplify {
            board,
            iterations,
            ideal_length,
            no_merge,
            free_area,
            parallel,
        } => {
            let options = RelaxOptions::default()
                .with_iterations(iterations)
                .with_ideal_edge_length(ideal_length)
                .with_preserve_area(!free_area)
                .with_parallel(parallel);
            cmd_simplify(&board, &options, !no_merge)?;
        }
    }

    Ok(())
}

fn build(args: &BoardArgs) -> Result<Board, Box<dyn std::error::Error>> {
    let options = PolygonBoardOptions::default();
    let board = match args.kind {
        BoardKind::Square => square_board(args.width, args.height)?,
        BoardKind::Hex => hex_board(args.size)?,
        BoardKind::Triangular => tiling_board(&TilingUnit::triangular(), args.size, &options)?,
        BoardKind::Rhombille => tiling_board(&TilingUnit::rhombille(), args.size, &options)?,
    };
    Ok(board)
}

/// Create a progress reporter that draws a bar on stderr.
fn create_progress() -> Progress {
    let last_percent = Arc::new(AtomicUsize::new(usize::MAX));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }
        let percent = if current >= total { 100 } else { current * 100 / total };
        if last_percent.swap(percent, Ordering::Relaxed) == percent {
            return;
        }

        let bar_width = 30;
        let filled = percent * bar_width / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn print_summary(board: &Board) {
    println!("Vertices: {}", board.num_vertices());
    println!("Edges: {}", board.num_edges());
    println!("Faces: {}", board.num_faces());
    println!(
        "Boundary: outer {} half-edges, {} holes",
        board.outer_boundary().len(),
        board.inner_boundaries().len()
    );
    println!("Signed area: {:.6}", board.signed_area());
}

fn cmd_info(args: &BoardArgs) -> Result<(), Box<dyn std::error::Error>> {
    let board = build(args)?;
    print_summary(&board);

    let mut sides: Vec<usize> = board.faces().map(|(_, face)| face.len()).collect();
    sides.sort_unstable();
    sides.dedup();
    println!("Face sizes: {:?}", sides);

    let max_degree = board.vertex_ids().map(|v| board.degree(v)).max().unwrap_or(0);
    println!("Max vertex degree: {}", max_degree);
    println!("Average edge length: {:.6}", board.average_edge_length());

    if let Some((min, max)) = board.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}) to ({:.3}, {:.3})",
            min.x, min.y, max.x, max.y
        );
    }

    match validate(&board) {
        Ok(()) => println!("Invariants: ok"),
        Err(violation) => println!("Invariants: {}", violation),
    }
    Ok(())
}

fn cmd_simplify(
    args: &BoardArgs,
    relax_options: &RelaxOptions,
    merge: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let board = build(args)?;
    println!("Built:");
    print_summary(&board);

    // Treat the board as solved: a single loop around the border
    let mut layout = LayoutBoard::new(
        &board,
        |e| {
            if board.edge(e).is_boundary() {
                EdgeState::Black
            } else {
                EdgeState::Red
            }
        },
        |_| None,
    );

    let start = Instant::now();
    let options = SimplifyOptions::default().with_merge_degree_two(merge);
    let report = layout.simplify(&options)?;
    println!(
        "\nSimplified in {} passes ({:.2?}): {} zones merged, {} opened, {} skipped in the last pass, {} vertices merged",
        report.passes,
        start.elapsed(),
        report.interior_zones,
        report.exterior_zones,
        report.skipped_zones_last_pass,
        report.vertices_merged
    );
    print_summary(layout.board());

    let progress = create_progress();
    let start = Instant::now();
    let relax_report = relax_with_progress(layout.board_mut(), relax_options, &progress);
    println!(
        "\nRelaxed: {} iterations, {} (max force {:.3e}, {:.2?})",
        relax_report.iterations,
        if relax_report.converged { "converged" } else { "not converged" },
        relax_report.max_force,
        start.elapsed()
    );
    print_summary(layout.board());

    validate(layout.board())?;
    Ok(())
}
