use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Parser, Subcommand};
use cube_replay_core::{
    parse_sequence, AppConfig, ColorSample, CommandSolver, CubeError, CubeState, RenderGraph,
    SequencerEvent, Session,
};
use tracing_subscriber::EnvFilter;

fn main() -> cube_replay_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { captures } => run_scan(config, &captures),
        Commands::Replay {
            captures,
            solver,
            fps,
        } => run_replay(config, &captures, &solver, fps),
        Commands::Animate { state, moves, fps } => run_animate(config, &state, &moves, fps),
    }
}

fn load_config(path: Option<&Path>) -> cube_replay_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::from_path(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn run_scan(config: AppConfig, captures: &Path) -> cube_replay_core::Result<()> {
    let mut session = Session::new(config)?;
    scan_captures(&mut session, captures)?;
    println!("{}", session.facelets()?);
    Ok(())
}

fn run_replay(
    config: AppConfig,
    captures: &Path,
    solver: &str,
    fps: u32,
) -> cube_replay_core::Result<()> {
    let mut session = Session::new(config)?;
    scan_captures(&mut session, captures)?;

    let solver = CommandSolver::from_command_line(solver)?;
    let moves = session.solve(&solver)?;
    let listing: Vec<String> = moves.iter().map(ToString::to_string).collect();
    tracing::info!(moves = %listing.join(" "), "solution");

    play(&mut session, fps)
}

fn run_animate(
    config: AppConfig,
    state: &str,
    moves: &str,
    fps: u32,
) -> cube_replay_core::Result<()> {
    let state = CubeState::from_facelets(state)?;
    let moves = parse_sequence(moves)?;

    let mut session = Session::with_state(config, state)?;
    session.load_moves(moves)?;
    play(&mut session, fps)
}

/// Replays captured sample sets. A rejected capture is treated like the
/// user being asked to show the face again, so the file may contain retries.
fn scan_captures(session: &mut Session, path: &Path) -> cube_replay_core::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let captures: Vec<[ColorSample; 9]> = serde_json::from_str(&text)?;

    for samples in &captures {
        if session.cube_state().is_some() {
            tracing::warn!("ignoring captures after the scan completed");
            break;
        }
        tracing::info!(prompt = %session.prompt());
        match session.capture_samples(samples) {
            Ok(snapshot) => tracing::info!(face = %snapshot.face, "captured"),
            Err(err @ CubeError::CenterMismatch { .. }) => {
                tracing::warn!(%err, "Incorrect face! Please show the correct face.")
            }
            Err(err) => return Err(err),
        }
    }

    if session.cube_state().is_none() {
        return Err(CubeError::msg(format!(
            "captures ended before every face was scanned ({})",
            session.prompt()
        )));
    }
    Ok(())
}

fn play(session: &mut Session, fps: u32) -> cube_replay_core::Result<()> {
    let delta = Duration::from_secs_f64(1.0 / f64::from(fps));
    let mut render = RenderGraph::new();

    while !session.is_animation_finished() {
        for event in session.tick(delta)? {
            match event {
                SequencerEvent::MoveBegan { index, mv } => {
                    tracing::info!(index, %mv, "move began")
                }
                SequencerEvent::MoveEnded { index, mv } => {
                    tracing::debug!(index, %mv, "move ended")
                }
                SequencerEvent::Completed => tracing::info!("Cube Solved!"),
                SequencerEvent::Cancelled { remaining } => {
                    tracing::warn!(remaining, "playback cancelled")
                }
            }
        }
        if let Some(scene) = session.scene() {
            render.submit(scene);
        }
    }

    tracing::info!(frames = render.frames_submitted(), "playback finished");
    if let Some(engine) = session.engine() {
        println!("{}", engine.lattice().visible_state()?);
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scan a 3x3x3 cube and replay its solution", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan recorded captures and print the canonical facelet string.
    Scan {
        /// JSON list of captures, each nine `[r, g, b]` samples.
        #[arg(long)]
        captures: PathBuf,
    },
    /// Scan, solve with an external program and replay the solution.
    Replay {
        #[arg(long)]
        captures: PathBuf,
        /// Solver command line; the facelet string is appended as last argument.
        #[arg(long)]
        solver: String,
        /// Simulated frame rate of the playback loop.
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,
    },
    /// Replay a move list on a given cube state.
    Animate {
        /// 54 character facelet string in URFDLB order.
        #[arg(long)]
        state: String,
        /// Whitespace separated moves, e.g. "R U R' U'". May be empty.
        #[arg(long, default_value = "")]
        moves: String,
        #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
        fps: u32,
    },
}
