//! Headless quadtree sandbox
//!
//! Scatters movers inside a walled arena and steps the physics world for a
//! fixed number of frames, logging partition statistics along the way.
//! Movers that have bled off all their speed against a wall or a neighbour
//! get a fresh random kick at every report.
//!
//! Usage: `quad_sandbox [config.toml|config.ron]`

mod config;

use std::f32::consts::TAU;
use std::path::Path;

use config::SandboxConfig;
use quad_physics::config::Config;
use quad_physics::debug::PartitionSnapshot;
use quad_physics::foundation::logging;
use quad_physics::foundation::math::{Vec2, Vec2Ext};
use quad_physics::physics::{Body, BodyHandle, FrameStats, PhysicsWorld};
use quad_physics::PhysicsError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_CONFIG: &str = "sandbox_app/sandbox.toml";
const WALL_THICKNESS: f32 = 8.0;

/// Totals over a whole run
#[derive(Debug, Default)]
struct RunSummary {
    frames: u32,
    detected: usize,
    resolved: usize,
    kicks: usize,
    peak_leaves: usize,
    last: FrameStats,
}

/// Four static slabs lining the inside of the arena
fn walls(min: Vec2, max: Vec2) -> [Body; 4] {
    let size = max - min;
    let mid = min + size / 2.0;
    let half = WALL_THICKNESS / 2.0;
    [
        Body::new(Vec2::new(min.x + half, mid.y), Vec2::new(WALL_THICKNESS, size.y), 0.0),
        Body::new(Vec2::new(max.x - half, mid.y), Vec2::new(WALL_THICKNESS, size.y), 0.0),
        Body::new(Vec2::new(mid.x, min.y + half), Vec2::new(size.x, WALL_THICKNESS), 0.0),
        Body::new(Vec2::new(mid.x, max.y - half), Vec2::new(size.x, WALL_THICKNESS), 0.0),
    ]
}

/// One mover per grid cell inside the walls, jittered within its cell
fn scatter(config: &SandboxConfig, rng: &mut impl Rng) -> Vec<Body> {
    let (min, max) = config.bounds();
    let inner_min = min + Vec2::repeat(WALL_THICKNESS);
    let inner = max - min - Vec2::repeat(2.0 * WALL_THICKNESS);
    let dims = Vec2::from(config.body_size);
    
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let columns = (config.body_count as f32).sqrt().ceil().max(1.0) as usize;
    #[allow(clippy::cast_precision_loss)]
    let cell = inner / columns as f32;
    
    let slack = (cell - dims) / 2.0;
    if slack.x < 0.0 || slack.y < 0.0 {
        log::warn!(
            "{} bodies of {}x{} do not fit the arena without overlapping",
            config.body_count, dims.x, dims.y
        );
    }
    let jitter = slack.map(|s| s.max(0.0) * 0.5);
    
    (0..config.body_count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let cell_index = Vec2::new((i % columns) as f32, (i / columns) as f32);
            let center = inner_min + cell.component_mul(&(cell_index + Vec2::repeat(0.5)));
            let offset = Vec2::new(
                rng.gen_range(-jitter.x..=jitter.x),
                rng.gen_range(-jitter.y..=jitter.y),
            );
            let mut body = Body::new(center + offset, dims, config.max_speed);
            kick(&mut body, rng);
            body
        })
        .collect()
}

/// Random heading at a quarter to full speed
fn kick(body: &mut Body, rng: &mut impl Rng) {
    let heading = rng.gen_range(0.0..TAU);
    let speed = rng.gen_range(0.25..=1.0) * body.max_speed;
    body.set_velocity(Vec2::new(heading.cos(), heading.sin()) * speed);
}

fn run(config: &SandboxConfig) -> Result<(PhysicsWorld, RunSummary), PhysicsError> {
    let (min, max) = config.bounds();
    let mut world = PhysicsWorld::new(min, max, config.physics.clone())?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    
    for wall in walls(min, max) {
        world.spawn(wall)?;
    }
    let movers: Vec<BodyHandle> = scatter(config, &mut rng)
        .into_iter()
        .map(|body| world.spawn(body))
        .collect::<Result<_, _>>()?;
    
    log::info!(
        "Sandbox ready: {} movers in [({}, {}), ({}, {})], {} frames of {:.4}s",
        movers.len(), min.x, min.y, max.x, max.y, config.frames, config.delta
    );
    
    let mut summary = RunSummary::default();
    for frame in 1..=config.frames {
        let stats = world.step(config.delta);
        summary.frames = frame;
        summary.detected += stats.detected;
        summary.resolved += stats.resolved;
        summary.peak_leaves = summary.peak_leaves.max(stats.leaves);
        summary.last = stats;
        
        if config.report_every > 0 && frame % config.report_every == 0 {
            let snapshot = PartitionSnapshot::capture(world.tree());
            log::info!(
                "Frame {}: {} leaves, {} nodes, {} outline segments, {} collisions resolved, {} bodies outside the partition",
                frame,
                stats.leaves,
                stats.nodes,
                snapshot.line_segments().len(),
                stats.resolved,
                snapshot.orphans().count()
            );
            
            let epsilon = config.physics.epsilon;
            for &handle in &movers {
                if let Some(body) = world.body_mut(handle) {
                    if body.velocity().is_zero_within(epsilon) {
                        kick(body, &mut rng);
                        summary.kicks += 1;
                    }
                }
            }
        }
    }
    
    Ok((world, summary))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let found = Path::new(&path).exists();
    let config = if found {
        SandboxConfig::load_from_file(&path)?
    } else {
        SandboxConfig::default()
    };
    
    logging::init_with_level(&config.log_level);
    if !found {
        log::warn!("Config file {} not found, using defaults", path);
    }
    config.validate()?;
    
    let (world, summary) = run(&config)?;
    
    let problems = world.tree().check_invariants();
    if !problems.is_empty() {
        for problem in &problems {
            log::error!("Partition invariant violated: {}", problem);
        }
        return Err(format!("{} partition invariants violated", problems.len()).into());
    }
    
    log::info!(
        "Ran {} frames: {} collisions detected, {} resolved, {} kicks, peak {} leaves, final {} nodes",
        summary.frames,
        summary.detected,
        summary.resolved,
        summary.kicks,
        summary.peak_leaves,
        summary.last.nodes
    );
    Ok(())
}
