//! Cambium Agent - demo runner
//!
//! Drives an agent against the in-memory scripted host for a number of frames
//! and prints what it did. With `--live` the decision and telemetry calls go to
//! the configured service.

use cambium_agent::core::config::AgentConfig;
use cambium_agent::core::error::Result;
use cambium_agent::core::types::{BlockPos, EntityId, Rotation, Vec3};
use cambium_agent::host::{
    Control, EntityKind, EntityView, HostTick, ItemKind, ItemStackView, RecordingActuator,
    ScriptedWorld,
};
use cambium_agent::service::HttpService;
use cambium_agent::strategy::{ClickStrategy, PvpStrategy, Strategy, WalkStrategy};
use cambium_agent::Agent;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

/// Frame length of the simulated host
const FRAME_MS: u64 = 50;
/// Distance walked per frame with a movement key held
const WALK_STEP: f64 = 0.2;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyKind {
    Walk,
    Click,
    Pvp,
    Rl,
}

/// Run the agent against a scripted world
#[derive(Parser, Debug)]
#[command(name = "cambium-agent")]
#[command(about = "Run the control core against an in-memory world")]
struct Args {
    /// Agent configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Strategy to start
    #[arg(long, value_enum, default_value = "pvp")]
    strategy: StrategyKind,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 200)]
    frames: u64,

    /// Seed for the click strategy
    #[arg(long)]
    seed: Option<u64>,

    /// Talk to the configured decision/telemetry service
    #[arg(long)]
    live: bool,
}

fn build_world() -> ScriptedWorld {
    let mut world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default());
    world.fill(BlockPos::new(-12, 63, -12), BlockPos::new(12, 63, 12), "stone");
    world.fill(BlockPos::new(-12, 64, 12), BlockPos::new(12, 66, 12), "oak_planks");
    world.spawn(EntityView {
        id: EntityId(1),
        name: "sparring_partner".into(),
        kind: EntityKind::Player,
        position: Vec3::new(6.5, 64.0, 3.5),
        velocity: Vec3::default(),
        rotation: Rotation::new(90.0, 0.0),
        health: 20.0,
        max_health: 20.0,
        armor: 4,
        held_weapon_damage: Some(6.0),
    });
    world.spawn(EntityView {
        id: EntityId(2),
        name: "zombie".into(),
        kind: EntityKind::Hostile,
        position: Vec3::new(-5.5, 64.0, -4.5),
        velocity: Vec3::default(),
        rotation: Rotation::default(),
        health: 20.0,
        max_health: 20.0,
        armor: 2,
        held_weapon_damage: None,
    });
    world.inventory = vec![
        ItemStackView {
            slot: 0,
            count: 64,
            kind: ItemKind::Block,
        },
        ItemStackView {
            slot: 2,
            count: 1,
            kind: ItemKind::Sword { damage: 7.0 },
        },
        ItemStackView {
            slot: 4,
            count: 1,
            kind: ItemKind::Bow,
        },
    ];
    world
}

/// Move the avatar according to the held controls
fn step_avatar(world: &mut ScriptedWorld, actuator: &RecordingActuator, base: Rotation) {
    let Some(avatar) = world.avatar_mut() else {
        return;
    };
    avatar.rotation = Rotation::new(base.yaw + actuator.yaw_total, actuator.pitch_total);
    avatar.swinging = actuator.is_pressed(Control::Attack);

    let facing = Rotation::new(avatar.rotation.yaw, 0.0).direction();
    // Facing rotated a quarter turn clockwise
    let side = Vec3::new(-facing.z, 0.0, facing.x);
    let mut step = Vec3::default();
    if actuator.is_pressed(Control::Forward) {
        step = step + facing;
    }
    if actuator.is_pressed(Control::Back) {
        step = step - facing;
    }
    if actuator.is_pressed(Control::Right) {
        step = step + side;
    }
    if actuator.is_pressed(Control::Left) {
        step = step - side;
    }
    let len = step.length();
    if len > 0.0 {
        avatar.position = avatar.position + step.scale(WALK_STEP / len);
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cambium_agent=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::new(),
    };

    let service = if args.live {
        Some(Arc::new(HttpService::new(&config.service)?))
    } else {
        None
    };

    let mut agent = Agent::new(config);
    if let Some(service) = &service {
        agent = agent.with_telemetry(service.clone());
    }

    let mut world = build_world();
    let bot_name = agent.bot_name(&world);
    let strategy: Box<dyn Strategy> = match args.strategy {
        StrategyKind::Walk => Box::new(WalkStrategy::new(6.5, 3.5, false)),
        StrategyKind::Click => Box::new(match args.seed {
            Some(seed) => ClickStrategy::seeded(5, 40, seed),
            None => ClickStrategy::new(5, 40),
        }),
        StrategyKind::Pvp => Box::new(PvpStrategy::new()),
        StrategyKind::Rl => match &service {
            Some(service) => Box::new(agent.rl_controller(service.clone(), &bot_name)),
            None => {
                tracing::warn!("The rl strategy needs --live; falling back to pvp");
                Box::new(PvpStrategy::new())
            }
        },
    };
    agent.request(strategy);

    tracing::info!(frames = args.frames, strategy = ?args.strategy, "Starting demo run");
    let base = world.avatar.as_ref().map(|a| a.rotation).unwrap_or_default();
    let mut actuator = RecordingActuator::new();
    let description = agent.description();

    for frame in 0..args.frames {
        let now = frame * FRAME_MS;
        agent.on_host_tick(&HostTick::start(now), &world, &mut actuator);
        agent.on_host_tick(&HostTick::end(now), &world, &mut actuator);
        step_avatar(&mut world, &actuator, base);

        if frame % 20 == 0 {
            let status = description.snapshot();
            let position = world.avatar.as_ref().map(|a| a.position).unwrap_or_default();
            println!(
                "[{:>5} ms] pos=({:.2}, {:.2}, {:.2}) keys={:?} {}",
                now,
                position.x,
                position.y,
                position.z,
                actuator.pressed(),
                if status.is_empty() { "<idle>" } else { status.as_str() }
            );
        }
        if agent.scheduler().is_idle() {
            tracing::info!(frame, "No strategies left");
            break;
        }
    }

    Ok(())
}
