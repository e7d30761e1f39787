use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::{UnitQuaternion, Vector3};
use tracing_subscriber::EnvFilter;

use rs_motion_cursor::action::{ActionKind, DevicePart, MotionType, ReferenceCS};
use rs_motion_cursor::chain::CursorChain;
use rs_motion_cursor::compiler::HumanCompiler;
use rs_motion_cursor::config::SessionConfig;
use rs_motion_cursor::cursor::Release;
use rs_motion_cursor::motion_error::IoKind;
use rs_motion_cursor::tool::Tool;
use rs_motion_cursor::utils::dump_state;

/// Runs a small scripted program through the cursor chain and prints the listing.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Session configuration (YAML). Defaults are used if not given.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Release and print the program block by block rather than all at once.
    #[arg(long)]
    blocks: bool,
}

/// Usage example. Set RUST_LOG=debug to see every applied action.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SessionConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => SessionConfig::default(),
    };
    println!("Configuration:\n{}", config.to_yaml());

    let chain = CursorChain::with_config(&config).context("Failed to build the cursor chain")?;
    chain.set_io_name("gripper", 0, IoKind::Digital)?;

    let pen = Arc::new(Tool::new("pen", Vector3::new(0.0, 0.0, 120.0), UnitQuaternion::identity()));
    let pointing_down = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), 180_f64.to_radians());

    chain.issue(ActionKind::Comment("Approach".into()))?;
    chain.issue(ActionKind::Speed { value: 100.0, relative: false })?;
    chain.issue(ActionKind::Transformation {
        translation: Vector3::new(300.0, 0.0, 500.0),
        rotation: pointing_down,
        relative: false,
        translation_first: true,
    })?;
    chain.issue(ActionKind::Attach(pen))?;
    chain.set_block()?;

    chain.issue(ActionKind::Comment("Square in the tool frame".into()))?;
    chain.issue(ActionKind::PushPop { push: true })?;
    chain.issue(ActionKind::ReferenceFrame(ReferenceCS::Local))?;
    chain.issue(ActionKind::Precision { value: 0.5, relative: false })?;
    for _ in 0..4 {
        chain.issue(ActionKind::translate(50.0, 0.0, 0.0))?;
        chain.issue(ActionKind::rotate(Vector3::z(), 90.0))?;
    }
    chain.issue(ActionKind::PushPop { push: false })?;
    chain.set_block()?;

    chain.issue(ActionKind::Comment("Park".into()))?;
    chain.issue(ActionKind::IODigital { pin: 0, on: true })?;
    chain.issue(ActionKind::Temperature { part: DevicePart::Bed, value: 60.0, relative: false, wait: false })?;
    chain.issue(ActionKind::Detach)?;
    chain.issue(ActionKind::MotionMode(MotionType::Joint))?;
    chain.issue(ActionKind::axes_to([0.0, 0.0, 90.0, 0.0, 90.0, 0.0]))?;

    // Fails: joint pose, Cartesian position is unknown. Logged and dropped.
    if let Err(e) = chain.issue(ActionKind::translate(0.0, 0.0, 10.0)) {
        println!("Rejected as expected: {}", e);
    }

    let compiler = HumanCompiler::new("demo");
    if args.blocks {
        let mut block = 1;
        while chain.write_cursor().actions_pending()? > 0 {
            println!("Block {}:", block);
            for line in chain.export_release(&compiler, Release::Block)? {
                println!("{}", line);
            }
            block += 1;
        }
    } else {
        for line in chain.export(&compiler)? {
            println!("{}", line);
        }
    }

    // Pretend the device has executed everything
    let report = chain.on_executed(chain.last_id())?;
    println!("Device executed {} actions, final state:", report.applied.len());
    dump_state(&chain.motion_cursor().state()?);
    Ok(())
}
