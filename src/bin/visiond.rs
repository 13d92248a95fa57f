//! visiond - vision bridge daemon
//!
//! This daemon:
//! 1. Listens on a TCP port for a camera peer
//! 2. Reads length-prefixed compressed frames, one session at a time
//! 3. Classifies each frame for a significant red region
//! 4. Answers every frame with `movered` or `idle`
//! 5. Optionally writes blended debug frames for inspection

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vision_bridge::{Config, VisionServer};

#[derive(Parser, Debug)]
#[command(name = "visiond", about = "Camera-to-actuator vision bridge")]
struct Args {
    /// Host/IP to bind the TCP server
    #[arg(long)]
    host: Option<String>,

    /// Port for the TCP server
    #[arg(long)]
    port: Option<u16>,

    /// Minimum red pixel ratio to trigger movement
    #[arg(long)]
    min_red_ratio: Option<f64>,

    /// Write blended debug frames for each processed image
    #[arg(long)]
    display: bool,

    /// Directory for debug frames
    #[arg(long)]
    display_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = Config::load()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ratio) = args.min_red_ratio {
        config.min_red_ratio = ratio;
    }
    if args.display {
        config.display = true;
    }
    if let Some(dir) = args.display_dir {
        config.display_dir = dir;
    }
    config.validate()?;

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
    }

    let handle = VisionServer::new(config).spawn()?;
    log::info!("visiond listening on {}", handle.addr);

    while !interrupted.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    log::info!("interrupt received, stopping visiond");
    handle.stop()?;
    Ok(())
}
