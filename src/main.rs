//! Oust - Main Application
//!
//! Runs the game unattended against real PS Move controllers over hidraw.
//! Needs root for device access, pairing and disconnecting controllers.
//!
//! Usage: `oust-rs [config.toml]` (defaults to configs/default.toml)

use anyhow::{Context, Result};
use log::{info, warn};
use oust_rs::backend::HidrawDriver;
use oust_rs::bootstrap;
use oust_rs::game::config::GameConfig;
use oust_rs::pairing::PairingWorker;
use oust_rs::GameManager;
use std::sync::atomic::Ordering;
use std::thread;

fn print_banner() {
    println!("======");
    println!(" OUST ");
    println!("======");
    println!("This game is designed to work unattended with no screen");
    println!("{}", "=".repeat(60));
    println!();
    println!("* Pairing a new controller *");
    println!("1. Plug in PS Move controller via USB");
    println!("2. Wait for light to turn solid white");
    println!("3. Unplug USB cable");
    println!("4. Press the PS button on the controller to connect via Bluetooth");
    println!("5. Controller lights up dim orange to show it's connected");
    println!();
    println!("* Button Controls: *");
    println!("While in the lobby:");
    println!(" - Pull trigger to join the game");
    println!(" - Press CIRCLE to show battery level");
    println!(" - Press SELECT to disconnect controller");
    println!(" - Press START to start the game early");
    println!();
    println!("Press Ctrl+C to stop");
    println!();
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    print_banner();

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => GameConfig::load_default()?,
    };

    bootstrap::ensure_privileged(&config.bootstrap)?;

    if let Err(e) = bootstrap::unblock_radio(&config.bootstrap) {
        warn!("Failed to unblock bluetooth: {}", e);
    }

    let driver = HidrawDriver::start(config.device.clone())?;
    let mut manager = GameManager::new(config.clone(), driver);

    if config.pairing.enabled {
        manager = manager.with_pairing(PairingWorker::spawn(config.pairing.clone())?);
    } else {
        info!("Automatic pairing disabled");
    }

    // Ctrl+C clears the running flag; the tick loop exits on its next pass
    let running = manager.running_flag();
    thread::Builder::new()
        .name("signal".to_string())
        .spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    warn!("Ctrl+C handling unavailable: {}", e);
                    return;
                }
            };

            if rt.block_on(tokio::signal::ctrl_c()).is_ok() {
                info!("Ctrl+C received");
                running.store(false, Ordering::SeqCst);
            }
        })?;

    println!("Let's go!");
    println!();

    manager.run();

    Ok(())
}
