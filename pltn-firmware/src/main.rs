//! PLTN - Nuclear Plant Simulator Node Firmware
//!
//! One binary for every node of the simulator chain. The role embedded
//! from node.toml decides what the board does:
//!
//! - generation: reads rod positions, stages the plant motors and
//!   humidifiers, broadcasts the power level downstream
//! - visualizer: mirrors one pump's status as a running LED animation

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::BufferedInterruptHandler;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pltn_core::config::{NodeConfig, Role};

mod board;
mod config;
mod report;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

// Configuration shared with the control task for the life of the program
static NODE_CONFIG: StaticCell<NodeConfig> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PLTN node firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static NodeConfig = NODE_CONFIG.init(config::load());

    match config.role {
        Role::Generation => {
            let (upstream, downstream, outputs) = board::generation(p, config);
            info!("Role: generation");
            spawner
                .spawn(tasks::generation_task(config, upstream, downstream, outputs))
                .unwrap();
        }
        Role::Visualizer => {
            let (upstream, leds) = board::visualizer(p, config);
            info!("Role: visualizer ({=str})", config.visualizer.watch_key.as_str());
            spawner
                .spawn(tasks::visualizer_task(config, upstream, leds))
                .unwrap();
        }
    }

    info!("Control task spawned, firmware running");
}
