//! Generation control task
//!
//! Reads rod positions from upstream, stages the plant outputs and
//! broadcasts the power level downstream.

use defmt::*;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::Timer;

use pltn_core::config::NodeConfig;
use pltn_core::node::GenerationNode;
use pltn_core::traits::Clock;
use pltn_hal_rp2040::{EmbassyClock, UartSink, UartSource};

use crate::board::PlantOutputs;
use crate::report;

#[embassy_executor::task]
pub async fn generation_task(
    config: &'static NodeConfig,
    upstream: BufferedUartRx,
    downstream: BufferedUartTx,
    mut outputs: PlantOutputs,
) {
    info!("Generation task started");

    let clock = EmbassyClock;
    let mut rx = UartSource::new(upstream);
    let mut tx = UartSink::new(downstream);
    let mut node = GenerationNode::generation(config);

    node.power_on(&mut outputs);
    info!("All outputs off, state: {}", node.state());

    let mut faults = 0;
    loop {
        let cycle = node.run_once(clock.now(), &mut rx, &mut tx, &mut outputs);
        report::cycle(&cycle);

        if cycle.stats.is_some() {
            debug!("UART receive errors: {}", rx.errors());
        }
        if outputs.faults() != faults {
            faults = outputs.faults();
            warn!("Output write faults: {}", faults);
        }

        Timer::after_millis(u64::from(config.link.idle_delay_ms)).await;
    }
}
