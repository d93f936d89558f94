//! Visualizer control task
//!
//! Mirrors one pump's status from the upstream link onto the LED bar.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::Timer;

use pltn_core::config::NodeConfig;
use pltn_core::node::VisualizerNode;
use pltn_core::traits::Clock;
use pltn_hal_rp2040::{EmbassyClock, UartSource};

use crate::board::FlowLeds;
use crate::report;

#[embassy_executor::task]
pub async fn visualizer_task(
    config: &'static NodeConfig,
    upstream: BufferedUartRx,
    mut leds: FlowLeds,
) {
    info!("Visualizer task started");

    let clock = EmbassyClock;
    let mut rx = UartSource::new(upstream);
    let mut node: VisualizerNode = VisualizerNode::visualizer(config);

    node.power_on(&mut leds);
    info!("LEDs cleared, watching {=str}", config.visualizer.watch_key.as_str());

    let mut position = node.sequencer().position();
    loop {
        // The visualizer never broadcasts, so the sink is a no-op
        let cycle = node.run_once(clock.now(), &mut rx, &mut (), &mut leds);
        report::cycle(&cycle);

        if node.sequencer().position() != position {
            position = node.sequencer().position();
            trace!("Frame {}: {}", position, node.sequencer().frame());
        }
        if cycle.stats.is_some() {
            debug!("UART receive errors: {}, LED faults: {}", rx.errors(), leds.faults());
        }

        Timer::after_millis(u64::from(config.link.idle_delay_ms)).await;
    }
}
