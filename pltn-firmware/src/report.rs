//! Operator log for one loop iteration
//!
//! The core returns what happened as a [`Cycle`]; this is the only place
//! it turns into log lines.

use defmt::*;
use pltn_core::sequencer::{Notice, Phase};
use pltn_core::Cycle;

pub fn cycle(cycle: &Cycle) {
    if let Some(message) = &cycle.received {
        debug!("RX: {}", message);
    }
    if cycle.overflowed {
        warn!("Frame exceeded the decoder buffer");
    }

    for notice in &cycle.notices {
        log_notice(notice);
    }

    if let Some(frame) = &cycle.broadcast {
        debug!("TX: {=[u8]:a}", frame.as_slice());
    }
    if cycle.write_failed {
        warn!("Downstream write failed, status frame dropped");
    }

    if let Some(stats) = cycle.stats {
        debug!(
            "Link: {} frames, {} overflows, {} rejected, {} busy",
            stats.frames, stats.overflows, stats.rejected, stats.busy_rejections
        );
    }
}

fn log_notice(notice: &Notice) {
    match *notice {
        Notice::StateChanged { from, to } => info!("State: {} -> {}", from, to),
        Notice::Stage {
            phase,
            step,
            total,
            subsystem,
        } => {
            let (label, action) = match phase {
                Phase::Startup => ("STARTUP", "on"),
                Phase::Shutdown => ("SHUTDOWN", "off"),
            };
            info!(
                "{=str} ({=u8}/{=u8}): {=str} {=str}",
                label,
                step,
                total,
                subsystem.name(),
                action
            );
        }
        Notice::LevelChanged { from, to } => {
            info!("Power level changed: {} -> {}", from.code(), to.code())
        }
        Notice::Alarm { active: true } => warn!("Over-power alarm sounding"),
        Notice::Alarm { active: false } => info!("Over-power alarm cleared"),
        Notice::StatusChanged { from, to } => info!("Pump status: {} -> {}", from, to),
        Notice::Blanked => info!("Pump off, LEDs cleared"),
    }
}
