//! LED flow animation mirroring a pump status
//!
//! A master position walks around the bar, one LED per frame. Each frame is
//! rendered off-line: equally spaced blocks of LEDs, each block a
//! brightness ramp ending at the head. The frame delay follows the pump
//! status; when the pump is off the bar is cleared once and left dark.

use pltn_protocol::Message;

use super::{Notice, Output, Sequencer};
use crate::config::{VisualizerConfig, LED_COUNT};
use crate::inputs::PumpInput;
use crate::state::PumpStatus;
use crate::time::Instant;
use crate::traits::Channel;

/// Pump-status animation on an `N`-LED bar
#[derive(Debug, Clone)]
pub struct Visualizer<const N: usize = LED_COUNT> {
    config: VisualizerConfig,
    status: PumpStatus,
    /// `None` once the bar has been blanked
    position: Option<usize>,
    last_frame: Instant,
    frame: [u8; N],
}

impl<const N: usize> Visualizer<N> {
    pub fn new(config: VisualizerConfig) -> Self {
        Self {
            config,
            status: PumpStatus::Off,
            position: Some(0),
            last_frame: Instant::ZERO,
            frame: [0; N],
        }
    }

    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Position the next frame will be drawn at, `None` while blanked
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Brightness of the last rendered frame
    pub fn frame(&self) -> &[u8; N] {
        &self.frame
    }

    /// Frame delay for a status, `None` when the animation is stopped
    pub fn frame_delay_ms(&self, status: PumpStatus) -> Option<u32> {
        match status {
            PumpStatus::Off => None,
            PumpStatus::Starting => Some(self.config.starting_delay_ms),
            PumpStatus::On => Some(self.config.on_delay_ms),
            PumpStatus::ShuttingDown => Some(self.config.shutting_down_delay_ms),
        }
    }

    fn render(&mut self, position: usize) {
        self.frame = [0; N];
        if N == 0 {
            return;
        }

        let blocks = usize::from(self.config.blocks).max(1);
        let spacing = N / blocks;
        let block_len = usize::from(self.config.block_len).min(self.config.ramp.len());
        // Short blocks take the bright end of the ramp
        let ramp = &self.config.ramp[self.config.ramp.len() - block_len..];

        for block in 0..blocks {
            let start = (position + block * spacing) % N;
            for (offset, &brightness) in ramp.iter().enumerate() {
                self.frame[(start + offset) % N] = brightness;
            }
        }
    }

    fn led_channel(index: usize) -> Channel {
        Channel::Led(u8::try_from(index).unwrap_or(u8::MAX))
    }

    fn blank(&mut self, out: &mut Output) {
        self.frame = [0; N];
        self.safe_outputs(out);
        self.position = None;
        out.notice(Notice::Blanked);
    }
}

impl<const N: usize> Sequencer for Visualizer<N> {
    type Inputs = PumpInput;
    type State = PumpStatus;

    fn state(&self) -> PumpStatus {
        self.status
    }

    fn tick(&mut self, input: &PumpInput, now: Instant, out: &mut Output) {
        let status = input.status();
        if status != self.status {
            out.notice(Notice::StatusChanged {
                from: self.status,
                to: status,
            });
            self.status = status;
        }

        let Some(delay) = self.frame_delay_ms(status) else {
            if self.position.is_some() {
                self.blank(out);
            }
            return;
        };

        let position = self.position.unwrap_or(0);
        self.position = Some(position);

        if now.has_elapsed(self.last_frame, delay) {
            self.last_frame = now;
            self.render(position);
            for (index, &brightness) in self.frame.iter().enumerate() {
                out.set_level(Self::led_channel(index), brightness);
            }
            self.position = Some((position + 1) % N.max(1));
        }
    }

    fn safe_outputs(&self, out: &mut Output) {
        for index in 0..N {
            out.set_level(Self::led_channel(index), 0);
        }
    }

    fn status(&self) -> Option<Message> {
        None
    }
}
