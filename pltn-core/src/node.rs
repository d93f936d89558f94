//! One node's control loop
//!
//! Every iteration runs in a fixed order: decode and parse whatever the
//! link delivered, tick the sequencer and apply its actions, then broadcast
//! the status if the broadcast period elapsed. The caller owns the sleep
//! between iterations.

use heapless::Vec;
use pltn_protocol::{DecoderStats, FrameDecoder, Message, MAX_FRAME_SIZE};

use crate::config::{LinkConfig, NodeConfig};
use crate::inputs::{ControlInputs, PumpInput, RodPositions};
use crate::sequencer::{Notice, Output, PlantSequencer, Sequencer, Visualizer, MAX_NOTICES};
use crate::time::{Instant, Interval};
use crate::traits::{Actuators, ByteSink, ByteSource};

/// What happened during one iteration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cycle {
    /// Message parsed this iteration (first [`MAX_FIELDS`] fields only)
    ///
    /// [`MAX_FIELDS`]: pltn_protocol::MAX_FIELDS
    pub received: Option<Message>,
    /// Operator diagnostics from the sequencer
    pub notices: Vec<Notice, MAX_NOTICES>,
    /// Status frame written downstream
    pub broadcast: Option<Vec<u8, MAX_FRAME_SIZE>>,
    /// The downstream write failed (the frame is not retried)
    pub write_failed: bool,
    /// A received frame hit the decoder capacity
    pub overflowed: bool,
    /// Decoder counters, when the diagnostics period elapsed
    pub stats: Option<DecoderStats>,
}

/// Decoder, inputs, sequencer and timers for one node
pub struct Node<S: Sequencer> {
    decoder: FrameDecoder,
    inputs: S::Inputs,
    sequencer: S,
    broadcast: Interval,
    diagnostics: Interval,
    output: Output,
}

impl<S: Sequencer> Node<S> {
    pub fn new(link: &LinkConfig, inputs: S::Inputs, sequencer: S) -> Self {
        Self {
            decoder: FrameDecoder::new(link.overflow),
            inputs,
            sequencer,
            broadcast: Interval::new(link.broadcast_period_ms),
            diagnostics: Interval::new(link.diagnostics_period_ms),
            output: Output::new(),
        }
    }

    pub fn sequencer(&self) -> &S {
        &self.sequencer
    }

    pub fn inputs(&self) -> &S::Inputs {
        &self.inputs
    }

    pub fn state(&self) -> S::State {
        self.sequencer.state()
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Drive every actuator to its off state
    pub fn power_on<A: Actuators>(&mut self, actuators: &mut A) {
        self.output.clear();
        self.sequencer.safe_outputs(&mut self.output);
        self.output.apply_to(actuators);
        self.output.clear();
    }

    /// Pull bytes until a frame completes or the source runs dry
    ///
    /// Bytes after a completed frame stay in the source for the next
    /// iteration.
    fn receive<R: ByteSource>(&mut self, rx: &mut R) -> Option<Message> {
        while !self.decoder.is_ready() {
            let Some(byte) = rx.read_byte() else {
                break;
            };
            self.decoder.feed(byte);
        }

        let payload = self.decoder.take()?;
        self.inputs.absorb(&payload);
        Some(Message::parse(&payload))
    }

    /// Run one loop iteration
    pub fn run_once<R, W, A>(
        &mut self,
        now: Instant,
        rx: &mut R,
        tx: &mut W,
        actuators: &mut A,
    ) -> Cycle
    where
        R: ByteSource,
        W: ByteSink,
        A: Actuators,
    {
        let mut cycle = Cycle::default();

        let overflows = self.decoder.stats().overflows;
        cycle.received = self.receive(rx);
        cycle.overflowed = self.decoder.stats().overflows != overflows;

        self.output.clear();
        self.sequencer.tick(&self.inputs, now, &mut self.output);
        self.output.apply_to(actuators);
        cycle.notices = self.output.take_notices();

        if self.broadcast.poll(now) {
            if let Some(frame) = self.sequencer.status().and_then(|s| s.encode_to_vec().ok()) {
                cycle.write_failed = tx.write_bytes(&frame).is_err();
                cycle.broadcast = Some(frame);
            }
        }

        if self.diagnostics.poll(now) {
            cycle.stats = Some(self.decoder.stats());
        }

        cycle
    }
}

/// Generation node: rod positions in, power level out
pub type GenerationNode = Node<PlantSequencer>;

/// Visualizer node: pump status in, LED animation
pub type VisualizerNode = Node<Visualizer>;

impl Node<PlantSequencer> {
    pub fn generation(config: &NodeConfig) -> Self {
        Node::new(
            &config.link,
            RodPositions::default(),
            PlantSequencer::new(config.generation),
        )
    }
}

impl<const N: usize> Node<Visualizer<N>> {
    pub fn visualizer(config: &NodeConfig) -> Self {
        Node::new(
            &config.link,
            PumpInput::new(config.visualizer.watch_key.clone()),
            Visualizer::new(config.visualizer.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OperatingState;
    use crate::traits::{Channel, DigitalOutput};
    use std::collections::VecDeque;

    struct Link(VecDeque<u8>);

    impl Link {
        fn with(bytes: &[u8]) -> Self {
            Link(bytes.iter().copied().collect())
        }
    }

    impl ByteSource for Link {
        fn read_byte(&mut self) -> Option<u8> {
            self.0.pop_front()
        }
    }

    #[derive(Default)]
    struct Wire {
        bytes: std::vec::Vec<u8>,
        fail: bool,
    }

    impl ByteSink for Wire {
        type Error = ();

        fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.bytes.extend_from_slice(bytes);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Outputs {
        levels: std::collections::HashMap<Channel, u8>,
        digitals: std::collections::HashMap<DigitalOutput, bool>,
    }

    impl Actuators for Outputs {
        fn set_level(&mut self, channel: Channel, percent: u8) {
            self.levels.insert(channel, percent);
        }

        fn set_digital(&mut self, output: DigitalOutput, on: bool) {
            self.digitals.insert(output, on);
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_message_drives_sequencer_same_iteration() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut rx = Link::with(b"<rod2:45;rod3:35>\n");
        let mut outputs = Outputs::default();

        let cycle = node.run_once(at(10), &mut rx, &mut (), &mut outputs);

        assert_eq!(cycle.received.unwrap().get("rod2"), Some(45));
        assert_eq!(node.state(), OperatingState::StartingUp);
        assert_eq!(outputs.levels.get(&Channel::SteamFan), Some(&50));
        assert!(!cycle.notices.is_empty());
    }

    #[test]
    fn test_unknown_keys_do_not_hide_rods() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut rx = Link::with(b"<a:1;b:1;c:1;d:1;e:1;f:1;g:1;h:1;rod2:45;rod3:35>\n");
        let mut outputs = Outputs::default();

        node.run_once(at(10), &mut rx, &mut (), &mut outputs);

        assert_eq!(node.inputs().rod2, 45);
        assert_eq!(node.inputs().rod3, 35);
        assert_eq!(node.state(), OperatingState::StartingUp);
    }

    #[test]
    fn test_one_frame_per_iteration() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut rx = Link::with(b"<rod2:45;rod3:35><rod2:5;rod3:5>");
        let mut outputs = Outputs::default();

        node.run_once(at(10), &mut rx, &mut (), &mut outputs);
        assert_eq!(node.inputs().rod2, 45);
        assert!(!rx.0.is_empty());

        node.run_once(at(20), &mut rx, &mut (), &mut outputs);
        assert_eq!(node.inputs().rod2, 5);
    }

    #[test]
    fn test_partial_frame_keeps_inputs() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut rx = Link::with(b"<rod2:45;rod3:35>");
        let mut outputs = Outputs::default();
        node.run_once(at(10), &mut rx, &mut (), &mut outputs);

        let mut rx = Link::with(b"<rod2:5");
        let cycle = node.run_once(at(20), &mut rx, &mut (), &mut outputs);
        assert!(cycle.received.is_none());
        assert_eq!(node.inputs().rod2, 45);
    }

    #[test]
    fn test_broadcast_period() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut wire = Wire::default();
        let mut outputs = Outputs::default();
        let mut rx = Link::with(b"");

        let cycle = node.run_once(at(490), &mut rx, &mut wire, &mut outputs);
        assert!(cycle.broadcast.is_none());

        let cycle = node.run_once(at(500), &mut rx, &mut wire, &mut outputs);
        assert_eq!(cycle.broadcast.unwrap().as_slice(), b"<pwr:0>\n");

        let cycle = node.run_once(at(510), &mut rx, &mut wire, &mut outputs);
        assert!(cycle.broadcast.is_none());

        node.run_once(at(1000), &mut rx, &mut wire, &mut outputs);
        assert_eq!(wire.bytes.as_slice(), b"<pwr:0>\n<pwr:0>\n");
    }

    #[test]
    fn test_write_failure_reported_not_fatal() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut wire = Wire {
            fail: true,
            ..Wire::default()
        };
        let mut outputs = Outputs::default();
        let mut rx = Link::with(b"<rod2:45;rod3:35>");

        let cycle = node.run_once(at(500), &mut rx, &mut wire, &mut outputs);
        assert!(cycle.write_failed);
        assert_eq!(node.state(), OperatingState::StartingUp);

        wire.fail = false;
        let cycle = node.run_once(at(1000), &mut rx, &mut wire, &mut outputs);
        assert!(!cycle.write_failed);
        assert_eq!(wire.bytes.as_slice(), b"<pwr:2>\n");
    }

    #[test]
    fn test_overflow_flagged() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut frame = std::vec::Vec::from(&b"<rod2:45;rod3:35;"[..]);
        frame.extend(std::iter::repeat(b'x').take(60));
        frame.push(b'>');
        let mut rx = Link(frame.into_iter().collect());
        let mut outputs = Outputs::default();

        let cycle = node.run_once(at(10), &mut rx, &mut (), &mut outputs);
        assert!(cycle.overflowed);
        // Truncated payload still carries the leading fields
        assert_eq!(node.inputs().rod3, 35);
    }

    #[test]
    fn test_diagnostics_period() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut rx = Link::with(b"<pwr:1>");
        let mut outputs = Outputs::default();

        let cycle = node.run_once(at(9_990), &mut rx, &mut (), &mut outputs);
        assert!(cycle.stats.is_none());

        let cycle = node.run_once(at(10_000), &mut rx, &mut (), &mut outputs);
        assert_eq!(cycle.stats.unwrap().frames, 1);
    }

    #[test]
    fn test_power_on_forces_off() {
        let mut node = GenerationNode::generation(&NodeConfig::default());
        let mut outputs = Outputs::default();
        node.power_on(&mut outputs);

        for channel in Channel::MOTORS {
            assert_eq!(outputs.levels.get(&channel), Some(&0));
        }
        assert_eq!(outputs.digitals.get(&DigitalOutput::Buzzer), Some(&false));
        assert_eq!(outputs.digitals.len(), 6);
    }

    #[test]
    fn test_visualizer_node_reads_watch_key() {
        let mut config = NodeConfig::default();
        config.visualizer.watch_key.clear();
        config.visualizer.watch_key.push_str("pump2").unwrap();
        let mut node = VisualizerNode::visualizer(&config);
        let mut rx = Link::with(b"<pump1:0;pump2:2;pump3:0>\n");
        let mut outputs = Outputs::default();

        let cycle = node.run_once(at(200), &mut rx, &mut (), &mut outputs);
        assert_eq!(node.state(), crate::state::PumpStatus::On);
        assert_eq!(outputs.levels.get(&Channel::Led(3)), Some(&100));
        assert!(cycle.broadcast.is_none());
    }
}
