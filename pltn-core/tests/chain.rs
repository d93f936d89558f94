//! Host-side chain test: rod frames into a generation node, its power
//! broadcast into a visualizer watching the `pwr` field.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use pltn_core::config::{NodeConfig, Role};
use pltn_core::node::{GenerationNode, VisualizerNode};
use pltn_core::state::{OperatingState, PumpStatus};
use pltn_core::traits::{Actuators, ByteSink, ByteSource, Channel, Clock, DigitalOutput};
use pltn_core::Instant;
use pltn_protocol::{Message, KEY_POWER, KEY_ROD2, KEY_ROD3};

/// In-memory UART: one end writes, the other reads
#[derive(Clone, Default)]
struct Pipe(Rc<RefCell<VecDeque<u8>>>);

impl ByteSource for Pipe {
    fn read_byte(&mut self) -> Option<u8> {
        self.0.borrow_mut().pop_front()
    }
}

impl ByteSink for Pipe {
    type Error = ();

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.0.borrow_mut().extend(bytes.iter().copied());
        Ok(())
    }
}

#[derive(Default)]
struct ManualClock(u64);

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_millis(self.0)
    }
}

#[derive(Default)]
struct Panel {
    levels: HashMap<Channel, u8>,
    digitals: HashMap<DigitalOutput, bool>,
}

impl Actuators for Panel {
    fn set_level(&mut self, channel: Channel, percent: u8) {
        self.levels.insert(channel, percent.min(100));
    }

    fn set_digital(&mut self, output: DigitalOutput, on: bool) {
        self.digitals.insert(output, on);
    }
}

impl Panel {
    fn level(&self, channel: Channel) -> u8 {
        self.levels.get(&channel).copied().unwrap_or(0)
    }

    fn lit(&self) -> usize {
        (0..16u8)
            .filter(|&i| self.level(Channel::Led(i)) > 0)
            .count()
    }
}

struct Chain {
    clock: ManualClock,
    rods: Pipe,
    link: Pipe,
    generation: GenerationNode,
    visualizer: VisualizerNode,
    plant: Panel,
    bar: Panel,
}

impl Chain {
    fn new() -> Self {
        let generation_config = NodeConfig::default();

        let mut visualizer_config = NodeConfig {
            role: Role::Visualizer,
            ..NodeConfig::default()
        };
        visualizer_config.visualizer.watch_key.clear();
        visualizer_config
            .visualizer
            .watch_key
            .push_str(KEY_POWER)
            .unwrap();
        visualizer_config.validate().unwrap();

        let mut chain = Self {
            clock: ManualClock::default(),
            rods: Pipe::default(),
            link: Pipe::default(),
            generation: GenerationNode::generation(&generation_config),
            visualizer: VisualizerNode::visualizer(&visualizer_config),
            plant: Panel::default(),
            bar: Panel::default(),
        };
        chain.generation.power_on(&mut chain.plant);
        chain.visualizer.power_on(&mut chain.bar);
        chain
    }

    fn send_rods(&mut self, rod2: u32, rod3: u32) {
        let mut message = Message::new();
        message.insert(KEY_ROD2, rod2).unwrap();
        message.insert(KEY_ROD3, rod3).unwrap();
        let frame = message.encode_to_vec().unwrap();
        self.rods.write_bytes(&frame).unwrap();
    }

    /// Run both nodes in 10 ms steps
    fn run_for(&mut self, ms: u64) {
        for _ in 0..ms / 10 {
            self.clock.0 += 10;
            let now = self.clock.now();

            let mut rods = self.rods.clone();
            let mut link = self.link.clone();
            self.generation
                .run_once(now, &mut rods, &mut link, &mut self.plant);
            self.visualizer
                .run_once(now, &mut link, &mut (), &mut self.bar);
        }
    }
}

#[test]
fn test_chain_full_power_cycle() {
    let mut chain = Chain::new();

    chain.run_for(1_000);
    assert_eq!(chain.generation.state(), OperatingState::Idle);
    assert_eq!(chain.visualizer.state(), PumpStatus::Off);
    assert_eq!(chain.bar.lit(), 0);

    // Rods withdrawn to full power: staged startup over three windows
    chain.send_rods(45, 35);
    chain.run_for(100);
    assert_eq!(chain.generation.state(), OperatingState::StartingUp);
    assert_eq!(chain.plant.level(Channel::SteamFan), 50);
    assert_eq!(chain.plant.level(Channel::Turbine), 0);

    chain.run_for(15_000);
    assert_eq!(chain.generation.state(), OperatingState::Running);
    for channel in Channel::MOTORS {
        assert_eq!(chain.plant.level(channel), 100);
    }

    // Power level 2 reads as "on" downstream and animates the bar
    assert_eq!(chain.visualizer.state(), PumpStatus::On);
    assert_eq!(chain.bar.lit(), 16);

    // Rods inserted: immediate cut, staged shutdown, then the bar goes dark
    chain.send_rods(10, 10);
    chain.run_for(100);
    assert_eq!(chain.generation.state(), OperatingState::ShuttingDown);
    for channel in Channel::MOTORS {
        assert_eq!(chain.plant.level(channel), 0);
    }
    for output in DigitalOutput::HUMIDIFIERS {
        assert_eq!(chain.plant.digitals.get(&output), Some(&false));
    }

    chain.run_for(16_000);
    assert_eq!(chain.generation.state(), OperatingState::Idle);
    for channel in Channel::MOTORS {
        assert_eq!(chain.plant.level(channel), 0);
    }
    for output in DigitalOutput::HUMIDIFIERS {
        assert_eq!(chain.plant.digitals.get(&output), Some(&false));
    }
    assert_eq!(chain.plant.digitals.get(&DigitalOutput::Buzzer), Some(&false));
    assert_eq!(chain.visualizer.state(), PumpStatus::Off);
    assert_eq!(chain.bar.lit(), 0);
}

#[test]
fn test_chain_normal_power_starts_visualizer_slowly() {
    let mut chain = Chain::new();
    chain.send_rods(25, 20);
    chain.run_for(16_000);

    assert_eq!(chain.generation.state(), OperatingState::Running);
    assert_eq!(chain.plant.level(Channel::Turbine), 40);
    // Power level 1 is read as "starting" by a visualizer watching pwr
    assert_eq!(chain.visualizer.state(), PumpStatus::Starting);
}

#[test]
fn test_chain_silent_link_freezes_progress() {
    let mut chain = Chain::new();
    chain.send_rods(45, 35);
    chain.run_for(16_000);
    assert_eq!(chain.generation.state(), OperatingState::Running);

    // No further rod frames: inputs hold, plant stays up
    chain.run_for(60_000);
    assert_eq!(chain.generation.state(), OperatingState::Running);
    assert_eq!(chain.generation.inputs().rod2, 45);
}

#[test]
fn test_chain_garbage_on_rod_link_ignored() {
    let mut chain = Chain::new();
    chain.rods.write_bytes(b"noise>>rod2:90\n<rod2:x;rod3:35>\n").unwrap();
    chain.run_for(100);

    // rod2 parsed as 0: plant stays off
    assert_eq!(chain.generation.inputs().rod2, 0);
    assert_eq!(chain.generation.inputs().rod3, 35);
    assert_eq!(chain.generation.state(), OperatingState::Idle);
}
