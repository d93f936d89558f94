//! Staged generation plant sequencer
//!
//! Rod positions select a power level. Leaving `Off` brings the four
//! subsystems up in order, one per sequence window, ending in `Running`
//! where the actuation profile follows the level. Returning to `Off` cuts
//! everything at once and then walks the shutdown stages back to `Idle`.
//!
//! Stage timing is measured from the previous stage, so a late tick shifts
//! the rest of the sequence rather than compressing it.

use pltn_protocol::{Message, KEY_POWER};

use super::{Notice, Output, Phase, Sequencer, Subsystem};
use crate::config::{GenerationConfig, LevelProfile};
use crate::inputs::RodPositions;
use crate::mode::PowerLevel;
use crate::state::{Event, OperatingState};
use crate::time::Instant;
use crate::traits::{Channel, DigitalOutput};

/// Stages per startup or shutdown sequence
pub const STAGE_COUNT: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Alarm {
    /// Alarm conditions held on the previous tick
    armed: bool,
    /// Current buzzer output
    sounding: bool,
    last_toggle: Instant,
}

/// Generation node state machine
#[derive(Debug, Clone)]
pub struct PlantSequencer {
    config: GenerationConfig,
    state: OperatingState,
    level: PowerLevel,
    previous_level: PowerLevel,
    /// 1-based stage cursor, meaningful while staging
    step: u8,
    stage_started: Instant,
    alarm: Alarm,
}

impl PlantSequencer {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            config,
            state: OperatingState::Idle,
            level: PowerLevel::Off,
            previous_level: PowerLevel::Off,
            step: 1,
            stage_started: Instant::ZERO,
            alarm: Alarm::default(),
        }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Level derived on the last tick
    pub fn level(&self) -> PowerLevel {
        self.level
    }

    /// Current stage cursor
    pub fn step(&self) -> u8 {
        self.step
    }

    /// True while the buzzer output is on
    pub fn alarm_sounding(&self) -> bool {
        self.alarm.sounding
    }

    fn apply_event(&mut self, event: Event, out: &mut Output) {
        let next = self.state.transition(event);
        if next != self.state {
            out.notice(Notice::StateChanged {
                from: self.state,
                to: next,
            });
            self.state = next;
        }
    }

    fn begin_stages(&mut self, event: Event, now: Instant, out: &mut Output) {
        self.apply_event(event, out);
        self.step = 1;
        self.stage_started = now;
    }

    fn next_stage(&mut self, now: Instant) -> bool {
        if now.has_elapsed(self.stage_started, self.config.sequence_window_ms) {
            self.step = self.step.saturating_add(1);
            self.stage_started = now;
            true
        } else {
            false
        }
    }

    fn stage_notice(&self, phase: Phase, out: &mut Output) {
        if let Some(subsystem) = Subsystem::for_step(self.step) {
            out.notice(Notice::Stage {
                phase,
                step: self.step,
                total: STAGE_COUNT,
                subsystem,
            });
        }
    }

    fn run_startup_stage(&mut self, out: &mut Output) {
        self.stage_notice(Phase::Startup, out);
        let startup = self.config.normal;

        match self.step {
            1 => {
                out.set_digital(DigitalOutput::SteamHumidifier1, true);
                out.set_level(Channel::SteamFan, startup.steam_fan);
            }
            2 => {
                out.set_level(Channel::Turbine, startup.turbine);
            }
            3 => {
                out.set_digital(DigitalOutput::CondenserHumidifier, true);
                out.set_level(Channel::CondenserPump, startup.condenser_pump);
            }
            4 => {
                out.set_digital(DigitalOutput::CoolingTowerHumidifier1, true);
                out.set_level(Channel::CoolingTowerFan, startup.cooling_tower_fan);
                self.apply_event(Event::StartupComplete, out);
                self.apply_profile(out);
            }
            // Ticking past the final stage does nothing
            _ => {}
        }
    }

    fn run_shutdown_stage(&mut self, out: &mut Output) {
        self.stage_notice(Phase::Shutdown, out);

        match self.step {
            // Steam generator was already cut by the full de-actuation
            1 => {}
            2 => out.set_level(Channel::Turbine, 0),
            3 => out.set_level(Channel::CondenserPump, 0),
            4 => {
                out.set_level(Channel::CoolingTowerFan, 0);
                self.apply_event(Event::ShutdownComplete, out);
            }
            _ => {}
        }
    }

    fn profile(&self) -> Option<LevelProfile> {
        match self.level {
            PowerLevel::Off => None,
            PowerLevel::Normal => Some(self.config.normal),
            PowerLevel::Max => Some(self.config.max),
        }
    }

    /// Apply the steady-state profile for the current level (running only)
    fn apply_profile(&self, out: &mut Output) {
        if self.state != OperatingState::Running {
            return;
        }
        let Some(profile) = self.profile() else {
            return;
        };

        out.set_digital(DigitalOutput::SteamHumidifier1, true);
        out.set_digital(DigitalOutput::SteamHumidifier2, profile.steam_humidifier_2);
        out.set_digital(DigitalOutput::CondenserHumidifier, true);
        out.set_digital(DigitalOutput::CoolingTowerHumidifier1, true);
        out.set_digital(
            DigitalOutput::CoolingTowerHumidifier2,
            profile.cooling_tower_humidifier_2,
        );
        out.set_level(Channel::SteamFan, profile.steam_fan);
        out.set_level(Channel::Turbine, profile.turbine);
        out.set_level(Channel::CondenserPump, profile.condenser_pump);
        out.set_level(Channel::CoolingTowerFan, profile.cooling_tower_fan);
    }

    /// Every humidifier off, buzzer off, every motor stopped
    fn all_off(&mut self, out: &mut Output) {
        if self.alarm.armed || self.alarm.sounding {
            out.notice(Notice::Alarm { active: false });
        }
        self.alarm.armed = false;
        self.alarm.sounding = false;
        self.safe_outputs(out);
    }

    fn abort_to_shutdown(&mut self, now: Instant, out: &mut Output) {
        self.begin_stages(Event::PowerLost, now, out);
        self.all_off(out);
        self.run_shutdown_stage(out);
    }

    fn update_alarm(&mut self, rods: &RodPositions, now: Instant, out: &mut Output) {
        let armed = self.level == PowerLevel::Max
            && self.config.thresholds.alarm_armed(rods.rod2, rods.rod3);

        if armed {
            if !self.alarm.armed {
                out.notice(Notice::Alarm { active: true });
            }
            if now.has_elapsed(self.alarm.last_toggle, self.config.alarm_toggle_ms) {
                self.alarm.last_toggle = now;
                self.alarm.sounding = !self.alarm.sounding;
                out.set_digital(DigitalOutput::Buzzer, self.alarm.sounding);
            }
        } else {
            if self.alarm.armed {
                out.notice(Notice::Alarm { active: false });
            }
            if self.alarm.sounding {
                self.alarm.sounding = false;
                out.set_digital(DigitalOutput::Buzzer, false);
            }
        }
        self.alarm.armed = armed;
    }
}

impl Sequencer for PlantSequencer {
    type Inputs = RodPositions;
    type State = OperatingState;

    fn state(&self) -> OperatingState {
        self.state
    }

    fn tick(&mut self, rods: &RodPositions, now: Instant, out: &mut Output) {
        self.previous_level = self.level;
        self.level = PowerLevel::derive(rods.rod2, rods.rod3, &self.config.thresholds);

        match self.state {
            OperatingState::Idle => {
                if !self.level.is_off() {
                    self.begin_stages(Event::PowerRequested, now, out);
                    self.run_startup_stage(out);
                }
            }
            OperatingState::StartingUp => {
                if self.level.is_off() {
                    self.abort_to_shutdown(now, out);
                } else if self.next_stage(now) {
                    self.run_startup_stage(out);
                }
            }
            OperatingState::Running => {
                if self.level.is_off() {
                    self.abort_to_shutdown(now, out);
                    return;
                }
                if self.level != self.previous_level {
                    out.notice(Notice::LevelChanged {
                        from: self.previous_level,
                        to: self.level,
                    });
                    self.apply_profile(out);
                }
                self.update_alarm(rods, now, out);
            }
            OperatingState::ShuttingDown => {
                if self.next_stage(now) {
                    self.run_shutdown_stage(out);
                }
            }
        }
    }

    fn safe_outputs(&self, out: &mut Output) {
        for output in DigitalOutput::HUMIDIFIERS {
            out.set_digital(output, false);
        }
        out.set_digital(DigitalOutput::Buzzer, false);
        for channel in Channel::MOTORS {
            out.set_level(channel, 0);
        }
    }

    fn status(&self) -> Option<Message> {
        Message::single(KEY_POWER, self.level.code()).ok()
    }
}
