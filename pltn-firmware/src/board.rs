//! Pin assignment per role
//!
//! Both roles receive on UART0 RX (GPIO17). The generation
//! node transmits downstream on UART1 TX (GPIO20).
//!
//! Generation outputs:
//! - GPIO2..5: steam fan, turbine, condenser pump, cooling tower fan (PWM)
//! - GPIO10..14: humidifier relays in stage order
//! - GPIO15: buzzer
//!
//! Visualizer outputs: GPIO0..15 drive LEDs 0..15 from PWM slices 0..7.

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{Pwm, PwmOutput};
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_rp::Peripherals;
use static_cell::StaticCell;

use pltn_core::config::{NodeConfig, LED_COUNT};
use pltn_drivers::{LedBar, PlantActuators, Polarity};
use pltn_hal_rp2040::pwm::output_config;
use pltn_hal_rp2040::uart::link_config;

use crate::Irqs;

/// Generation node output bank on RP2040 peripherals
pub type PlantOutputs = PlantActuators<PwmOutput<'static>, Output<'static>, Output<'static>>;

/// Visualizer LED bar on RP2040 peripherals
pub type FlowLeds = LedBar<PwmOutput<'static>, LED_COUNT>;

// UART buffers (must live forever)
static UPSTREAM_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static DOWNSTREAM_TX_BUF: StaticCell<[u8; 128]> = StaticCell::new();

/// Split a slice into its two outputs
fn outputs(pwm: Pwm<'static>) -> (PwmOutput<'static>, PwmOutput<'static>) {
    match pwm.split() {
        (Some(a), Some(b)) => (a, b),
        _ => defmt::panic!("PWM slice configured without both outputs"),
    }
}

/// Upstream link, downstream link and actuators for the generation role
pub fn generation(
    p: Peripherals,
    config: &NodeConfig,
) -> (BufferedUartRx, BufferedUartTx, PlantOutputs) {
    let upstream = BufferedUartRx::new(
        p.UART0,
        Irqs,
        p.PIN_17,
        UPSTREAM_RX_BUF.init([0; 256]),
        link_config(config.link.baudrate),
    );
    let downstream = BufferedUartTx::new(
        p.UART1,
        Irqs,
        p.PIN_20,
        DOWNSTREAM_TX_BUF.init([0; 128]),
        link_config(config.link.baudrate),
    );
    info!("Links: UART0 RX upstream, UART1 TX downstream @ {}", config.link.baudrate);

    let (steam_fan, turbine) = outputs(Pwm::new_output_ab(
        p.PWM_SLICE1,
        p.PIN_2,
        p.PIN_3,
        output_config(),
    ));
    let (condenser_pump, cooling_tower_fan) = outputs(Pwm::new_output_ab(
        p.PWM_SLICE2,
        p.PIN_4,
        p.PIN_5,
        output_config(),
    ));

    let active_low = config.generation.relay_active_low;
    let idle = Level::from(active_low);
    let humidifiers = [
        Output::new(p.PIN_10, idle),
        Output::new(p.PIN_11, idle),
        Output::new(p.PIN_12, idle),
        Output::new(p.PIN_13, idle),
        Output::new(p.PIN_14, idle),
    ];
    let buzzer = Output::new(p.PIN_15, Level::Low);

    let bank = PlantActuators::new(
        [steam_fan, turbine, condenser_pump, cooling_tower_fan],
        humidifiers,
        buzzer,
        Polarity::from_active_low(active_low),
    );
    info!("Plant outputs ready (relays active-low: {})", active_low);

    (upstream, downstream, bank)
}

/// Upstream link and LED bar for the visualizer role
pub fn visualizer(p: Peripherals, config: &NodeConfig) -> (BufferedUartRx, FlowLeds) {
    let upstream = BufferedUartRx::new(
        p.UART0,
        Irqs,
        p.PIN_17,
        UPSTREAM_RX_BUF.init([0; 256]),
        link_config(config.link.baudrate),
    );
    info!("Link: UART0 RX upstream @ {}", config.link.baudrate);

    let (led0, led1) = outputs(Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_0, p.PIN_1, output_config()));
    let (led2, led3) = outputs(Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, output_config()));
    let (led4, led5) = outputs(Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, output_config()));
    let (led6, led7) = outputs(Pwm::new_output_ab(p.PWM_SLICE3, p.PIN_6, p.PIN_7, output_config()));
    let (led8, led9) = outputs(Pwm::new_output_ab(p.PWM_SLICE4, p.PIN_8, p.PIN_9, output_config()));
    let (led10, led11) =
        outputs(Pwm::new_output_ab(p.PWM_SLICE5, p.PIN_10, p.PIN_11, output_config()));
    let (led12, led13) =
        outputs(Pwm::new_output_ab(p.PWM_SLICE6, p.PIN_12, p.PIN_13, output_config()));
    let (led14, led15) =
        outputs(Pwm::new_output_ab(p.PWM_SLICE7, p.PIN_14, p.PIN_15, output_config()));

    let leds = LedBar::new([
        led0, led1, led2, led3, led4, led5, led6, led7, led8, led9, led10, led11, led12, led13,
        led14, led15,
    ]);
    info!("LED bar ready ({} LEDs)", LED_COUNT);

    (upstream, leds)
}
