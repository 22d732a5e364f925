#![no_std]
#![no_main]

use defmt_rtt as _;
use panic_probe as _;
use rtic::app;

#[app(device = rp_pico::hal::pac, peripherals = true)]
mod app {
    use defmt::{error, info, warn};
    use keypad_alarm_clock::{
        ClockConfig, Controller, GpioIndicators, GpioSegmentDisplay, MatrixKeypad, Multiplexer,
        Polarity, SharedClockState,
    };
    use rp_pico::hal::{
        clocks::init_clocks_and_plls,
        fugit::{MicrosDurationU32, MicrosDurationU64},
        gpio::{DynPinId, FunctionSioInput, FunctionSioOutput, Pin, PinState, PullDown, PullUp},
        sio::Sio,
        timer::{Alarm, Alarm0, Alarm1, Instant, Timer},
        watchdog::Watchdog,
    };

    type OutPin = Pin<DynPinId, FunctionSioOutput, PullDown>;
    type InPin = Pin<DynPinId, FunctionSioInput, PullUp>;
    type Keypad = MatrixKeypad<OutPin, InPin, Timer>;

    // Segments, position selects and LEDs are all active-low; this level keeps them dark.
    const DARK: PinState = PinState::High;

    // Shared resources (accessed by the interrupts and the main loop)
    #[shared]
    struct Shared {
        state: SharedClockState,
    }

    // Local resources (accessed by single tasks)
    #[local]
    struct Local {
        rtc_alarm: Alarm0,
        next_second: Instant,
        tick_period: MicrosDurationU64,
        refresh_alarm: Alarm1,
        refresh_period: MicrosDurationU32,
        multiplexer: Multiplexer,
        display: GpioSegmentDisplay<OutPin, OutPin>,
        controller: Controller<Keypad>,
        leds: GpioIndicators<OutPin>,
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        info!("alarm clock starting");
        let config = ClockConfig::DEFAULT;

        let mut pac = ctx.device;
        let mut watchdog = Watchdog::new(pac.WATCHDOG);
        let sio = Sio::new(pac.SIO);

        let external_xtal_freq_hz = 12_000_000u32;
        let clocks = init_clocks_and_plls(
            external_xtal_freq_hz,
            pac.XOSC,
            pac.CLOCKS,
            pac.PLL_SYS,
            pac.PLL_USB,
            &mut pac.RESETS,
            &mut watchdog,
        )
        .ok()
        .unwrap();

        let pins = rp_pico::Pins::new(
            pac.IO_BANK0,
            pac.PADS_BANK0,
            sio.gpio_bank0,
            &mut pac.RESETS,
        );

        // a, b, c, d, e, f, g, dp
        let segments = [
            pins.gpio0.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio1.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio2.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio3.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio4.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio5.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio6.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio7.into_push_pull_output_in_state(DARK).into_dyn_pin(),
        ];
        // minutes ones, minutes tens, hours ones, hours tens
        let positions = [
            pins.gpio8.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio9.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio10.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio11.into_push_pull_output_in_state(DARK).into_dyn_pin(),
        ];
        let rows = [
            pins.gpio12.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            pins.gpio13.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            pins.gpio14.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
            pins.gpio15.into_push_pull_output_in_state(PinState::High).into_dyn_pin(),
        ];
        let cols = [
            pins.gpio16.into_pull_up_input().into_dyn_pin(),
            pins.gpio17.into_pull_up_input().into_dyn_pin(),
            pins.gpio18.into_pull_up_input().into_dyn_pin(),
            pins.gpio19.into_pull_up_input().into_dyn_pin(),
        ];
        // alarm signal, alarm setting, clock setting, second
        let leds = [
            pins.gpio20.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio21.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio22.into_push_pull_output_in_state(DARK).into_dyn_pin(),
            pins.gpio26.into_push_pull_output_in_state(DARK).into_dyn_pin(),
        ];

        let mut timer = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

        // 1 Hz timekeeping, scheduled against the previous deadline so latency does not drift
        let tick_period = MicrosDurationU64::micros(config.tick_period_us);
        let mut rtc_alarm = timer.alarm_0().unwrap();
        let next_second = timer.get_counter() + tick_period;
        rtc_alarm.schedule_at(next_second).unwrap();
        rtc_alarm.enable_interrupt();

        let refresh_period = MicrosDurationU32::micros(config.refresh_period_us);
        let mut refresh_alarm = timer.alarm_1().unwrap();
        refresh_alarm.schedule(refresh_period).unwrap();
        refresh_alarm.enable_interrupt();

        let display = GpioSegmentDisplay::new(
            segments,
            positions,
            Polarity::ActiveLow,
            Polarity::ActiveLow,
        );
        let keypad = MatrixKeypad::new(rows, cols, timer, config.settle_us);

        info!("config: {}", config);

        (
            Shared {
                state: SharedClockState::new(),
            },
            Local {
                rtc_alarm,
                next_second,
                tick_period,
                refresh_alarm,
                refresh_period,
                multiplexer: Multiplexer::new(),
                display,
                controller: Controller::new(keypad, config.release_policy),
                leds: GpioIndicators::new(leds, Polarity::ActiveLow),
            },
            init::Monotonics(),
        )
    }

    // Main loop: keypad, mode machine, timekeeping, status LEDs
    #[idle(shared = [state], local = [controller, leds])]
    fn idle(mut ctx: idle::Context) -> ! {
        loop {
            if ctx
                .local
                .controller
                .step(&mut ctx.shared.state, ctx.local.leds)
                .is_err()
            {
                error!("main loop pass failed");
            }
        }
    }

    // Hardware Task: Timer Interrupt (1Hz)
    #[task(binds = TIMER_IRQ_0, priority = 2, shared = [state], local = [rtc_alarm, next_second, tick_period])]
    fn rtc_tick(mut ctx: rtc_tick::Context) {
        let alarm = ctx.local.rtc_alarm;
        alarm.clear_interrupt();
        *ctx.local.next_second = *ctx.local.next_second + *ctx.local.tick_period;
        if alarm.schedule_at(*ctx.local.next_second).is_err() {
            warn!("could not schedule next second");
        }

        ctx.shared.state.lock(|s| s.on_rtc_tick());
    }

    // Hardware Task: Timer Interrupt (~1kHz), one digit per call
    #[task(binds = TIMER_IRQ_1, priority = 1, shared = [state], local = [refresh_alarm, refresh_period, multiplexer, display])]
    fn refresh_display(mut ctx: refresh_display::Context) {
        ctx.local.refresh_alarm.clear_interrupt();
        ctx.local
            .refresh_alarm
            .schedule(*ctx.local.refresh_period)
            .ok();

        let readout = ctx.shared.state.lock(|s| s.readout());
        if ctx
            .local
            .multiplexer
            .refresh(readout, ctx.local.display)
            .is_err()
        {
            warn!("display refresh failed");
        }
    }
}
