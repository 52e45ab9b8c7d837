//! Integration tests for the main-loop dispatcher driven by simulated knobs

use wled_knobs::{
    hal::{MockClock, MockDelay, MockDisplay, MockLightClient, MockPins},
    ButtonLevel, Channel, Clock, DispatchConfig, Dispatcher, EncoderSample, InputPipeline,
    LightUpdate, PipelineConfig, Rgb,
};

const FORWARD: [u8; 4] = [0b01, 0b11, 0b10, 0b00];
const REVERSE: [u8; 4] = [0b10, 0b11, 0b01, 0b00];

/// Knob box on a desk: pins, a clock, and the collaborators.
struct Rig {
    pins: MockPins,
    delay: MockDelay,
    clock: MockClock,
    display: MockDisplay,
    light: MockLightClient,
}

impl Rig {
    fn new() -> Self {
        Self {
            pins: MockPins::new(),
            delay: MockDelay::new(),
            clock: MockClock::new(),
            display: MockDisplay::new(),
            light: MockLightClient::new(),
        }
    }

    fn turn(&mut self, pipeline: &InputPipeline, channel: Channel, detents: i32) {
        let codes = if detents >= 0 { FORWARD } else { REVERSE };
        for _ in 0..detents.unsigned_abs() {
            for code in codes {
                self.pins.set_encoder(channel, EncoderSample::from_code(code));
                pipeline.on_encoder_edge(channel, &mut self.pins);
            }
        }
    }

    fn click(&mut self, pipeline: &InputPipeline, channel: Channel) {
        let now = self.clock.now_ms();
        self.pins.set_button(channel, ButtonLevel::Pressed);
        pipeline.on_button_edge(channel, &mut self.pins, &mut self.delay, now);
        self.pins.set_button(channel, ButtonLevel::Released);
        pipeline.on_button_edge(channel, &mut self.pins, &mut self.delay, now + 60);
    }

    /// Polls every 5 ms for `duration_ms`.
    fn run(&mut self, dispatcher: &mut Dispatcher<'_>, duration_ms: u64) {
        let end = self.clock.now_ms() + duration_ms;
        while self.clock.now_ms() < end {
            dispatcher.poll(self.clock.now_ms(), &mut self.display, &mut self.light);
            self.clock.advance(5);
        }
    }
}

#[test]
fn turning_red_sends_one_colour_update() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();

    rig.turn(&pipeline, Channel::Red, 3);
    rig.run(&mut dispatcher, 500);

    assert_eq!(rig.light.colors, vec![Rgb::new(15, 0, 0)]);
    assert!(rig.light.effects.is_empty());
    assert_eq!(rig.display.render_count, 1);
    assert!(!dispatcher.state().color_changed());
}

#[test]
fn updates_within_one_window_are_coalesced() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();

    // Window opens at t=0 with nothing pending
    rig.run(&mut dispatcher, 10);
    rig.turn(&pipeline, Channel::Green, 2);
    rig.run(&mut dispatcher, 50);
    rig.turn(&pipeline, Channel::Green, 2);
    rig.run(&mut dispatcher, 200);

    assert_eq!(rig.light.colors, vec![Rgb::new(0, 20, 0)]);
}

#[test]
fn preset_then_effect_arrive_in_separate_windows() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();

    rig.click(&pipeline, Channel::Blue);
    rig.turn(&pipeline, Channel::Effect, 2);
    rig.run(&mut dispatcher, 10);

    // Colour wins the first window
    assert_eq!(rig.light.colors, vec![Rgb::new(0, 0, 150)]);
    assert!(rig.light.effects.is_empty());

    rig.run(&mut dispatcher, 200);
    assert_eq!(rig.light.effects, vec![2]);
    assert_eq!(dispatcher.state().effect_name(), "Rainbow");
}

#[test]
fn effect_knob_wraps_backwards_and_press_resets() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();

    rig.turn(&pipeline, Channel::Effect, -1);
    rig.run(&mut dispatcher, 10);
    assert_eq!(dispatcher.state().effect(), 9);
    assert_eq!(rig.light.effects, vec![9]);

    rig.click(&pipeline, Channel::Effect);
    rig.run(&mut dispatcher, 200);
    assert_eq!(dispatcher.state().effect(), 0);
    assert_eq!(rig.light.effects, vec![9, 0]);
}

#[test]
fn wled_outage_is_retried_until_it_recovers() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();
    rig.light = MockLightClient::failing(3);

    rig.turn(&pipeline, Channel::Red, 1);
    // Windows at 0, 150, 300 fail; 450 succeeds
    rig.run(&mut dispatcher, 500);

    assert_eq!(rig.light.attempts, 4);
    assert_eq!(rig.light.colors, vec![Rgb::new(5, 0, 0)]);
}

#[test]
fn report_describes_the_iteration() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
    let mut rig = Rig::new();

    rig.turn(&pipeline, Channel::Red, 1);
    rig.click(&pipeline, Channel::Green);

    let report = dispatcher.poll(0, &mut rig.display, &mut rig.light);

    assert_eq!(report.ticks.get(Channel::Red), 1);
    assert_eq!(report.events, 1);
    assert!(report.rendered);
    // Preset replaces the ticked colour before forwarding
    assert_eq!(report.light, Some(LightUpdate::Color(Rgb::new(0, 150, 0))));
    assert!(!report.light_failed);
    assert!(report.diagnostics);

    let idle = dispatcher.poll(1, &mut rig.display, &mut rig.light);
    assert!(idle.ticks.is_zero());
    assert_eq!(idle.events, 0);
    assert!(!idle.rendered);
    assert_eq!(idle.light, None);
}

#[test]
fn colour_saturates_at_knob_limits() {
    let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
    let config = DispatchConfig::default().with_color_step(100);
    let mut dispatcher = Dispatcher::new(&pipeline, config).unwrap();
    let mut rig = Rig::new();

    rig.turn(&pipeline, Channel::Blue, 5);
    rig.turn(&pipeline, Channel::Red, -2);
    rig.run(&mut dispatcher, 10);

    assert_eq!(dispatcher.state().color(), Rgb::new(0, 0, 255));
}
