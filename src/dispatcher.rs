//! Main-loop consumer of the input pipeline.
//!
//! The [`Dispatcher`] owns the [`LightState`] and the pipeline's event
//! consumer. Each call to [`poll`](Dispatcher::poll):
//!
//! 1. drains the encoder accumulators and applies the ticks (colour knobs
//!    move by [`DispatchConfig::color_step`] per tick, the effect knob by one
//!    catalogue entry);
//! 2. drains the button queue (colour buttons jump to their preset, the
//!    effect button resets the effect);
//! 3. forwards to the collaborators, each on its own interval.
//!
//! # Forwarding
//!
//! | Target | Interval | Sends |
//! |--------|----------|-------|
//! | display | `display_interval_ms` | a render, only when the colour differs from the last render |
//! | light | `light_interval_ms` | the colour if it changed, otherwise the effect if it changed |
//! | log | `diagnostics_interval_ms` | a `debug` line with pipeline counters |
//!
//! The first poll is due on every interval. A light update that fails keeps
//! its change flag raised and is retried on the next interval. Collaborator
//! errors are logged and never stop the loop.
//!
//! # Example
//!
//! ```rust
//! use wled_knobs::{Channel, Dispatcher, DispatchConfig, InputPipeline, PipelineConfig};
//! use wled_knobs::hal::{MockDisplay, MockLightClient, MockPins};
//! use wled_knobs::quadrature::EncoderSample;
//!
//! let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
//! let mut pins = MockPins::new();
//!
//! // One detent clockwise on the red knob
//! for code in [0b01, 0b11, 0b10, 0b00] {
//!     pins.set_encoder(Channel::Red, EncoderSample::from_code(code));
//!     pipeline.on_encoder_edge(Channel::Red, &mut pins);
//! }
//!
//! let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
//! let report = dispatcher.poll(0, &mut MockDisplay::new(), &mut MockLightClient::new());
//!
//! assert_eq!(dispatcher.state().color().r, 5);
//! assert!(report.rendered);
//! ```

use core::fmt::Debug;

use crate::accumulator::EncoderDeltas;
use crate::channel::Channel;
use crate::config::DispatchConfig;
use crate::pipeline::InputPipeline;
use crate::queue::{EventConsumer, DEFAULT_QUEUE_SIZE};
use crate::state::{LightState, Rgb};
use crate::traits::{LightClient, LightDisplay};

/// Update sent to the light controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightUpdate {
    /// Solid colour.
    Color(Rgb),
    /// Effect id.
    Effect(u8),
}

/// What one [`Dispatcher::poll`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PollReport {
    /// Encoder ticks applied this iteration.
    pub ticks: EncoderDeltas,
    /// Button events taken from the queue.
    pub events: usize,
    /// The display was re-rendered.
    pub rendered: bool,
    /// Light update that went through, if any.
    pub light: Option<LightUpdate>,
    /// A light update was attempted and failed.
    pub light_failed: bool,
    /// A diagnostics line was logged.
    pub diagnostics: bool,
}

/// Interval gate keyed on the last time it opened.
#[derive(Clone, Copy, Debug, Default)]
struct IntervalGate {
    last_ms: Option<u64>,
}

impl IntervalGate {
    /// Opens (and restarts) if `interval_ms` has elapsed or it never opened.
    fn ready(&mut self, now_ms: u64, interval_ms: u64) -> bool {
        let due = self
            .last_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= interval_ms);
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }
}

/// Main-loop consumer that turns pipeline output into light updates.
pub struct Dispatcher<'a, const N: usize = DEFAULT_QUEUE_SIZE> {
    pipeline: &'a InputPipeline<N>,
    events: EventConsumer<'a, N>,
    config: DispatchConfig,
    state: LightState,
    rendered_color: Option<Rgb>,
    display_gate: IntervalGate,
    light_gate: IntervalGate,
    diagnostics_gate: IntervalGate,
}

impl<'a, const N: usize> Dispatcher<'a, N> {
    /// Creates a dispatcher and claims the pipeline's event consumer.
    ///
    /// Returns `None` if the consumer is already claimed elsewhere.
    pub fn new(pipeline: &'a InputPipeline<N>, config: DispatchConfig) -> Option<Self> {
        Self::with_state(pipeline, config, LightState::new())
    }

    /// Like [`new`](Self::new), starting from an existing light state.
    pub fn with_state(
        pipeline: &'a InputPipeline<N>,
        config: DispatchConfig,
        state: LightState,
    ) -> Option<Self> {
        let events = pipeline.consumer()?;
        Some(Self {
            pipeline,
            events,
            config,
            state,
            rendered_color: None,
            display_gate: IntervalGate::default(),
            light_gate: IntervalGate::default(),
            diagnostics_gate: IntervalGate::default(),
        })
    }

    /// Current light state.
    pub fn state(&self) -> &LightState {
        &self.state
    }

    /// Mutable light state, for changes that do not come from the knobs.
    pub fn state_mut(&mut self) -> &mut LightState {
        &mut self.state
    }

    /// The pipeline this dispatcher consumes.
    pub fn pipeline(&self) -> &'a InputPipeline<N> {
        self.pipeline
    }

    /// Dispatch configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Runs one main-loop iteration.
    pub fn poll<D, L>(&mut self, now_ms: u64, display: &mut D, light: &mut L) -> PollReport
    where
        D: LightDisplay,
        D::Error: Debug,
        L: LightClient,
        L::Error: Debug,
    {
        let mut report = PollReport::default();

        if let Some(ticks) = self.pipeline.drain_encoders() {
            self.apply_ticks(&ticks);
            report.ticks = ticks;
        }

        report.events = self.handle_events();

        if self.display_gate.ready(now_ms, self.config.display_interval_ms) {
            report.rendered = self.refresh_display(display);
        }

        if self.light_gate.ready(now_ms, self.config.light_interval_ms) {
            match self.forward_light(light) {
                Ok(update) => report.light = update,
                Err(()) => report.light_failed = true,
            }
        }

        if self
            .diagnostics_gate
            .ready(now_ms, self.config.diagnostics_interval_ms)
        {
            self.log_diagnostics(now_ms);
            report.diagnostics = true;
        }

        report
    }

    // ========================================================================
    // Input handling
    // ========================================================================

    fn apply_ticks(&mut self, ticks: &EncoderDeltas) {
        let step = self.config.color_step;
        self.state.adjust_color(
            ticks.get(Channel::Red).saturating_mul(step),
            ticks.get(Channel::Green).saturating_mul(step),
            ticks.get(Channel::Blue).saturating_mul(step),
        );
        self.state.adjust_effect(ticks.get(Channel::Effect));
    }

    fn handle_events(&mut self) -> usize {
        let mut handled = 0;
        for event in self.events.drain() {
            handled += 1;
            if !event.is_press() {
                continue;
            }
            match event.channel {
                Channel::Effect => self.state.reset_effect(),
                channel => {
                    self.state.apply_preset(channel);
                }
            }
        }
        handled
    }

    // ========================================================================
    // Forwarding
    // ========================================================================

    fn refresh_display<D>(&mut self, display: &mut D) -> bool
    where
        D: LightDisplay,
        D::Error: Debug,
    {
        let color = self.state.color();
        if self.rendered_color == Some(color) {
            return false;
        }
        match display.render(&self.state) {
            Ok(()) => {
                self.rendered_color = Some(color);
                true
            }
            Err(e) => {
                log::warn!("display render failed: {:?}", e);
                false
            }
        }
    }

    fn forward_light<L>(&mut self, light: &mut L) -> Result<Option<LightUpdate>, ()>
    where
        L: LightClient,
        L::Error: Debug,
    {
        let update = if self.state.color_changed() {
            LightUpdate::Color(self.state.color())
        } else if self.state.effect_changed() {
            LightUpdate::Effect(self.state.effect())
        } else {
            return Ok(None);
        };

        let result = match update {
            LightUpdate::Color(color) => light.set_color(color),
            LightUpdate::Effect(index) => light.set_effect(index),
        };

        match result {
            Ok(()) => {
                match update {
                    LightUpdate::Color(_) => self.state.clear_color_changed(),
                    LightUpdate::Effect(_) => self.state.clear_effect_changed(),
                }
                log::debug!("light updated: {:?}", update);
                Ok(Some(update))
            }
            Err(e) => {
                log::warn!("light update {:?} failed: {:?}", update, e);
                Err(())
            }
        }
    }

    fn log_diagnostics(&self, now_ms: u64) {
        let diag = self.pipeline.diagnostics();
        let color = self.state.color();
        log::debug!(
            "t={}ms irq={} debounce={} push={}/{} pop={}/{} dropped={} queued={} last_push={:?} last_pop={:?}",
            now_ms,
            diag.interrupt_calls,
            diag.debounce_checks,
            diag.queue.push_successes,
            diag.queue.push_attempts,
            diag.queue.pop_successes,
            diag.queue.pop_attempts,
            diag.queue.dropped,
            diag.queued,
            diag.queue.last_pushed,
            diag.queue.last_popped,
        );
        log::debug!(
            "rgb=({},{},{}) effect={} ({})",
            color.r,
            color.g,
            color.b,
            self.state.effect(),
            self.state.effect_name(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::debounce::ButtonLevel;
    use crate::hal::{MockDelay, MockDisplay, MockLightClient, MockPins};
    use crate::quadrature::EncoderSample;

    fn detent(pipeline: &InputPipeline, pins: &mut MockPins, channel: Channel, forward: bool) {
        let codes: [u8; 4] = if forward {
            [0b01, 0b11, 0b10, 0b00]
        } else {
            [0b10, 0b11, 0b01, 0b00]
        };
        for code in codes {
            pins.set_encoder(channel, EncoderSample::from_code(code));
            pipeline.on_encoder_edge(channel, pins);
        }
    }

    fn press(pipeline: &InputPipeline, pins: &mut MockPins, channel: Channel, now_ms: u64) {
        pins.set_button(channel, ButtonLevel::Pressed);
        pipeline.on_button_edge(channel, pins, &mut MockDelay::new(), now_ms);
        pins.set_button(channel, ButtonLevel::Released);
        pipeline.on_button_edge(channel, pins, &mut MockDelay::new(), now_ms + 100);
    }

    #[test]
    fn second_dispatcher_cannot_claim_consumer() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let first = Dispatcher::new(&pipeline, DispatchConfig::default());
        assert!(first.is_some());
        assert!(Dispatcher::new(&pipeline, DispatchConfig::default()).is_none());
    }

    #[test]
    fn ticks_scale_by_color_step() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut pins = MockPins::new();
        detent(&pipeline, &mut pins, Channel::Green, true);
        detent(&pipeline, &mut pins, Channel::Green, true);

        let config = DispatchConfig::default().with_color_step(7);
        let mut dispatcher = Dispatcher::new(&pipeline, config).unwrap();
        let report = dispatcher.poll(0, &mut MockDisplay::new(), &mut MockLightClient::new());

        assert_eq!(report.ticks.get(Channel::Green), 2);
        assert_eq!(dispatcher.state().color(), Rgb::new(0, 14, 0));
    }

    #[test]
    fn effect_knob_wraps() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut pins = MockPins::new();
        detent(&pipeline, &mut pins, Channel::Effect, false);

        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut light = MockLightClient::new();
        let report = dispatcher.poll(0, &mut MockDisplay::new(), &mut light);

        assert_eq!(dispatcher.state().effect(), 9);
        assert_eq!(report.light, Some(LightUpdate::Effect(9)));
        assert_eq!(light.effects, [9]);
    }

    #[test]
    fn buttons_apply_presets_and_reset_effect() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut pins = MockPins::new();
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        dispatcher.state_mut().set_effect(4);

        press(&pipeline, &mut pins, Channel::Red, 0);
        press(&pipeline, &mut pins, Channel::Effect, 10);

        let report = dispatcher.poll(0, &mut MockDisplay::new(), &mut MockLightClient::new());
        assert_eq!(report.events, 2);
        assert_eq!(dispatcher.state().color(), Rgb::new(150, 0, 0));
        assert_eq!(dispatcher.state().effect(), 0);
    }

    #[test]
    fn display_only_renders_colour_changes_within_interval() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut pins = MockPins::new();
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut display = MockDisplay::new();
        let mut light = MockLightClient::new();

        // First poll always renders
        assert!(dispatcher.poll(0, &mut display, &mut light).rendered);
        // Same colour, interval elapsed: nothing to draw
        assert!(!dispatcher.poll(40, &mut display, &mut light).rendered);

        detent(&pipeline, &mut pins, Channel::Blue, true);
        // Colour changed but interval not elapsed since the 40ms gate
        assert!(!dispatcher.poll(50, &mut display, &mut light).rendered);
        assert!(dispatcher.poll(73, &mut display, &mut light).rendered);

        assert_eq!(display.render_count, 2);
        assert_eq!(display.last_state.unwrap().color(), Rgb::new(0, 0, 5));
    }

    #[test]
    fn colour_takes_precedence_over_effect() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut display = MockDisplay::new();
        let mut light = MockLightClient::new();

        dispatcher.state_mut().set_color(Rgb::new(1, 1, 1));
        dispatcher.state_mut().set_effect(3);

        let first = dispatcher.poll(0, &mut display, &mut light);
        assert_eq!(first.light, Some(LightUpdate::Color(Rgb::new(1, 1, 1))));

        // Effect waits for the next light interval
        assert_eq!(dispatcher.poll(100, &mut display, &mut light).light, None);
        let second = dispatcher.poll(150, &mut display, &mut light);
        assert_eq!(second.light, Some(LightUpdate::Effect(3)));

        assert_eq!(dispatcher.poll(300, &mut display, &mut light).light, None);
    }

    #[test]
    fn failed_light_update_is_retried() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut display = MockDisplay::new();
        let mut light = MockLightClient::failing(1);

        dispatcher.state_mut().set_color(Rgb::new(0, 150, 0));

        let first = dispatcher.poll(0, &mut display, &mut light);
        assert!(first.light_failed);
        assert!(dispatcher.state().color_changed());

        let retry = dispatcher.poll(150, &mut display, &mut light);
        assert_eq!(retry.light, Some(LightUpdate::Color(Rgb::new(0, 150, 0))));
        assert!(!dispatcher.state().color_changed());
        assert_eq!(light.attempts, 2);
    }

    #[test]
    fn display_failure_does_not_stop_light_updates() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut display = MockDisplay {
            fail: true,
            ..MockDisplay::default()
        };
        let mut light = MockLightClient::new();
        dispatcher.state_mut().set_effect(2);

        let report = dispatcher.poll(0, &mut display, &mut light);
        assert!(!report.rendered);
        assert_eq!(report.light, Some(LightUpdate::Effect(2)));
    }

    #[test]
    fn diagnostics_interval() {
        let pipeline: InputPipeline = InputPipeline::new(PipelineConfig::new());
        let mut dispatcher = Dispatcher::new(&pipeline, DispatchConfig::default()).unwrap();
        let mut display = MockDisplay::new();
        let mut light = MockLightClient::new();

        assert!(dispatcher.poll(0, &mut display, &mut light).diagnostics);
        assert!(!dispatcher.poll(4_999, &mut display, &mut light).diagnostics);
        assert!(dispatcher.poll(5_000, &mut display, &mut light).diagnostics);
    }
}
