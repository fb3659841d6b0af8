use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::{InputAction, InputSnapshot, Renderer, StateMachine, StepOutcome, Surface, Vec2};

pub const SLOW_FRAME_ENV_VAR: &str = "SEASHORE_SLOW_FRAME_MS";

const CLEAR_COLOR: [u8; 4] = [12, 14, 20, 255];

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub logical_width: u32,
    pub logical_height: u32,
    pub target_tps: u32,
    /// Tick rate at which `InputSnapshot::dt` equals `1.0`.
    pub dt_reference_fps: f32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Seashore".to_string(),
            window_width: 1280,
            window_height: 720,
            logical_width: 320,
            logical_height: 180,
            target_tps: 60,
            dt_reference_fps: 60.0,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(5),
            simulated_slow_frame_ms: 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Drives `machine` with fixed simulation ticks until a state asks to exit
/// or the window closes.
pub fn run_app(config: LoopConfig, mut machine: StateMachine) -> Result<(), AppError> {
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(
        Arc::clone(&window),
        config.logical_width,
        config.logical_height,
    )
    .map_err(AppError::CreateRenderer)?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let tick_dt = tick_dt_scalar(fixed_dt, config.dt_reference_fps);
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);

    info!(
        target_tps,
        tick_dt,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        logical_width = config.logical_width,
        logical_height = config.logical_height,
        "loop_config"
    );

    let mut surface = Surface::new(config.logical_width, config.logical_height);
    let mut input_collector = InputCollector::default();
    let mut last_input = InputSnapshot::empty().with_dt(tick_dt);
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsAccumulator::new(metrics_log_interval);
    let mut last_applied_title: Option<String> = None;
    let window_for_loop = Arc::clone(&window);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let logical =
                            renderer.window_to_logical(position.x as f32, position.y as f32);
                        input_collector.set_cursor_position_px(logical);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.set_cursor_position_px(None);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let is_pressed = event.state == ElementState::Pressed;
                        input_collector.update_action_state_from_physical_key(
                            event.physical_key,
                            is_pressed,
                        );
                    }
                    WindowEvent::RedrawRequested => {
                        if slow_frame_delay > Duration::ZERO {
                            // Explicit debug perturbation only.
                            thread::sleep(slow_frame_delay);
                        }

                        let now = Instant::now();
                        let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                        last_frame_instant = now;
                        accumulator = accumulator
                            .saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                        for _ in 0..step_plan.ticks_to_run {
                            let input_snapshot = input_collector.snapshot_for_tick(tick_dt);
                            match machine.update(&input_snapshot) {
                                Ok(StepOutcome::Continue) | Ok(StepOutcome::Switched(_)) => {}
                                Ok(StepOutcome::Exit) => {
                                    info!(reason = "state_exit", "shutdown_requested");
                                    window_target.exit();
                                    return;
                                }
                                Err(build_error) => {
                                    error!(error = %build_error, "state_build_failed");
                                    window_target.exit();
                                    return;
                                }
                            }
                            last_input = input_snapshot;
                            metrics.record_tick();
                        }
                        accumulator = step_plan.remaining_accumulator;
                        if step_plan.dropped_backlog > Duration::ZERO {
                            warn!(
                                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                                max_ticks_per_frame, "sim_clamp_triggered"
                            );
                        }

                        surface.clear(CLEAR_COLOR);
                        machine.draw(&mut surface, &last_input);
                        if let Err(error) = renderer.present(&surface) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        let next_title = machine.debug_title();
                        if next_title != last_applied_title {
                            let title = match &next_title {
                                Some(name) => format!("{} - {name}", config.window_title),
                                None => config.window_title.clone(),
                            };
                            window_for_loop.set_title(&title);
                            last_applied_title = next_title;
                        }

                        metrics.record_frame(raw_frame_dt);
                        if let Some(snapshot) = metrics.maybe_snapshot(now) {
                            info!(
                                fps = snapshot.fps,
                                tps = snapshot.tps,
                                frame_time_ms = snapshot.frame_time_ms,
                                worst_frame_ms = snapshot.worst_frame_ms,
                                state = ?machine.active_key(),
                                "loop_metrics"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

#[derive(Debug, Default)]
struct InputCollector {
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    left_click_pressed_edge: bool,
}

impl InputCollector {
    fn update_action_state_from_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        let action = match key {
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                InputAction::MoveLeft
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                InputAction::MoveRight
            }
            PhysicalKey::Code(KeyCode::Space) => InputAction::Jump,
            PhysicalKey::Code(KeyCode::KeyE) => InputAction::Interact,
            PhysicalKey::Code(KeyCode::Escape) => InputAction::Pause,
            _ => return,
        };
        self.action_states.set(action, is_pressed);
    }

    fn set_cursor_position_px(&mut self, position: Option<(f32, f32)>) {
        self.cursor_position_px = position.map(|(x, y)| Vec2::new(x, y));
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => {
                if !self.left_mouse_is_down {
                    self.left_click_pressed_edge = true;
                }
                self.left_mouse_is_down = true;
            }
            ElementState::Released => self.left_mouse_is_down = false,
        }
    }

    fn snapshot_for_tick(&mut self, dt: f32) -> InputSnapshot {
        let snapshot = InputSnapshot::new(
            self.action_states,
            dt,
            self.cursor_position_px,
            self.left_click_pressed_edge,
        );
        self.action_states.clear_edges();
        self.left_click_pressed_edge = false;
        snapshot
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::replace(&mut accumulator, Duration::ZERO)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn tick_dt_scalar(fixed_dt: Duration, reference_fps: f32) -> f32 {
    let reference_fps = if reference_fps.is_finite() && reference_fps > 0.0 {
        reference_fps
    } else {
        60.0
    };
    fixed_dt.as_secs_f32() * reference_fps
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    match env::var(SLOW_FRAME_ENV_VAR) {
        Ok(value) => match value.parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = value.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                Duration::from_millis(config_slow_frame_ms)
            }
        },
        Err(env::VarError::NotPresent) => Duration::from_millis(config_slow_frame_ms),
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            Duration::from_millis(config_slow_frame_ms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_plan_runs_whole_ticks_and_keeps_remainder() {
        let plan = plan_sim_steps(Duration::from_millis(40), Duration::from_millis(16), 5);
        assert_eq!(plan.ticks_to_run, 2);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn step_plan_drops_backlog_past_tick_cap() {
        let plan = plan_sim_steps(Duration::from_millis(200), Duration::from_millis(16), 3);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(152));
    }

    #[test]
    fn tick_dt_is_one_at_reference_rate() {
        let dt = tick_dt_scalar(Duration::from_secs_f64(1.0 / 60.0), 60.0);
        assert!((dt - 1.0).abs() < 0.0001);
        let half = tick_dt_scalar(Duration::from_secs_f64(1.0 / 120.0), 60.0);
        assert!((half - 0.5).abs() < 0.0001);
    }

    #[test]
    fn movement_keys_map_to_actions() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyA), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::ArrowRight), true);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Space), true);

        let snapshot = input.snapshot_for_tick(1.0);
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.was_pressed(InputAction::Jump));
    }

    #[test]
    fn key_edges_last_a_single_tick() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyE), true);
        let first = input.snapshot_for_tick(1.0);
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::KeyE), true);
        let second = input.snapshot_for_tick(1.0);

        assert!(first.was_pressed(InputAction::Interact));
        assert!(!second.was_pressed(InputAction::Interact));
        assert!(second.is_down(InputAction::Interact));
    }

    #[test]
    fn escape_maps_to_pause_not_quit() {
        let mut input = InputCollector::default();
        input.update_action_state_from_physical_key(PhysicalKey::Code(KeyCode::Escape), true);
        assert!(input.snapshot_for_tick(1.0).was_pressed(InputAction::Pause));
    }

    #[test]
    fn left_click_is_edge_triggered_for_single_tick() {
        let mut input = InputCollector::default();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick(1.0);
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.snapshot_for_tick(1.0);

        assert!(first.left_click_pressed());
        assert!(!second.left_click_pressed());
    }
}
