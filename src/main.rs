//! House Energy entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::f64::consts::TAU;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use house_energy::gesture::GestureGate;
    use house_energy::sim::{
        ClickOutcome, FrameClock, SimEvent, SimulationSession, Snapshot, tick,
    };
    use house_energy::ui::{self, ConsumptionLevel};
    use house_energy::{HouseLayout, Settings};

    /// Host state wrapped around the simulation
    struct Game {
        session: SimulationSession,
        ctx: CanvasRenderingContext2d,
        clock: FrameClock,
        gesture: GestureGate,
        /// A requestAnimationFrame callback is pending
        loop_active: bool,
        /// Pending randomizer timeout handle
        chaos_timeout: Option<i32>,
    }

    impl Game {
        fn cancel_chaos(&mut self) {
            if let Some(handle) = self.chaos_timeout.take() {
                if let Some(window) = web_sys::window() {
                    window.clear_timeout_with_handle(handle);
                }
            }
        }

        /// Draw the house: device boxes, activation halo, player
        fn render(&self, snap: &Snapshot) {
            let ctx = &self.ctx;
            let canvas = self.session.canvas();
            ctx.set_fill_style_str("#0a1a26");
            ctx.fill_rect(0.0, 0.0, canvas.x as f64, canvas.y as f64);

            for (idx, device) in self.session.devices().iter().enumerate() {
                let on = snap.device_on.get(idx).copied().unwrap_or(false);
                if on {
                    ctx.set_fill_style_str("rgba(255,200,70,0.35)");
                    ctx.fill_rect(
                        (device.x - 18.0) as f64,
                        (device.y - 18.0) as f64,
                        (device.w + 36.0) as f64,
                        (device.h + 36.0) as f64,
                    );
                }
                ctx.set_fill_style_str(if on { "#ffeaa7" } else { "#c7d8e0" });
                ctx.fill_rect(device.x as f64, device.y as f64, device.w as f64, device.h as f64);
                ctx.set_fill_style_str("#9fb6c3");
                let _ = ctx.fill_text(
                    &device.label,
                    device.x as f64,
                    (device.y + device.h + 16.0) as f64,
                );
            }

            if let Some(idx) = snap.near_device {
                let center = self.session.devices()[idx].center();
                ctx.set_fill_style_str("rgba(120,194,168,0.25)");
                ctx.begin_path();
                let _ = ctx.arc(
                    center.x as f64,
                    center.y as f64,
                    self.session.settings().activation_radius as f64,
                    0.0,
                    TAU,
                );
                ctx.fill();
            }

            let bob = (snap.step_phase.sin() * 2.4) as f64;
            let player = self.session.player();
            ctx.set_fill_style_str("#ffdd88");
            ctx.begin_path();
            let _ = ctx.arc(
                snap.player.x as f64,
                snap.player.y as f64 + bob,
                player.radius as f64,
                0.0,
                TAU,
            );
            ctx.fill();
        }

        /// Update HUD elements in DOM
        fn update_hud(&self, snap: &Snapshot) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let settings = self.session.settings();

            set_text(&document, "powerW", &format!("{:.0}", snap.total_watts));
            set_text(&document, "energyWh", &ui::format_energy(snap.energy_wh));

            if let Some(el) = document.get_element_by_id("meterFill") {
                let pct = ui::meter_fraction(snap.total_watts, settings) * 100.0;
                let _ = el.set_attribute("style", &format!("width: {:.1}%", pct));
            }

            let level = ConsumptionLevel::from_watts(snap.total_watts, settings);
            set_text(&document, "consumptionStatus", level.label());
            if let Some(el) = document.get_element_by_id("consumptionStatus") {
                let class = match level {
                    ConsumptionLevel::High => "high",
                    ConsumptionLevel::Normal => "",
                };
                let _ = el.set_attribute("class", class);
            }

            let challenge = &snap.challenge;
            set_text(&document, "challengeTimer", &ui::format_countdown(challenge.remaining_secs));
            set_text(
                &document,
                "challengeThreshold",
                &format!("{:.0}", challenge.threshold_w),
            );
            set_text(&document, "challengeStatus", ui::challenge_status_text(challenge));

            if let Some(list) = document.get_element_by_id("deviceList") {
                let items: String = self
                    .session
                    .devices()
                    .iter()
                    .map(|d| {
                        format!(
                            "<li>{} - {}W <strong>{}</strong></li>",
                            d.label,
                            d.power,
                            if d.on { "ON" } else { "OFF" }
                        )
                    })
                    .collect();
                list.set_inner_html(&items);
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "visible" } else { "hidden" });
        }
    }

    fn show_result(outcome: &house_energy::sim::ChallengeOutcome) {
        let (title, message) = ui::result_text(outcome);
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            set_text(&document, "resultTitle", title);
            set_text(&document, "resultMessage", &message);
        }
        set_visible("resultModal", true);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("House Energy starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("houseCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let layout = HouseLayout::default();
        canvas.set_width(layout.canvas_width as u32);
        canvas.set_height(layout.canvas_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let session = SimulationSession::new(layout, settings.clone(), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let game = Rc::new(RefCell::new(Game {
            session,
            ctx,
            clock: FrameClock::new(),
            gesture: GestureGate::new(settings.gesture_cooldown_ms),
            loop_active: false,
            chaos_timeout: None,
        }));

        log::info!("Session initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_gesture_listener(game.clone());

        start_sim(game);

        log::info!("House Energy running!");
        Ok(())
    }

    /// Start the simulation and the frame loop if it is not already going
    fn start_sim(game: Rc<RefCell<Game>>) {
        let needs_frame = {
            let mut g = game.borrow_mut();
            g.session.start();
            g.clock.reset();
            !std::mem::replace(&mut g.loop_active, true)
        };
        if needs_frame {
            request_animation_frame(game);
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard: movement keys + E to toggle nearby devices
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "e" || key == "E" {
                    g.session.toggle_nearby();
                    event.prevent_default();
                    return;
                }
                if g.session.key_event(&key, true) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().session.key_event(&event.key(), false) {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click/tap toggles the device under the pointer (locked during a challenge)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let point = Vec2::new(
                    (event.client_x() as f64 - rect.left()) as f32,
                    (event.client_y() as f64 - rect.top()) as f32,
                );
                let outcome = game.borrow_mut().session.click_at(point);
                if outcome == ClickOutcome::Locked {
                    event.prevent_default();
                    set_visible("clickModal", true);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click("resetBtn", move |_| game.borrow_mut().session.reset());
        }

        // Arm a challenge and ask the player to confirm
        {
            let game = game.clone();
            on_click("challengeBtn", move |_| {
                {
                    let mut g = game.borrow_mut();
                    g.cancel_chaos();
                    g.session.start_default_challenge();
                }
                set_visible("resultModal", false);
                set_visible("clickModal", true);
                start_sim(game.clone());
            });
        }

        // Dismissing the prompt starts the countdown and the randomizer
        {
            let game = game.clone();
            on_click("clickModalClose", move |_| {
                set_visible("clickModal", false);
                let began = game.borrow_mut().session.begin_challenge();
                if began {
                    schedule_chaos(game.clone());
                }
            });
        }

        {
            let game = game.clone();
            on_click("resultRestart", move |_| {
                {
                    let mut g = game.borrow_mut();
                    g.cancel_chaos();
                    g.session.restart_challenge();
                }
                set_visible("resultModal", false);
                start_sim(game.clone());
                schedule_chaos(game.clone());
            });
        }

        on_click("resultClose", move |_| {
            let mut g = game.borrow_mut();
            g.cancel_chaos();
            g.session.stop_challenge();
            g.session.pause();
            set_visible("resultModal", false);
        });
    }

    /// External webcam code dispatches `house-gesture` on window when a
    /// raised hand is detected
    fn setup_gesture_listener(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if !g.gesture.try_accept(js_sys::Date::now()) {
                return;
            }
            let changed = g.session.force_all_off();
            log::info!("Gesture: all devices off (changed: {})", changed);
        });
        let _ = window
            .add_event_listener_with_callback("house-gesture", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Arm the next randomizer firing for the current challenge run
    fn schedule_chaos(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let (delay, generation) = {
            let mut g = game.borrow_mut();
            if !g.session.chaos_active() {
                return;
            }
            (g.session.next_chaos_delay_ms(), g.session.chaos_generation())
        };

        let game_cb = game.clone();
        let closure = Closure::once(move || {
            let still_current = {
                let mut g = game_cb.borrow_mut();
                g.chaos_timeout = None;
                g.session.chaos_fire(generation);
                g.session.chaos_active() && g.session.chaos_generation() == generation
            };
            if still_current {
                schedule_chaos(game_cb);
            }
        });
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay as i32,
        );
        closure.forget();

        if let Ok(handle) = handle {
            game.borrow_mut().chaos_timeout = Some(handle);
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let keep_running = {
            let mut g = game.borrow_mut();

            let max_dt = g.session.settings().max_frame_dt;
            let dt = g.clock.delta(time, max_dt);
            let report = tick(&mut g.session, dt);

            g.render(&report.snapshot);
            g.update_hud(&report.snapshot);

            for event in &report.events {
                match event {
                    SimEvent::ChallengeFinished(outcome) => {
                        g.cancel_chaos();
                        show_result(outcome);
                    }
                }
            }

            g.loop_active = report.keep_running;
            report.keep_running
        };

        if keep_running {
            request_animation_frame(game);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("House Energy (native) starting...");
    log::info!("Native mode runs a headless challenge - serve the wasm build for the full game");

    if let Err(e) = run_headless_challenge() {
        log::error!("Headless run failed: {}", e);
        std::process::exit(1);
    }
}

/// Walk to the kitchen, switch things on, then play one challenge with a
/// simulated randomizer timer
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_challenge() -> house_energy::Result<()> {
    use house_energy::sim::{SimEvent, SimulationSession, tick};
    use house_energy::ui;
    use house_energy::{HouseLayout, Settings};

    const FRAME: f32 = 1.0 / 60.0;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut session = SimulationSession::new(HouseLayout::default(), Settings::load(), seed)?;
    session.start();

    session.key_event("ArrowDown", true);
    session.key_event("ArrowRight", true);
    for _ in 0..90 {
        tick(&mut session, FRAME);
    }
    session.key_event("ArrowDown", false);
    session.key_event("ArrowRight", false);
    let flipped = session.toggle_nearby();
    let report = tick(&mut session, FRAME);
    log::info!(
        "Player at ({:.0}, {:.0}), toggled {} device(s), drawing {:.0} W",
        report.snapshot.player.x,
        report.snapshot.player.y,
        flipped,
        report.snapshot.total_watts
    );

    session.reset();
    session.start_default_challenge();
    session.begin_challenge();

    let mut until_fire = session.next_chaos_delay_ms() as f32 / 1000.0;
    loop {
        until_fire -= FRAME;
        if until_fire <= 0.0 {
            session.chaos_fire(session.chaos_generation());
            until_fire += session.next_chaos_delay_ms() as f32 / 1000.0;
        }

        // Keep the house under control the way a player would
        if session.total_watts() > session.settings().high_load_w {
            session.turn_off_lights();
        }

        let report = tick(&mut session, FRAME);
        for event in &report.events {
            let SimEvent::ChallengeFinished(outcome) = event;
            let (title, message) = ui::result_text(outcome);
            println!("{} {}", title, message);
        }
        if !report.keep_running {
            println!(
                "Final: {} left, {} Wh total",
                ui::format_countdown(report.snapshot.challenge.remaining_secs),
                ui::format_energy(report.snapshot.energy_wh)
            );
            break;
        }
    }

    Ok(())
}
