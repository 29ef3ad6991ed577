//! Sharky entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent};

    use sharky::audio::AudioManager;
    use sharky::sim::{Drawable, EntityKind, GamePhase, TickInput, World};
    use sharky::{HighScores, Settings};

    /// Game instance holding all state
    struct Game {
        world: World,
        settings: Settings,
        highscores: HighScores,
        audio: AudioManager,
        ctx: CanvasRenderingContext2d,
        input: TickInput,
        last_time: f64,
        /// Highscore already recorded for the current session
        recorded: bool,
        last_rank: Option<usize>,
    }

    impl Game {
        /// Advance and draw one animation frame
        fn frame(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                (time - self.last_time) as f32
            } else {
                0.0
            };
            self.last_time = time;

            self.world.update(dt, &self.input);
            // Pause is a one-shot input
            self.input.pause = false;

            let events = self.world.drain_events();
            self.audio.play_events(&events);

            if self.world.is_over() && !self.recorded {
                self.record_highscore();
            }
            self.render();
        }

        fn record_highscore(&mut self) {
            self.recorded = true;
            let when = String::from(js_sys::Date::new_0().to_iso_string());
            let record = self
                .world
                .highscore_record(&self.settings.player_name, &when);
            log::info!(
                "Run finished: score {}, final {}",
                record.score,
                record.final_score
            );
            self.last_rank = self.highscores.add_record(record);
            if let Err(e) = self.highscores.save() {
                log::warn!("Could not save high scores: {}", e);
            }
        }

        /// New session with a fresh layout
        fn restart(&mut self) {
            self.world.restart_with_seed(js_sys::Date::now() as u64);
            self.input = TickInput::default();
            self.recorded = false;
            self.last_rank = None;
        }

        fn render(&self) {
            let ctx = &self.ctx;
            let canvas = self.world.canvas();
            let (w, h) = (canvas.x as f64, canvas.y as f64);

            ctx.set_fill_style_str(if self.settings.dark_mode {
                "#06141f"
            } else {
                "#1b6ca8"
            });
            ctx.fill_rect(0.0, 0.0, w, h);

            for drawable in self.world.drawables() {
                draw_placeholder(ctx, &drawable);
            }

            self.draw_hud(w);

            match self.world.phase {
                GamePhase::GameOver => self.draw_overlay("GAME OVER", w, h),
                GamePhase::Victory => self.draw_overlay("VICTORY!", w, h),
                GamePhase::Running if self.world.paused => {
                    ctx.set_fill_style_str("rgba(0,0,0,0.4)");
                    ctx.fill_rect(0.0, 0.0, w, h);
                    ctx.set_fill_style_str("white");
                    ctx.set_text_align("center");
                    ctx.set_font("32px sans-serif");
                    let _ = ctx.fill_text("Paused", w / 2.0, h / 2.0);
                }
                GamePhase::Running => {}
            }
        }

        fn draw_hud(&self, w: f64) {
            let ctx = &self.ctx;
            let world = &self.world;
            ctx.set_fill_style_str("white");
            ctx.set_text_align("left");
            ctx.set_font("16px sans-serif");
            let secs = world.elapsed_ms / 1000.0;
            let _ = ctx.fill_text(&format!("Score: {}", world.score), 10.0, 22.0);
            let _ = ctx.fill_text(&format!("Eaten: {}", world.enemies_eaten), 10.0, 42.0);
            if let Some(best) = self.highscores.top_score() {
                let _ = ctx.fill_text(&format!("Best: {}", best), 10.0, 82.0);
            }
            let _ = ctx.fill_text(
                &format!("Time: {}:{:02}", (secs / 60.0) as u32, secs as u32 % 60),
                10.0,
                62.0,
            );

            if world.preset.boss_trigger_score.is_some() && !world.boss_active {
                let bar_w = 160.0;
                let x = w - bar_w - 10.0;
                ctx.set_fill_style_str("rgba(0,0,0,0.5)");
                ctx.fill_rect(x, 10.0, bar_w, 10.0);
                ctx.set_fill_style_str("#f1c40f");
                ctx.fill_rect(x, 10.0, bar_w * world.boss_progress() as f64, 10.0);
            }
        }

        fn draw_overlay(&self, title: &str, w: f64, h: f64) {
            let ctx = &self.ctx;
            ctx.set_fill_style_str("rgba(0,0,0,0.6)");
            ctx.fill_rect(0.0, 0.0, w, h);
            ctx.set_fill_style_str("white");
            ctx.set_text_align("center");
            ctx.set_font("40px sans-serif");
            let _ = ctx.fill_text(title, w / 2.0, h / 2.0 - 80.0);

            ctx.set_font("18px sans-serif");
            let summary = self.world.summary();
            let _ = ctx.fill_text(
                &format!(
                    "Score {}  |  Eaten {}  |  {:.0}s",
                    summary.score,
                    summary.enemies_eaten,
                    summary.elapsed_ms / 1000.0
                ),
                w / 2.0,
                h / 2.0 - 40.0,
            );
            if let Some(rank) = self.last_rank {
                let _ = ctx.fill_text(&format!("New highscore rank #{}", rank), w / 2.0, h / 2.0 - 15.0);
            }

            ctx.set_font("14px sans-serif");
            for (i, rec) in self.highscores.top(5, false).iter().enumerate() {
                let _ = ctx.fill_text(
                    &format!(
                        "{}. {} - {} ({})",
                        i + 1,
                        rec.name,
                        rec.final_score,
                        rec.difficulty.as_str()
                    ),
                    w / 2.0,
                    h / 2.0 + 15.0 + i as f64 * 20.0,
                );
            }
            let _ = ctx.fill_text("Press R to restart", w / 2.0, h / 2.0 + 130.0);
        }
    }

    /// Sprite stand-in: a tinted box per entity kind
    fn draw_placeholder(ctx: &CanvasRenderingContext2d, d: &Drawable) {
        let color = match d.kind {
            EntityKind::Player => "#3498db",
            EntityKind::Puffer => "#e67e22",
            EntityKind::Jelly => "#e84393",
            EntityKind::Boss => "#8e44ad",
            EntityKind::Bubble => "rgba(255,255,255,0.6)",
        };
        let (x, y, w, h) = (d.x as f64, d.y as f64, d.width as f64, d.height as f64);
        ctx.set_fill_style_str(color);
        ctx.fill_rect(x, y, w, h);

        // Eye marks the facing side
        let eye_x = if d.flip_x { x + w * 0.2 } else { x + w * 0.8 };
        ctx.set_fill_style_str("white");
        ctx.fill_rect(eye_x - 2.0, y + h * 0.35, 4.0, 4.0);

        if d.kind == EntityKind::Boss {
            if let Some(frac) = d.health_fraction {
                let bar_w = w.max(60.0);
                let bx = x + (w - bar_w) / 2.0;
                let by = y - 18.0;
                ctx.set_fill_style_str("rgba(0,0,0,0.6)");
                ctx.fill_rect(bx - 1.0, by - 1.0, bar_w + 2.0, 10.0);
                ctx.set_fill_style_str("red");
                ctx.fill_rect(bx, by, bar_w * frac as f64, 8.0);
            }
        }
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Sharky starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let config = settings.world_config(canvas.width() as f32, canvas.height() as f32, seed);
        let mut world = World::new(config);
        world.start();

        let game = Rc::new(RefCell::new(Game {
            world,
            highscores: HighScores::load(),
            audio: AudioManager::new(settings.effective_sfx_volume()),
            settings,
            ctx,
            input: TickInput::default(),
            last_time: 0.0,
            recorded: false,
            last_rank: None,
        }));

        setup_keyboard(&window, game.clone())?;
        setup_auto_pause(&window, game.clone())?;
        request_animation_frame(game);
        log::info!("Sharky running with seed {}", seed);
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                let key = event.key().to_lowercase();
                match key.as_str() {
                    "p" | "escape" if !event.repeat() => g.input.pause = true,
                    "r" if g.world.is_over() => g.restart(),
                    _ => set_held(&mut g.input, &key, true),
                }
                if key == " " || key.starts_with("arrow") {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key().to_lowercase();
                set_held(&mut game.borrow_mut().input, &key, false);
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn set_held(input: &mut TickInput, key: &str, down: bool) {
        match key {
            "arrowup" | "w" => input.up = down,
            "arrowdown" | "s" => input.down = down,
            "arrowleft" | "a" => input.left = down,
            "arrowright" | "d" => input.right = down,
            " " => input.melee = down,
            "f" => input.shoot = down,
            _ => {}
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        // Tab hidden
        if let Some(document) = window.document() {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if !g.world.is_over() && !g.world.paused {
                        g.world.set_paused(true);
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur
        let blur_game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = blur_game.borrow_mut();
            g.input = TickInput::default();
            if !g.world.is_over() && !g.world.paused {
                g.world.set_paused(true);
                log::info!("Auto-paused (window blur)");
            }
            if g.settings.mute_on_blur {
                g.audio.set_muted(true);
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();

        // Focus regained; stay paused until the player resumes
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            game.borrow_mut().audio.set_muted(false);
        });
        window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();

        *g.borrow_mut() = Some(Closure::new(move |time: f64| {
            game.borrow_mut().frame(time);
            if let Some(cb) = f.borrow().as_ref() {
                schedule(cb);
            }
        }));

        if let Some(cb) = g.borrow().as_ref() {
            schedule(cb);
        }
    }

    fn schedule(cb: &Closure<dyn FnMut(f64)>) {
        if let Some(window) = web_sys::window() {
            if window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .is_err()
            {
                log::error!("requestAnimationFrame failed; game loop stopped");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sharky (native) starting...");
    log::info!("Native mode runs a headless session - build for wasm32 to play");

    // sharky [seed] [difficulty]
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);
    let difficulty = match args.next().map(|s| s.parse::<sharky::sim::Difficulty>()) {
        Some(Ok(d)) => d,
        Some(Err(e)) => {
            log::warn!("{}, using normal", e);
            sharky::sim::Difficulty::Normal
        }
        None => sharky::sim::Difficulty::Normal,
    };
    smoke_run(seed, difficulty);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a scripted minute at 60 Hz and report the outcome
#[cfg(not(target_arch = "wasm32"))]
fn smoke_run(seed: u64, difficulty: sharky::sim::Difficulty) {
    use sharky::sim::{TickInput, World, WorldConfig};

    let mut world = World::new(WorldConfig {
        seed,
        difficulty,
        ..WorldConfig::default()
    });
    world.start();

    let mut events = 0usize;
    for frame in 0..3600u32 {
        // Zig-zag across the canvas, firing now and then
        let phase = (frame / 90) % 4;
        let input = TickInput {
            up: phase == 0,
            right: phase == 1,
            down: phase == 2,
            left: phase == 3,
            shoot: frame % 45 == 0,
            melee: frame % 30 == 0,
            pause: false,
        };
        world.update(1000.0 / 60.0, &input);
        events += world.drain_events().len();
        if world.is_over() {
            break;
        }
    }

    let summary = world.summary();
    println!(
        "seed {}: {:?} after {:.1}s, score {}, eaten {}, {} events",
        seed,
        summary.outcome,
        summary.elapsed_ms / 1000.0,
        summary.score,
        summary.enemies_eaten,
        events
    );
}
