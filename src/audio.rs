//! Audio cues using the Web Audio API
//!
//! Every sound is a short sequence of synthesized tones, so there are no
//! audio files to load.

use web_sys::OscillatorType::{Sawtooth, Sine, Square, Triangle};
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Enemy eaten
    Eat,
    /// Bubble fired
    Shoot,
    /// Melee swing
    FinSlap,
    /// Enemy destroyed by an attack
    EnemyKilled,
    /// Boss took a hit
    BossHit,
    /// Boss enters
    BossAppears,
    GameOver,
    Victory,
}

impl SoundEffect {
    /// Cue for a simulation event
    pub fn for_event(event: &GameEvent) -> Self {
        match event {
            GameEvent::Eat { .. } => SoundEffect::Eat,
            GameEvent::Shoot => SoundEffect::Shoot,
            GameEvent::FinSlap => SoundEffect::FinSlap,
            GameEvent::EnemyKilled { .. } => SoundEffect::EnemyKilled,
            GameEvent::BossHit { .. } => SoundEffect::BossHit,
            GameEvent::BossFightStarted => SoundEffect::BossAppears,
            GameEvent::GameOver => SoundEffect::GameOver,
            GameEvent::Victory => SoundEffect::Victory,
        }
    }

    fn tones(&self) -> &'static [Tone] {
        match self {
            SoundEffect::Eat => EAT,
            SoundEffect::Shoot => SHOOT,
            SoundEffect::FinSlap => FIN_SLAP,
            SoundEffect::EnemyKilled => ENEMY_KILLED,
            SoundEffect::BossHit => BOSS_HIT,
            SoundEffect::BossAppears => BOSS_APPEARS,
            SoundEffect::GameOver => GAME_OVER,
            SoundEffect::Victory => VICTORY,
        }
    }
}

/// Gulp: low drop plus a bright click
const EAT: &[Tone] = &[
    Tone::new(220.0, Sine, 0.5, 0.0, 0.12).glide(90.0),
    Tone::new(660.0, Triangle, 0.2, 0.04, 0.08),
];
const SHOOT: &[Tone] = &[Tone::new(300.0, Sine, 0.3, 0.0, 0.18).glide(900.0)];
const FIN_SLAP: &[Tone] = &[
    Tone::new(180.0, Triangle, 0.4, 0.0, 0.1).glide(70.0),
    Tone::new(1200.0, Square, 0.08, 0.0, 0.04),
];
const ENEMY_KILLED: &[Tone] = &[Tone::new(500.0, Square, 0.2, 0.0, 0.15).glide(120.0)];
const BOSS_HIT: &[Tone] = &[
    Tone::new(90.0, Sawtooth, 0.4, 0.0, 0.2).glide(45.0),
    Tone::new(70.0, Sine, 0.3, 0.0, 0.25),
];
/// Two detuned drones, then a falling rumble
const BOSS_APPEARS: &[Tone] = &[
    Tone::new(110.0, Sawtooth, 0.25, 0.0, 0.6),
    Tone::new(104.0, Sawtooth, 0.25, 0.3, 0.6),
    Tone::new(82.0, Sine, 0.4, 0.6, 0.9).glide(41.0),
];
const GAME_OVER: &[Tone] = &[
    Tone::new(392.0, Sine, 0.3, 0.0, 0.3),
    Tone::new(330.0, Sine, 0.3, 0.2, 0.3),
    Tone::new(262.0, Sine, 0.3, 0.4, 0.3),
    Tone::new(196.0, Sine, 0.3, 0.6, 0.5).glide(98.0),
];
const VICTORY: &[Tone] = &[
    Tone::new(523.0, Triangle, 0.25, 0.0, 0.2),
    Tone::new(659.0, Triangle, 0.25, 0.1, 0.2),
    Tone::new(784.0, Triangle, 0.25, 0.2, 0.2),
    Tone::new(1047.0, Triangle, 0.3, 0.3, 0.5),
];

/// One oscillator burst with an exponential fade
#[derive(Debug, Clone, Copy)]
struct Tone {
    freq: f32,
    /// Frequency at the end of the burst, if it slides
    end_freq: Option<f32>,
    wave: OscillatorType,
    gain: f32,
    /// Start offset (s)
    delay: f64,
    /// Length (s)
    duration: f64,
}

impl Tone {
    const fn new(freq: f32, wave: OscillatorType, gain: f32, delay: f64, duration: f64) -> Self {
        Self {
            freq,
            end_freq: None,
            wave,
            gain,
            delay,
            duration,
        }
    }

    const fn glide(self, end_freq: f32) -> Self {
        Self {
            end_freq: Some(end_freq),
            ..self
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(volume: f32) -> Self {
        // Not available outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Play the cue for every event in order
    pub fn play_events(&self, events: &[GameEvent]) {
        for event in events {
            self.play(SoundEffect::for_event(event));
        }
    }

    pub fn play(&self, effect: SoundEffect) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let now = ctx.current_time();
        for tone in effect.tones() {
            self.play_tone(ctx, tone, now);
        }
    }

    fn create_osc(&self, ctx: &AudioContext, tone: &Tone) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;
        osc.set_type(tone.wave);
        osc.frequency().set_value(tone.freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;
        Some((osc, gain))
    }

    fn play_tone(&self, ctx: &AudioContext, tone: &Tone, now: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, tone) else {
            return;
        };
        let start = now + tone.delay;
        let end = start + tone.duration;

        gain.gain().set_value_at_time(self.volume * tone.gain, start).ok();
        gain.gain().exponential_ramp_to_value_at_time(0.01, end).ok();
        if let Some(end_freq) = tone.end_freq {
            osc.frequency().set_value_at_time(tone.freq, start).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(end_freq, end)
                .ok();
        }

        osc.start_with_when(start).ok();
        osc.stop_with_when(end + 0.05).ok();
    }
}
