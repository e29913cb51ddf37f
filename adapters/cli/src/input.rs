use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use tower_platformer_core::{Direction, InputState};
use tower_platformer_rendering::FrameInput;

const RANDOM_HOLD_FRAMES: u32 = 15;
const RANDOM_JUMP_CHANCE: f64 = 0.08;

/// One segment of a scripted run: an input held for a number of frames.
///
/// The jump and pause flags only fire on the first frame of the segment.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub(crate) struct ScriptStep {
    /// Number of frames the segment lasts.
    pub(crate) frames: u32,
    /// Input sampled during the segment.
    #[serde(flatten)]
    pub(crate) input: InputState,
    /// Whether the segment starts by toggling pause.
    #[serde(default)]
    pub(crate) pause_toggle: bool,
}

/// Source of per-frame input for headless runs.
#[derive(Debug)]
pub(crate) enum InputSource {
    /// Replays a fixed script, then idles.
    Scripted {
        steps: Vec<ScriptStep>,
        step: usize,
        frame: u32,
    },
    /// Generates reproducible pseudo-random input from a seed.
    Random {
        rng: ChaCha8Rng,
        held: InputState,
        frame: u32,
    },
}

impl InputSource {
    /// Parses a JSON array of [`ScriptStep`]s.
    pub(crate) fn scripted(source: &str) -> serde_json::Result<Self> {
        let steps: Vec<ScriptStep> = serde_json::from_str(source)?;
        Ok(Self::Scripted {
            steps,
            step: 0,
            frame: 0,
        })
    }

    /// Creates a random source seeded with `seed`.
    pub(crate) fn random(seed: u64) -> Self {
        Self::Random {
            rng: ChaCha8Rng::seed_from_u64(seed),
            held: InputState::idle(),
            frame: 0,
        }
    }

    /// Input for the next frame.
    pub(crate) fn next_frame(&mut self) -> FrameInput {
        match self {
            Self::Scripted { steps, step, frame } => {
                while steps.get(*step).map_or(false, |current| *frame >= current.frames) {
                    *step += 1;
                    *frame = 0;
                }
                let Some(current) = steps.get(*step) else {
                    return FrameInput::default();
                };
                let first = *frame == 0;
                *frame += 1;
                FrameInput {
                    input: if first {
                        current.input
                    } else {
                        current.input.without_jump()
                    },
                    pause_toggle: first && current.pause_toggle,
                }
            }
            Self::Random { rng, held, frame } => {
                if *frame % RANDOM_HOLD_FRAMES == 0 {
                    let mut next = InputState::idle();
                    match rng.gen_range(0..3) {
                        0 => next = next.holding(Direction::Left),
                        1 => next = next.holding(Direction::Right),
                        _ => {}
                    }
                    match rng.gen_range(0..4) {
                        0 => next = next.holding(Direction::Up),
                        1 => next = next.holding(Direction::Down),
                        _ => {}
                    }
                    *held = next;
                }
                *frame = frame.wrapping_add(1);

                let input = if rng.gen_bool(RANDOM_JUMP_CHANCE) {
                    held.with_jump()
                } else {
                    *held
                };
                FrameInput {
                    input,
                    pause_toggle: false,
                }
            }
        }
    }
}
