use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{AnimationConfig, CubeError, Move, MoveEngine, Result};

/// Interpolation curve applied to each layer turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    #[default]
    QuadraticInOut,
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

pub(crate) fn normalized_progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }

    (elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
}

#[derive(Debug, Clone)]
struct MoveTimer {
    elapsed: Duration,
    duration: Duration,
}

impl MoveTimer {
    fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
        }
    }

    fn advance(&mut self, delta: Duration) {
        self.elapsed = self.elapsed.saturating_add(delta);
    }

    fn progress(&self) -> f32 {
        normalized_progress(self.elapsed, self.duration)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Time past the end of the turn, carried into the next move.
    fn overshoot(&self) -> Duration {
        self.elapsed.saturating_sub(self.duration)
    }
}

/// Notifications emitted while a move list plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    MoveBegan { index: usize, mv: Move },
    MoveEnded { index: usize, mv: Move },
    /// Every move finished. Emitted exactly once.
    Completed,
    /// A cancel request took effect between two moves.
    Cancelled { remaining: usize },
}

#[derive(Debug, Clone)]
enum Phase {
    Between,
    Active { index: usize, timer: MoveTimer },
    Completed,
    Cancelled,
    Aborted,
}

/// Plays a move list through a [`MoveEngine`] strictly one move at a time.
///
/// Driven by [`tick`](Self::tick); a move is only started once the previous
/// one has been fully baked.
#[derive(Debug, Clone)]
pub struct AnimationSequencer {
    moves: Vec<Move>,
    next: usize,
    phase: Phase,
    move_duration: Duration,
    easing: Easing,
    cancel_requested: bool,
}

impl AnimationSequencer {
    pub fn new(moves: Vec<Move>, config: &AnimationConfig) -> Self {
        Self {
            moves,
            next: 0,
            phase: Phase::Between,
            move_duration: config.move_duration(),
            easing: config.easing,
            cancel_requested: false,
        }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Index of the move currently rotating, for highlighting.
    pub fn active_index(&self) -> Option<usize> {
        match &self.phase {
            Phase::Active { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Number of moves fully applied so far.
    pub fn completed_moves(&self) -> usize {
        self.next
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            Phase::Completed | Phase::Cancelled | Phase::Aborted
        )
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.phase, Phase::Aborted)
    }

    /// Stops playback at the next move boundary. A rotating layer always
    /// finishes first.
    pub fn request_cancel(&mut self) {
        self.cancel_requested = true;
    }

    /// Advances playback by `delta`. Leftover time after a move ends flows
    /// into the next one, so a large delta may finish several moves.
    pub fn tick(
        &mut self,
        delta: Duration,
        engine: &mut MoveEngine,
    ) -> Result<Vec<SequencerEvent>> {
        let mut events = Vec::new();
        let mut budget = delta;

        loop {
            match &mut self.phase {
                Phase::Completed | Phase::Cancelled | Phase::Aborted => break,
                Phase::Between => {
                    if self.cancel_requested {
                        let remaining = self.moves.len() - self.next;
                        info!(remaining, "animation cancelled");
                        self.phase = Phase::Cancelled;
                        events.push(SequencerEvent::Cancelled { remaining });
                        break;
                    }
                    let Some(&mv) = self.moves.get(self.next) else {
                        info!(moves = self.moves.len(), "animation complete");
                        self.phase = Phase::Completed;
                        events.push(SequencerEvent::Completed);
                        break;
                    };
                    if let Err(err) = engine.begin_move(mv) {
                        return Err(self.abort(err));
                    }
                    events.push(SequencerEvent::MoveBegan {
                        index: self.next,
                        mv,
                    });
                    self.phase = Phase::Active {
                        index: self.next,
                        timer: MoveTimer::new(self.move_duration),
                    };
                }
                Phase::Active { index, timer } => {
                    let index = *index;
                    timer.advance(budget);
                    if !timer.is_finished() {
                        let eased = self.easing.apply(timer.progress());
                        if let Err(err) = engine.set_progress(eased) {
                            return Err(self.abort(err));
                        }
                        break;
                    }
                    budget = timer.overshoot();

                    let mv = match engine.finish_move() {
                        Ok(mv) => mv,
                        Err(err) => return Err(self.abort(err)),
                    };
                    debug!(index, %mv, "move finished");
                    events.push(SequencerEvent::MoveEnded { index, mv });
                    self.next = index + 1;
                    self.phase = Phase::Between;
                }
            }
        }

        Ok(events)
    }

    fn abort(&mut self, err: CubeError) -> CubeError {
        error!(%err, completed = self.next, "animation aborted");
        self.phase = Phase::Aborted;
        err
    }
}
