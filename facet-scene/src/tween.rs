//! Time-driven repeating tweens.
//!
//! A [`Tween`] is a scheduled task: it only produces samples while it is
//! running, and it is advanced by the frame clock rather than by a timer of
//! its own.

use std::time::Duration;

/// Lifecycle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
    Stopped,
    Completed,
    Cancelled,
}

/// How many times a tween plays after its first cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Infinite,
    Count(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Easing curve applied to raw progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out, `1 - (1 - t)^2`.
    #[default]
    Power1Out,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// One evaluation of a running tween.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenSample {
    /// Position within the current cycle in `0.0..=1.0`, after yoyo reversal.
    pub progress: f32,
    /// `progress` passed through the ease.
    pub eased: f32,
    pub direction: Direction,
    /// Zero-based index of the current cycle.
    pub cycle: u64,
}

const MIN_DURATION: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct Tween {
    duration: Duration,
    repeat: Repeat,
    yoyo: bool,
    ease: Ease,
    state: TaskState,
    elapsed: Duration,
    last_tick: Option<Duration>,
}

impl Tween {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration: duration.max(MIN_DURATION),
            repeat: Repeat::Count(0),
            yoyo: false,
            ease: Ease::default(),
            state: TaskState::Idle,
            elapsed: Duration::ZERO,
            last_tick: None,
        }
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TaskState::Running
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Play time accumulated while running.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Begin or resume. Has no effect once completed or cancelled.
    pub fn start(&mut self) {
        if matches!(self.state, TaskState::Idle | TaskState::Stopped) {
            self.state = TaskState::Running;
            self.last_tick = None;
        }
    }

    /// Pause; a later [`Tween::start`] resumes from the same point.
    pub fn stop(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Stopped;
        }
    }

    /// Terminate permanently.
    pub fn cancel(&mut self) {
        self.state = TaskState::Cancelled;
    }

    /// Advance to the clock reading `now` and sample the tween.
    ///
    /// The first call after [`Tween::start`] only anchors the clock, so time
    /// spent idle or stopped is never counted.
    pub fn advance(&mut self, now: Duration) -> Option<TweenSample> {
        if self.state != TaskState::Running {
            return None;
        }

        if let Some(last) = self.last_tick {
            self.elapsed += now.saturating_sub(last);
        }
        self.last_tick = Some(now);

        let duration = self.duration.as_secs_f64();
        let elapsed = self.elapsed.as_secs_f64();
        let mut cycle = (elapsed / duration).floor() as u64;
        let mut local = (elapsed - cycle as f64 * duration) / duration;

        if let Repeat::Count(extra) = self.repeat {
            let total = u64::from(extra) + 1;
            if cycle >= total {
                self.state = TaskState::Completed;
                cycle = total - 1;
                local = 1.0;
            }
        }

        let direction = if self.yoyo && cycle % 2 == 1 {
            Direction::Backward
        } else {
            Direction::Forward
        };
        let local = local.clamp(0.0, 1.0) as f32;
        let progress = match direction {
            Direction::Forward => local,
            Direction::Backward => 1.0 - local,
        };

        Some(TweenSample {
            progress,
            eased: self.ease.apply(progress),
            direction,
            cycle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn looping() -> Tween {
        Tween::new(Duration::from_secs(1))
            .repeat(Repeat::Infinite)
            .yoyo(true)
            .ease(Ease::Linear)
    }

    #[test]
    fn test_idle_tween_does_not_sample() {
        let mut tween = looping();
        assert_eq!(tween.advance(ms(100)), None);
        assert_eq!(tween.state(), TaskState::Idle);
    }

    #[test]
    fn test_first_advance_anchors_clock() {
        let mut tween = looping();
        tween.start();
        let sample = tween.advance(ms(5_000)).unwrap();
        assert_eq!(sample.progress, 0.0);
        assert_eq!(tween.elapsed(), Duration::ZERO);

        let sample = tween.advance(ms(5_250)).unwrap();
        assert!((sample.progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_yoyo_reverses_each_cycle() {
        let mut tween = looping();
        tween.start();
        tween.advance(ms(0));

        let forward = tween.advance(ms(250)).unwrap();
        assert_eq!(forward.direction, Direction::Forward);
        assert_eq!(forward.cycle, 0);

        let backward = tween.advance(ms(1_250)).unwrap();
        assert_eq!(backward.direction, Direction::Backward);
        assert_eq!(backward.cycle, 1);
        assert!((backward.progress - 0.75).abs() < 1e-6);

        let again = tween.advance(ms(2_250)).unwrap();
        assert_eq!(again.direction, Direction::Forward);
        assert_eq!(again.cycle, 2);
    }

    #[test]
    fn test_infinite_tween_never_completes() {
        let mut tween = looping();
        tween.start();
        tween.advance(ms(0));
        for step in 1..500 {
            assert!(tween.advance(ms(step * 997)).is_some());
        }
        assert!(tween.is_running());
    }

    #[test]
    fn test_finite_tween_completes_on_final_value() {
        let mut tween = Tween::new(Duration::from_secs(1))
            .repeat(Repeat::Count(1))
            .yoyo(true)
            .ease(Ease::Linear);
        tween.start();
        tween.advance(ms(0));
        let last = tween.advance(ms(2_500)).unwrap();
        assert_eq!(last.cycle, 1);
        assert_eq!(last.progress, 0.0);
        assert_eq!(tween.state(), TaskState::Completed);
        assert_eq!(tween.advance(ms(3_000)), None);
    }

    #[test]
    fn test_stop_excludes_paused_time() {
        let mut tween = looping();
        tween.start();
        tween.advance(ms(0));
        tween.advance(ms(200));
        tween.stop();
        assert_eq!(tween.advance(ms(700)), None);

        tween.start();
        tween.advance(ms(10_000));
        let sample = tween.advance(ms(10_100)).unwrap();
        assert!((sample.progress - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut tween = looping();
        tween.start();
        tween.cancel();
        tween.start();
        assert_eq!(tween.state(), TaskState::Cancelled);
        assert_eq!(tween.advance(ms(10)), None);
    }

    #[test]
    fn test_power1_out() {
        assert_eq!(Ease::Power1Out.apply(0.0), 0.0);
        assert_eq!(Ease::Power1Out.apply(1.0), 1.0);
        assert!((Ease::Power1Out.apply(0.5) - 0.75).abs() < 1e-6);
    }
}
