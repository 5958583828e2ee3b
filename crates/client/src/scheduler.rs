/// Frame pacing state, owned by the driver.
///
/// Replaces the free-variable timing of an ad hoc render loop with an
/// explicit value: a frame is due when at least one period has passed
/// since the last drawn frame.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    period_ms: u64,
    last_draw_ms: Option<u64>,
}

impl FrameScheduler {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            last_draw_ms: None,
        }
    }

    /// Scheduler targeting `fps` frames per second.
    pub fn with_fps(fps: u32) -> Self {
        Self::new(1000 / u64::from(fps.max(1)))
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Whether a frame should be drawn at `now_ms` (milliseconds since
    /// session start). Records the draw time when it returns true. The
    /// first call is always due.
    pub fn frame_due(&mut self, now_ms: u64) -> bool {
        let due = match self.last_draw_ms {
            None => true,
            Some(last) => now_ms >= last + self.period_ms,
        };
        if due {
            self.last_draw_ms = Some(now_ms);
        }
        due
    }

    /// Forget the last draw time; the next tick is due immediately.
    pub fn reset(&mut self) {
        self.last_draw_ms = None;
    }
}

impl Default for FrameScheduler {
    /// The reference driver cadence: ~30 frames per second.
    fn default() -> Self {
        Self::with_fps(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_always_due() {
        let mut sched = FrameScheduler::default();
        assert!(sched.frame_due(0));
    }

    #[test]
    fn ticks_inside_period_are_skipped() {
        let mut sched = FrameScheduler::new(33);
        assert!(sched.frame_due(0));
        assert!(!sched.frame_due(10));
        assert!(!sched.frame_due(32));
        assert!(sched.frame_due(33));
        assert!(!sched.frame_due(50));
        assert!(sched.frame_due(70));
    }

    #[test]
    fn default_cadence_is_about_thirty_fps() {
        let mut sched = FrameScheduler::default();
        let drawn = (0..1000).filter(|&ms| sched.frame_due(ms)).count();
        assert!((28..=32).contains(&drawn), "drew {drawn} frames");
    }

    #[test]
    fn reset_makes_next_tick_due() {
        let mut sched = FrameScheduler::new(100);
        assert!(sched.frame_due(0));
        assert!(!sched.frame_due(10));
        sched.reset();
        assert!(sched.frame_due(11));
    }

    #[test]
    fn zero_fps_is_clamped() {
        let sched = FrameScheduler::with_fps(0);
        assert_eq!(sched.period_ms(), 1000);
    }
}
