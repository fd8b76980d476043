use std::collections::VecDeque;
use std::time::{Duration, Instant};

use uuid::Uuid;

/// One broadcast event as the feed consumes it. Built from a
/// `draw_live_events` row plus the owning item's visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEvent {
    pub id: Uuid,
    pub seq: i64,
    pub item_name: String,
    pub winner_student_id: String,
    /// Visibility recorded on the event row at emission time.
    pub is_public: bool,
    /// Current visibility of the winner row, re-checked on refresh.
    pub winner_is_public: bool,
}

impl FeedEvent {
    fn visible(&self) -> bool {
        self.is_public && self.winner_is_public
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Feed suppressed by the global switch; nothing transitions.
    Disabled,
    Idle,
    /// A new event was detected; only the item name is shown for the lead-in.
    PreStart,
    /// Winner identity shown; the reveal cue fires once per event id.
    Revealing,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedTiming {
    pub pre_start: Duration,
    pub reveal: Duration,
}

impl Default for FeedTiming {
    fn default() -> Self {
        Self {
            pre_start: Duration::from_millis(3000),
            reveal: Duration::from_millis(6000),
        }
    }
}

/// Spectator feed state machine: idle → pre-start → revealing → idle, one
/// event per full cycle.
///
/// Events are consumed strictly in ascending `seq` order; bursts are queued
/// and replayed one at a time, never collapsed. Non-public events never enter
/// the queue. Redelivered events (reconnect, overlapping polls) fall at or
/// below the `seq` high-water mark and are dropped, so the reveal cue fires at
/// most once per event.
#[derive(Debug)]
pub struct LiveFeed {
    timing: FeedTiming,
    enabled: bool,
    phase: FeedPhase,
    phase_since: Option<Instant>,
    current: Option<FeedEvent>,
    queue: VecDeque<FeedEvent>,
    last_seq: i64,
    pending_cue: Option<Uuid>,
}

impl LiveFeed {
    pub fn new(timing: FeedTiming) -> Self {
        Self {
            timing,
            enabled: false,
            phase: FeedPhase::Disabled,
            phase_since: None,
            current: None,
            queue: VecDeque::new(),
            last_seq: 0,
            pending_cue: None,
        }
    }

    pub fn phase(&self) -> FeedPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&FeedEvent> {
        self.current.as_ref()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn last_seq(&self) -> i64 {
        self.last_seq
    }

    /// The reveal cue for the event that just entered the reveal phase, if it
    /// has not been consumed yet. Taking it clears it.
    pub fn take_cue(&mut self) -> Option<Uuid> {
        self.pending_cue.take()
    }

    /// Apply the global switch. Turning the page off drops the queue and any
    /// in-flight animation; turning it back on resumes from the current
    /// sequence position (past events are not replayed).
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if enabled {
            self.phase = FeedPhase::Idle;
            self.phase_since = None;
        } else {
            self.phase = FeedPhase::Disabled;
            self.phase_since = None;
            self.current = None;
            self.queue.clear();
            self.pending_cue = None;
        }
    }

    /// Feed newly fetched events into the queue. Input may overlap previous
    /// fetches or arrive unsorted; only events with `seq` above the high-water
    /// mark are queued, in ascending order. The mark advances over hidden
    /// events too, so they are dropped rather than deferred, and it is the
    /// sole dedupe state: nothing here grows with the event history.
    pub fn observe(&mut self, events: &[FeedEvent]) {
        let mut incoming: Vec<&FeedEvent> = events
            .iter()
            .filter(|e| e.seq > self.last_seq)
            .collect();
        incoming.sort_by_key(|e| e.seq);

        for event in incoming {
            self.last_seq = event.seq;
            if self.enabled && event.visible() {
                self.queue.push_back(event.clone());
            }
        }
    }

    /// Advance phase transitions. Call with a monotonic clock; idempotent for
    /// the same instant.
    pub fn tick(&mut self, now: Instant) {
        if !self.enabled {
            return;
        }

        match self.phase {
            FeedPhase::Disabled => {}
            FeedPhase::Idle => {
                if let Some(next) = self.queue.pop_front() {
                    self.current = Some(next);
                    self.phase = FeedPhase::PreStart;
                    self.phase_since = Some(now);
                }
            }
            FeedPhase::PreStart => {
                if self.elapsed(now) >= self.timing.pre_start {
                    self.phase = FeedPhase::Revealing;
                    self.phase_since = Some(now);
                    self.pending_cue = self.current.as_ref().map(|e| e.id);
                }
            }
            FeedPhase::Revealing => {
                if self.elapsed(now) >= self.timing.reveal {
                    self.current = None;
                    self.phase = FeedPhase::Idle;
                    self.phase_since = None;
                }
            }
        }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.phase_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(seq: i64, public: bool) -> FeedEvent {
        FeedEvent {
            id: Uuid::new_v4(),
            seq,
            item_name: format!("prize-{seq}"),
            winner_student_id: format!("s{seq}"),
            is_public: public,
            winner_is_public: true,
        }
    }

    fn timing() -> FeedTiming {
        FeedTiming {
            pre_start: Duration::from_millis(100),
            reveal: Duration::from_millis(100),
        }
    }

    #[test]
    fn disabled_feed_never_transitions() {
        let mut feed = LiveFeed::new(timing());
        let t0 = Instant::now();

        feed.observe(&[event(1, true), event(2, true)]);
        feed.tick(t0);
        feed.tick(t0 + Duration::from_secs(10));

        assert_eq!(feed.phase(), FeedPhase::Disabled);
        assert!(feed.current().is_none());
        assert_eq!(feed.queue_len(), 0);
    }

    #[test]
    fn full_phase_cycle_for_one_event() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);
        let t0 = Instant::now();

        feed.observe(&[event(1, true)]);
        assert_eq!(feed.phase(), FeedPhase::Idle);

        feed.tick(t0);
        assert_eq!(feed.phase(), FeedPhase::PreStart);
        // winner identity is withheld during the lead-in
        assert!(feed.current().is_some());
        assert!(feed.take_cue().is_none());

        feed.tick(t0 + Duration::from_millis(100));
        assert_eq!(feed.phase(), FeedPhase::Revealing);
        let cue = feed.take_cue();
        assert!(cue.is_some());
        // cue is consumed exactly once
        assert!(feed.take_cue().is_none());

        feed.tick(t0 + Duration::from_millis(200));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert!(feed.current().is_none());
    }

    #[test]
    fn burst_replays_in_seq_order_one_at_a_time() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);
        let t0 = Instant::now();

        let e6 = event(6, true);
        let e5 = event(5, true);
        // delivered out of order in a single burst
        feed.observe(&[e6.clone(), e5.clone()]);
        assert_eq!(feed.queue_len(), 2);

        feed.tick(t0);
        assert_eq!(feed.current().unwrap().seq, 5);
        feed.tick(t0 + Duration::from_millis(100));
        assert_eq!(feed.phase(), FeedPhase::Revealing);
        assert_eq!(feed.current().unwrap().seq, 5);

        // seq 6 must wait for seq 5 to complete its cycle
        feed.tick(t0 + Duration::from_millis(200));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        feed.tick(t0 + Duration::from_millis(210));
        assert_eq!(feed.current().unwrap().seq, 6);
        assert_eq!(feed.phase(), FeedPhase::PreStart);
    }

    #[test]
    fn redelivery_does_not_requeue_or_refire() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);
        let t0 = Instant::now();

        let e = event(1, true);
        feed.observe(&[e.clone()]);
        feed.tick(t0);
        feed.tick(t0 + Duration::from_millis(100));
        assert!(feed.take_cue().is_some());

        // reconnect-style redelivery of the same event
        feed.observe(&[e.clone()]);
        feed.tick(t0 + Duration::from_millis(200));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert_eq!(feed.queue_len(), 0);
        assert!(feed.take_cue().is_none());
    }

    #[test]
    fn events_at_or_below_the_mark_never_requeue() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);

        feed.observe(&[event(1, true), event(2, true), event(3, true)]);
        assert_eq!(feed.queue_len(), 3);
        assert_eq!(feed.last_seq(), 3);

        // a late arrival below the mark is dropped even with an unseen id
        feed.observe(&[event(2, true)]);
        assert_eq!(feed.queue_len(), 3);
        assert_eq!(feed.last_seq(), 3);
    }

    #[test]
    fn private_events_are_filtered_out_entirely() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);
        let t0 = Instant::now();

        let mut hidden_winner = event(2, true);
        hidden_winner.winner_is_public = false;

        feed.observe(&[event(1, false), hidden_winner, event(3, true)]);
        assert_eq!(feed.queue_len(), 1);

        feed.tick(t0);
        assert_eq!(feed.current().unwrap().seq, 3);
        // the hidden events advanced the high-water mark
        assert_eq!(feed.last_seq(), 3);
    }

    #[test]
    fn disabling_mid_reveal_drops_everything() {
        let mut feed = LiveFeed::new(timing());
        feed.set_enabled(true);
        let t0 = Instant::now();

        feed.observe(&[event(1, true), event(2, true)]);
        feed.tick(t0);
        feed.tick(t0 + Duration::from_millis(100));
        assert_eq!(feed.phase(), FeedPhase::Revealing);

        feed.set_enabled(false);
        assert_eq!(feed.phase(), FeedPhase::Disabled);
        assert!(feed.current().is_none());
        assert_eq!(feed.queue_len(), 0);

        // new events while disabled advance the mark but are not replayed later
        feed.observe(&[event(3, true)]);
        feed.set_enabled(true);
        feed.tick(t0 + Duration::from_millis(300));
        assert_eq!(feed.phase(), FeedPhase::Idle);
        assert_eq!(feed.last_seq(), 3);
    }
}
