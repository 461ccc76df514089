//! Per-entity liveness state. Probes say what a target looks like right now;
//! this module decides whether that observation is news.

pub mod registry;

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::probe::ProbeOutcome;

/// A state-transition alert, rendered for humans and queued for delivery.
#[derive(Debug, Clone)]
pub struct Alert {
    pub entity_id: i32,
    pub text: String,
    /// Emission time, so delivery lag is visible downstream.
    pub raised_at: DateTime<Utc>,
}

/// Tracks one entity's believed liveness across evaluation cycles.
///
/// A fresh monitor believes its entity is up. An entity that is already dead
/// when monitoring starts therefore produces a genuine Up to Down flip on
/// its first evaluation, and alerts exactly once.
#[derive(Debug)]
pub struct EntityMonitor {
    entity_id: i32,
    entity_name: String,
    is_up: bool,
    fail_count: u32,
    last_transition_at: Instant,
}

impl EntityMonitor {
    pub fn new(entity_id: i32, entity_name: impl Into<String>, now: Instant) -> Self {
        Self {
            entity_id,
            entity_name: entity_name.into(),
            is_up: true,
            fail_count: 0,
            last_transition_at: now,
        }
    }

    pub fn is_up(&self) -> bool {
        self.is_up
    }

    /// Number of Up to Down transitions seen so far. Reset on recovery.
    pub fn fail_count(&self) -> u32 {
        self.fail_count
    }

    pub fn last_transition_at(&self) -> Instant {
        self.last_transition_at
    }

    /// Applies one probe outcome to the state machine.
    ///
    /// An outcome that matches the current state mutates nothing and returns
    /// `None`. A mismatch flips the state, restarts the transition clock and
    /// returns the alert for the flip; the elapsed time reported in the alert
    /// is the time spent in the state being left.
    pub fn observe(&mut self, outcome: ProbeOutcome, now: Instant) -> Option<Alert> {
        if outcome.alive == self.is_up {
            return None;
        }

        let elapsed = now.duration_since(self.last_transition_at);
        self.is_up = outcome.alive;
        self.last_transition_at = now;

        let text = if outcome.alive {
            self.fail_count = 0;
            format!(
                "Entity '{}' is UP! Previous downtime: {}",
                self.entity_name,
                format_duration(elapsed)
            )
        } else {
            self.fail_count += 1;
            match &outcome.detail {
                Some(detail) => format!(
                    "Entity '{}' is DOWN! Previous uptime: {}. Error: {}",
                    self.entity_name,
                    format_duration(elapsed),
                    detail
                ),
                None => format!(
                    "Entity '{}' is DOWN! Previous uptime: {}",
                    self.entity_name,
                    format_duration(elapsed)
                ),
            }
        };

        Some(Alert {
            entity_id: self.entity_id,
            text,
            raised_at: Utc::now(),
        })
    }
}

/// Renders an elapsed duration the way a human reads one: "350ms", "45s",
/// "2m3s", "1h0m5s". Sub-second durations are shown in milliseconds.
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    if total_secs == 0 {
        return format!("{}ms", d.as_millis());
    }

    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up() -> ProbeOutcome {
        ProbeOutcome::up()
    }

    fn down(detail: &str) -> ProbeOutcome {
        ProbeOutcome::down(detail)
    }

    fn at(t0: Instant, secs: u64) -> Instant {
        t0 + Duration::from_secs(secs)
    }

    #[test]
    fn starts_up_and_stays_silent_while_up() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        assert!(monitor.is_up());
        assert!(monitor.observe(up(), at(t0, 30)).is_none());
        assert!(monitor.observe(up(), at(t0, 60)).is_none());
        assert_eq!(monitor.fail_count(), 0);
        assert_eq!(monitor.last_transition_at(), t0);
    }

    #[test]
    fn first_down_alerts_once_with_the_uptime() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        let alert = monitor
            .observe(down("connection refused"), at(t0, 60))
            .unwrap();
        assert_eq!(alert.entity_id, 1);
        assert_eq!(
            alert.text,
            "Entity 'api' is DOWN! Previous uptime: 1m0s. Error: connection refused"
        );
        assert!(!monitor.is_up());
        assert_eq!(monitor.fail_count(), 1);

        // Staying down is not news.
        assert!(monitor.observe(down("still refused"), at(t0, 90)).is_none());
        assert!(monitor.observe(down("still refused"), at(t0, 120)).is_none());
        assert_eq!(monitor.fail_count(), 1);
        assert_eq!(monitor.last_transition_at(), at(t0, 60));
    }

    #[test]
    fn recovery_alerts_with_the_downtime_and_resets_the_fail_count() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(7, "worker", t0);

        monitor.observe(down("boom"), at(t0, 60)).unwrap();
        let alert = monitor.observe(up(), at(t0, 90)).unwrap();

        assert_eq!(alert.entity_id, 7);
        assert_eq!(alert.text, "Entity 'worker' is UP! Previous downtime: 30s");
        assert!(monitor.is_up());
        assert_eq!(monitor.fail_count(), 0);
        assert_eq!(monitor.last_transition_at(), at(t0, 90));
    }

    #[test]
    fn alerts_exactly_once_per_flip() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        let outcomes = [true, false, false, true, true, false];
        let mut alerts = 0;
        for (i, alive) in outcomes.into_iter().enumerate() {
            let outcome = if alive { up() } else { down("err") };
            if monitor.observe(outcome, at(t0, 30 * (i as u64 + 1))).is_some() {
                alerts += 1;
            }
        }
        assert_eq!(alerts, 3);
    }

    #[test]
    fn down_without_detail_omits_the_error_suffix() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        let outcome = ProbeOutcome {
            alive: false,
            detail: None,
        };
        let alert = monitor.observe(outcome, at(t0, 45)).unwrap();
        assert_eq!(alert.text, "Entity 'api' is DOWN! Previous uptime: 45s");
    }

    #[test]
    fn fail_count_counts_down_transitions_not_down_observations() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        monitor.observe(down("a"), at(t0, 10));
        monitor.observe(down("a"), at(t0, 20));
        assert_eq!(monitor.fail_count(), 1);

        monitor.observe(up(), at(t0, 30));
        monitor.observe(down("b"), at(t0, 40));
        assert_eq!(monitor.fail_count(), 1);

        monitor.observe(up(), at(t0, 50));
        assert_eq!(monitor.fail_count(), 0);
    }

    // The canonical flap: statuses 200, 200, 500, 200 at a 30s cadence.
    #[test]
    fn a_brief_outage_produces_a_down_and_an_up_alert() {
        let t0 = Instant::now();
        let mut monitor = EntityMonitor::new(1, "api", t0);

        assert!(monitor.observe(up(), at(t0, 0)).is_none());
        assert!(monitor.observe(up(), at(t0, 30)).is_none());

        let down_alert = monitor
            .observe(down("Http status: 500"), at(t0, 60))
            .unwrap();
        assert_eq!(
            down_alert.text,
            "Entity 'api' is DOWN! Previous uptime: 1m0s. Error: Http status: 500"
        );

        let up_alert = monitor.observe(up(), at(t0, 90)).unwrap();
        assert_eq!(up_alert.text, "Entity 'api' is UP! Previous downtime: 30s");
    }

    #[test]
    fn formats_durations_compactly() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(350)), "350ms");
        assert_eq!(format_duration(Duration::from_secs(1)), "1s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(60)), "1m0s");
        assert_eq!(format_duration(Duration::from_secs(123)), "2m3s");
        assert_eq!(format_duration(Duration::from_secs(3605)), "1h0m5s");
        assert_eq!(format_duration(Duration::from_secs(3723)), "1h2m3s");
    }
}
