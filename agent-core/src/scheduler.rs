//! Elapsed-time gating for the cooperative loop.
//!
//! The loop feeds `plan` a monotonic since-boot duration each tick; the
//! decision is pure so the gating can be tested on the host.

use std::time::Duration;

use crate::config::AgentConfig;

/// One periodic action's gate against the tick clock.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    last_run: Option<Duration>,
}

impl Cadence {
    /// A gate that is due immediately on the first tick. The telemetry
    /// report uses this: the device announces itself as soon as it is up.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    /// A gate that behaves as if it had just run at boot, so the first
    /// firing happens one full interval in. The update check uses this.
    pub fn primed(interval: Duration) -> Self {
        Self {
            interval,
            last_run: Some(Duration::ZERO),
        }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    pub fn mark_run(&mut self, now: Duration) {
        self.last_run = Some(now);
    }
}

/// What a tick should do. Execution order is fixed: reconnection strictly
/// precedes the update check, which strictly precedes the telemetry send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPlan {
    pub reconnect: bool,
    pub check_update: bool,
    pub report_telemetry: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickAction {
    Reconnect,
    CheckUpdate,
    ReportTelemetry,
}

impl TickPlan {
    /// The due actions in their mandatory execution order.
    pub fn actions(&self) -> impl Iterator<Item = TickAction> {
        [
            self.reconnect.then_some(TickAction::Reconnect),
            self.check_update.then_some(TickAction::CheckUpdate),
            self.report_telemetry.then_some(TickAction::ReportTelemetry),
        ]
        .into_iter()
        .flatten()
    }
}

/// Gates the two periodic actions. The caller reports back after performing
/// an action; a gate only resets then, so a tick that skips its action (for
/// example while reconnecting took the whole tick) stays due.
pub struct Scheduler {
    update: Cadence,
    telemetry: Cadence,
}

impl Scheduler {
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            update: Cadence::primed(config.update_interval),
            telemetry: Cadence::new(config.report_interval),
        }
    }

    pub fn plan(&self, now: Duration, associated: bool) -> TickPlan {
        TickPlan {
            reconnect: !associated,
            check_update: self.update.is_due(now),
            report_telemetry: self.telemetry.is_due(now),
        }
    }

    pub fn update_checked(&mut self, now: Duration) {
        self.update.mark_run(now);
    }

    pub fn telemetry_sent(&mut self, now: Duration) {
        self.telemetry.mark_run(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentConfig {
        AgentConfig {
            report_interval: Duration::from_secs(10),
            update_interval: Duration::from_secs(300),
            ..AgentConfig::default()
        }
    }

    #[test]
    fn first_report_is_due_immediately_but_update_check_is_not() {
        let scheduler = Scheduler::new(&config());
        let plan = scheduler.plan(Duration::ZERO, true);
        assert!(plan.report_telemetry);
        assert!(!plan.check_update);
        assert!(!plan.reconnect);
    }

    #[test]
    fn gates_reset_only_when_the_action_is_reported_done() {
        let mut scheduler = Scheduler::new(&config());

        // Still due on a later tick if nothing was performed.
        assert!(scheduler.plan(Duration::from_secs(3), true).report_telemetry);

        scheduler.telemetry_sent(Duration::from_secs(3));
        assert!(!scheduler.plan(Duration::from_secs(4), true).report_telemetry);
        assert!(scheduler.plan(Duration::from_secs(13), true).report_telemetry);
    }

    #[test]
    fn update_check_fires_after_one_full_interval() {
        let mut scheduler = Scheduler::new(&config());
        assert!(!scheduler.plan(Duration::from_secs(299), true).check_update);
        assert!(scheduler.plan(Duration::from_secs(300), true).check_update);

        scheduler.update_checked(Duration::from_secs(300));
        assert!(!scheduler.plan(Duration::from_secs(301), true).check_update);
        assert!(scheduler.plan(Duration::from_secs(600), true).check_update);
    }

    #[test]
    fn reconnection_precedes_check_precedes_report() {
        let scheduler = Scheduler::new(&config());
        let plan = scheduler.plan(Duration::from_secs(600), false);
        let order: Vec<TickAction> = plan.actions().collect();
        assert_eq!(
            order,
            [
                TickAction::Reconnect,
                TickAction::CheckUpdate,
                TickAction::ReportTelemetry,
            ]
        );
    }

    #[test]
    fn an_associated_tick_plans_no_reconnect() {
        let scheduler = Scheduler::new(&config());
        let plan = scheduler.plan(Duration::from_secs(600), true);
        let order: Vec<TickAction> = plan.actions().collect();
        assert_eq!(order, [TickAction::CheckUpdate, TickAction::ReportTelemetry]);
    }
}
