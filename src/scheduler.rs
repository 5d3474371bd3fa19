//! Polling loop: fetch the price, feed the tracker, push alerts.
//!
//! Every tick spawns an independent cycle, so a slow fetch never delays the
//! next one. Overlapping cycles serialize on the tracker lock, which makes
//! each evaluate-and-update of the reference atomic.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::alarm::tracker::AlarmTracker;
use crate::alarm::Alert;
use crate::api::icbc::IcbcGoldSource;
use crate::api::PriceSource;
use crate::config::Config;
use crate::error::{GoldWatchError, PriceError};
use crate::http;
use crate::notify::{BarkNotifier, DeliveryReport, NotifierSet, WebhookNotifier};

#[derive(Debug)]
pub enum CycleOutcome {
    FetchFailed(PriceError),
    Quiet { price: f64, reference: f64 },
    Alerted { alert: Alert, report: DeliveryReport },
}

#[derive(Clone)]
pub struct GoldWatch {
    source: Arc<dyn PriceSource>,
    tracker: Arc<Mutex<AlarmTracker>>,
    notifiers: Arc<NotifierSet>,
}

impl GoldWatch {
    pub fn new(source: Arc<dyn PriceSource>, tracker: AlarmTracker, notifiers: NotifierSet) -> Self {
        Self {
            source,
            tracker: Arc::new(Mutex::new(tracker)),
            notifiers: Arc::new(notifiers),
        }
    }

    /// Wires the ICBC source and whichever notification channels have
    /// somewhere to deliver.
    pub fn from_config(config: &Config) -> Result<Self, GoldWatchError> {
        config.validate()?;
        let client = http::build_client(&config.http)?;
        let source = IcbcGoldSource::new(client.clone(), &config.source)?;

        let mut notifiers = NotifierSet::new();
        match WebhookNotifier::from_config(client.clone(), &config.webhook) {
            Some(webhook) => notifiers.push(webhook),
            None => info!("Webhook disabled"),
        }
        if config.bark.token.is_empty() {
            info!("No Bark tokens configured");
        } else {
            notifiers.push(BarkNotifier::new(client, &config.bark));
        }
        if notifiers.is_empty() {
            warn!("No notification channels configured, alerts will only be logged");
        }

        let tracker = AlarmTracker::new(config.alarm.seed, config.alarm.step);
        Ok(Self::new(Arc::new(source), tracker, notifiers))
    }

    pub async fn reference(&self) -> f64 {
        self.tracker.lock().await.reference()
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    pub async fn run_cycle(&self) -> CycleOutcome {
        let price = match self.source.fetch_price().await {
            Ok(price) => price,
            Err(e) => {
                error!("{}: failed to fetch gold price: {}", self.source.name(), e);
                return CycleOutcome::FetchFailed(e);
            }
        };

        let (direction, reference) = {
            let mut tracker = self.tracker.lock().await;
            info!(
                "Current price: {}, alarm threshold: {} (step {})",
                price,
                tracker.reference(),
                tracker.step()
            );
            let direction = tracker.evaluate(price);
            // Lock released at end of block, before any network I/O
            (direction, tracker.reference())
        };

        let Some(direction) = direction else {
            return CycleOutcome::Quiet { price, reference };
        };

        let alert = Alert::new(price, direction);
        info!("{} (threshold now {})", alert.message(), reference);

        let report = self.notifiers.dispatch(&alert.message()).await;
        for failure in report.failures() {
            if let Err(e) = &failure.result {
                warn!("{} -> {} not delivered: {}", failure.channel, failure.target, e);
            }
        }
        CycleOutcome::Alerted { alert, report }
    }

    /// Starts a cycle every `period`, forever. The first one runs at once.
    pub async fn run(self, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay); // no catch-up bursts

        info!("Polling {} every {:?}", self.source.name(), period);
        loop {
            ticker.tick().await;
            let watch = self.clone(); // cheap, all Arcs
            tokio::spawn(async move {
                match watch.run_cycle().await {
                    CycleOutcome::FetchFailed(e) => debug!("Cycle ended early: {}", e),
                    CycleOutcome::Quiet { price, reference } => {
                        debug!("{} is within a step of {}", price, reference)
                    }
                    CycleOutcome::Alerted { alert, report } if !report.is_complete() => warn!(
                        "Alert from {} reached {}/{} targets",
                        alert.at.format("%H:%M:%S"),
                        report.delivered(),
                        report.deliveries().len()
                    ),
                    CycleOutcome::Alerted { alert, report } => debug!(
                        "Alert from {} reached all {} targets",
                        alert.at.format("%H:%M:%S"),
                        report.delivered()
                    ),
                }
            });
        }
    }
}
