pub mod bark;
pub mod webhook;

use async_trait::async_trait;
use futures::future::join_all;

use crate::error::NotifyError;

pub use bark::BarkNotifier;
pub use webhook::WebhookNotifier;

/// Outcome of sending one message to one target.
#[derive(Debug)]
pub struct Delivery {
    pub channel: String,
    pub target: String,
    pub result: Result<(), NotifyError>,
}

/// A channel that can push a text message to its targets.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    /// Attempts every target once and reports each result.
    async fn notify(&self, message: &str) -> Vec<Delivery>;
}

#[derive(Debug, Default)]
pub struct DeliveryReport {
    deliveries: Vec<Delivery>,
}

impl DeliveryReport {
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn delivered(&self) -> usize {
        self.deliveries.iter().filter(|d| d.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|d| d.result.is_err())
    }

    pub fn is_complete(&self) -> bool {
        self.deliveries.iter().all(|d| d.result.is_ok())
    }
}

/// Fans a message out to every registered channel concurrently.
#[derive(Default)]
pub struct NotifierSet {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notifier: impl Notifier + 'static) {
        self.notifiers.push(Box::new(notifier));
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub async fn dispatch(&self, message: &str) -> DeliveryReport {
        let results = join_all(self.notifiers.iter().map(|n| n.notify(message))).await;
        DeliveryReport {
            deliveries: results.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records messages; fails the targets listed in `failing`.
    pub(crate) struct RecordingNotifier {
        pub name: &'static str,
        pub targets: Vec<&'static str>,
        pub failing: Vec<&'static str>,
        pub sent: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub(crate) fn new(name: &'static str, targets: Vec<&'static str>) -> Self {
            Self {
                name,
                targets,
                failing: Vec::new(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        fn name(&self) -> &str {
            self.name
        }

        async fn notify(&self, message: &str) -> Vec<Delivery> {
            self.sent.lock().unwrap().push(message.to_string());
            self.targets
                .iter()
                .map(|target| Delivery {
                    channel: self.name.to_string(),
                    target: target.to_string(),
                    result: if self.failing.contains(target) {
                        Err(NotifyError::HttpStatus(500))
                    } else {
                        Ok(())
                    },
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn dispatch_reaches_every_channel() {
        let mut set = NotifierSet::new();
        set.push(RecordingNotifier::new("webhook", vec!["hook"]));
        set.push(RecordingNotifier::new("bark", vec!["a", "b"]));

        let report = set.dispatch("hello").await;

        assert_eq!(set.len(), 2);
        assert_eq!(report.deliveries().len(), 3);
        assert_eq!(report.delivered(), 3);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn partial_failures_are_collected() {
        let mut bark = RecordingNotifier::new("bark", vec!["a", "b", "c"]);
        bark.failing = vec!["b"];
        let mut set = NotifierSet::new();
        set.push(RecordingNotifier::new("webhook", vec!["hook"]));
        set.push(bark);

        let report = set.dispatch("hello").await;

        assert_eq!(report.delivered(), 3);
        assert!(!report.is_complete());
        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].channel, "bark");
        assert_eq!(failures[0].target, "b");
    }

    #[tokio::test]
    async fn empty_set_reports_nothing() {
        let set = NotifierSet::new();
        let report = set.dispatch("hello").await;

        assert!(set.is_empty());
        assert!(report.deliveries().is_empty());
        assert!(report.is_complete());
    }
}
