//! Announcement of newly added events.
//!
//! This is the boundary to whatever messaging front end is wired in. The
//! pipeline hands over the `added` list of a merge; [`broadcast`] renders one
//! [`announcement`] per event and delivers it to every subscribed recipient.
//!
//! Delivery is at-most-once: a failed delivery is logged and never retried,
//! and it does not stop delivery to the remaining recipients. Deliveries are
//! paced by a fixed delay.

use std::fmt::Write;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tracing::{error, info, instrument};

use crate::error::DeliveryError;
use crate::models::{Event, Subscribers};

/// Sends one message to one recipient.
pub trait Deliver {
    async fn deliver(&self, recipient: &str, message: &str) -> Result<(), DeliveryError>;
}

/// [`Deliver`] implementation that writes every message to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDeliver;

impl Deliver for LogDeliver {
    async fn deliver(&self, recipient: &str, message: &str) -> Result<(), DeliveryError> {
        info!(%recipient, %message, "Announcement");
        Ok(())
    }
}

/// Counts from one [`broadcast`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Render the message announcing `event`.
pub fn announcement(event: &Event) -> String {
    let mut message = String::new();
    writeln!(message, "New free LEGO event!\n").unwrap();
    writeln!(message, "{}", event.title).unwrap();
    writeln!(message, "Location: {}", event.location).unwrap();
    writeln!(message, "Date: {}", event.date_display).unwrap();
    writeln!(message, "Store: {}", event.store).unwrap();
    if !event.url.is_empty() {
        writeln!(message, "\nDetails: {}", event.url).unwrap();
    }
    write!(message, "\nExport: /export_{}", event.id).unwrap();
    message
}

/// Announce each of `events` to every subscribed recipient.
#[instrument(level = "info", skip_all, fields(events = events.len(), subscribers = subscribers.len()))]
pub async fn broadcast<D: Deliver>(
    deliver: &D,
    subscribers: &Subscribers,
    events: &[Event],
    delay: Duration,
) -> BroadcastReport {
    let recipients: Vec<&str> = subscribers
        .iter()
        .filter(|(_, subscriber)| subscriber.subscribed)
        .map(|(id, _)| id.as_str())
        .collect();

    let messages: Vec<(&str, String)> = events
        .iter()
        .flat_map(|event| {
            let text = announcement(event);
            recipients.iter().map(move |recipient| (*recipient, text.clone()))
        })
        .collect();

    let report = stream::iter(messages)
        .then(|(recipient, text)| async move {
            let result = deliver.deliver(recipient, &text).await;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        })
        .fold(BroadcastReport::default(), |mut report, result| async move {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!(error = %e, "Delivery failed");
                    report.failed += 1;
                }
            }
            report
        })
        .await;

    info!(delivered = report.delivered, failed = report.failed, "Broadcast complete");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Store, Subscriber};
    use chrono::Local;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording {
        sent: RefCell<Vec<(String, String)>>,
        fail_for: Option<&'static str>,
    }

    impl Deliver for Recording {
        async fn deliver(&self, recipient: &str, message: &str) -> Result<(), DeliveryError> {
            if self.fail_for == Some(recipient) {
                return Err(DeliveryError::new(recipient, "chat not found"));
            }
            self.sent
                .borrow_mut()
                .push((recipient.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn event(id: &str, url: &str) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Free LEGO {id}"),
            location: "Leeds".to_string(),
            date: "2025-December-5".to_string(),
            date_display: "2025-December-5".to_string(),
            store: Store::LegoStore,
            description: String::new(),
            source: "auto_scrape".to_string(),
            url: url.to_string(),
            created_at: Local::now(),
        }
    }

    fn subscribers(entries: &[(&str, bool)]) -> Subscribers {
        entries
            .iter()
            .map(|(id, subscribed)| {
                (
                    id.to_string(),
                    Subscriber {
                        subscribed: *subscribed,
                        ..Subscriber::default()
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_announcement_contents() {
        let text = announcement(&event("auto_7", "https://example.com/free-lego"));
        assert!(text.contains("Free LEGO auto_7"));
        assert!(text.contains("Location: Leeds"));
        assert!(text.contains("Date: 2025-December-5"));
        assert!(text.contains("Store: LEGO Store"));
        assert!(text.contains("Details: https://example.com/free-lego"));
        assert!(text.ends_with("/export_auto_7"));
    }

    #[test]
    fn test_announcement_without_url() {
        assert!(!announcement(&event("auto_1", "")).contains("Details:"));
    }

    #[tokio::test]
    async fn test_broadcast_skips_unsubscribed() {
        let deliver = Recording::default();
        let subs = subscribers(&[("1", true), ("2", false), ("3", true)]);
        let report = broadcast(&deliver, &subs, &[event("auto_1", "")], Duration::ZERO).await;

        assert_eq!(report, BroadcastReport { delivered: 2, failed: 0 });
        let recipients: Vec<_> = deliver.sent.borrow().iter().map(|(r, _)| r.clone()).collect();
        assert_eq!(recipients, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_broadcast_isolates_failures() {
        let deliver = Recording {
            fail_for: Some("2"),
            ..Recording::default()
        };
        let subs = subscribers(&[("1", true), ("2", true), ("3", true)]);
        let events = [event("auto_1", ""), event("auto_2", "")];
        let report = broadcast(&deliver, &subs, &events, Duration::from_millis(1)).await;

        assert_eq!(report, BroadcastReport { delivered: 4, failed: 2 });
        assert_eq!(deliver.sent.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_broadcast_nothing_to_send() {
        let report = broadcast(&LogDeliver, &subscribers(&[("1", true)]), &[], Duration::ZERO).await;
        assert_eq!(report, BroadcastReport::default());
    }
}
