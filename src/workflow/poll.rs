use std::time::Duration;

use crate::client::{SmmClient, SmmError};
use crate::domain::{OrderId, StatusResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Status polling parameters.
pub struct PollOptions {
    /// First delay between fetches.
    pub interval: Duration,
    /// Maximum number of fetches. `0` behaves as `1`.
    pub attempts: u32,
    /// Grow the delay by 1.5x after each sleep instead of keeping it constant.
    pub exponential_backoff: bool,
    /// Ceiling for grown delays.
    pub max_interval: Duration,
}

impl PollOptions {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_ATTEMPTS: u32 = 30;
    pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(interval: Duration, attempts: u32) -> Self {
        Self {
            interval,
            attempts,
            ..Self::default()
        }
    }

    pub fn schedule(&self) -> PollSchedule {
        PollSchedule {
            next: self.interval,
            exponential: self.exponential_backoff,
            max_interval: self.max_interval,
        }
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            attempts: Self::DEFAULT_ATTEMPTS,
            exponential_backoff: true,
            max_interval: Self::DEFAULT_MAX_INTERVAL,
        }
    }
}

#[derive(Debug, Clone)]
/// Endless sequence of delays between status fetches.
///
/// Starts at the interval; with backoff each following delay is
/// `min(previous * 1.5, max_interval)`.
pub struct PollSchedule {
    next: Duration,
    exponential: bool,
    max_interval: Duration,
}

impl Iterator for PollSchedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next;
        if self.exponential {
            self.next = (current.saturating_mul(3) / 2).min(self.max_interval);
        }
        Some(current)
    }
}

/// Poll an order until it reaches a terminal status, reports an error, or the
/// attempt budget runs out. Returns the last snapshot either way.
///
/// Fetch failures are returned as-is; there is no sleep after the last fetch.
pub async fn wait_for_status(
    client: &SmmClient,
    order: OrderId,
    options: &PollOptions,
) -> Result<StatusResponse, SmmError> {
    let attempts = options.attempts.max(1);
    let mut schedule = options.schedule();
    let mut attempt = 1;

    loop {
        let snapshot = client.order_status(order).await?;
        tracing::info!(
            %order,
            attempt,
            attempts,
            status = snapshot.status.as_deref().unwrap_or("-"),
            remains = snapshot.remains.as_deref().unwrap_or("-"),
            charge = snapshot.charge.as_deref().unwrap_or("-"),
            error = snapshot.error.as_deref().unwrap_or("-"),
            "order status"
        );

        if snapshot.has_error() || snapshot.is_terminal() || attempt >= attempts {
            return Ok(snapshot);
        }

        if let Some(delay) = schedule.next() {
            client.pause(delay).await;
        }
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::client::RetryPolicy;
    use crate::client::testing::{RecordingSleeper, ScriptedTransport, test_client};

    use super::*;

    fn secs(value: f64) -> Duration {
        Duration::from_secs_f64(value)
    }

    #[test]
    fn backoff_grows_by_half_and_caps() {
        let options = PollOptions::new(Duration::from_secs(1), 30);
        let delays: Vec<Duration> = options.schedule().take(6).collect();
        assert_eq!(
            delays,
            vec![
                secs(1.0),
                secs(1.5),
                secs(2.25),
                secs(3.375),
                secs(5.0625),
                secs(7.59375),
            ]
        );

        let tail: Vec<Duration> = options.schedule().take(40).collect();
        assert!(tail.iter().all(|delay| *delay <= Duration::from_secs(60)));
        assert_eq!(tail.last(), Some(&Duration::from_secs(60)));
    }

    #[test]
    fn constant_schedule_without_backoff() {
        let options = PollOptions {
            exponential_backoff: false,
            ..PollOptions::new(Duration::from_secs(7), 5)
        };
        assert!(options.schedule().take(10).all(|d| d == Duration::from_secs(7)));
    }

    #[test]
    fn custom_ceiling_is_respected() {
        let options = PollOptions {
            max_interval: Duration::from_secs(20),
            ..PollOptions::new(Duration::from_secs(10), 5)
        };
        let delays: Vec<Duration> = options.schedule().take(4).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(10),
                Duration::from_secs(15),
                Duration::from_secs(20),
                Duration::from_secs(20),
            ]
        );
    }

    #[tokio::test]
    async fn polls_until_terminal_status() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"status": "Pending"}"#);
        transport.reply(200, r#"{"status": "Pending"}"#);
        transport.reply(200, r#"{"status": "Completed", "remains": "0"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let options = PollOptions::new(Duration::from_secs(10), 3);
        let last = wait_for_status(&client, OrderId::new(1), &options)
            .await
            .unwrap();

        assert_eq!(last.status.as_deref(), Some("Completed"));
        assert_eq!(transport.requests().len(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(10), Duration::from_secs(15)]
        );
    }

    #[tokio::test]
    async fn stops_immediately_on_error() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"error": "Not found"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let last = wait_for_status(&client, OrderId::new(5), &PollOptions::default())
            .await
            .unwrap();

        assert_eq!(last.status.as_deref(), Some("Error"));
        assert_eq!(last.error.as_deref(), Some("Not found"));
        assert_eq!(transport.requests().len(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn terminal_statuses_match_case_insensitively() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"status": "REFUNDED"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let last = wait_for_status(&client, OrderId::new(5), &PollOptions::default())
            .await
            .unwrap();
        assert_eq!(last.status.as_deref(), Some("REFUNDED"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn returns_last_snapshot_when_attempts_run_out() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"status": "Pending"}"#);
        transport.reply(200, r#"{"status": "In progress", "remains": "40"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let options = PollOptions::new(Duration::from_secs(2), 2);
        let last = wait_for_status(&client, OrderId::new(5), &options)
            .await
            .unwrap();

        assert_eq!(last.status.as_deref(), Some("In progress"));
        assert_eq!(last.remains.as_deref(), Some("40"));
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test]
    async fn zero_attempts_still_fetches_once() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"status": "Pending"}"#);
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let options = PollOptions::new(Duration::from_secs(1), 0);
        let last = wait_for_status(&client, OrderId::new(5), &options)
            .await
            .unwrap();
        assert_eq!(last.status.as_deref(), Some("Pending"));
        assert_eq!(transport.requests().len(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn fetch_failures_propagate() {
        let transport = ScriptedTransport::new();
        transport.reply(200, r#"{"status": "Pending"}"#);
        transport.reply(401, "unauthorized");
        let sleeper = RecordingSleeper::new();
        let client = test_client(&transport, &sleeper, RetryPolicy::none(), false);

        let err = wait_for_status(&client, OrderId::new(5), &PollOptions::new(Duration::from_secs(1), 5))
            .await
            .unwrap_err();
        assert!(matches!(err, SmmError::HttpStatus { status: 401, .. }));
        assert_eq!(transport.requests().len(), 2);
    }
}
