use std::time::Duration;
use tokio::time::Instant;

use super::channel::{ChannelConnector, NotificationChannel};
use crate::observer::{StatusKind, StatusObserver};
use crate::tracker::Sample;

/// Throttled status posting. Owns the cooldown clock and the lazily
/// (re)acquired channel; the worker never talks to the channel directly.
pub struct StatusFeed {
    mission_id: String,
    cooldown: Duration,
    connector: Box<dyn ChannelConnector>,
    channel: Option<Box<dyn NotificationChannel>>,
    last_posted: Option<Instant>,
}

impl StatusFeed {
    pub fn new(mission_id: String, cooldown: Duration, connector: Box<dyn ChannelConnector>) -> Self {
        Self {
            mission_id,
            cooldown,
            connector,
            channel: None,
            last_posted: None,
        }
    }

    /// One eager connection attempt. Failure leaves the feed without a
    /// channel; later announces retry opportunistically.
    pub async fn establish(&mut self, observer: &dyn StatusObserver) {
        self.ensure_channel(observer).await;
    }

    pub async fn announce(
        &mut self,
        text: &str,
        sample: &Sample,
        observer: &dyn StatusObserver,
    ) {
        if let Some(last) = self.last_posted {
            if last.elapsed() < self.cooldown {
                log::info!(
                    "Not posting. Last post was less than {}s ago",
                    self.cooldown.as_secs()
                );
                return;
            }
        }

        if !self.ensure_channel(observer).await {
            return;
        }

        let message = match sample.altitude_and_speed() {
            Some((altitude, speed)) => format!(
                "{}: {}. alt={}m speed={}m/s",
                self.mission_id, text, altitude, speed
            ),
            None => format!("{}: {}", self.mission_id, text),
        };

        let Some(channel) = self.channel.as_mut() else {
            return;
        };
        match channel.post(&message).await {
            // Only a successful post advances the cooldown clock.
            Ok(()) => self.last_posted = Some(Instant::now()),
            Err(e) => {
                log::error!("Failed to post status update: {e}");
                observer.report(StatusKind::Connection, "Status post failed");
            }
        }
    }

    async fn ensure_channel(&mut self, observer: &dyn StatusObserver) -> bool {
        if self.channel.is_some() {
            return true;
        }
        match self.connector.connect().await {
            Ok(channel) => {
                self.channel = Some(channel);
                true
            }
            Err(e) => {
                log::error!("Failed to connect to status feed: {e}");
                observer.report(StatusKind::Connection, "Failed to connect to status feed");
                false
            }
        }
    }
}
