use std::sync::Arc;
use std::time::Duration;

use bson::oid::ObjectId;
use tokio::time::timeout;
use tracing::{debug, warn};

use barkpark_config::DeliverySettings;
use barkpark_db::models::PushRegistration;

use crate::dao::push_registration::PushRegistrationDao;

use super::channel::{PushChannel, PushSendError, RealtimeChannel};

/// What happened on the best-effort channels for one notification. The
/// feed write has already succeeded before the router runs, so this is
/// diagnostic only — nothing in here ever propagates as an error.
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub realtime_delivered: bool,
    pub push_attempted: usize,
    pub push_delivered: usize,
    pub push_deactivated: usize,
}

/// Fans a composed notification out to the realtime session (if any) and,
/// when no foregrounded session got it, to every active push registration.
///
/// Channel policy: the feed is the source of truth; realtime and push are
/// acceleration layers. Every send is time-bounded, every failure is
/// logged and swallowed, and one dead device never blocks the rest.
pub struct DeliveryRouter {
    registrations: Arc<PushRegistrationDao>,
    realtime: Arc<dyn RealtimeChannel>,
    push: Arc<dyn PushChannel>,
    settings: DeliverySettings,
}

impl DeliveryRouter {
    pub fn new(
        registrations: Arc<PushRegistrationDao>,
        realtime: Arc<dyn RealtimeChannel>,
        push: Arc<dyn PushChannel>,
        settings: DeliverySettings,
    ) -> Self {
        Self {
            registrations,
            realtime,
            push,
            settings,
        }
    }

    pub async fn deliver(&self, user_id: ObjectId, frame: &serde_json::Value) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        report.realtime_delivered = self.send_realtime(user_id, frame).await;

        // Push unless a foregrounded session just received the frame.
        let foreground = report.realtime_delivered && self.realtime.is_foreground(&user_id);
        if !foreground {
            self.fan_out_push(user_id, frame, &mut report).await;
        }

        debug!(
            %user_id,
            realtime = report.realtime_delivered,
            push_attempted = report.push_attempted,
            push_delivered = report.push_delivered,
            "Notification routed"
        );
        report
    }

    /// Realtime-only send for ephemeral gamification event frames.
    pub async fn send_event(&self, user_id: ObjectId, frame: &serde_json::Value) -> bool {
        self.send_realtime(user_id, frame).await
    }

    async fn send_realtime(&self, user_id: ObjectId, frame: &serde_json::Value) -> bool {
        if !self.realtime.is_connected(&user_id) {
            return false;
        }

        let budget = Duration::from_millis(self.settings.socket_send_timeout_ms);
        match timeout(budget, self.realtime.send(&user_id, frame)).await {
            Ok(sent) => sent,
            Err(_) => {
                warn!(%user_id, "Realtime send timed out, falling back to push");
                false
            }
        }
    }

    async fn fan_out_push(
        &self,
        user_id: ObjectId,
        frame: &serde_json::Value,
        report: &mut DeliveryReport,
    ) {
        let registrations = match self.registrations.find_active(user_id).await {
            Ok(regs) => regs,
            Err(e) => {
                warn!(%user_id, %e, "Failed to load push registrations");
                return;
            }
        };
        if registrations.is_empty() {
            return;
        }

        report.push_attempted = registrations.len();
        let budget = Duration::from_millis(self.settings.push_timeout_ms);

        // Independent per-device timeouts; the aggregate is bounded by the
        // slowest single budget, not the sum.
        let sends = registrations
            .iter()
            .map(|registration| self.push_one(registration, frame, budget));
        let outcomes = futures::future::join_all(sends).await;

        for (registration, outcome) in registrations.iter().zip(outcomes) {
            match outcome {
                PushOutcome::Delivered => {
                    report.push_delivered += 1;
                    if let Some(id) = registration.id {
                        if let Err(e) = self.registrations.touch(id).await {
                            warn!(%user_id, %e, "Failed to touch push registration");
                        }
                    }
                }
                PushOutcome::Invalid => {
                    report.push_deactivated += 1;
                    warn!(
                        %user_id,
                        endpoint = %registration.endpoint,
                        "Push endpoint invalid, deactivating"
                    );
                    if let Err(e) = self
                        .registrations
                        .deactivate(user_id, &registration.endpoint)
                        .await
                    {
                        warn!(%user_id, %e, "Failed to deactivate push registration");
                    }
                }
                PushOutcome::Failed => {}
            }
        }
    }

    async fn push_one(
        &self,
        registration: &PushRegistration,
        frame: &serde_json::Value,
        budget: Duration,
    ) -> PushOutcome {
        match timeout(budget, self.push.send(registration, frame)).await {
            Ok(Ok(())) => PushOutcome::Delivered,
            Ok(Err(PushSendError::EndpointInvalid)) => PushOutcome::Invalid,
            Ok(Err(PushSendError::Other(e))) => {
                warn!(endpoint = %registration.endpoint, %e, "Push send failed");
                PushOutcome::Failed
            }
            Err(_) => {
                warn!(endpoint = %registration.endpoint, "Push send timed out");
                PushOutcome::Failed
            }
        }
    }
}

enum PushOutcome {
    Delivered,
    Invalid,
    Failed,
}
