use async_trait::async_trait;
use tracing::debug;
use web_push::{
    ContentEncoding, IsahcWebPushClient, SubscriptionInfo, URL_SAFE_NO_PAD, VapidSignature,
    VapidSignatureBuilder, WebPushClient, WebPushError, WebPushMessageBuilder,
};

use barkpark_config::PushSettings;
use barkpark_db::models::PushRegistration;

use super::channel::{PushChannel, PushSendError};

/// VAPID Web Push delivery. One HTTP request per device registration; the
/// router owns timeouts and fan-out, this type only speaks the protocol.
pub struct WebPushChannel {
    client: IsahcWebPushClient,
    settings: PushSettings,
}

impl WebPushChannel {
    pub fn new(settings: PushSettings) -> Result<Self, WebPushError> {
        Ok(Self {
            client: IsahcWebPushClient::new()?,
            settings,
        })
    }

    /// Per-endpoint VAPID signature carrying the configured subject claim;
    /// push services reject tokens without one.
    fn vapid_signature(
        &self,
        subscription: &SubscriptionInfo,
    ) -> Result<VapidSignature, PushSendError> {
        let private_key = self
            .settings
            .vapid_private_key
            .as_deref()
            .ok_or_else(|| PushSendError::Other("No VAPID key configured".to_string()))?;

        let mut builder =
            VapidSignatureBuilder::from_base64(private_key, URL_SAFE_NO_PAD, subscription)
                .map_err(|e| PushSendError::Other(e.to_string()))?;
        builder.add_claim("sub", self.settings.vapid_subject.clone());
        builder
            .build()
            .map_err(|e| PushSendError::Other(e.to_string()))
    }
}

/// Stand-in used when no VAPID key is configured. Every send fails softly,
/// so the router logs and moves on without touching registrations.
pub struct DisabledPushChannel;

#[async_trait]
impl PushChannel for DisabledPushChannel {
    async fn send(
        &self,
        _registration: &PushRegistration,
        _payload: &serde_json::Value,
    ) -> Result<(), PushSendError> {
        Err(PushSendError::Other("Push delivery disabled".to_string()))
    }
}

#[async_trait]
impl PushChannel for WebPushChannel {
    async fn send(
        &self,
        registration: &PushRegistration,
        payload: &serde_json::Value,
    ) -> Result<(), PushSendError> {
        let subscription = SubscriptionInfo::new(
            registration.endpoint.clone(),
            registration.keys.p256dh.clone(),
            registration.keys.auth.clone(),
        );

        let signature = self.vapid_signature(&subscription)?;

        let body = payload.to_string();
        let mut builder = WebPushMessageBuilder::new(&subscription);
        builder.set_payload(ContentEncoding::Aes128Gcm, body.as_bytes());
        builder.set_vapid_signature(signature);

        let message = builder
            .build()
            .map_err(|e| PushSendError::Other(e.to_string()))?;

        match self.client.send(message).await {
            Ok(()) => {
                debug!(endpoint = %registration.endpoint, "Web push delivered");
                Ok(())
            }
            Err(e) => match e.short_description() {
                "endpoint_not_valid" | "endpoint_not_found" => {
                    Err(PushSendError::EndpointInvalid)
                }
                _ => Err(PushSendError::Other(e.to_string())),
            },
        }
    }
}
