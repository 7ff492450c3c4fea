use std::sync::Arc;

use mongodb::Database;
use tracing::{info, warn};

use barkpark_config::Settings;
use barkpark_services::{
    AuthService, Catalog,
    dao::{
        event_key::EventKeyDao, mission::MissionDao, notification::NotificationDao,
        points::PointsDao, profile::ProfileDao, push_registration::PushRegistrationDao,
        user::UserDao,
    },
    gamification::{
        GamificationEngine, badges::BadgeEvaluator, locks::UserLockRegistry,
        missions::MissionTracker, points::PointsLedger, streak::StreakTracker,
    },
    notify::{DeliveryRouter, DisabledPushChannel, Notifier, PushChannel, WebPushChannel},
};

use crate::ws::{dispatcher::WsRealtime, storage::WsStorage};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileDao>,
    pub notifications: Arc<NotificationDao>,
    pub push_registrations: Arc<PushRegistrationDao>,
    pub engine: Arc<GamificationEngine>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> anyhow::Result<Self> {
        let catalog = Arc::new(Catalog::load()?);

        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let profiles = Arc::new(ProfileDao::new(&db));
        let transactions = Arc::new(PointsDao::new(&db));
        let missions_dao = Arc::new(MissionDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));
        let push_registrations = Arc::new(PushRegistrationDao::new(&db));
        let event_keys = Arc::new(EventKeyDao::new(&db));

        let ws_storage = Arc::new(WsStorage::new());

        let push: Arc<dyn PushChannel> = if settings.push.vapid_private_key.is_some() {
            Arc::new(WebPushChannel::new(settings.push.clone())?)
        } else {
            warn!("No VAPID private key configured, push delivery disabled");
            Arc::new(DisabledPushChannel)
        };

        let router = Arc::new(DeliveryRouter::new(
            push_registrations.clone(),
            Arc::new(WsRealtime::new(ws_storage.clone())),
            push,
            settings.delivery.clone(),
        ));
        let notifier = Arc::new(Notifier::new(notifications.clone(), router));

        let ledger = Arc::new(PointsLedger::new(
            users.clone(),
            profiles.clone(),
            transactions.clone(),
            catalog.clone(),
        ));
        let streaks = Arc::new(StreakTracker::new(
            users.clone(),
            profiles.clone(),
            catalog.clone(),
        ));
        let badges = Arc::new(BadgeEvaluator::new(
            profiles.clone(),
            ledger.clone(),
            catalog.clone(),
        ));
        let missions = Arc::new(MissionTracker::new(
            missions_dao,
            profiles.clone(),
            ledger.clone(),
            catalog.clone(),
        ));

        let engine = Arc::new(GamificationEngine::new(
            Arc::new(UserLockRegistry::new()),
            users,
            profiles.clone(),
            transactions,
            event_keys,
            ledger,
            streaks,
            badges,
            missions,
            notifier,
            catalog,
        ));

        info!("Application state initialized");

        Ok(Self {
            db,
            settings,
            auth,
            profiles,
            notifications,
            push_registrations,
            engine,
            ws_storage,
        })
    }
}
