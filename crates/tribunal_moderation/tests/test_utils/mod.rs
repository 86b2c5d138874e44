//! Test utilities for moderation tests.
//!
//! Provides a recording gateway, a recording notifier and a harness wiring
//! them to an in-memory store.

#![allow(dead_code)]

pub mod mock_gateway;

pub use mock_gateway::{GatewayCall, MockGateway, MockOp};

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tribunal_core::{GuildId, GuildSettings, ModerationEvent, Rank, RoleId, UserId};
use tribunal_error::{GatewayError, GatewayErrorKind, GatewayResult};
use tribunal_interface::{ModerationNotifier, ModerationStore};
use tribunal_moderation::{InMemoryModerationStore, InfractionLifecycle, LifecycleConfig};

pub const GUILD: GuildId = GuildId(1);
pub const OWNER: UserId = UserId(5);
pub const MODERATOR: UserId = UserId(10);
pub const JUNIOR: UserId = UserId(11);
pub const MEMBER: UserId = UserId(20);
pub const OTHER_MEMBER: UserId = UserId(21);
pub const STRANGER: UserId = UserId(30);
pub const BOT: UserId = UserId(1000);
pub const MUTE_ROLE: RoleId = RoleId(777);

/// Notifier that records events and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ModerationEvent>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<ModerationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.events().iter().map(|event| event.label()).collect()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModerationNotifier for RecordingNotifier {
    async fn notify(&self, event: &ModerationEvent) -> GatewayResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GatewayError::new(GatewayErrorKind::Unavailable(
                "log channel unreachable".to_string(),
            )));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Lifecycle wired to mocks, with a populated guild.
pub struct Harness {
    pub store: Arc<InMemoryModerationStore>,
    pub gateway: Arc<MockGateway>,
    pub notifier: Arc<RecordingNotifier>,
    pub lifecycle: InfractionLifecycle,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(LifecycleConfig::default()).await
    }

    pub async fn with_config(config: LifecycleConfig) -> Self {
        let store = Arc::new(InMemoryModerationStore::new());
        store
            .save_guild_settings(GuildSettings::new(GUILD).with_mute_role(MUTE_ROLE))
            .await
            .unwrap();

        let gateway = Arc::new(MockGateway::new(BOT));
        gateway.set_owner(GUILD, OWNER);
        gateway.set_rank(GUILD, OWNER, Rank(1));
        gateway.set_rank(GUILD, BOT, Rank(100));
        gateway.set_rank(GUILD, MODERATOR, Rank(50));
        gateway.set_rank(GUILD, JUNIOR, Rank(10));
        gateway.set_rank(GUILD, MEMBER, Rank(10));
        gateway.set_rank(GUILD, OTHER_MEMBER, Rank(5));

        let notifier = Arc::new(RecordingNotifier::default());
        let lifecycle = InfractionLifecycle::new(
            store.clone(),
            gateway.clone(),
            notifier.clone(),
            config,
        );

        Self {
            store,
            gateway,
            notifier,
            lifecycle,
        }
    }
}
