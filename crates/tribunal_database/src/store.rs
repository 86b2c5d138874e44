//! Diesel implementation of the moderation store.

use crate::connection::{DEFAULT_POOL_SIZE, PgPool, build_pool, database_url_from_env};
use crate::models::{
    EscalationRuleRow, GuildSettingsRow, InfractionRow, NewEscalationHistoryRow,
    NewInfractionRow, NewPermissionRuleRow, PermissionRuleRow, threshold_to_column, to_column,
};
use crate::schema::{
    escalation_history, escalation_rules, guild_settings, infractions, permission_rules,
};
use crate::{DatabaseResult, run_migrations};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{debug, instrument};
use tribunal_core::{
    GuildId, GuildSettings, Infraction, InfractionId, InfractionType, NewInfraction,
    NewPermissionRule, PermissionRule, Revoker, RuleId, UserId, WarningEscalationRule,
};
use tribunal_error::{
    DatabaseError, DatabaseErrorKind, ModerationError, ModerationErrorKind, ModerationResult,
};
use tribunal_interface::ModerationStore;

/// PostgreSQL-backed [`ModerationStore`].
///
/// Cloning shares the underlying pool.
#[derive(Clone)]
pub struct PostgresModerationStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresModerationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("PostgresModerationStore")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

fn not_found(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::NotFound(message))
}

fn conflict(message: String) -> ModerationError {
    ModerationError::new(ModerationErrorKind::Conflict(message))
}

fn infraction_exists(conn: &mut PgConnection, id: InfractionId) -> ModerationResult<bool> {
    let exists = diesel::select(diesel::dsl::exists(
        infractions::table.filter(infractions::id.eq(id.get())),
    ))
    .get_result::<bool>(conn)
    .map_err(DatabaseError::from)?;
    Ok(exists)
}

fn into_infractions(rows: Vec<InfractionRow>) -> ModerationResult<Vec<Infraction>> {
    rows.into_iter()
        .map(|row| Infraction::try_from(row).map_err(ModerationError::from))
        .collect()
}

impl PostgresModerationStore {
    /// Connect to `database_url` with a pool of `pool_size` connections.
    ///
    /// # Errors
    ///
    /// Returns a pool error if the database cannot be reached.
    pub fn new(database_url: &str, pool_size: u32) -> DatabaseResult<Self> {
        Ok(Self::with_pool(build_pool(database_url, pool_size)?))
    }

    /// Connect using `DATABASE_URL` and the default pool size.
    ///
    /// # Errors
    ///
    /// Returns a connection error if `DATABASE_URL` is unset or unreachable.
    pub fn from_env() -> DatabaseResult<Self> {
        Self::new(&database_url_from_env()?, DEFAULT_POOL_SIZE)
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a connection cannot be obtained or a migration fails.
    pub async fn run_migrations(&self) -> ModerationResult<usize> {
        self.run(|conn| Ok(run_migrations(conn)?)).await
    }

    /// Run a blocking diesel operation on a pooled connection.
    async fn run<T, F>(&self, operation: F) -> ModerationResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> ModerationResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::Pool(format!(
                    "Failed to get connection from pool: {}",
                    e
                )))
            })?;
            operation(&mut conn)
        })
        .await
        .map_err(|e| {
            ModerationError::new(ModerationErrorKind::Storage(format!(
                "Database task failed: {}",
                e
            )))
        })?
    }
}

#[async_trait]
impl ModerationStore for PostgresModerationStore {
    #[instrument(skip(self, rule), fields(guild_id = %rule.guild_id))]
    async fn add_permission_rule(
        &self,
        rule: NewPermissionRule,
    ) -> ModerationResult<PermissionRule> {
        let row = NewPermissionRuleRow::from(rule.validate()?);
        self.run(move |conn| {
            let inserted = diesel::insert_into(permission_rules::table)
                .values(&row)
                .returning(PermissionRuleRow::as_returning())
                .get_result(conn)
                .map_err(DatabaseError::from)?;
            debug!(rule_id = inserted.id, "Permission rule stored");
            Ok(PermissionRule::try_from(inserted)?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_permission_rule(
        &self,
        guild_id: GuildId,
        rule_id: RuleId,
    ) -> ModerationResult<()> {
        self.run(move |conn| {
            let deleted = diesel::delete(
                permission_rules::table
                    .filter(permission_rules::id.eq(rule_id.get()))
                    .filter(permission_rules::guild_id.eq(to_column(guild_id.get()))),
            )
            .execute(conn)
            .map_err(DatabaseError::from)?;
            if deleted == 0 {
                return Err(not_found(format!(
                    "Permission rule {} does not exist in guild {}",
                    rule_id, guild_id
                )));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_permission_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<PermissionRule>> {
        self.run(move |conn| {
            let rows = permission_rules::table
                .filter(permission_rules::guild_id.eq(to_column(guild_id.get())))
                .order(permission_rules::id.asc())
                .select(PermissionRuleRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            rows.into_iter()
                .map(|row| PermissionRule::try_from(row).map_err(ModerationError::from))
                .collect()
        })
        .await
    }

    #[instrument(
        skip(self, infraction),
        fields(guild_id = %infraction.guild_id, receiver_id = %infraction.receiver_id)
    )]
    async fn insert_infraction(&self, infraction: NewInfraction) -> ModerationResult<Infraction> {
        let row = NewInfractionRow::from(infraction);
        self.run(move |conn| {
            let inserted = diesel::insert_into(infractions::table)
                .values(&row)
                .returning(InfractionRow::as_returning())
                .get_result(conn)
                .map_err(DatabaseError::from)?;
            debug!(infraction_id = inserted.id, "Infraction stored");
            Ok(Infraction::try_from(inserted)?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_infraction(&self, id: InfractionId) -> ModerationResult<Option<Infraction>> {
        self.run(move |conn| {
            let row = infractions::table
                .find(id.get())
                .select(InfractionRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(row.map(Infraction::try_from).transpose()?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_infraction(&self, id: InfractionId) -> ModerationResult<()> {
        self.run(move |conn| {
            let deleted = diesel::delete(infractions::table.find(id.get()))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if deleted == 0 {
                return Err(not_found(format!("Infraction {} does not exist", id)));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn mark_revoked(
        &self,
        id: InfractionId,
        revoker: Revoker,
        revoked_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction> {
        self.run(move |conn| {
            // Conditional on revoked = false so concurrent revokes cannot both win.
            let updated = diesel::update(
                infractions::table
                    .find(id.get())
                    .filter(infractions::revoked.eq(false)),
            )
            .set((
                infractions::revoked.eq(true),
                infractions::revoked_by.eq(Some(revoker.to_string())),
                infractions::revoked_at.eq(Some(revoked_at)),
            ))
            .returning(InfractionRow::as_returning())
            .get_result(conn)
            .optional()
            .map_err(DatabaseError::from)?;

            match updated {
                Some(row) => Ok(Infraction::try_from(row)?),
                None if infraction_exists(conn, id)? => {
                    Err(conflict(format!("Infraction {} was already revoked", id)))
                }
                None => Err(not_found(format!("Infraction {} does not exist", id))),
            }
        })
        .await
    }

    #[instrument(skip(self, message))]
    async fn mark_appealed(
        &self,
        id: InfractionId,
        message: &str,
        appealed_at: DateTime<Utc>,
    ) -> ModerationResult<Infraction> {
        let message = message.to_string();
        self.run(move |conn| {
            let updated = diesel::update(
                infractions::table
                    .find(id.get())
                    .filter(infractions::appealed_at.is_null()),
            )
            .set((
                infractions::appealed_at.eq(Some(appealed_at)),
                infractions::appeal_message.eq(Some(message)),
            ))
            .returning(InfractionRow::as_returning())
            .get_result(conn)
            .optional()
            .map_err(DatabaseError::from)?;

            match updated {
                Some(row) => Ok(Infraction::try_from(row)?),
                None if infraction_exists(conn, id)? => {
                    Err(conflict(format!("Infraction {} was already appealed", id)))
                }
                None => Err(not_found(format!("Infraction {} does not exist", id))),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn clear_appeal(&self, id: InfractionId) -> ModerationResult<()> {
        self.run(move |conn| {
            let updated = diesel::update(infractions::table.find(id.get()))
                .set((
                    infractions::appealed_at.eq(None::<DateTime<Utc>>),
                    infractions::appeal_message.eq(None::<String>),
                ))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            if updated == 0 {
                return Err(not_found(format!("Infraction {} does not exist", id)));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_infractions(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        include_revoked: bool,
    ) -> ModerationResult<Vec<Infraction>> {
        self.run(move |conn| {
            let mut query = infractions::table
                .filter(infractions::guild_id.eq(to_column(guild_id.get())))
                .filter(infractions::receiver_id.eq(to_column(receiver_id.get())))
                .into_boxed();
            if !include_revoked {
                query = query.filter(infractions::revoked.eq(false));
            }
            let rows = query
                .order(infractions::id.asc())
                .select(InfractionRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            into_infractions(rows)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn count_active_warnings(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
    ) -> ModerationResult<u32> {
        self.run(move |conn| {
            let count: i64 = infractions::table
                .filter(infractions::guild_id.eq(to_column(guild_id.get())))
                .filter(infractions::receiver_id.eq(to_column(receiver_id.get())))
                .filter(infractions::infraction_type.eq(InfractionType::Warning.to_string()))
                .filter(infractions::revoked.eq(false))
                .count()
                .get_result(conn)
                .map_err(DatabaseError::from)?;
            Ok(u32::try_from(count).unwrap_or(u32::MAX))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_active_mute(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<Infraction>> {
        self.run(move |conn| {
            let row = infractions::table
                .filter(infractions::guild_id.eq(to_column(guild_id.get())))
                .filter(infractions::receiver_id.eq(to_column(receiver_id.get())))
                .filter(infractions::infraction_type.eq(InfractionType::Mute.to_string()))
                .filter(infractions::revoked.eq(false))
                .filter(
                    infractions::expires_at
                        .is_null()
                        .or(infractions::expires_at.ge(now)),
                )
                .order(infractions::id.desc())
                .select(InfractionRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(row.map(Infraction::try_from).transpose()?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_expired(&self, now: DateTime<Utc>) -> ModerationResult<Vec<Infraction>> {
        self.run(move |conn| {
            let rows = infractions::table
                .filter(infractions::revoked.eq(false))
                .filter(infractions::expires_at.lt(now))
                .order(infractions::id.asc())
                .select(InfractionRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            into_infractions(rows)
        })
        .await
    }

    #[instrument(
        skip(self, rule),
        fields(guild_id = %rule.guild_id, warning_count = rule.warning_count)
    )]
    async fn set_escalation_rule(&self, rule: WarningEscalationRule) -> ModerationResult<()> {
        rule.validate()?;
        let row = EscalationRuleRow::from(&rule);
        self.run(move |conn| {
            diesel::insert_into(escalation_rules::table)
                .values(&row)
                .on_conflict((escalation_rules::guild_id, escalation_rules::warning_count))
                .do_update()
                .set((
                    escalation_rules::punishment.eq(&row.punishment),
                    escalation_rules::mute_duration_secs.eq(row.mute_duration_secs),
                ))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn remove_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<()> {
        let threshold = threshold_to_column(warning_count);
        self.run(move |conn| {
            let deleted = diesel::delete(escalation_rules::table.find((
                to_column(guild_id.get()),
                threshold,
            )))
            .execute(conn)
            .map_err(DatabaseError::from)?;
            if deleted == 0 {
                return Err(not_found(format!(
                    "No escalation rule at {} warnings in guild {}",
                    warning_count, guild_id
                )));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_escalation_rule(
        &self,
        guild_id: GuildId,
        warning_count: u32,
    ) -> ModerationResult<Option<WarningEscalationRule>> {
        let Ok(threshold) = i32::try_from(warning_count) else {
            return Ok(None);
        };
        self.run(move |conn| {
            let row = escalation_rules::table
                .find((to_column(guild_id.get()), threshold))
                .select(EscalationRuleRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(row.map(WarningEscalationRule::try_from).transpose()?)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_escalation_rules(
        &self,
        guild_id: GuildId,
    ) -> ModerationResult<Vec<WarningEscalationRule>> {
        self.run(move |conn| {
            let rows = escalation_rules::table
                .filter(escalation_rules::guild_id.eq(to_column(guild_id.get())))
                .order(escalation_rules::warning_count.asc())
                .select(EscalationRuleRow::as_select())
                .load(conn)
                .map_err(DatabaseError::from)?;
            rows.into_iter()
                .map(|row| WarningEscalationRule::try_from(row).map_err(ModerationError::from))
                .collect()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn record_escalation(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
        warning_id: InfractionId,
    ) -> ModerationResult<bool> {
        let row = NewEscalationHistoryRow::new(guild_id, receiver_id, warning_count, warning_id);
        self.run(move |conn| {
            let inserted = diesel::insert_into(escalation_history::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(inserted == 1)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn has_escalation_fired(
        &self,
        guild_id: GuildId,
        receiver_id: UserId,
        warning_count: u32,
    ) -> ModerationResult<bool> {
        let threshold = threshold_to_column(warning_count);
        self.run(move |conn| {
            let fired = diesel::select(diesel::dsl::exists(escalation_history::table.find((
                to_column(guild_id.get()),
                to_column(receiver_id.get()),
                threshold,
            ))))
            .get_result::<bool>(conn)
            .map_err(DatabaseError::from)?;
            Ok(fired)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_guild_settings(&self, guild_id: GuildId) -> ModerationResult<GuildSettings> {
        self.run(move |conn| {
            let row = guild_settings::table
                .find(to_column(guild_id.get()))
                .select(GuildSettingsRow::as_select())
                .first(conn)
                .optional()
                .map_err(DatabaseError::from)?;
            Ok(row
                .map(GuildSettings::from)
                .unwrap_or_else(|| GuildSettings::new(guild_id)))
        })
        .await
    }

    #[instrument(skip(self, settings), fields(guild_id = %settings.guild_id))]
    async fn save_guild_settings(&self, settings: GuildSettings) -> ModerationResult<()> {
        let row = GuildSettingsRow::from(&settings);
        self.run(move |conn| {
            diesel::insert_into(guild_settings::table)
                .values(&row)
                .on_conflict(guild_settings::guild_id)
                .do_update()
                .set((
                    guild_settings::mute_role_id.eq(row.mute_role_id),
                    guild_settings::log_channel_id.eq(row.log_channel_id),
                ))
                .execute(conn)
                .map_err(DatabaseError::from)?;
            Ok(())
        })
        .await
    }
}
