//! PostgreSQL 사용자 저장소.
//!
//! soft delete(`deleted_at`)된 행은 모든 조회에서 제외됩니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use usermgmt_core::{Identity, NewIdentity, PresenceStatus, Role, StoreError, UserStore};

// ================================================================================================
// Types
// ================================================================================================

/// users 테이블 레코드
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub status: String,
    #[sqlx(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[sqlx(default)]
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for Identity {
    type Error = StoreError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role = Role::parse(&record.role).ok_or_else(|| {
            StoreError::Unavailable(format!("unknown role in users table: {}", record.role))
        })?;
        let status = PresenceStatus::parse(&record.status).unwrap_or_default();

        Ok(Identity {
            id: record.id,
            email: record.email,
            name: record.name,
            password_hash: record.password_hash,
            role,
            is_active: record.is_active,
            status,
            last_active_at: record.last_active_at,
            department_id: record.department_id,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, role, is_active, status, \
     last_active_at, department_id, created_at, updated_at";

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound,
        other => StoreError::Unavailable(other.to_string()),
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 기반 [`UserStore`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 스키마 마이그레이션 실행.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        info!("Running database migrations...");

        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        info!("Migrations completed successfully");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Identity, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        record.try_into()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Identity, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        record.try_into()
    }

    async fn create(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let email = Identity::normalize_email(&identity.email);
        let sql = format!(
            r#"
            INSERT INTO users (email, name, password_hash, role, department_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&email)
            .bind(&identity.name)
            .bind(&identity.password_hash)
            .bind(identity.role.as_str())
            .bind(identity.department_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail(email.clone())
                }
                other => map_sqlx_error(other),
            })?;

        record.try_into()
    }

    async fn update(&self, identity: &Identity) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, role = $3, is_active = $4, status = $5,
                last_active_at = $6, department_id = $7, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(identity.id)
        .bind(&identity.name)
        .bind(identity.role.as_str())
        .bind(identity.is_active)
        .bind(identity.status.as_str())
        .bind(identity.last_active_at)
        .bind(identity.department_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn department_exists(&self, department_id: Uuid) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM departments WHERE id = $1)")
                .bind(department_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(exists)
    }

    async fn list(&self) -> Result<Vec<Identity>, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY created_at, id"
        );
        let records = sqlx::query_as::<_, UserRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        records.into_iter().map(Identity::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: &str, status: &str) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: "Test".to_string(),
            password_hash: "$argon2id$dummy".to_string(),
            role: role.to_string(),
            is_active: true,
            status: status.to_string(),
            last_active_at: None,
            department_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_record_into_identity() {
        let identity = Identity::try_from(record("manager", "busy")).unwrap();
        assert_eq!(identity.role, Role::Manager);
        assert_eq!(identity.status, PresenceStatus::Busy);
        assert_eq!(identity.password_hash, "$argon2id$dummy");
    }

    #[test]
    fn test_unknown_role_rejected() {
        assert!(matches!(
            Identity::try_from(record("root", "online")),
            Err(StoreError::Unavailable(_))
        ));
    }

    #[test]
    fn test_unknown_status_falls_back_to_offline() {
        let identity = Identity::try_from(record("employee", "???")).unwrap();
        assert_eq!(identity.status, PresenceStatus::Offline);
    }

    #[test]
    fn test_email_uniqueness_ignores_soft_deleted_rows() {
        let schema = include_str!("../../../../migrations/01_users.sql");
        let index = schema
            .lines()
            .find(|line| line.contains("users_email_lower_idx"))
            .unwrap();

        assert!(index.contains("UNIQUE"));
        assert!(index.contains("LOWER(email)"));
        assert!(index.contains("WHERE deleted_at IS NULL"));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::NotFound
        ));
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
    }
}
