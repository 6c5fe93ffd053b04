//! SeaORM-backed implementations of the storage ports.
//!
//! Both repositories are generic over `C: ConnectionTrait`, so they can be
//! built on a `DatabaseConnection` or on a transaction.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{AdminData, Profile, Student};
use crate::domain::model::{Account, SessionRecord};
use crate::domain::repo::{AccountsRepository, DocumentsRepository};
use crate::infra::storage::entity::{accounts, admin_data, profiles, sessions, students};

pub struct SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> AccountsRepository for SeaOrmAccountsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let found = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_uid(&self, uid: Uuid) -> anyhow::Result<Option<Account>> {
        let found = accounts::Entity::find_by_id(uid)
            .one(&self.conn)
            .await
            .context("find_by_uid failed")?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, a: Account) -> anyhow::Result<bool> {
        let m = accounts::ActiveModel {
            uid: Set(a.uid),
            email: Set(a.email),
            password_hash: Set(a.password_hash),
            created_at: Set(a.created_at),
        };
        match m.insert(&self.conn).await {
            Ok(_) => Ok(true),
            // ux_accounts_email
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Ok(false),
            Err(e) => Err(anyhow::Error::new(e).context("insert account failed")),
        }
    }

    async fn insert_session(&self, s: SessionRecord) -> anyhow::Result<()> {
        let m = sessions::ActiveModel {
            token_hash: Set(s.token_hash),
            uid: Set(s.uid),
            created_at: Set(s.created_at),
            expires_at: Set(s.expires_at),
        };
        let _ = m.insert(&self.conn).await.context("insert session failed")?;
        Ok(())
    }

    async fn find_session(&self, token_hash: &str) -> anyhow::Result<Option<SessionRecord>> {
        let found = sessions::Entity::find_by_id(token_hash.to_owned())
            .one(&self.conn)
            .await
            .context("find_session failed")?;
        Ok(found.map(Into::into))
    }

    async fn delete_session(&self, token_hash: &str) -> anyhow::Result<bool> {
        let res = sessions::Entity::delete_by_id(token_hash.to_owned())
            .exec(&self.conn)
            .await
            .context("delete_session failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await
            .context("delete_expired_sessions failed")?;
        Ok(res.rows_affected)
    }
}

pub struct SeaOrmDocumentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmDocumentsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> DocumentsRepository for SeaOrmDocumentsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_profile(&self, uid: Uuid) -> anyhow::Result<Option<Profile>> {
        let found = profiles::Entity::find_by_id(uid)
            .one(&self.conn)
            .await
            .context("find_profile failed")?;
        Ok(found.map(Into::into))
    }

    async fn upsert_profile(&self, uid: Uuid, p: Profile) -> anyhow::Result<()> {
        let m = profiles::ActiveModel {
            uid: Set(uid),
            email: Set(p.email),
            role: Set(p.role),
        };
        profiles::Entity::insert(m)
            .on_conflict(
                OnConflict::column(profiles::Column::Uid)
                    .update_columns([profiles::Column::Email, profiles::Column::Role])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("upsert_profile failed")?;
        Ok(())
    }

    async fn insert_student(&self, owner: Uuid, s: Student) -> anyhow::Result<()> {
        let m = students::ActiveModel {
            id: Set(s.id),
            owner_id: Set(owner),
            first_name: Set(s.first_name),
            last_name: Set(s.last_name),
            enrollment_date: Set(s.enrollment_date),
            created_at: Set(s.created_at),
        };
        let _ = m.insert(&self.conn).await.context("insert_student failed")?;
        Ok(())
    }

    async fn delete_student(&self, owner: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = students::Entity::delete_many()
            .filter(students::Column::OwnerId.eq(owner))
            .filter(students::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("delete_student failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_students(&self, owner: Uuid) -> anyhow::Result<Vec<Student>> {
        let rows = students::Entity::find()
            .filter(students::Column::OwnerId.eq(owner))
            .order_by_desc(students::Column::CreatedAt)
            .order_by_desc(students::Column::Id)
            .all(&self.conn)
            .await
            .context("list_students failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert_admin_data(&self, r: AdminData) -> anyhow::Result<()> {
        let m = admin_data::ActiveModel {
            id: Set(r.id),
            message: Set(r.message),
            created_by: Set(r.created_by),
            created_at: Set(r.created_at),
        };
        let _ = m.insert(&self.conn).await.context("insert_admin_data failed")?;
        Ok(())
    }

    async fn list_admin_data(&self) -> anyhow::Result<Vec<AdminData>> {
        let rows = admin_data::Entity::find()
            .order_by_desc(admin_data::Column::CreatedAt)
            .order_by_desc(admin_data::Column::Id)
            .all(&self.conn)
            .await
            .context("list_admin_data failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
