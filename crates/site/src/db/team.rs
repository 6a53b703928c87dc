//! Team member repository.

use sqlx::PgPool;

use lakeside_core::TeamMemberId;

use super::{RepositoryError, count_to_usize};
use crate::collections::{EditableStore, OrderedStore, Positioned, PrimaryImageStore};
use crate::models::team::{TeamDraft, TeamMember};

#[derive(Debug, sqlx::FromRow)]
struct TeamMemberRow {
    id: i32,
    name: String,
    role: String,
    description: String,
    image_url: String,
    sort_order: i32,
}

impl From<TeamMemberRow> for TeamMember {
    fn from(row: TeamMemberRow) -> Self {
        Self {
            id: TeamMemberId::new(row.id),
            name: row.name,
            role: row.role,
            description: row.description,
            image_url: row.image_url,
            sort_order: row.sort_order,
        }
    }
}

const COLUMNS: &str = "id, name, role, description, image_url, sort_order";

/// Repository for the about page team.
pub struct TeamRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TeamRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderedStore for TeamRepository<'_> {
    type Item = TeamMember;
    type Draft = TeamDraft;

    async fn list(&self, (): ()) -> Result<Vec<TeamMember>, RepositoryError> {
        let rows = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "SELECT {COLUMNS} FROM team_member ORDER BY sort_order, id"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, (): ()) -> Result<usize, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_member")
            .fetch_one(self.pool)
            .await?;
        count_to_usize(count)
    }

    async fn max_sort_order(&self, (): ()) -> Result<Option<i32>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT MAX(sort_order) FROM team_member")
            .fetch_one(self.pool)
            .await?)
    }

    async fn insert_batch(
        &self,
        (): (),
        rows: Vec<Positioned<TeamDraft>>,
    ) -> Result<Vec<TeamMember>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(rows.len());
        for Positioned { sort_order, draft } in rows {
            let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
                "INSERT INTO team_member (name, role, description, sort_order) \
                 VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
            ))
            .bind(&draft.name)
            .bind(&draft.role)
            .bind(&draft.description)
            .bind(sort_order)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(row.into());
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find(&self, id: TeamMemberId) -> Result<Option<TeamMember>, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "SELECT {COLUMNS} FROM team_member WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: TeamMemberId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM team_member WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_sort_order(
        &self,
        id: TeamMemberId,
        sort_order: i32,
    ) -> Result<Option<TeamMember>, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "UPDATE team_member SET sort_order = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(sort_order)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl EditableStore for TeamRepository<'_> {
    async fn update(
        &self,
        id: TeamMemberId,
        draft: TeamDraft,
    ) -> Result<Option<TeamMember>, RepositoryError> {
        let row = sqlx::query_as::<_, TeamMemberRow>(&format!(
            "UPDATE team_member SET name = $2, role = $3, description = $4 \
             WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.role)
        .bind(&draft.description)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}

impl PrimaryImageStore for TeamRepository<'_> {
    async fn primary_image(&self, id: TeamMemberId) -> Result<Option<String>, RepositoryError> {
        Ok(sqlx::query_scalar("SELECT image_url FROM team_member WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?)
    }

    async fn set_primary_image(
        &self,
        id: TeamMemberId,
        url: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE team_member SET image_url = $2 WHERE id = $1")
            .bind(id)
            .bind(url)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
