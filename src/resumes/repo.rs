use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::resumes::dto::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "resume_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResumeStatus {
    Apply,
    Drop,
    Pass,
    Interview1,
    Interview2,
    FinalPass,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resume {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub status: ResumeStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Detail/list view with the author's name joined in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeDetails {
    pub id: Uuid,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub status: ResumeStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeLog {
    pub id: Uuid,
    pub recruiter_id: Uuid,
    pub resume_id: Uuid,
    pub old_status: ResumeStatus,
    pub new_status: ResumeStatus,
    pub reason: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeLogView {
    pub id: Uuid,
    pub recruiter_name: String,
    pub resume_id: Uuid,
    pub old_status: ResumeStatus,
    pub new_status: ResumeStatus,
    pub reason: String,
    pub created_at: OffsetDateTime,
}

pub async fn create(
    db: &PgPool,
    author_id: Uuid,
    title: &str,
    content: &str,
) -> anyhow::Result<Resume> {
    let resume = sqlx::query_as::<_, Resume>(
        r#"
        INSERT INTO resumes (author_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, author_id, title, content, status, created_at, updated_at
        "#,
    )
    .bind(author_id)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(resume)
}

/// `author` narrows the listing to one applicant; recruiters pass `None` and
/// see everything.
pub async fn list(
    db: &PgPool,
    author: Option<Uuid>,
    sort: SortOrder,
) -> anyhow::Result<Vec<ResumeDetails>> {
    let order = match sort {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let sql = format!(
        r#"
        SELECT r.id, u.name AS author_name, r.title, r.content, r.status,
               r.created_at, r.updated_at
        FROM resumes r
        JOIN users u ON u.id = r.author_id
        WHERE ($1::uuid IS NULL OR r.author_id = $1)
        ORDER BY r.created_at {order}
        "#
    );
    let rows = sqlx::query_as::<_, ResumeDetails>(&sql)
        .bind(author)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_details(
    db: &PgPool,
    id: Uuid,
    author: Option<Uuid>,
) -> anyhow::Result<Option<ResumeDetails>> {
    let row = sqlx::query_as::<_, ResumeDetails>(
        r#"
        SELECT r.id, u.name AS author_name, r.title, r.content, r.status,
               r.created_at, r.updated_at
        FROM resumes r
        JOIN users u ON u.id = r.author_id
        WHERE r.id = $1 AND ($2::uuid IS NULL OR r.author_id = $2)
        "#,
    )
    .bind(id)
    .bind(author)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    author_id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
) -> anyhow::Result<Option<Resume>> {
    let resume = sqlx::query_as::<_, Resume>(
        r#"
        UPDATE resumes
        SET title = COALESCE($3, title),
            content = COALESCE($4, content),
            updated_at = now()
        WHERE id = $1 AND author_id = $2
        RETURNING id, author_id, title, content, status, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(author_id)
    .bind(title)
    .bind(content)
    .fetch_optional(db)
    .await?;
    Ok(resume)
}

pub async fn delete(db: &PgPool, id: Uuid, author_id: Uuid) -> anyhow::Result<Option<Uuid>> {
    let deleted = sqlx::query_scalar::<_, Uuid>(
        r#"
        DELETE FROM resumes WHERE id = $1 AND author_id = $2 RETURNING id
        "#,
    )
    .bind(id)
    .bind(author_id)
    .fetch_optional(db)
    .await?;
    Ok(deleted)
}

/// Status change and its audit log land in one transaction; the row lock
/// keeps the logged old status honest under concurrent updates.
pub async fn update_status_with_log(
    db: &PgPool,
    resume_id: Uuid,
    recruiter_id: Uuid,
    new_status: ResumeStatus,
    reason: &str,
) -> anyhow::Result<Option<ResumeLog>> {
    let mut tx = db.begin().await?;

    let old_status = sqlx::query_scalar::<_, ResumeStatus>(
        r#"SELECT status FROM resumes WHERE id = $1 FOR UPDATE"#,
    )
    .bind(resume_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(old_status) = old_status else {
        return Ok(None);
    };

    sqlx::query(r#"UPDATE resumes SET status = $2, updated_at = now() WHERE id = $1"#)
        .bind(resume_id)
        .bind(new_status)
        .execute(&mut *tx)
        .await?;

    let log = sqlx::query_as::<_, ResumeLog>(
        r#"
        INSERT INTO resume_logs (recruiter_id, resume_id, old_status, new_status, reason)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, recruiter_id, resume_id, old_status, new_status, reason, created_at
        "#,
    )
    .bind(recruiter_id)
    .bind(resume_id)
    .bind(old_status)
    .bind(new_status)
    .bind(reason)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(log))
}

pub async fn list_logs(db: &PgPool, resume_id: Uuid) -> anyhow::Result<Vec<ResumeLogView>> {
    let rows = sqlx::query_as::<_, ResumeLogView>(
        r#"
        SELECT l.id, u.name AS recruiter_name, l.resume_id, l.old_status,
               l.new_status, l.reason, l.created_at
        FROM resume_logs l
        JOIN users u ON u.id = l.recruiter_id
        WHERE l.resume_id = $1
        ORDER BY l.created_at DESC
        "#,
    )
    .bind(resume_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
