//! Idea repository for database operations

use common::error::DatabaseResult;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow, types::Json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::idea::{
    Author, Difficulty, Idea, IdeaCounts, IdeaDraft, IdeaFilter, IdeaSummary, RecentIdea, TagCount,
};

const IDEA_COLUMNS: &str = "id, title, verified, summary, description, tags, difficulty, \
     estimated_time, tech_stack, upvotes, views, inspiration_link, author, user_id, \
     created_at, updated_at";

/// Number of tags and recent ideas shown on the dashboard
const SUMMARY_SIZE: i64 = 5;

fn idea_from_row(row: &PgRow) -> Result<Idea, sqlx::Error> {
    let difficulty: String = row.try_get("difficulty")?;
    let Json(author): Json<Author> = row.try_get("author")?;

    Ok(Idea {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        verified: row.try_get("verified")?,
        summary: row.try_get("summary")?,
        description: row.try_get("description")?,
        tags: row.try_get("tags")?,
        // the column CHECK keeps this to known values
        difficulty: Difficulty::parse(&difficulty).unwrap_or_default(),
        estimated_time: row.try_get("estimated_time")?,
        tech_stack: row.try_get("tech_stack")?,
        upvotes: row.try_get("upvotes")?,
        views: row.try_get("views")?,
        inspiration_link: row.try_get("inspiration_link")?,
        author,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn ideas_from_rows(rows: &[PgRow]) -> DatabaseResult<Vec<Idea>> {
    Ok(rows
        .iter()
        .map(idea_from_row)
        .collect::<Result<Vec<_>, _>>()?)
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Idea repository
#[derive(Clone)]
pub struct IdeaRepository {
    pool: PgPool,
}

impl IdeaRepository {
    /// Create a new idea repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List ideas matching a filter, one page at a time
    pub async fn list(&self, filter: &IdeaFilter) -> DatabaseResult<Vec<Idea>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM ideas WHERE TRUE", IDEA_COLUMNS));

        if let Some(tag) = &filter.tag {
            builder
                .push(" AND EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE lower(t) = lower(")
                .push_bind(tag.clone())
                .push("))");
        }

        if let Some(difficulty) = filter.difficulty {
            builder
                .push(" AND difficulty = ")
                .push_bind(difficulty.as_str());
        }

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", escape_like(search));
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR summary ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(user) = filter.user {
            builder.push(" AND user_id = ").push_bind(user);
        }

        builder
            .push(" ORDER BY ")
            .push(filter.sort.order_by())
            .push(" LIMIT ")
            .push_bind(i64::from(filter.limit))
            .push(" OFFSET ")
            .push_bind(filter.offset());

        debug!("Listing ideas with {:?}", filter);

        let rows = builder.build().fetch_all(&self.pool).await?;
        ideas_from_rows(&rows)
    }

    /// Featured ideas: verified first, then most upvoted, most viewed, newest
    pub async fn featured(&self, limit: i64) -> DatabaseResult<Vec<Idea>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM ideas
            ORDER BY verified DESC, upvotes DESC, views DESC, created_at DESC
            LIMIT $1
            "#,
            IDEA_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        ideas_from_rows(&rows)
    }

    /// Most recently created ideas
    pub async fn latest(&self, limit: i64) -> DatabaseResult<Vec<Idea>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM ideas
            ORDER BY created_at DESC
            LIMIT $1
            "#,
            IDEA_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        ideas_from_rows(&rows)
    }

    /// All ideas owned by a user, newest first
    pub async fn by_owner(&self, user_id: Uuid) -> DatabaseResult<Vec<Idea>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM ideas
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
            IDEA_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        ideas_from_rows(&rows)
    }

    /// Dashboard summary over a user's ideas
    pub async fn summary(&self, user_id: Uuid) -> DatabaseResult<IdeaSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*)::BIGINT AS total_ideas,
                   COALESCE(SUM(upvotes), 0)::BIGINT AS total_upvotes,
                   COALESCE(SUM(views), 0)::BIGINT AS total_views,
                   COALESCE(AVG(upvotes), 0)::FLOAT8 AS avg_upvotes
            FROM ideas
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let counts = IdeaCounts {
            total_ideas: row.try_get("total_ideas")?,
            total_upvotes: row.try_get("total_upvotes")?,
            total_views: row.try_get("total_views")?,
            avg_upvotes: row.try_get("avg_upvotes")?,
        };

        let top_tags = sqlx::query(
            r#"
            SELECT tag, COUNT(*)::BIGINT AS count
            FROM ideas, unnest(tags) AS tag
            WHERE user_id = $1
            GROUP BY tag
            ORDER BY count DESC, tag ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(SUMMARY_SIZE)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(TagCount {
                tag: row.try_get("tag")?,
                count: row.try_get("count")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        let recent_ideas = sqlx::query(
            r#"
            SELECT id, title, created_at, upvotes
            FROM ideas
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(SUMMARY_SIZE)
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| {
            Ok(RecentIdea {
                id: row.try_get("id")?,
                title: row.try_get("title")?,
                created_at: row.try_get("created_at")?,
                upvotes: row.try_get("upvotes")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(IdeaSummary {
            counts,
            top_tags,
            recent_ideas,
        })
    }

    /// Find an idea by ID
    pub async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<Idea>> {
        let row = sqlx::query(&format!("SELECT {} FROM ideas WHERE id = $1", IDEA_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }

    /// Find an idea by ID and count the view
    pub async fn find_and_record_view(&self, id: Uuid) -> DatabaseResult<Option<Idea>> {
        let row = sqlx::query(&format!(
            "UPDATE ideas SET views = views + 1 WHERE id = $1 RETURNING {}",
            IDEA_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }

    /// Insert a new idea owned by `owner_id`
    pub async fn create(&self, draft: &IdeaDraft, owner_id: Uuid) -> DatabaseResult<Idea> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO ideas (title, summary, description, tags, difficulty, estimated_time,
                               tech_stack, inspiration_link, author, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            IDEA_COLUMNS
        ))
        .bind(&draft.title)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(&draft.tags)
        .bind(draft.difficulty.as_str())
        .bind(&draft.estimated_time)
        .bind(&draft.tech_stack)
        .bind(&draft.inspiration_link)
        .bind(Json(&draft.author))
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        let idea = idea_from_row(&row)?;
        info!("Created idea {} for user {}", idea.id, owner_id);

        Ok(idea)
    }

    /// Overwrite an idea's content, returning `None` if it no longer exists
    pub async fn update(&self, id: Uuid, draft: &IdeaDraft) -> DatabaseResult<Option<Idea>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE ideas
            SET title = $2, summary = $3, description = $4, tags = $5, difficulty = $6,
                estimated_time = $7, tech_stack = $8, inspiration_link = $9, author = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            IDEA_COLUMNS
        ))
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.summary)
        .bind(&draft.description)
        .bind(&draft.tags)
        .bind(draft.difficulty.as_str())
        .bind(&draft.estimated_time)
        .bind(&draft.tech_stack)
        .bind(&draft.inspiration_link)
        .bind(Json(&draft.author))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }

    /// Delete an idea, returning whether a row was removed
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM ideas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record `user_id`'s upvote on an idea
    ///
    /// Repeated upvotes by the same user leave the count unchanged.
    pub async fn upvote(&self, idea_id: Uuid, user_id: Uuid) -> DatabaseResult<Option<Idea>> {
        let row = sqlx::query(&format!(
            r#"
            WITH inserted AS (
                INSERT INTO idea_upvotes (idea_id, user_id)
                SELECT id, $2 FROM ideas WHERE id = $1
                ON CONFLICT DO NOTHING
                RETURNING idea_id
            )
            UPDATE ideas
            SET upvotes = upvotes + (SELECT COUNT(*) FROM inserted)
            WHERE id = $1
            RETURNING {}
            "#,
            IDEA_COLUMNS
        ))
        .bind(idea_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(idea_from_row).transpose()?)
    }
}
