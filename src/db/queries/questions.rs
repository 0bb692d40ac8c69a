use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::pagination::PageWindow;

const SELECT_QUESTIONS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// Optional predicates, ANDed together. The default filter selects every row.
#[derive(Debug, Default, Clone)]
pub struct QuestionFilter {
    pub category: Option<i64>,
    pub search: Option<String>,
    pub exclude: Vec<i64>,
}

impl QuestionFilter {
    pub fn in_category(category: i64) -> Self {
        QuestionFilter {
            category: Some(category),
            ..Default::default()
        }
    }

    pub fn matching(term: impl Into<String>) -> Self {
        QuestionFilter {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn excluding(mut self, ids: &[i64]) -> Self {
        self.exclude.extend_from_slice(ids);
        self
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut keyword = " WHERE ";
        if let Some(category) = self.category {
            qb.push(keyword).push("category = ").push_bind(category);
            keyword = " AND ";
        }
        if let Some(term) = &self.search {
            qb.push(keyword)
                .push("question LIKE ")
                .push_bind(like_pattern(term))
                .push(" ESCAPE '\\'");
            keyword = " AND ";
        }
        // one JSON array parameter, however many ids are excluded
        if !self.exclude.is_empty() {
            let ids = serde_json::Value::from(self.exclude.clone()).to_string();
            qb.push(keyword)
                .push("id NOT IN (SELECT value FROM json_each(")
                .push_bind(ids)
                .push("))");
        }
    }
}

// LIKE is case-insensitive for ASCII; wildcards in the term match literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub async fn get_questions(pool: &SqlitePool, filter: &QuestionFilter) -> sqlx::Result<Vec<Question>> {
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
    filter.push_where(&mut qb);
    qb.push(" ORDER BY id");
    qb.build_query_as::<Question>().fetch_all(pool).await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    filter: &QuestionFilter,
    window: PageWindow,
) -> sqlx::Result<Vec<Question>> {
    if window.limit() == 0 {
        return Ok(Vec::new());
    }
    let mut qb = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
    filter.push_where(&mut qb);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(window.limit())
        .push(" OFFSET ")
        .push_bind(window.offset());
    qb.build_query_as::<Question>().fetch_all(pool).await
}

pub async fn count_questions(pool: &SqlitePool, filter: &QuestionFilter) -> sqlx::Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM questions");
    filter.push_where(&mut qb);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

pub async fn get_question(pool: &SqlitePool, id: i64) -> sqlx::Result<Question> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Fails with `RowNotFound` when nothing was deleted, so only one of two
/// racing deletes of the same id succeeds.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();

    if deleted == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// Upserts by id, keeping the ids from the import.
pub async fn import_questions(
    conn: &mut SqliteConnection,
    questions: Vec<Question>,
) -> sqlx::Result<()> {
    for question in questions {
        sqlx::query(
            r#"
            INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (id) DO UPDATE SET
                question = excluded.question,
                answer = excluded.answer,
                category = excluded.category,
                difficulty = excluded.difficulty
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
