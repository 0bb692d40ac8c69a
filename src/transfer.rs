//! CSV dump and restore of the trivia tables.

use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::queries::categories::{get_all_categories, import_categories};
use crate::db::queries::questions::{get_questions, import_questions};
use crate::db::{Category, Question, QuestionFilter};

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record.with_context(|| format!("Bad record in {}", path.display()))?;
        out.push(record);
    }
    Ok(out)
}

pub async fn export_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_questions(pool, &QuestionFilter::default()).await?;
    if !dir.exists() {
        std::fs::create_dir_all(dir)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    write_to(&dir.join(CATEGORIES_FILE), categories)?;
    write_to(&dir.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

/// Both files are parsed before anything is written, and both tables are
/// written in one transaction.
pub async fn import_data(pool: &SqlitePool, dir: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&dir.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&dir.join(QUESTIONS_FILE))?;
    tracing::info!(
        "Importing {} categories and {} questions from {}",
        categories.len(),
        questions.len(),
        dir.display()
    );
    let mut tx = pool.begin().await?;
    import_categories(&mut tx, categories).await?;
    import_questions(&mut tx, questions).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::db::queries::questions::{count_questions, create_question};
    use crate::db::NewQuestion;

    #[tokio::test]
    async fn export_then_import_into_empty_database() {
        let source = memory_pool().await;
        create_question(
            &source,
            &NewQuestion {
                question: "Which is the only team to play in every soccer World Cup?".to_owned(),
                answer: "Brazil".to_owned(),
                category: 6,
                difficulty: 3,
            },
        )
        .await
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("dump");
        export_data(&source, &dump).await.unwrap();

        let target = memory_pool().await;
        import_data(&target, &dump).await.unwrap();

        let imported = get_questions(&target, &QuestionFilter::default())
            .await
            .unwrap();
        assert_eq!(
            imported,
            get_questions(&source, &QuestionFilter::default())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn categories_file_uses_type_header() {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().unwrap();
        export_data(&pool, dir.path()).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(CATEGORIES_FILE)).unwrap();
        assert!(contents.starts_with("id,type\n1,Science\n"));
    }

    #[tokio::test]
    async fn missing_questions_file_imports_nothing() {
        let pool = memory_pool().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n9,Music\n").unwrap();

        assert!(import_data(&pool, dir.path()).await.is_err());
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 6);
        assert_eq!(
            count_questions(&pool, &QuestionFilter::default())
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn failed_question_write_rolls_back_categories() {
        let pool = memory_pool().await;
        sqlx::query(
            r#"
            CREATE TRIGGER reject_questions BEFORE INSERT ON questions
            BEGIN SELECT RAISE(ABORT, 'rejected'); END
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CATEGORIES_FILE), "id,type\n9,Music\n").unwrap();
        std::fs::write(
            dir.path().join(QUESTIONS_FILE),
            "id,question,answer,category,difficulty\n1,q,a,9,2\n",
        )
        .unwrap();

        assert!(import_data(&pool, dir.path()).await.is_err());
        assert_eq!(get_all_categories(&pool).await.unwrap().len(), 6);
    }
}
