use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub cover_image: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Clone, sqlx::FromRow)]
pub struct CategoryWithRestaurantCount {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub cover_image: Option<String>,
    pub created_at: NaiveDateTime,
    pub restaurant_count: i64,
}

#[derive(Debug)]
pub enum Error {
    Conflict,
    UnexpectedError,
}

/// Normalizes a free-text category name to its slug: trimmed, lowercased,
/// any run of whitespace collapsed to a single hyphen. Total over Unicode
/// input and idempotent.
pub fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

pub async fn find_by_slug<'e, E: PgExecutor<'e>>(e: E, slug: String) -> Result<Option<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching category by slug: {}", err);
            Error::UnexpectedError
        })
}

pub async fn find_many<'e, E: PgExecutor<'e>>(e: E) -> Result<Vec<CategoryWithRestaurantCount>> {
    sqlx::query_as::<_, CategoryWithRestaurantCount>(
        "
        SELECT c.*, COUNT(r.id) AS restaurant_count
        FROM categories c
        LEFT JOIN restaurants r ON r.category_id = c.id
        GROUP BY c.id
        ORDER BY c.name
        ",
    )
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching categories: {}", err);
        Error::UnexpectedError
    })
}

async fn create<'e, E: PgExecutor<'e>>(e: E, name: String, slug: String) -> Result<Category> {
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Ulid::new().to_string())
    .bind(name)
    .bind(slug)
    .fetch_one(e)
    .await
    .map_err(|err| {
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return Error::Conflict;
        }
        tracing::error!("Error occurred while creating a category: {}", err);
        Error::UnexpectedError
    })
}

/// Looks a category up by the slug of `name`, creating it when absent. A
/// lost creation race surfaces as a unique violation, which resolves to a
/// re-fetch of the row the winner inserted.
pub async fn get_or_create<'e, E: PgExecutor<'e> + Copy>(e: E, name: String) -> Result<Category> {
    let slug = slugify(&name);

    if let Some(category) = find_by_slug(e, slug.clone()).await? {
        return Ok(category);
    }

    match create(e, name.trim().to_string(), slug.clone()).await {
        Ok(category) => Ok(category),
        Err(Error::Conflict) => find_by_slug(e, slug)
            .await?
            .ok_or(Error::UnexpectedError),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(slugify("Italian Food"), "italian-food");
        assert_eq!(slugify("italian food"), "italian-food");
    }

    #[test]
    fn slug_collapses_repeated_separators() {
        assert_eq!(slugify("  Fast \t  Food  "), "fast-food");
        assert_eq!(slugify("a\n\nb"), "a-b");
    }

    #[test]
    fn slug_is_idempotent() {
        let once = slugify("Korean BBQ");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn slug_is_total_over_unicode() {
        assert_eq!(slugify("Crêpes  Étoilées"), "crêpes-étoilées");
        assert_eq!(slugify("   "), "");
    }
}
