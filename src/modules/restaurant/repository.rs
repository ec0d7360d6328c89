use crate::modules::user::repository::User;
use crate::utils::pagination::{Paginated, Pagination};
use chrono::{Days, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub cover_image: String,
    pub address: String,
    pub category_id: String,
    pub owner_id: String,
    pub is_promoted: bool,
    pub promoted_until: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateRestaurantPayload {
    pub name: String,
    pub cover_image: String,
    pub address: String,
    pub category_id: String,
    pub owner_id: String,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

pub fn is_owner(user: &User, restaurant: &Restaurant) -> bool {
    restaurant.owner_id == user.id
}

const PROMOTION_DAYS: u64 = 7;

/// End of the promotion window bought by a payment: seven calendar days
/// from `from`, following standard date-add rollover (Jan 28 -> Feb 4).
pub fn promotion_window(from: NaiveDateTime) -> NaiveDateTime {
    from + Days::new(PROMOTION_DAYS)
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateRestaurantPayload,
) -> Result<Restaurant> {
    sqlx::query_as::<_, Restaurant>(
        "
        INSERT INTO restaurants (id, name, cover_image, address, category_id, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.cover_image)
    .bind(payload.address)
    .bind(payload.category_id)
    .bind(payload.owner_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating a restaurant: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Restaurant>> {
    sqlx::query_as::<_, Restaurant>("SELECT * FROM restaurants WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while fetching restaurant with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
}

#[derive(Deserialize, Clone)]
pub struct FindManyFilters {
    pub search: Option<String>,
}

/// Paginated listing; promoted restaurants come first. The search filter
/// is a case-insensitive substring match on the name.
pub async fn find_many<'e, E: PgExecutor<'e> + Copy>(
    e: E,
    pagination: Pagination,
    filters: FindManyFilters,
) -> Result<Paginated<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>(
        "
        SELECT *
        FROM restaurants
        WHERE name ILIKE CONCAT('%', COALESCE($1, ''), '%')
        ORDER BY is_promoted DESC, created_at DESC
        LIMIT $2
        OFFSET $3
        ",
    )
    .bind(filters.search.clone())
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching restaurants: {}", err);
        Error::UnexpectedError
    })?;

    let (total,): (i64,) = sqlx::query_as(
        "
        SELECT COUNT(id)
        FROM restaurants
        WHERE name ILIKE CONCAT('%', COALESCE($1, ''), '%')
        ",
    )
    .bind(filters.search)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while counting restaurants: {}", err);
        Error::UnexpectedError
    })?;

    Ok(Paginated::new(
        restaurants,
        total as u32,
        pagination.page,
        pagination.per_page,
    ))
}

pub async fn find_many_by_category_id<'e, E: PgExecutor<'e> + Copy>(
    e: E,
    category_id: String,
    pagination: Pagination,
) -> Result<Paginated<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>(
        "
        SELECT *
        FROM restaurants
        WHERE category_id = $1
        ORDER BY is_promoted DESC, created_at DESC
        LIMIT $2
        OFFSET $3
        ",
    )
    .bind(category_id.clone())
    .bind(pagination.limit())
    .bind(pagination.offset())
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching restaurants by category: {}", err);
        Error::UnexpectedError
    })?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(id) FROM restaurants WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(e)
            .await
            .map_err(|err| {
                tracing::error!("Error occurred while counting restaurants by category: {}", err);
                Error::UnexpectedError
            })?;

    Ok(Paginated::new(
        restaurants,
        total as u32,
        pagination.page,
        pagination.per_page,
    ))
}

#[derive(Default)]
pub struct UpdateRestaurantPayload {
    pub name: Option<String>,
    pub cover_image: Option<String>,
    pub address: Option<String>,
    pub category_id: Option<String>,
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateRestaurantPayload,
) -> Result<()> {
    sqlx::query(
        "
        UPDATE restaurants SET
            name = COALESCE($1, name),
            cover_image = COALESCE($2, cover_image),
            address = COALESCE($3, address),
            category_id = COALESCE($4, category_id),
            updated_at = NOW()
        WHERE
            id = $5
        ",
    )
    .bind(payload.name)
    .bind(payload.cover_image)
    .bind(payload.address)
    .bind(payload.category_id)
    .bind(id.clone())
    .execute(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while updating restaurant with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
    .map(|_| ())
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<()> {
    sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id.clone())
        .execute(e)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error occurred while deleting restaurant with id {}: {}",
                id,
                err
            );
            Error::UnexpectedError
        })
        .map(|_| ())
}

pub async fn promote_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    until: NaiveDateTime,
) -> Result<()> {
    sqlx::query(
        "
        UPDATE restaurants SET
            is_promoted = TRUE,
            promoted_until = $1,
            updated_at = NOW()
        WHERE
            id = $2
        ",
    )
    .bind(until)
    .bind(id.clone())
    .execute(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while promoting restaurant with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
    .map(|_| ())
}

pub async fn find_expired_promoted<'e, E: PgExecutor<'e>>(
    e: E,
    now: NaiveDateTime,
) -> Result<Vec<Restaurant>> {
    sqlx::query_as::<_, Restaurant>(
        "SELECT * FROM restaurants WHERE is_promoted = TRUE AND promoted_until < $1",
    )
    .bind(now)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching expired promotions: {}", err);
        Error::UnexpectedError
    })
}

/// Clears both promotion fields together; already-cleared rows are a no-op,
/// so overlapping sweep runs are safe.
pub async fn clear_promotion_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<()> {
    sqlx::query(
        "
        UPDATE restaurants SET
            is_promoted = FALSE,
            promoted_until = NULL,
            updated_at = NOW()
        WHERE
            id = $1
        ",
    )
    .bind(id.clone())
    .execute(e)
    .await
    .map_err(|err| {
        tracing::error!(
            "Error occurred while clearing promotion of restaurant with id {}: {}",
            id,
            err
        );
        Error::UnexpectedError
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::user::repository::Role;
    use chrono::NaiveDate;

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            password: String::new(),
            role: Role::Owner,
            is_verified: true,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    fn restaurant(owner_id: &str) -> Restaurant {
        Restaurant {
            id: "r1".to_string(),
            name: "Pizza Palace".to_string(),
            cover_image: String::new(),
            address: String::new(),
            category_id: "c1".to_string(),
            owner_id: owner_id.to_string(),
            is_promoted: false,
            promoted_until: None,
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn owner_check_compares_principal_ids() {
        let restaurant = restaurant("u1");
        assert!(is_owner(&user("u1"), &restaurant));
        assert!(!is_owner(&user("u2"), &restaurant));
    }

    #[test]
    fn promotion_window_is_seven_calendar_days() {
        let jan_28 = NaiveDate::from_ymd_opt(2024, 1, 28)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let feb_4 = NaiveDate::from_ymd_opt(2024, 2, 4)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(promotion_window(jan_28), feb_4);
    }

    #[test]
    fn promotion_window_rolls_over_year_end() {
        let dec_28 = NaiveDate::from_ymd_opt(2024, 12, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let jan_4 = NaiveDate::from_ymd_opt(2025, 1, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(promotion_window(dec_28), jan_4);
    }
}
