use crate::modules::restaurant::repository::Restaurant;
use crate::modules::user::repository::User;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use sqlx::PgExecutor;
use ulid::Ulid;

type Result<T> = std::result::Result<T, Error>;

#[derive(Serialize, Deserialize, Clone, Debug, sqlx::FromRow)]
pub struct Dish {
    pub id: String,
    pub name: String,
    pub price: BigDecimal,
    pub photo: Option<String>,
    pub description: String,
    pub restaurant_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

pub struct CreateDishPayload {
    pub name: String,
    pub price: BigDecimal,
    pub photo: Option<String>,
    pub description: String,
    pub restaurant_id: String,
}

#[derive(Debug)]
pub enum Error {
    UnexpectedError,
}

/// Dish ownership is transitive: the principal owns the dish iff they own
/// the restaurant the dish belongs to.
pub fn is_owner(user: &User, restaurant: &Restaurant, dish: &Dish) -> bool {
    dish.restaurant_id == restaurant.id && restaurant.owner_id == user.id
}

pub async fn create<'e, E: PgExecutor<'e>>(e: E, payload: CreateDishPayload) -> Result<Dish> {
    sqlx::query_as::<_, Dish>(
        "
        INSERT INTO dishes (id, name, price, photo, description, restaurant_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.name)
    .bind(payload.price)
    .bind(payload.photo)
    .bind(payload.description)
    .bind(payload.restaurant_id)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while creating a dish: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<Option<Dish>> {
    sqlx::query_as::<_, Dish>("SELECT * FROM dishes WHERE id = $1")
        .bind(id.clone())
        .fetch_optional(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while fetching dish with id {}: {}", id, err);
            Error::UnexpectedError
        })
}

pub async fn find_many_by_restaurant_id<'e, E: PgExecutor<'e>>(
    e: E,
    restaurant_id: String,
) -> Result<Vec<Dish>> {
    sqlx::query_as::<_, Dish>(
        "SELECT * FROM dishes WHERE restaurant_id = $1 ORDER BY created_at DESC",
    )
    .bind(restaurant_id)
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while fetching dishes: {}", err);
        Error::UnexpectedError
    })
}

#[derive(Default)]
pub struct UpdateDishPayload {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub photo: Option<String>,
    pub description: Option<String>,
}

pub async fn update_by_id<'e, E: PgExecutor<'e>>(
    e: E,
    id: String,
    payload: UpdateDishPayload,
) -> Result<()> {
    sqlx::query(
        "
        UPDATE dishes SET
            name = COALESCE($1, name),
            price = COALESCE($2, price),
            photo = COALESCE($3, photo),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE
            id = $5
        ",
    )
    .bind(payload.name)
    .bind(payload.price)
    .bind(payload.photo)
    .bind(payload.description)
    .bind(id.clone())
    .execute(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while updating dish with id {}: {}", id, err);
        Error::UnexpectedError
    })
    .map(|_| ())
}

pub async fn delete_by_id<'e, E: PgExecutor<'e>>(e: E, id: String) -> Result<()> {
    sqlx::query("DELETE FROM dishes WHERE id = $1")
        .bind(id.clone())
        .execute(e)
        .await
        .map_err(|err| {
            tracing::error!("Error occurred while deleting dish with id {}: {}", id, err);
            Error::UnexpectedError
        })
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::user::repository::Role;
    use bigdecimal::FromPrimitive;

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

    fn restaurant(id: &str, owner_id: &str) -> Restaurant {
        Restaurant {
            id: id.to_string(),
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

    fn dish(restaurant_id: &str) -> Dish {
        Dish {
            id: "d1".to_string(),
            name: "Margherita".to_string(),
            price: BigDecimal::from_f32(12.5).unwrap(),
            photo: None,
            description: String::new(),
            restaurant_id: restaurant_id.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
            updated_at: None,
        }
    }

    #[test]
    fn ownership_is_transitive_through_the_restaurant() {
        let restaurant = restaurant("r1", "u1");
        let dish = dish("r1");

        assert!(is_owner(&user("u1"), &restaurant, &dish));
        assert!(!is_owner(&user("u2"), &restaurant, &dish));
    }

    #[test]
    fn dish_from_another_restaurant_is_not_owned() {
        let restaurant = restaurant("r1", "u1");
        let dish = dish("r2");

        assert!(!is_owner(&user("u1"), &restaurant, &dish));
    }
}
