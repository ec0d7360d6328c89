use crate::modules::restaurant;
use crate::types::{Context, SchedulableJob};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

/// Clears each promotion in turn. Each id is its own unit of work: a failed
/// update is logged and the rest of the batch still runs. Returns the number
/// of promotions actually cleared.
async fn clear_each<F, Fut>(ids: Vec<String>, clear: F) -> usize
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<(), restaurant::repository::Error>>,
{
    let mut cleared = 0;

    for id in ids {
        match clear(id.clone()).await {
            Ok(()) => cleared += 1,
            Err(err) => {
                tracing::error!(
                    "Failed to clear promotion of restaurant with id {}: {:?}",
                    id,
                    err
                );
            }
        }
    }

    cleared
}

/// Un-promotes every restaurant whose promotion window has lapsed.
async fn expire_promotions_job(ctx: Arc<Context>) -> Result<(), apalis::prelude::Error> {
    let now = Utc::now().naive_utc();

    let expired = match restaurant::repository::find_expired_promoted(&ctx.db_conn.pool, now).await
    {
        Ok(expired) => expired,
        Err(_) => return Ok(()),
    };

    if !expired.is_empty() {
        tracing::info!("Expiring {} stale restaurant promotions", expired.len());
    }

    let ids = expired.into_iter().map(|restaurant| restaurant.id).collect();
    clear_each(ids, |id| {
        restaurant::repository::clear_promotion_by_id(&ctx.db_conn.pool, id)
    })
    .await;

    Ok(())
}

fn setup_expire_promotions_job(
    ctx: Arc<Context>,
) -> Arc<
    dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), apalis::prelude::Error>> + Send>>
        + Send
        + Sync,
> {
    Arc::new(move || {
        let ctx = ctx.clone();
        Box::pin(async move { expire_promotions_job(ctx).await })
    })
}

pub fn list(ctx: Arc<Context>) -> Vec<SchedulableJob> {
    vec![SchedulableJob {
        schedule: apalis::cron::Schedule::from_str("*/30 * * * * *")
            .expect("Couldn't create schedule!"),
        job: setup_expire_promotions_job(ctx),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn a_failed_clear_does_not_stop_the_batch() {
        let attempted: Mutex<Vec<String>> = Mutex::new(vec![]);
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let cleared = clear_each(ids, |id| {
            attempted.lock().unwrap().push(id.clone());
            async move {
                if id == "b" {
                    Err(restaurant::repository::Error::UnexpectedError)
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(cleared, 2);
        assert_eq!(
            *attempted.lock().unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[tokio::test]
    async fn an_empty_batch_clears_nothing() {
        let cleared = clear_each(vec![], |_id| async { Ok(()) }).await;
        assert_eq!(cleared, 0);
    }
}
