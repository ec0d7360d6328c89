use super::repository;
use crate::types::{Context, SchedulableJob};
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

const SESSION_CLEANUP_SCHEDULE: &str = "0 0 * * * *";

/// Deletes sessions whose lifetime has lapsed so the table does not grow
/// without bound. Failures are already logged at the repository and the next
/// run picks the rows up again.
async fn clean_up_sessions_job(ctx: Arc<Context>) -> Result<(), apalis::prelude::Error> {
    if let Ok(deleted) =
        repository::delete_expired_sessions(&ctx.db_conn.pool, Utc::now().naive_utc()).await
    {
        if deleted > 0 {
            tracing::info!("Deleted {} expired sessions", deleted);
        }
    }

    Ok(())
}

fn setup_clean_up_sessions_job(
    ctx: Arc<Context>,
) -> Arc<
    dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), apalis::prelude::Error>> + Send>>
        + Send
        + Sync,
> {
    Arc::new(move || {
        let ctx = ctx.clone();
        Box::pin(async move { clean_up_sessions_job(ctx).await })
    })
}

pub fn list(ctx: Arc<Context>) -> Vec<SchedulableJob> {
    vec![SchedulableJob {
        schedule: apalis::cron::Schedule::from_str(SESSION_CLEANUP_SCHEDULE)
            .expect("Couldn't create schedule!"),
        job: setup_clean_up_sessions_job(ctx),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_schedule_is_a_valid_cron_expression() {
        assert!(apalis::cron::Schedule::from_str(SESSION_CLEANUP_SCHEDULE).is_ok());
    }
}
