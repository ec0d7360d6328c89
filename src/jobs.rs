use apalis::cron::CronStream;
use apalis::prelude::*;
use apalis::utils::TokioExecutor;
use std::sync::Arc;

use crate::{
    modules::{auth, payment},
    types,
};

pub fn monitor(ctx: Arc<types::Context>) -> Monitor<TokioExecutor> {
    let mut all_jobs = payment::job::list(ctx.clone());
    all_jobs.extend(auth::job::list(ctx));

    let storage = types::TickStorage::new();
    let mut monitor = Monitor::<TokioExecutor>::new();

    for (index, job) in all_jobs.into_iter().enumerate() {
        let run = job.job.clone();
        let worker = WorkerBuilder::new(format!("nomnom-job-{}", index))
            .with_storage(storage.clone())
            .stream(CronStream::new(job.schedule).into_stream())
            .build_fn(move |_tick: types::Tick| {
                let run = run.clone();
                async move { run().await }
            });
        monitor = monitor.register_with_count(1, worker);
    }

    monitor
}
