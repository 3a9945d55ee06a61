use futures_taskpool::{TaskPool, DEFAULT_DRAIN_POLL_INTERVAL};
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::info;

/// Generates random numbers and reaps a known number of results.
async fn random_generation(nworkers: usize, count: usize) {
  let pool = TaskPool::<f64>::new(nworkers, Handle::current(), "random_generation");
  for i in 0..count {
    pool.add_blocking(Some(i.to_string()), rand::random::<f64>);
  }

  for _ in 0..count {
    match pool.reap(None).await {
      Ok(completed) => println!("{:?}", completed.into_parts()),
      Err(e) => tracing::error!("Reap failed: {:?}", e),
    }
  }
}

/// Generates random numbers, then drains right away. `nworkers` must be small
/// enough that not every task has finished by then, so the number of results
/// is not known in advance.
async fn random_generation_with_drain(nworkers: usize, count: usize) {
  let pool = TaskPool::<f64>::new(nworkers, Handle::current(), "random_generation_with_drain");
  for i in 0..count {
    pool.add_blocking(Some(i.to_string()), rand::random::<f64>);
  }
  pool.drain(DEFAULT_DRAIN_POLL_INTERVAL).await;

  let mut reaped = 0usize;
  while !pool.is_empty() {
    match pool.reap(None).await {
      Ok(completed) => {
        println!("{:?}", completed.into_parts());
        reaped += 1;
      }
      Err(e) => tracing::error!("Reap failed: {:?}", e),
    }
  }
  info!("Reaped {} of {} tasks after drain.", reaped, count);
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .with_target(false)
    .init();

  let nworkers = 5;
  let count = 500;

  println!("\nrandom_generation:");
  let started = Instant::now();
  random_generation(nworkers, count).await;
  println!("elapsed ({:?})", started.elapsed());

  println!("\nrandom_generation_with_drain:");
  let started = Instant::now();
  random_generation_with_drain(nworkers, count).await;
  println!("elapsed ({:?})", started.elapsed());
}
