use futures_taskpool::TaskPool;
use std::process::Command;
use std::time::Instant;
use tokio::runtime::Handle;
use tracing::info;

/// Runs `argv` `count` times on a pool of `nworkers`, printing each trimmed stdout.
async fn callexec(argv: &[&str], nworkers: usize, count: usize) {
  let pool = TaskPool::<String>::new(nworkers, Handle::current(), "callexec");
  for i in 0..count {
    let argv: Vec<String> = argv.iter().map(|arg| arg.to_string()).collect();
    pool.add_blocking(Some(i.to_string()), move || match Command::new(&argv[0]).args(&argv[1..]).output() {
      Ok(output) => String::from_utf8_lossy(&output.stdout).trim().to_string(),
      Err(e) => format!("failed to run {}: {}", argv[0], e),
    });
  }

  for _ in 0..count {
    match pool.reap(None).await {
      Ok(completed) => match completed.outcome {
        Ok(out) => println!("{}", out),
        Err(e) => println!("task {} failed: {}", completed.task_id, e),
      },
      Err(e) => tracing::error!("Reap failed: {:?}", e),
    }
  }
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .with_target(false)
    .init();

  // 100 one-second sleeps on 5 workers should take ~20s, not ~100s.
  let runs: [(&[&str], usize, usize); 5] = [
    (&["/bin/sleep", "1"][..], 5, 100),
    (&["/bin/hostname"][..], 2, 100),
    (&["/bin/hostname"][..], 5, 100),
    (&["/bin/hostname"][..], 10, 100),
    (&["/bin/hostname"][..], 20, 100),
  ];

  for (argv, nworkers, count) in runs {
    println!("\ncallexec({:?}, {}, {})", argv, nworkers, count);
    let started = Instant::now();
    callexec(argv, nworkers, count).await;
    println!("elapsed ({:?})", started.elapsed());
  }
  info!("All callexec runs finished.");
}
