use std::process;

use clap::Parser;

use handoff::errors::Result;
use handoff::stress::{self, StressConfig, StressReport};
use handoff::sync::Capacity;

#[derive(Parser)]
#[command(version, about = "Stress a handoff queue with concurrent producers and consumers", long_about = None)]
struct Args {
    /// number of threads pushing messages onto the queue.
    #[arg(long, default_value_t = 4)]
    producers: usize,
    /// number of threads popping messages off the queue.
    #[arg(long, default_value_t = 4)]
    consumers: usize,
    /// number of messages each producer pushes.
    #[arg(long, default_value_t = 1000)]
    messages: usize,
    /// bound the queue to this many messages, unbounded if omitted.
    #[arg(long)]
    capacity: Option<usize>,
}

impl From<Args> for StressConfig {
    fn from(args: Args) -> Self {
        StressConfig {
            producers: args.producers,
            consumers: args.consumers,
            messages_per_producer: args.messages,
            capacity: Capacity::from(args.capacity),
        }
    }
}

// 0 for a clean run, 1 if messages were lost, duplicated or reordered,
// 2 if the run itself failed
fn exit_code(outcome: &Result<StressReport>) -> i32 {
    match outcome {
        Ok(report) if report.is_clean() => 0,
        Ok(_) => 1,
        Err(_) => 2,
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = StressConfig::from(Args::parse());
    let outcome = stress::run(&config);

    match &outcome {
        Ok(report) => println!("{}", report),
        Err(e) => eprintln!("stress run failed: {}", e),
    }

    process::exit(exit_code(&outcome));
}
