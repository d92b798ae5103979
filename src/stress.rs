//! Stress a [`Queue`] with concurrent producers and consumers, then check
//! that every message arrived exactly once and in producer order.
//!
//! ```
//! use handoff::stress::{self, StressConfig};
//! use handoff::sync::Capacity;
//!
//! let config = StressConfig {
//!     producers: 2,
//!     consumers: 3,
//!     messages_per_producer: 100,
//!     capacity: Capacity::Bounded(8),
//! };
//!
//! let report = stress::run(&config).unwrap();
//! assert_eq!(report.received, 200);
//! assert!(report.is_clean());
//! ```
//!
//! [`Queue`]: ../sync/queue/struct.Queue.html
use std::fmt::{self, Display};
use std::time::{Duration, Instant};

use crate::array::FixedArray;
use crate::errors::{Error, Result};
use crate::sync::queue::Queue;
use crate::sync::Capacity;

// -----------------------------------------------------------------------------
// 		- Config -
// -----------------------------------------------------------------------------
/// Shape of a stress run.
///
/// Producer `p` pushes the messages `p * messages_per_producer ..
/// (p + 1) * messages_per_producer` in ascending order, so every
/// message is distinct.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of producer threads
    pub producers: usize,
    /// Number of consumer threads
    pub consumers: usize,
    /// Messages pushed by each producer
    pub messages_per_producer: usize,
    /// Capacity of the queue under test
    pub capacity: Capacity,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            consumers: 4,
            messages_per_producer: 1000,
            capacity: Capacity::Unbounded,
        }
    }
}

impl StressConfig {
    fn total(&self) -> Result<usize> {
        if self.producers == 0 {
            return Err(Error::InvalidConfig("at least one producer is required"));
        }

        if self.consumers == 0 {
            return Err(Error::InvalidConfig("at least one consumer is required"));
        }

        self.producers
            .checked_mul(self.messages_per_producer)
            .ok_or(Error::InvalidConfig("too many messages"))
    }
}

// -----------------------------------------------------------------------------
// 		- Report -
// -----------------------------------------------------------------------------
/// Outcome of a stress run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressReport {
    /// Messages pushed
    pub sent: usize,
    /// Messages popped, duplicates included
    pub received: usize,
    /// Messages popped more than once
    pub duplicates: usize,
    /// Messages pushed but never popped
    pub missing: usize,
    /// Messages a consumer popped after a later message of the same producer
    pub out_of_order: usize,
    /// Wall time from the first spawn until every consumer finished
    pub elapsed: Duration,
}

impl StressReport {
    /// `true` if every message arrived exactly once and in order
    pub fn is_clean(&self) -> bool {
        self.received == self.sent
            && self.duplicates == 0
            && self.missing == 0
            && self.out_of_order == 0
    }
}

impl Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "sent:         {}", self.sent)?;
        writeln!(f, "received:     {}", self.received)?;
        writeln!(f, "duplicates:   {}", self.duplicates)?;
        writeln!(f, "missing:      {}", self.missing)?;
        writeln!(f, "out of order: {}", self.out_of_order)?;
        write!(f, "elapsed:      {:?}", self.elapsed)
    }
}

// -----------------------------------------------------------------------------
// 		- Run -
// -----------------------------------------------------------------------------
/// Run the producers and consumers to completion.
///
/// The queue is closed once every producer is done, which
/// lets the consumers drain what is left and return.
pub fn run(config: &StressConfig) -> Result<StressReport> {
    run_with(config, |queue| queue.iter().collect())
}

// Closes the queue when a consumer returns or unwinds, so
// producers blocked on a full queue are released either way.
struct CloseOnDrop<'a, T>(&'a Queue<T>);

impl<T> Drop for CloseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.0.close();
    }
}

fn run_with<F>(config: &StressConfig, consume: F) -> Result<StressReport>
where
    F: Fn(&Queue<u64>) -> Vec<u64> + Sync,
{
    let sent = config.total()?;
    let per_producer = config.messages_per_producer;
    let queue = Queue::<u64>::new(config.capacity)?;

    info!(
        "stress run: {} producer(s) x {} message(s), {} consumer(s), {:?}",
        config.producers, per_producer, config.consumers, config.capacity
    );

    let start = Instant::now();

    let consume = &consume;
    let consumed = crossbeam::scope(|s| -> Result<Vec<Vec<u64>>> {
        let producers = (0..config.producers)
            .map(|p| {
                let queue = queue.clone();
                s.spawn(move |_| {
                    let first = (p * per_producer) as u64;
                    for msg in first..first + per_producer as u64 {
                        if let Err(e) = queue.push(msg) {
                            warn!("producer {} stopped early: {}", p, e);
                            break;
                        }
                    }
                    debug!("producer {} done", p);
                })
            })
            .collect::<Vec<_>>();

        let consumers = (0..config.consumers)
            .map(|c| {
                let queue = queue.clone();
                s.spawn(move |_| {
                    let _close = CloseOnDrop(&queue);
                    let consumed = consume(&queue);
                    debug!("consumer {} done after {} message(s)", c, consumed.len());
                    consumed
                })
            })
            .collect::<Vec<_>>();

        let mut panicked = false;
        for handle in producers {
            panicked |= handle.join().is_err();
        }

        // Every producer is done (or dead): release the consumers
        queue.close();

        let mut consumed = Vec::with_capacity(config.consumers);
        for handle in consumers {
            match handle.join() {
                Ok(messages) => consumed.push(messages),
                Err(_) => panicked = true,
            }
        }

        if panicked {
            return Err(Error::WorkerPanicked);
        }

        Ok(consumed)
    })
    .map_err(|_| Error::WorkerPanicked)??;

    let elapsed = start.elapsed();
    let report = verify(sent, config.producers, per_producer, &consumed, elapsed)?;

    info!("stress run finished in {:?}, clean: {}", report.elapsed, report.is_clean());
    Ok(report)
}

fn verify(
    sent: usize,
    producers: usize,
    per_producer: usize,
    consumed: &[Vec<u64>],
    elapsed: Duration,
) -> Result<StressReport> {
    let mut seen = FixedArray::<bool>::new(sent);
    let mut report = StressReport {
        sent,
        received: 0,
        duplicates: 0,
        missing: 0,
        out_of_order: 0,
        elapsed,
    };

    for messages in consumed {
        let mut last = FixedArray::<Option<u64>>::new(producers);

        for &msg in messages {
            report.received += 1;

            let index = msg as usize;
            if seen.set(index, true)? {
                report.duplicates += 1;
            }

            let producer = index / per_producer;
            let prev = last[producer];
            match prev {
                Some(prev) if msg < prev => report.out_of_order += 1,
                _ => last[producer] = Some(msg),
            }
        }
    }

    report.missing = seen.iter().filter(|seen| !**seen).count();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_clean_run() -> Result<()> {
        let consumed = vec![vec![0, 2, 3], vec![1, 4, 5]];
        let report = verify(6, 2, 3, &consumed, Duration::default())?;
        assert!(report.is_clean());
        Ok(())
    }

    #[test]
    fn verify_counts_duplicates_and_missing() -> Result<()> {
        let consumed = vec![vec![0, 1], vec![1]];
        let report = verify(3, 1, 3, &consumed, Duration::default())?;
        assert_eq!(report.received, 3);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.missing, 1);
        assert!(!report.is_clean());
        Ok(())
    }

    #[test]
    fn verify_counts_out_of_order() -> Result<()> {
        let consumed = vec![vec![1, 0, 2]];
        let report = verify(3, 1, 3, &consumed, Duration::default())?;
        assert_eq!(report.out_of_order, 1);
        assert_eq!(report.duplicates, 0);
        Ok(())
    }

    #[test]
    fn verify_rejects_unknown_message() {
        let consumed = vec![vec![7]];
        match verify(3, 1, 3, &consumed, Duration::default()) {
            Err(Error::OutOfBounds { index: 7, len: 3 }) => {}
            _ => panic!("Should return an OutOfBounds error"),
        }
    }

    #[test]
    fn consumer_panic_releases_blocked_producers() {
        let config = StressConfig {
            producers: 2,
            consumers: 1,
            messages_per_producer: 100,
            capacity: Capacity::Bounded(1),
        };

        let res = run_with(&config, |queue| {
            let _ = queue.pop();
            panic!("consumer failed");
        });
        assert_eq!(res, Err(Error::WorkerPanicked));
    }

    #[test]
    fn zero_workers_rejected() {
        let config = StressConfig { producers: 0, ..StressConfig::default() };
        assert!(run(&config).is_err());

        let config = StressConfig { consumers: 0, ..StressConfig::default() };
        assert!(run(&config).is_err());
    }
}
