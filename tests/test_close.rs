use std::thread;
use std::time::{Duration, Instant};

use handoff::errors::{Error, PushError, Result};
use handoff::sync::queue::Queue;


#[test]
fn test_close_releases_blocked_consumers() {
    let queue = Queue::<u32>::unbounded();

    let handles = (0..3)
        .map(|_| {
            let rx = queue.clone();
            thread::spawn(move || rx.pop())
        })
        .collect::<Vec<_>>();

    // Give the consumers some time to block
    thread::sleep(Duration::from_millis(50));
    assert!(queue.close());

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Err(Error::Closed));
    }
}

#[test]
fn test_close_releases_blocked_producer() -> Result<()> {
    let queue = Queue::bounded(1)?;
    queue.push(1)?;

    let tx = queue.clone();
    let producer = thread::spawn(move || tx.push(2));

    thread::sleep(Duration::from_millis(50));
    queue.close();

    match producer.join().unwrap() {
        Err(PushError::Closed(2)) => {}
        other => panic!("expected Closed(2), got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_pending_messages_survive_close() -> Result<()> {
    let queue = Queue::unbounded();
    queue.push(1)?;
    queue.push(2)?;
    queue.close();

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop(), Ok(1));
    assert_eq!(queue.try_pop_for(Duration::from_millis(10)), Ok(2));
    assert_eq!(queue.pop(), Err(Error::Closed));
    assert_eq!(queue.try_pop(), Err(Error::Closed));
    Ok(())
}

#[test]
fn test_push_after_close() {
    let queue = Queue::unbounded();
    queue.close();

    let err = queue.push(vec![1, 2, 3]).unwrap_err();
    assert!(err.is_closed());
    assert_eq!(Error::from(&err), Error::Closed);
    assert_eq!(err.into_inner(), vec![1, 2, 3]);

    assert!(queue.is_empty());
}

#[test]
fn test_close_is_idempotent() {
    let queue = Queue::<()>::unbounded();
    let other = queue.clone();

    assert!(!queue.is_closed());
    assert!(queue.close());
    assert!(!other.close());
    assert!(other.is_closed());
}

#[test]
fn test_iterator_ends_on_close() -> Result<()> {
    let queue = Queue::unbounded();
    for i in 0..3 {
        queue.push(i)?;
    }
    queue.close();

    let collected = (&queue).into_iter().collect::<Vec<_>>();
    assert_eq!(collected, vec![0, 1, 2]);

    let rest = queue.into_iter().collect::<Vec<_>>();
    assert!(rest.is_empty());
    Ok(())
}

#[test]
fn test_close_releases_timed_consumer_before_deadline() {
    let queue = Queue::<u32>::unbounded();
    let rx = queue.clone();

    let consumer = thread::spawn(move || {
        let start = Instant::now();
        let res = rx.try_pop_for(Duration::from_secs(10));
        (res, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    queue.close();

    let (res, waited) = consumer.join().unwrap();
    assert_eq!(res, Err(Error::Closed));
    assert!(waited < Duration::from_secs(5));
}

#[test]
fn test_close_releases_timed_producer_before_deadline() -> Result<()> {
    let queue = Queue::bounded(1)?;
    queue.push(1)?;

    let tx = queue.clone();
    let producer = thread::spawn(move || {
        let start = Instant::now();
        let res = tx.push_timeout(2, Duration::from_secs(10));
        (res, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    queue.close();

    let (res, waited) = producer.join().unwrap();
    assert_eq!(res, Err(PushError::Closed(2)));
    assert!(waited < Duration::from_secs(5));
    Ok(())
}
