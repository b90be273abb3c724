//! Tests for the sequential port pool.

use corral::{Error, PortPool, SequentialPortPool};

// =============================================================================
// Acquire
// =============================================================================

#[test]
fn test_acquire_returns_successive_ports() {
    let pool = SequentialPortPool::new(61001, 10);

    assert_eq!(pool.acquire().unwrap(), 61001);
    assert_eq!(pool.acquire().unwrap(), 61002);
}

#[test]
fn test_acquire_fails_when_exhausted() {
    let pool = SequentialPortPool::new(61001, 2);

    pool.acquire().unwrap();
    pool.acquire().unwrap();

    let err = pool.acquire().unwrap_err();
    assert!(matches!(err, Error::PoolExhausted { pool: "port" }));
}

// =============================================================================
// Remove
// =============================================================================

#[test]
fn test_remove_claims_a_specific_port() {
    let pool = SequentialPortPool::new(61001, 3);

    pool.remove(61002).unwrap();

    assert_eq!(pool.acquire().unwrap(), 61001);
    assert_eq!(pool.acquire().unwrap(), 61003);
    assert!(pool.acquire().is_err());
}

#[test]
fn test_remove_fails_when_port_is_already_acquired() {
    let pool = SequentialPortPool::new(61001, 3);

    let port = pool.acquire().unwrap();

    let err = pool.remove(port).unwrap_err();
    assert!(matches!(err, Error::PortTaken(61001)));
}

// =============================================================================
// Release
// =============================================================================

#[test]
fn test_release_returns_port_to_the_tail() {
    let pool = SequentialPortPool::new(61001, 2);

    let port = pool.acquire().unwrap();
    pool.release(port);

    assert_eq!(pool.acquire().unwrap(), 61002);
    assert_eq!(pool.acquire().unwrap(), 61001);
}

#[test]
fn test_release_ignores_out_of_range_port() {
    let pool = SequentialPortPool::new(61001, 2);

    pool.release(100);

    pool.acquire().unwrap();
    pool.acquire().unwrap();
    assert!(pool.acquire().is_err());
}

#[test]
fn test_release_ignores_already_free_port() {
    let pool = SequentialPortPool::new(61001, 2);

    let port = pool.acquire().unwrap();
    pool.release(port);
    pool.release(port);

    pool.acquire().unwrap();
    pool.acquire().unwrap();
    assert!(pool.acquire().is_err(), "duplicate release must not grow the pool");
}

// =============================================================================
// Sizing
// =============================================================================

#[test]
fn test_initial_size_reports_capacity() {
    assert_eq!(SequentialPortPool::new(61001, 5000).initial_size(), 5000);
}

#[test]
fn test_pool_is_clamped_to_the_port_range() {
    let pool = SequentialPortPool::new(65534, 10);

    assert_eq!(pool.initial_size(), 2);
    assert_eq!(pool.acquire().unwrap(), 65534);
    assert_eq!(pool.acquire().unwrap(), 65535);
    assert!(pool.acquire().is_err());
}
