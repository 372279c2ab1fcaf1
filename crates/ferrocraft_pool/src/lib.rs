//! The concurrency core: a growable ring-buffer deque and the fixed-size
//! worker pool that drains it.

pub mod pool;
pub mod ring;

pub use pool::TaskPool;
pub use ring::RingDeque;
