//! Polling helpers and custom assertions.

use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Assert every index addresses a palette entry.
pub fn assert_indices_below(indices: &[u8], palette_len: usize) {
    if let Some((pos, &index)) = indices
        .iter()
        .enumerate()
        .find(|(_, &i)| i as usize >= palette_len)
    {
        panic!("index {index} at position {pos} is outside a {palette_len}-color palette");
    }
}
