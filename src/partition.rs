/*
 * Partition Module
 *
 * Splits the agent index range into one contiguous chunk per worker.
 * Chunk sizes differ by at most one: the first `count % workers` chunks
 * take one extra agent. The split only depends on its inputs, never on
 * thread scheduling, so a tick is reproducible.
 */

use std::ops::Range;

pub fn partition(count: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0, "partition needs at least one worker");

    let base = count / workers;
    let extra = count % workers;

    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0;
    for chunk in 0..workers {
        let len = base + usize::from(chunk < extra);
        chunks.push(start..start + len);
        start += len;
    }

    debug_assert_eq!(start, count);
    chunks
}
