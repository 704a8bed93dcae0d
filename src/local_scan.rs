/// In-place inclusive prefix sum of one slice.
///
/// This is both the per-node/per-thread local scanner and the sequential
/// baseline. Returns the slice total (zero for an empty slice).
pub fn prefix_sum(nums: &mut [i64]) -> i64 {
    let mut sum = 0i64;
    for x in nums.iter_mut() {
        sum += *x;
        *x = sum;
    }
    sum
}

/// Adds `offset` to every element.
pub fn add_offset(nums: &mut [i64], offset: i64) {
    if offset == 0 {
        return;
    }
    for x in nums.iter_mut() {
        *x += offset;
    }
}
