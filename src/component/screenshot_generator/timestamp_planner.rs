/// 將影片長度等分為 count + 1 段，取每個分段點作為截圖時間（毫秒）
///
/// 例如長度 600000ms、5 張截圖時得到 100000, 200000, ..., 500000。
#[must_use]
pub fn plan_timestamps(duration_ms: u64, count: usize) -> Vec<u64> {
    if count == 0 || duration_ms == 0 {
        return Vec::new();
    }

    let divisor = count as u128 + 1;
    (1..=count as u128)
        .map(|i| (i * u128::from(duration_ms) / divisor) as u64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_timestamps_evenly_spaced() {
        assert_eq!(
            plan_timestamps(600_000, 5),
            vec![100_000, 200_000, 300_000, 400_000, 500_000]
        );
    }

    #[test]
    fn test_plan_timestamps_floor_division() {
        assert_eq!(plan_timestamps(1_000, 2), vec![333, 666]);
    }

    #[test]
    fn test_plan_timestamps_empty() {
        assert!(plan_timestamps(0, 5).is_empty());
        assert!(plan_timestamps(600_000, 0).is_empty());
    }

    #[test]
    fn test_plan_timestamps_strictly_inside_duration() {
        let duration = 7_777;
        let stamps = plan_timestamps(duration, 9);
        assert_eq!(stamps.len(), 9);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        assert!(stamps.iter().all(|t| *t < duration));
    }
}
