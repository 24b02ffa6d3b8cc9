//! 分区器
//!
//! `batch_size = len / context_size`（向下取整），按 `batch_size` 步长切分，
//! 最后一个分区吸收余数，可能更短。因此分区数为 `ceil(len / batch_size)`，
//! 在不能整除时会比 `context_size` 多出一个。

use std::ops::Range;

/// 计算分区边界
///
/// 只应在 `len >= context_size >= 1` 时调用。其余情况（`batch_size` 为 0）
/// 返回覆盖全部元素的单个分区，避免零步长；`len == 0` 时返回空列表。
pub fn partition_bounds(len: usize, context_size: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }

    let batch_size = len / context_size.max(1);
    if batch_size == 0 {
        return vec![0..len];
    }

    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}
