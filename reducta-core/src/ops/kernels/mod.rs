//! CPU compute kernels registered in the dispatch table.
//!
//! Kernels receive an [`IterationPlan`], branch on its compute dtype, walk the
//! input lane by lane (in parallel) and write the plan's outputs.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::config::config;
use crate::device::StorageDevice;
use crate::ops::reduction::dispatch::{KernelFn, OpKind};
use crate::ops::reduction::plan::LaneGeometry;
use crate::ops::traits::Element;
use crate::parallel::parallel_map;

pub(crate) mod reduce;
pub(crate) mod scan;

pub(crate) fn register_cpu_kernels(table: &mut HashMap<(OpKind, StorageDevice), KernelFn>) {
    let cpu = StorageDevice::CPU;
    table.insert((OpKind::Sum, cpu), reduce::sum_kernel);
    table.insert((OpKind::NanSum, cpu), reduce::nansum_kernel);
    table.insert((OpKind::Prod, cpu), reduce::prod_kernel);
    table.insert((OpKind::And, cpu), reduce::and_kernel);
    table.insert((OpKind::Or, cpu), reduce::or_kernel);
    table.insert((OpKind::MaxValues, cpu), reduce::max_values_kernel);
    table.insert((OpKind::MinValues, cpu), reduce::min_values_kernel);
    table.insert((OpKind::AminMax, cpu), reduce::aminmax_kernel);
    table.insert((OpKind::ArgMax, cpu), reduce::argmax_kernel);
    table.insert((OpKind::ArgMin, cpu), reduce::argmin_kernel);
    table.insert((OpKind::Norm, cpu), reduce::norm_kernel);
    table.insert((OpKind::StdVar, cpu), reduce::std_var_kernel);
    table.insert((OpKind::CumSum, cpu), scan::cumsum_kernel);
    table.insert((OpKind::CumProd, cpu), scan::cumprod_kernel);
    table.insert((OpKind::LogCumSumExp, cpu), scan::logcumsumexp_kernel);
    table.insert((OpKind::CumMax, cpu), scan::cummax_kernel);
    table.insert((OpKind::CumMin, cpu), scan::cummin_kernel);
}

/// Minimum number of lanes per rayon task so each task touches about a grain of elements.
fn lanes_per_task(geometry: &LaneGeometry) -> usize {
    (config().grain_size / geometry.len.max(1)).max(1)
}

/// Borrows lane `lane` when it is contiguous, copies it otherwise.
pub(crate) fn lane<'a, T: Element>(data: &'a [T], geometry: &LaneGeometry, lane: usize) -> Cow<'a, [T]> {
    if geometry.inner == 1 {
        let start = lane * geometry.len;
        Cow::Borrowed(&data[start..start + geometry.len])
    } else {
        Cow::Owned((0..geometry.len).map(|k| data[geometry.index(lane, k)]).collect())
    }
}

/// One result per lane, in lane order.
pub(crate) fn map_lanes<T, R, F>(data: &[T], geometry: LaneGeometry, f: F) -> Vec<R>
where
    T: Element,
    R: Send,
    F: Fn(&[T]) -> R + Sync + Send,
{
    parallel_map(geometry.lanes(), lanes_per_task(&geometry), |l| {
        f(&*lane(data, &geometry, l))
    })
}

/// Runs `f` on every lane and scatters the per-lane outputs back into the
/// input layout. `f` must return exactly `geometry.len` values.
pub(crate) fn scan_lanes<T, R, F>(data: &[T], geometry: LaneGeometry, f: F) -> Vec<R>
where
    T: Element,
    R: Copy + Send + Sync,
    F: Fn(&[T]) -> Vec<R> + Sync + Send,
{
    let per_lane = map_lanes(data, geometry, f);
    scatter_lanes(per_lane, geometry)
}

/// Lays lanes of `geometry.len` values out as `[outer, len, inner]`.
pub(crate) fn scatter_lanes<R: Copy>(per_lane: Vec<Vec<R>>, geometry: LaneGeometry) -> Vec<R> {
    if geometry.inner == 1 {
        return per_lane.into_iter().flatten().collect();
    }
    let LaneGeometry { outer, len, inner } = geometry;
    (0..outer * len * inner)
        .map(|flat| {
            let o = flat / (len * inner);
            let k = (flat / inner) % len;
            let i = flat % inner;
            per_lane[o * inner + i][k]
        })
        .collect()
}
