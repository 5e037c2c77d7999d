//! End-to-end latency of a path

use crate::analysis::Analysis;
use crate::model::PathId;
use crate::time::Duration;

/// The worst-case end-to-end latency of a path and the activation of
/// the first hop that exhibits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub worst_case: Duration,
    pub activation: usize,
}

/// For a synchronous path, the latency of activation `n` is the busy
/// time of the last hop minus the earliest release of the first hop,
/// maximized over the hyperperiod. For a sporadic path, it is the sum
/// of the hops' worst-case response times.
pub fn end_to_end_latency(analysis: &Analysis, path: PathId) -> Latency {
    let tasks = &analysis.system().path(path).tasks;
    let (first, last) = match (tasks.first(), tasks.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => {
            return Latency {
                worst_case: 0,
                activation: 0,
            }
        }
    };
    match analysis.input_model(first).as_synchronous() {
        Some(sync) => {
            let busy_times = &analysis.result(last).busy_times;
            (0..sync.activations_per_hyperperiod())
                .filter_map(|n| busy_times.get(n).map(|busy| (busy - sync.delta_min(n), n)))
                .fold(
                    Latency {
                        worst_case: 0,
                        activation: 0,
                    },
                    |worst, (latency, n)| {
                        if latency > worst.worst_case {
                            Latency {
                                worst_case: latency,
                                activation: n,
                            }
                        } else {
                            worst
                        }
                    },
                )
        }
        None => Latency {
            worst_case: tasks.iter().map(|t| analysis.result(*t).wcrt).sum(),
            activation: 0,
        },
    }
}
