/*! Compositional performance analysis of switched Ethernet networks

Streams traverse output ports hop by hop. Time-triggered streams are
described by [synchronous] event models and analyzed on the
[schedule] of their port; all other streams are described by
[arrival] bounds and analyzed with a fixed-priority busy window
([fixed_priority]). [analysis::Analysis] couples the ports by
propagating each hop's output to the next until all results are
stable.
*/

pub mod analysis;
pub mod arrival;
pub mod budget;
pub mod constraints;
pub mod demand;
pub mod error;
pub mod event_model;
pub mod fixed_point;
pub mod fixed_priority;
pub mod model;
pub mod options;
pub mod order;
pub mod path;
pub mod propagation;
pub mod schedule;
pub mod scheduler;
pub mod synchronous;
pub mod time;

pub use analysis::{analyze_system, Analysis, TaskResult};
pub use error::{AnalysisError, ConfigError};
pub use event_model::EventModel;
pub use model::{Policy, System, TaskSpec, TrafficClass};
pub use options::{AnalysisOptions, Propagation};

#[cfg(test)]
mod tests {
    use crate::time::{Duration, Service};

    pub fn d(t: i64) -> Duration {
        t
    }

    pub fn s(t: i64) -> Service {
        t
    }
}
