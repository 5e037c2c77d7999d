/*! Analysis options

[AnalysisOptions] collects the knobs of a global analysis run. It
implements `serde`'s traits so that it can be embedded into whatever
configuration format a front end uses; absent fields take their
default values. The timeout is written as (fractional) seconds.
*/

use serde::{Deserialize, Serialize};

use crate::time::Duration;

/// How the output of a sporadic task is turned into the input model
/// of its successor. Synchronous tasks always propagate their busy
/// times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Add the response-time jitter to the input model.
    Jitter,
    /// Add the response-time jitter, but keep successive outputs at
    /// least one best-case transmission time apart.
    #[default]
    JitterDmin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Wall-clock limit of a run, checked after each round and
    /// during schedule construction.
    #[serde(with = "seconds")]
    pub timeout: std::time::Duration,
    /// Maximum number of activations in a sporadic busy window.
    pub max_iterations: usize,
    /// Abort at the first constraint violation instead of reporting
    /// violations after convergence.
    pub check_violations: bool,
    pub propagation: Propagation,
    /// Fixed-point searches give up beyond this window length (ns).
    pub divergence_limit: Duration,
    /// Safety cap on the passes of the schedule load sweep.
    pub max_schedule_passes: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        AnalysisOptions {
            timeout: std::time::Duration::from_secs(900),
            max_iterations: 1000,
            check_violations: false,
            propagation: Propagation::default(),
            divergence_limit: 1_000_000_000,
            max_schedule_passes: 3,
        }
    }
}

mod seconds {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(timeout: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(timeout.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| de::Error::custom(format!("invalid timeout: {} seconds", secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = AnalysisOptions::default();
        assert_eq!(opts.timeout, std::time::Duration::from_secs(900));
        assert_eq!(opts.max_iterations, 1000);
        assert!(!opts.check_violations);
        assert_eq!(opts.propagation, Propagation::JitterDmin);
        assert_eq!(opts.max_schedule_passes, 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let opts: AnalysisOptions =
            serde_yaml::from_str("timeout: 0.5\ncheck_violations: true\npropagation: jitter\n")
                .unwrap();
        assert_eq!(opts.timeout, std::time::Duration::from_millis(500));
        assert!(opts.check_violations);
        assert_eq!(opts.propagation, Propagation::Jitter);
        assert_eq!(opts.max_iterations, 1000);
        assert_eq!(opts.divergence_limit, 1_000_000_000);
    }

    #[test]
    fn negative_timeout_is_rejected() {
        assert!(serde_yaml::from_str::<AnalysisOptions>("timeout: -1.0\n").is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let opts = AnalysisOptions {
            timeout: std::time::Duration::from_secs(2),
            propagation: Propagation::Jitter,
            ..AnalysisOptions::default()
        };
        let text = serde_yaml::to_string(&opts).unwrap();
        assert!(text.contains("propagation: jitter"));
        let back: AnalysisOptions = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, opts);
    }
}
