use itertools::Itertools;

use super::RequestBound;
use crate::time::{Duration, Service};

/// A wrapper type for representing the total demand of individual
/// demand sources stored in a slice.
#[derive(Clone, Debug)]
pub struct Slice<'a, T> {
    slice: &'a [T],
}

impl<'a, T> Slice<'a, T> {
    pub fn of(slice: &'a [T]) -> Self {
        Slice { slice }
    }
}

impl<'a, T: RequestBound> RequestBound for Slice<'a, T> {
    fn service_needed(&self, delta: Duration) -> Service {
        self.slice.iter().map(|rbf| rbf.service_needed(delta)).sum()
    }

    fn steps_iter<'b>(&'b self) -> Box<dyn Iterator<Item = Duration> + 'b> {
        Box::new(
            self.slice
                .iter()
                .map(|rbf| rbf.steps_iter())
                .kmerge()
                .dedup(),
        )
    }
}
