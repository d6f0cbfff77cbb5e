/// Run status reported through the progress callback. Distinct from
/// `bbd_types::RunStatus`, which describes only the two terminal states a
/// finished `SimulationOutput` can carry; `Running` only ever appears here,
/// mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Running,
    Complete,
    Cancelled,
}

/// One progress update, emitted at a cadence decoupled from the iteration
/// rate (spec 4.D).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub iteration: u32,
    pub status: ProgressStatus,
}

/// Optional host callbacks threaded through a run. Both are write-only /
/// read-only from the core's perspective and are only ever invoked from the
/// calling thread between iteration batches, never from inside the
/// rayon-parallelized inner loop, so neither needs to be `Send`/`Sync`.
#[derive(Default)]
pub struct RunCallbacks<'a> {
    pub on_progress: Option<&'a mut dyn FnMut(Progress)>,
    pub cancelled: Option<&'a dyn Fn() -> bool>,
}

impl<'a> RunCallbacks<'a> {
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn report(&mut self, progress: Progress) {
        if let Some(cb) = self.on_progress.as_deref_mut() {
            cb(progress);
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.map(|c| c()).unwrap_or(false)
    }
}
