//! Builder tuning knobs

/// Build configuration
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Parallel jobs handed to the compile step; 1 disables `--parallel`
    pub jobs: usize,
    /// Leave the work directory in place after a successful run
    pub keep_work_dir: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            jobs: 1,
            keep_work_dir: false,
        }
    }
}

impl BuildConfig {
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    #[must_use]
    pub fn with_keep_work_dir(mut self, keep: bool) -> Self {
        self.keep_work_dir = keep;
        self
    }
}
