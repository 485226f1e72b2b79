/// Options for a single run, fixed at startup
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Log planned mutations instead of executing them
    pub dry_run: bool,
    /// Enable debug-level logging
    pub verbose: bool,
    /// Subscription ids or display names to process; empty means all
    pub subscription_filter: Vec<String>,
}
