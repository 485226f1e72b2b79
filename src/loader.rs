//! Discovery and credential-fetch orchestration.
//!
//! Strictly sequential: subscriptions, then clusters per subscription, then
//! a three-step credential fetch per cluster. A failure anywhere abandons
//! only the cluster or subscription it happened in; the run keeps going and
//! reports the damage in the final summary.

use std::thread;
use std::time::Duration;

use crate::azure::{decode_listing, Cluster, Subscription};
use crate::config::RunConfig;
use crate::logger::Logger;
use crate::runner::{CommandOutcome, CommandRunner};

const CLUSTER_PAUSE: Duration = Duration::from_secs(1);

/// Counters accumulated over one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub subscriptions: usize,
    pub clusters_found: usize,
    pub clusters_configured: usize,
}

impl RunSummary {
    /// Exit code for the hosting process. Partial failure maps to 2 so
    /// automation can see it; preview runs always succeed.
    pub fn exit_code(&self, dry_run: bool) -> i32 {
        if !dry_run && self.clusters_configured < self.clusters_found {
            2
        } else {
            0
        }
    }
}

pub struct CredentialLoader<'a> {
    runner: &'a dyn CommandRunner,
    logger: Logger,
    config: RunConfig,
    cluster_pause: Duration,
}

impl<'a> CredentialLoader<'a> {
    pub fn new(runner: &'a dyn CommandRunner, logger: Logger, config: RunConfig) -> Self {
        Self {
            runner,
            logger,
            config,
            cluster_pause: CLUSTER_PAUSE,
        }
    }

    /// Override the pause inserted between cluster fetches.
    pub fn with_cluster_pause(mut self, pause: Duration) -> Self {
        self.cluster_pause = pause;
        self
    }

    /// List the subscriptions visible to the current login, applying the
    /// configured allow-list (exact match on id or display name).
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.logger.info("🔍 Finding your Azure subscriptions...");

        let mut subscriptions: Vec<Subscription> =
            match self.runner.run("az", &["account", "list"], true, true) {
                CommandOutcome::Output(value) => decode_listing(value),
                _ => {
                    self.logger.error("❌ Couldn't get your subscriptions");
                    return Vec::new();
                }
            };

        if !self.config.subscription_filter.is_empty() {
            subscriptions.retain(|sub| {
                self.config
                    .subscription_filter
                    .iter()
                    .any(|wanted| wanted == &sub.id || wanted == &sub.name)
            });
            if subscriptions.is_empty() {
                self.logger.warn(&format!(
                    "⚠️ No subscriptions match your filter: {:?}",
                    self.config.subscription_filter
                ));
            }
        }

        self.logger
            .info(&format!("📋 Found {} subscription(s)", subscriptions.len()));
        for sub in &subscriptions {
            self.logger.info(&format!("   • {}", sub.name));
        }

        subscriptions
    }

    /// List the AKS clusters in one subscription, switching the CLI's
    /// active subscription first.
    pub fn clusters(&self, subscription_id: &str) -> Vec<Cluster> {
        self.logger.info("🔎 Looking for AKS clusters...");

        let set_context = self.runner.run(
            "az",
            &["account", "set", "--subscription", subscription_id],
            false,
            true,
        );
        if set_context.is_failure() {
            self.logger.error("❌ Can't access this subscription");
            return Vec::new();
        }

        // No clusters and a failed listing both come back empty; only the
        // log severity tells them apart.
        let clusters: Vec<Cluster> = match self.runner.run("az", &["aks", "list"], true, true) {
            CommandOutcome::Output(value) => decode_listing(value),
            _ => {
                self.logger
                    .warn("⚠️ Couldn't list clusters in this subscription");
                return Vec::new();
            }
        };

        if clusters.is_empty() {
            self.logger.info("📭 No clusters here");
        } else {
            self.logger
                .info(&format!("🎯 Found {} cluster(s):", clusters.len()));
            for cluster in &clusters {
                self.logger.info(&format!("     {}", cluster.name));
            }
        }

        clusters
    }

    /// Fetch and convert credentials for one cluster. Returns whether the
    /// cluster ended up configured; under dry-run every step is a logged
    /// no-op and the would-be work counts as done.
    pub fn fetch_cluster_credentials(&self, subscription_id: &str, cluster: &Cluster) -> bool {
        self.logger
            .info(&format!("🔑 Getting credentials for: {}", cluster.name));

        let set_context = self.runner.run(
            "az",
            &["account", "set", "--subscription", subscription_id],
            false,
            false,
        );
        if set_context.is_failure() {
            self.logger.error("❌ Can't switch to subscription");
            return false;
        }

        let fetched = self.runner.run(
            "az",
            &[
                "aks",
                "get-credentials",
                "--resource-group",
                &cluster.resource_group,
                "--name",
                &cluster.name,
                "--overwrite-existing",
            ],
            false,
            false,
        );
        if fetched.is_failure() {
            self.logger
                .error(&format!("❌ Failed to get credentials for {}", cluster.name));
            return false;
        }

        // Rewrite the fresh kubeconfig entry to authenticate through the
        // Azure CLI. If this fails the raw entry from get-credentials is
        // left in place.
        let converted = self.runner.run(
            "kubelogin",
            &["convert-kubeconfig", "-l", "azurecli"],
            false,
            false,
        );
        if converted.is_failure() {
            self.logger
                .error(&format!("❌ kubelogin setup failed for {}", cluster.name));
            return false;
        }

        if !self.config.dry_run {
            self.logger.info(&format!("✅ Ready: {}", cluster.name));
        }
        true
    }

    /// Run the whole sequence and return the final counts.
    pub fn load_all(&self) -> RunSummary {
        self.logger
            .info("🚀 Starting Azure Kubernetes credential loader");
        if self.config.dry_run {
            self.logger
                .info("🔍 Preview mode - showing what would be done");
        }

        let subscriptions = self.subscriptions();
        if subscriptions.is_empty() {
            self.logger.error("❌ No subscriptions found or accessible");
            return RunSummary::default();
        }

        let mut summary = RunSummary {
            subscriptions: subscriptions.len(),
            ..Default::default()
        };

        for subscription in &subscriptions {
            self.logger.info("");
            self.logger.info(&"=".repeat(60));
            self.logger.info(&format!("🏢 {}", subscription.name));
            self.logger.info(&"=".repeat(60));

            let clusters = self.clusters(&subscription.id);
            summary.clusters_found += clusters.len();

            for cluster in &clusters {
                if self.fetch_cluster_credentials(&subscription.id, cluster) {
                    summary.clusters_configured += 1;
                }

                // Stay under the Azure API's rate tolerance.
                if !self.config.dry_run {
                    thread::sleep(self.cluster_pause);
                }
            }
        }

        self.print_summary(&summary);
        summary
    }

    fn print_summary(&self, summary: &RunSummary) {
        self.logger.info("");
        self.logger.info(&"=".repeat(60));
        self.logger.info("📊 Summary");
        self.logger.info(&"=".repeat(60));
        self.logger
            .info(&format!("Subscriptions: {}", summary.subscriptions));
        self.logger
            .info(&format!("Clusters found: {}", summary.clusters_found));

        if self.config.dry_run {
            self.logger.info("🔍 Preview completed - no changes made");
            return;
        }

        self.logger.info(&format!(
            "Configured: {}/{}",
            summary.clusters_configured, summary.clusters_found
        ));
        if summary.clusters_configured < summary.clusters_found {
            let failed = summary.clusters_found - summary.clusters_configured;
            self.logger
                .warn(&format!("⚠️ {} cluster(s) had issues", failed));
        } else if summary.clusters_configured > 0 {
            self.logger.info("🎉 All clusters ready to use!");
        } else {
            self.logger.info("📭 No clusters found");
        }
    }
}
