use anyhow::Result;
use clap::Parser;

use akscreds::config::RunConfig;
use akscreds::loader::CredentialLoader;
use akscreds::logger::Logger;
use akscreds::preflight;
use akscreds::runner::ExecRunner;

#[derive(Parser)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Automatically fetch AKS credentials from all Azure subscriptions",
    after_help = "Examples:\n  \
        akscreds                          # Process all subscriptions\n  \
        akscreds --dry-run                # Preview actions without executing\n  \
        akscreds -s sub1 -s sub2          # Process specific subscriptions\n  \
        akscreds --verbose                # Enable debug logging"
)]
struct Cli {
    /// Preview actions without executing them
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Process only specific subscription IDs or names
    #[arg(short, long, value_name = "SUBSCRIPTION")]
    subscription: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if preflight::check_prerequisites().is_err() {
        std::process::exit(1);
    }

    println!();
    println!("{}", "=".repeat(70));
    println!("🚀 Azure Kubernetes Credential Loader");
    println!("{}", "=".repeat(70));

    let config = RunConfig {
        dry_run: cli.dry_run,
        verbose: cli.verbose,
        subscription_filter: cli.subscription,
    };

    let logger = Logger::new(config.verbose);
    let runner = ExecRunner::new(logger.clone(), config.dry_run);
    let loader = CredentialLoader::new(&runner, logger, config.clone());

    let summary = loader.load_all();

    println!("\n🎉 All done!");
    if !config.dry_run {
        println!("\n🔄 What's next:");
        println!("   kubectl config get-contexts       # List all contexts");
        println!("   kubectl config use-context <name> # Switch to a cluster");
    }

    let code = summary.exit_code(config.dry_run);
    if code != 0 {
        std::process::exit(code);
    }

    Ok(())
}
