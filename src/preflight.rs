//! Startup checks - make sure both external CLI tools are installed.

use anyhow::{bail, Result};
use std::process::Command;

struct Tool {
    name: &'static str,
    label: &'static str,
    version_args: &'static [&'static str],
    install_hint: &'static str,
}

const TOOLS: &[Tool] = &[
    Tool {
        name: "az",
        label: "Azure CLI",
        version_args: &["--version"],
        install_hint: "https://docs.microsoft.com/en-us/cli/azure/install-azure-cli",
    },
    Tool {
        name: "kubelogin",
        label: "kubelogin",
        version_args: &["--version"],
        install_hint: "https://github.com/Azure/kubelogin",
    },
];

/// Verify `az` and `kubelogin` are on PATH and answer their version
/// checks. Prints one line per tool and install guidance on failure.
pub fn check_prerequisites() -> Result<()> {
    println!("🔧 Checking prerequisites...");

    for tool in TOOLS {
        if !tool_responds(tool) {
            println!("❌ {} not found - please install it first", tool.label);
            println!("   Install guide: {}", tool.install_hint);
            bail!("{} is required", tool.label);
        }
        println!("✅ {} found", tool.label);
    }

    println!("✨ Ready to go!");
    Ok(())
}

fn tool_responds(tool: &Tool) -> bool {
    if which::which(tool.name).is_err() {
        return false;
    }
    Command::new(tool.name)
        .args(tool.version_args)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_a_present_tool() {
        let tool = Tool {
            name: "true",
            label: "true",
            version_args: &[],
            install_hint: "",
        };
        assert!(tool_responds(&tool));
    }

    #[test]
    fn rejects_a_missing_tool() {
        let tool = Tool {
            name: "akscreds-no-such-tool",
            label: "nothing",
            version_args: &["--version"],
            install_hint: "",
        };
        assert!(!tool_responds(&tool));
    }
}
