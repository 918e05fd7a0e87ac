use crate::interface::DEFAULT_INTERFACE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "blockwall")]
#[command(about = "Drop IPv4 packets from blocklisted sources at the XDP ingress hook", long_about = None)]
pub struct Cli {
    /// Blocklist configuration file (.yaml, .yml or .json)
    pub config: PathBuf,

    /// Network interface to attach to
    #[arg(default_value = DEFAULT_INTERFACE)]
    pub interface: String,

    /// XDP attach mode
    #[arg(long, value_enum, default_value_t = XdpMode::Auto)]
    pub xdp_mode: XdpMode,

    /// Validate the configuration and print the resulting table, then exit
    #[arg(long)]
    pub check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum XdpMode {
    /// Let the kernel pick (native if the driver supports it)
    Auto,
    /// Generic XDP in the networking stack
    Skb,
    /// Native driver XDP
    Driver,
    /// NIC offload
    Hw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_only_defaults_interface() {
        let cli = Cli::try_parse_from(["blockwall", "blocklist.yaml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("blocklist.yaml"));
        assert_eq!(cli.interface, "eth0");
        assert_eq!(cli.xdp_mode, XdpMode::Auto);
        assert!(!cli.check);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_explicit_interface_and_flags() {
        let cli = Cli::try_parse_from([
            "blockwall",
            "-v",
            "--xdp-mode",
            "skb",
            "/etc/blockwall.json",
            "enp3s0",
        ])
        .unwrap();
        assert_eq!(cli.interface, "enp3s0");
        assert_eq!(cli.xdp_mode, XdpMode::Skb);
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_config_is_usage_error() {
        assert!(Cli::try_parse_from(["blockwall"]).is_err());
    }

    #[test]
    fn test_extra_positional_is_usage_error() {
        assert!(Cli::try_parse_from(["blockwall", "a.yaml", "eth0", "extra"]).is_err());
    }
}
