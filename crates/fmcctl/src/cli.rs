//! Clap derive structures for the `fmcctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fmcctl -- manage firewall management center controllers
#[derive(Debug, Parser)]
#[command(
    name = "fmcctl",
    version,
    about = "Manage firewall management center controllers from the command line",
    long_about = "Registers virtual firewalls, configures their interfaces and static \
        routes, deploys pending changes, and checks that a management center holds \
        the device group, policies, zones and objects a deployment depends on.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "FMC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "FMC_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Username for the token exchange (overrides profile)
    #[arg(long, short = 'u', env = "FMC_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for the token exchange (environment only)
    #[arg(
        long,
        env = "FMC_PASSWORD",
        global = true,
        hide = true,
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Use this access token instead of exchanging credentials
    #[arg(long, env = "FMC_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Domain UUID (defaults to the global domain)
    #[arg(long, env = "FMC_DOMAIN", global = true)]
    pub domain: Option<String>,

    /// Refresh tokens older than this (e.g. "30m", "10m 30s")
    #[arg(long, value_parser = humantime::parse_duration, global = true)]
    pub token_max_age: Option<Duration>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FMC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FMC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "FMC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check reachability and whether the controller holds the desired configuration
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Register, inspect, and remove managed devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Look up object ids by name
    #[command(alias = "obj")]
    Objects(ObjectsArgs),

    /// Configure and check device interfaces
    #[command(alias = "if")]
    Interfaces(InterfacesArgs),

    /// Create and check IPv4 static routes
    Routes(RoutesArgs),

    /// Deploy pending changes to devices
    Deploy(DeployArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  STATUS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Probe the controller with the token before checking (retries on failure)
    #[arg(long)]
    pub verify: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List registered devices
    #[command(alias = "ls")]
    List,

    /// Show a device record
    Show {
        /// Device name
        device: String,
    },

    /// Register a virtual firewall into the configured device group
    Register(RegisterArgs),

    /// Remove a device registration
    #[command(alias = "rm")]
    Deregister {
        /// Device name
        device: String,
    },

    /// List the members of a device group
    Members {
        /// Device group name (defaults to the profile's device group)
        group: Option<String>,
    },

    /// Whether a device is registered
    RegStatus {
        /// Device name
        device: String,
    },

    /// Memory usage over the last minute
    Metrics {
        /// Device name
        device: String,
    },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Device name as it will appear on the controller
    pub name: String,

    /// Management address the controller reaches the device on
    #[arg(long)]
    pub mgmt_ip: String,

    /// Registration key configured on the device
    #[arg(long)]
    pub reg_key: String,

    /// NAT id configured on the device
    #[arg(long, default_value = "")]
    pub nat_id: String,

    /// License capabilities (repeatable)
    #[arg(long = "license", default_value = "BASE")]
    pub license_caps: Vec<String>,

    /// Performance tier
    #[arg(long, default_value = "FTDv5")]
    pub performance_tier: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OBJECTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ObjectsArgs {
    #[command(subcommand)]
    pub command: ObjectsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ObjectsCommand {
    /// Resolve a name to its object id
    Resolve {
        /// Object name
        name: String,

        /// Object kind (searches networks, hosts, then ports when omitted)
        #[arg(long)]
        kind: Option<ObjectKindArg>,
    },

    /// List every object of a kind
    #[command(alias = "ls")]
    List {
        /// Object kind
        kind: ObjectKindArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ObjectKindArg {
    DeviceGroup,
    AccessPolicy,
    NatPolicy,
    SecurityZone,
    Network,
    Host,
    Port,
    Device,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTERFACES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InterfacesArgs {
    #[command(subcommand)]
    pub command: InterfacesCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfacesCommand {
    /// List a device's physical interfaces
    #[command(alias = "ls")]
    List {
        /// Device name
        device: String,
    },

    /// Address an interface with DHCP
    ConfigureDhcp(InterfaceSpec),

    /// Address an interface statically
    ConfigureStatic {
        #[command(flatten)]
        spec: InterfaceSpec,

        #[command(flatten)]
        address: StaticAddress,
    },

    /// Compare an interface against the expected configuration
    Status {
        #[command(flatten)]
        spec: InterfaceSpec,

        /// Expected static address (DHCP is expected when omitted)
        #[arg(long)]
        address: Option<String>,

        /// Expected netmask
        #[arg(long, default_value = "255.255.255.0")]
        netmask: String,
    },
}

/// Which interface, and what it should look like.
#[derive(Debug, Args)]
pub struct InterfaceSpec {
    /// Device name
    pub device: String,

    /// Hardware interface name (e.g., GigabitEthernet0/1)
    pub interface: String,

    /// Logical name
    #[arg(long)]
    pub ifname: String,

    /// Security zone name
    #[arg(long)]
    pub zone: String,

    /// MTU
    #[arg(long, default_value_t = 1500)]
    pub mtu: u32,

    /// Interface mode
    #[arg(long, default_value = "NONE")]
    pub mode: String,

    /// Restrict the interface to management traffic
    #[arg(long)]
    pub management_only: bool,
}

#[derive(Debug, Args)]
pub struct StaticAddress {
    /// IPv4 address
    #[arg(long)]
    pub address: String,

    /// Netmask (dotted or prefix length)
    #[arg(long)]
    pub netmask: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutesArgs {
    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    /// List a device's static routes
    #[command(alias = "ls")]
    List {
        /// Device name
        device: String,
    },

    /// Create a static route
    Create {
        #[command(flatten)]
        route: RouteSpec,

        /// Route metric
        #[arg(long, default_value_t = 1)]
        metric: u32,
    },

    /// Whether a matching static route exists
    Check {
        #[command(flatten)]
        route: RouteSpec,
    },
}

#[derive(Debug, Args)]
pub struct RouteSpec {
    /// Device name
    pub device: String,

    /// Logical name of the egress interface
    #[arg(long)]
    pub interface: String,

    /// Destination network or host object name
    #[arg(long)]
    pub network: String,

    /// Gateway: a host object name or a literal address
    #[arg(long)]
    pub gateway: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEPLOY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[command(subcommand)]
    pub command: DeployCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeployCommand {
    /// Deploy pending changes to a device
    Start {
        /// Device name
        device: String,
    },

    /// Whether a device has undeployed changes
    Status {
        /// Device name
        device: String,
    },

    /// List devices with undeployed changes
    Deployable,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
