//! `orbitctl` — inspect and demonstrate an Orbit consistent hashing ring.
//!
//! # Usage
//!
//! ```text
//! orbitctl demo                                  # Server1..3 / Key1..5 walkthrough
//! orbitctl resolve Key1 Key2 -n a -n b -n c      # which node owns each key
//! orbitctl resolve Key1 --replicas 2 -c orbit.toml
//! orbitctl distribution --keys 100000            # per-node share of synthetic keys
//! orbitctl plan --remove b --keys 10000          # how many keys would move
//! ```

mod config;
mod telemetry;

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use orbit_ring::{AnyHasher, Ring};
use orbit_types::NodeId;
use tracing::{debug, info};

use config::CliConfig;

/// Ring for the demo walkthrough.
const DEMO_SERVERS: [&str; 3] = ["Server1", "Server2", "Server3"];
const DEMO_KEYS: [&str; 5] = ["Key1", "Key2", "Key3", "Key4", "Key5"];
const DEMO_REMOVED: &str = "Server2";

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "orbitctl",
    version,
    about = "Inspect an Orbit consistent hashing ring"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of virtual nodes per node.
    #[arg(short = 'v', long, global = true)]
    virtual_nodes: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Ring membership given on the command line.
#[derive(Args, Debug, Default)]
struct NodeArgs {
    /// Node to place on the ring (repeatable). Replaces `[ring] nodes`.
    #[arg(short = 'n', long = "node")]
    nodes: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add Server1..Server3, resolve Key1..Key5, remove Server2 and resolve again.
    Demo,

    /// Resolve keys to their owning node.
    Resolve {
        /// Keys to resolve.
        #[arg(required = true)]
        keys: Vec<String>,

        /// Number of distinct nodes to list per key (at least 1).
        #[arg(
            short,
            long,
            default_value = "1",
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        replicas: usize,

        #[command(flatten)]
        nodes: NodeArgs,
    },

    /// Show how synthetic keys and ring arcs spread across nodes.
    Distribution {
        /// Number of synthetic keys to resolve.
        #[arg(short, long, default_value = "10000")]
        keys: usize,

        #[command(flatten)]
        nodes: NodeArgs,
    },

    /// Count the keys that would move if a node joined or left.
    Plan {
        /// Node that would join the ring.
        #[arg(long, conflicts_with = "remove", required_unless_present = "remove")]
        add: Option<String>,

        /// Node that would leave the ring.
        #[arg(long)]
        remove: Option<String>,

        /// Number of synthetic keys to check.
        #[arg(short, long, default_value = "10000")]
        keys: usize,

        #[command(flatten)]
        nodes: NodeArgs,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    telemetry::init(&config.log.level);

    // CLI args override config file values.
    if let Some(v) = cli.virtual_nodes {
        config.ring.virtual_nodes = v;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Demo => cmd_demo(&config, &mut out),
        Commands::Resolve {
            keys,
            replicas,
            nodes,
        } => {
            override_nodes(&mut config, nodes);
            cmd_resolve(&config, &keys, replicas, &mut out)
        }
        Commands::Distribution { keys, nodes } => {
            override_nodes(&mut config, nodes);
            cmd_distribution(&config, keys, &mut out)
        }
        Commands::Plan {
            add,
            remove,
            keys,
            nodes,
        } => {
            override_nodes(&mut config, nodes);
            let change = match (add, remove) {
                (Some(node), None) => Change::Add(NodeId::from(node)),
                (None, Some(node)) => Change::Remove(NodeId::from(node)),
                _ => bail!("exactly one of --add or --remove is required"),
            };
            cmd_plan(&config, &change, keys, &mut out)
        }
    }
}

fn override_nodes(config: &mut CliConfig, args: NodeArgs) {
    if !args.nodes.is_empty() {
        config.ring.nodes = args.nodes;
    }
}

/// Build an empty ring from the `[ring]` section.
fn empty_ring(config: &CliConfig) -> Result<Ring<AnyHasher>> {
    let ring_config = config.ring_config();
    let ring = Ring::from_config(&ring_config).context("invalid ring configuration")?;
    info!(
        virtual_nodes = ring_config.virtual_nodes,
        hasher = %ring_config.hasher,
        "ring created"
    );
    Ok(ring)
}

/// Build a ring holding every configured node.
fn build_ring(config: &CliConfig) -> Result<Ring<AnyHasher>> {
    if config.ring.nodes.is_empty() {
        bail!("no nodes configured: pass --node or set `nodes` in the [ring] section");
    }

    let mut ring = empty_ring(config)?;
    for node in &config.ring.nodes {
        ring.add_node(NodeId::from(node.as_str()));
    }
    debug!(
        nodes = ring.node_count(),
        vnodes = ring.vnode_count(),
        "ring populated"
    );
    Ok(ring)
}

fn synthetic_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key-{i}")).collect()
}

// -----------------------------------------------------------------------
// orbitctl demo
// -----------------------------------------------------------------------

fn cmd_demo(config: &CliConfig, out: &mut impl Write) -> Result<()> {
    let mut ring = empty_ring(config)?;
    for server in DEMO_SERVERS {
        ring.add_node(NodeId::from(server));
    }

    for key in DEMO_KEYS {
        writeln!(out, "Key: {key} is mapped to {}", ring.resolve(key)?)?;
    }

    writeln!(out)?;
    writeln!(out, "Removing {DEMO_REMOVED}")?;
    ring.remove_node(&NodeId::from(DEMO_REMOVED));

    for key in DEMO_KEYS {
        writeln!(out, "Key: {key} is now mapped to {}", ring.resolve(key)?)?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// orbitctl resolve
// -----------------------------------------------------------------------

fn cmd_resolve(
    config: &CliConfig,
    keys: &[String],
    replicas: usize,
    out: &mut impl Write,
) -> Result<()> {
    let ring = build_ring(config)?;

    for key in keys {
        if replicas <= 1 {
            writeln!(out, "{key} -> {}", ring.resolve(key)?)?;
        } else {
            let owners: Vec<String> = ring
                .resolve_n(key, replicas)
                .iter()
                .map(NodeId::to_string)
                .collect();
            writeln!(out, "{key} -> {}", owners.join(", "))?;
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// orbitctl distribution
// -----------------------------------------------------------------------

fn cmd_distribution(config: &CliConfig, count: usize, out: &mut impl Write) -> Result<()> {
    let ring = build_ring(config)?;

    let mut counts: BTreeMap<NodeId, usize> =
        ring.node_ids().into_iter().map(|n| (n, 0)).collect();
    for key in synthetic_keys(count) {
        *counts.entry(ring.resolve(&key)?.clone()).or_default() += 1;
    }
    let shares = ring.ownership();

    writeln!(
        out,
        "{} nodes, {} vnodes, {count} keys",
        ring.node_count(),
        ring.vnode_count()
    )?;
    writeln!(
        out,
        "{:<24} {:>10} {:>8} {:>8}",
        "node", "keys", "keys%", "arc%"
    )?;
    for (node, n) in &counts {
        let key_pct = if count == 0 {
            0.0
        } else {
            *n as f64 * 100.0 / count as f64
        };
        let arc_pct = shares.get(node).copied().unwrap_or_default() * 100.0;
        writeln!(out, "{node:<24} {n:>10} {key_pct:>7.2}% {arc_pct:>7.2}%")?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// orbitctl plan
// -----------------------------------------------------------------------

/// A membership change to plan for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Add(NodeId),
    Remove(NodeId),
}

fn cmd_plan(
    config: &CliConfig,
    change: &Change,
    key_count: usize,
    out: &mut impl Write,
) -> Result<()> {
    let old = build_ring(config)?;
    let mut new = old.clone();
    match change {
        Change::Add(node) => {
            if old.contains(node) {
                bail!("node {node} is already on the ring");
            }
            new.add_node(node.clone());
        }
        Change::Remove(node) => {
            if !old.contains(node) {
                bail!("node {node} is not on the ring");
            }
            // An empty ring owns no keys, so no key could move.
            if old.node_count() == 1 {
                bail!("removing {node} would leave the ring empty");
            }
            new.remove_node(node);
        }
    }

    let keys = synthetic_keys(key_count);
    let migrations = Ring::diff(&old, &new, &keys);

    let mut flows: BTreeMap<(NodeId, NodeId), usize> = BTreeMap::new();
    for m in &migrations {
        *flows.entry((m.from.clone(), m.to.clone())).or_default() += 1;
    }

    let pct = if key_count == 0 {
        0.0
    } else {
        migrations.len() as f64 * 100.0 / key_count as f64
    };
    let moved = migrations.len();
    writeln!(out, "{moved} of {key_count} keys move ({pct:.2}%)")?;
    for ((from, to), n) in &flows {
        writeln!(out, "  {from} -> {to}: {n}")?;
    }

    Ok(())
}
