//! The `modulax` CLI: node runner and wallet commands.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use libp2p::Multiaddr;
use modulax_chain::genesis_wallet;
use modulax_node::cipher::{decode_from_cipher, encode_to_cipher};
use modulax_node::keystore::WalletStore;
use modulax_node::network::GossipConfig;
use modulax_node::rpc::RpcServerConfig;
use modulax_node::telemetry::init_telemetry;
use modulax_node::{Node, NodeConfig, RpcClient};
use modulax_types::{Address, Transaction, Wallet};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_DB_PATH: &str = "./modulax_chain";
const DEFAULT_LISTEN: &str = "/ip4/0.0.0.0/tcp/4001";

#[derive(Parser)]
#[command(name = "modulax", about = "Modulax blockchain node and wallet CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the node
    Run(RunArgs),

    /// Manage wallets
    #[command(subcommand)]
    Wallet(WalletCommand),
}

#[derive(Args)]
struct RunArgs {
    /// Multiaddr of a peer to connect to
    #[arg(long)]
    connect: Option<String>,

    /// JSON-RPC listen address
    #[arg(long, default_value = "0.0.0.0:8080")]
    api_addr: SocketAddr,

    /// Gossip listen multiaddr
    #[arg(long, default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Chain database directory
    #[arg(long, default_value = DEFAULT_DB_PATH)]
    db_path: PathBuf,
}

#[derive(Subcommand)]
enum WalletCommand {
    /// Create and save a new wallet key pair
    New,

    /// Get the balance of an address (cipher format)
    Balance {
        address: String,
        #[arg(long, default_value = "http://localhost:8080/rpc")]
        rpc_url: String,
    },

    /// Send tokens from one address to another (addresses in cipher format)
    Send {
        from: String,
        to: String,
        amount: u64,
        #[arg(long, default_value = "http://localhost:8080/rpc")]
        rpc_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Run(args) => run_node(args).await,
        Command::Wallet(cmd) => run_wallet(cmd).await,
    }
}

async fn run_node(mut args: RunArgs) -> anyhow::Result<()> {
    init_telemetry();

    // A second local node connecting to the first shifts to its own data
    // directory and ports, matching the defaults' single-machine setup.
    if args.connect.is_some() {
        if args.db_path == PathBuf::from(DEFAULT_DB_PATH) {
            args.db_path = PathBuf::from("./modulax_chain_2");
        }
        if args.listen == DEFAULT_LISTEN {
            args.listen = "/ip4/0.0.0.0/tcp/4002".to_string();
        }
        if args.api_addr.port() == 8080 {
            args.api_addr.set_port(8081);
        }
    }

    setup_genesis_wallet()?;

    let listen: Multiaddr = args
        .listen
        .parse()
        .with_context(|| format!("invalid listen address {}", args.listen))?;
    let bootstrap = match &args.connect {
        Some(addr) => vec![addr
            .parse::<Multiaddr>()
            .with_context(|| format!("invalid peer address {addr}"))?],
        None => vec![],
    };

    let config = NodeConfig::default()
        .with_db_path(args.db_path)
        .with_gossip(
            GossipConfig::default()
                .with_listen_address(listen)
                .with_bootstrap_peers(bootstrap),
        )
        .with_rpc(RpcServerConfig {
            listen_addr: args.api_addr,
        });

    let node = Node::start(config).await?;
    println!("Modulax node running; JSON-RPC on {}", node.rpc_addr());

    tokio::signal::ctrl_c().await?;
    node.shutdown().await;
    Ok(())
}

/// Write the genesis wallet file on first run so the operator can spend the
/// genesis supply.
fn setup_genesis_wallet() -> anyhow::Result<()> {
    let wallet = genesis_wallet()?;
    let store = WalletStore::open_default();
    if !store.exists(&wallet.address().to_hex()) {
        let path = store.save(&wallet)?;
        println!("Genesis wallet created at {}", path.display());
        println!(
            "Genesis address: {}",
            encode_to_cipher(&wallet.address().to_hex())
        );
    }
    Ok(())
}

async fn run_wallet(cmd: WalletCommand) -> anyhow::Result<()> {
    match cmd {
        WalletCommand::New => {
            let wallet = Wallet::generate();
            let path = WalletStore::open_default().save(&wallet)?;
            println!("New Modulax wallet created");
            println!("Address: {}", encode_to_cipher(&wallet.address().to_hex()));
            println!("Wallet saved to: {}", path.display());
        }

        WalletCommand::Balance { address, rpc_url } => {
            let hex_address =
                decode_from_cipher(&address).context("invalid Modulax address format")?;
            let account = RpcClient::new(rpc_url).get_account(&hex_address).await?;
            println!("Balance for {address}: {}", account.balance);
            println!("Nonce for   {address}: {}", account.nonce);
        }

        WalletCommand::Send {
            from,
            to,
            amount,
            rpc_url,
        } => {
            let from_hex = decode_from_cipher(&from).context("invalid sender address format")?;
            let to_hex = decode_from_cipher(&to).context("invalid recipient address format")?;
            let to_address = Address::from_hex(&to_hex).context("invalid recipient address")?;

            let wallet = WalletStore::open_default()
                .load(&from_hex)
                .context("could not load sender wallet")?;

            let client = RpcClient::new(rpc_url);
            let sender = client.get_account(&from_hex).await?;
            if sender.balance < amount {
                bail!(
                    "insufficient funds: balance {} < amount {amount}",
                    sender.balance
                );
            }

            let tx = Transaction::new_signed(&wallet, to_address, amount, sender.nonce)?;
            let accepted = client.send_transaction(&tx).await?;
            println!("{accepted}");
            println!("Hash (hex): {}", tx.hash.to_hex());
        }
    }
    Ok(())
}
