//! SeaWolf Exchange terminal client

mod account;
mod app;
mod chat;
mod config;
mod confirm;
mod constants;
mod history;
mod logger;
mod market;
mod proxy;
mod transfers;

use app::App;
use clap::{Parser, Subcommand};
use config::ClientConfig;
use market::SortArg;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seawolf")]
#[command(about = "SeaWolf Exchange client")]
struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a node account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        /// Repeat the password
        #[arg(long)]
        confirm_password: String,
        /// Wallet seed phrase
        #[arg(long)]
        seed: String,
    },
    /// Log the node in and show the wallet
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log the node out
    Logout,
    /// Browse marketplace listings
    Market {
        /// Filter by file name or CID
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value_t = SortArg::Lowest)]
        sort: SortArg,
        /// Show the listings this node provides
        #[arg(long)]
        own: bool,
    },
    /// Pay a provider and download the file
    Buy {
        /// Provider peer ID
        peer_id: String,
        /// File CID
        cid: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
        /// Follow the download until it finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Show downloads
    Downloads {
        /// Follow progress until nothing is downloading
        #[arg(short, long)]
        watch: bool,
    },
    /// Pause a download
    Pause { session_id: i64 },
    /// Resume a paused download
    Resume { session_id: i64 },
    /// Chat with buyers and sellers
    #[command(subcommand)]
    Chat(ChatCommands),
    /// Relay traffic through a proxy, or serve as one
    #[command(subcommand)]
    Proxy(ProxyCommands),
    /// Show wallet balance and history
    Wallet,
    /// Publish a file
    Upload {
        path: PathBuf,
        /// Price in SWE
        #[arg(short, long)]
        price: f64,
    },
    /// Show published files
    Uploads,
    /// Unpublish a file
    Delete { cid: String },
}

#[derive(Subcommand)]
enum ChatCommands {
    /// Ask a provider to chat about a listing
    Request { peer_id: String, cid: String },
    /// Show incoming and outgoing requests
    Requests,
    /// Accept an incoming request
    Accept { peer_id: String, request_id: i64 },
    /// Decline an incoming request
    Decline { peer_id: String, request_id: i64 },
    /// Print a chat transcript
    Show { peer_id: String, chat_id: i64 },
    /// Send a message
    Send {
        peer_id: String,
        chat_id: i64,
        text: String,
    },
    /// Close a chat
    Finish { peer_id: String, chat_id: i64 },
    /// Follow outgoing requests
    Watch,
}

#[derive(Subcommand)]
enum ProxyCommands {
    /// List available proxies
    List,
    /// Relay through a proxy until Enter, then pay for the traffic
    Connect {
        peer_id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Serve as a proxy until Enter
    Serve {
        /// Price in SWE per MiB
        #[arg(short, long)]
        price: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    let cli = Cli::parse();
    let app = App::start(cli.config).await?;

    // History is saved even when the command fails part way, e.g. a payment
    // that went through before the download could start
    let outcome = run(&app, cli.command).await;
    if let Err(e) = app.save_history() {
        log::warn!("Failed to save wallet history: {:#}", e);
    }
    outcome
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Register {
            username,
            password,
            confirm_password,
            seed,
        } => account::register(app, &username, &password, &confirm_password, &seed).await?,
        Commands::Login { username, password } => {
            account::login(app, &username, &password).await?
        }
        Commands::Logout => account::logout(app).await?,
        Commands::Market { search, sort, own } => {
            market::show_market(app, &search, sort, own).await?
        }
        Commands::Buy {
            peer_id,
            cid,
            yes,
            watch,
        } => market::buy(app, &peer_id, &cid, yes, watch).await?,
        Commands::Downloads { watch } => transfers::list_downloads(app, watch).await?,
        Commands::Pause { session_id } => transfers::set_paused(app, session_id, true).await?,
        Commands::Resume { session_id } => transfers::set_paused(app, session_id, false).await?,
        Commands::Chat(command) => match command {
            ChatCommands::Request { peer_id, cid } => chat::request(app, &peer_id, &cid).await?,
            ChatCommands::Requests => chat::list_requests(app).await?,
            ChatCommands::Accept {
                peer_id,
                request_id,
            } => chat::accept(app, &peer_id, request_id).await?,
            ChatCommands::Decline {
                peer_id,
                request_id,
            } => chat::decline(app, &peer_id, request_id).await?,
            ChatCommands::Show { peer_id, chat_id } => chat::show(app, &peer_id, chat_id).await?,
            ChatCommands::Send {
                peer_id,
                chat_id,
                text,
            } => chat::send(app, &peer_id, chat_id, &text).await?,
            ChatCommands::Finish { peer_id, chat_id } => {
                chat::finish(app, &peer_id, chat_id).await?
            }
            ChatCommands::Watch => chat::watch(app).await?,
        },
        Commands::Proxy(command) => match command {
            ProxyCommands::List => proxy::list(app).await?,
            ProxyCommands::Connect { peer_id, yes } => proxy::connect(app, &peer_id, yes).await?,
            ProxyCommands::Serve { price } => proxy::serve(app, price).await?,
        },
        Commands::Wallet => account::wallet(app).await?,
        Commands::Upload { path, price } => account::upload(app, &path, price).await?,
        Commands::Uploads => account::list_uploads(app).await?,
        Commands::Delete { cid } => account::delete(app, &cid).await?,
    }

    Ok(())
}
