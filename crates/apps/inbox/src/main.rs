//! Inbox - terminal front end for the email service
//!
//! Drives the same dual-view store a UI would, so listings, star and read
//! toggles, and deletes go through the store's local repair and re-fetch.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emails::{ClientConfig, EmailId, EmailStore, EmailTransport, HttpTransport, ViewKind};
use log::{error, info, warn};
use std::sync::Arc;

mod render;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Override the API base URL from the config
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of emails
    List {
        /// List the starred view instead of all emails
        #[arg(long)]
        starred: bool,

        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Search with a raw query string, e.g. `from:a@b.com subject:budget -draft`
    Search { query: String },
    /// Print one email
    Show {
        #[arg(required_unless_present = "message_id", conflicts_with = "message_id")]
        id: Option<String>,

        #[arg(long)]
        message_id: Option<String>,
    },
    /// Toggle the starred flag
    Star { id: String },
    /// Toggle the read flag
    Read { id: String },
    /// Delete one or more emails
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Write the current settings to the config file
    InitConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut cfg = ClientConfig::load().context("Failed to load client config")?;
    if let Some(api_url) = args.api_url {
        cfg.api_url = api_url;
    }

    let transport: Arc<dyn EmailTransport> = Arc::new(HttpTransport::from_config(&cfg)?);
    if let Some(output) = execute(args.command, &cfg, transport)? {
        println!("{}", output);
    }
    Ok(())
}

/// Run one command against a transport, returning what should be printed
fn execute(
    command: Command,
    cfg: &ClientConfig,
    transport: Arc<dyn EmailTransport>,
) -> Result<Option<String>> {
    let mut store = EmailStore::new(transport.clone(), cfg.store_options());

    let output = match command {
        Command::List {
            starred,
            page,
            page_size,
        } => {
            let kind = if starred { ViewKind::Starred } else { ViewKind::All };
            store.initialize()?;
            if let Some(size) = page_size {
                store.set_page_size(kind, size)?;
            }
            go_to_page(&mut store, kind, page)?;
            Some(render::view_listing(store.view(kind)))
        }
        Command::Search { query } => {
            store.search(emails::SearchPredicate::QueryString(query))?;
            Some(render::view_listing(store.all()))
        }
        Command::Show { id, message_id } => {
            let email = match (id, message_id) {
                (_, Some(mid)) => store.open_by_message_id(&mid)?,
                (Some(id), None) => store.open(&EmailId::new(id))?,
                (None, None) => anyhow::bail!("Either an ID or --message-id is required"),
            };
            Some(render::email_detail(&email))
        }
        Command::Star { id } => {
            let id = EmailId::new(id);
            store.initialize()?;
            if store.email(&id).is_some() {
                store.toggle_starred_one(&id)?;
            } else {
                let mut email = transport.get(&id)?;
                email.is_starred = !email.is_starred;
                transport.update(&email)?;
            }
            info!("Toggled star on email {}", id);
            None
        }
        Command::Read { id } => {
            let id = EmailId::new(id);
            store.initialize()?;
            if store.email(&id).is_some() {
                store.toggle_read_one(&id)?;
            } else {
                let mut email = transport.get(&id)?;
                email.is_read = !email.is_read;
                transport.update(&email)?;
            }
            info!("Toggled read on email {}", id);
            None
        }
        Command::Delete { ids } => {
            store.initialize()?;
            let ids: Vec<EmailId> = ids.into_iter().map(EmailId::new).collect();

            let (loaded, elsewhere): (Vec<_>, Vec<_>) = ids
                .into_iter()
                .partition(|id| store.all().window().contains(id));
            for id in &loaded {
                store.toggle_selected_one_of_view(ViewKind::All, id);
            }
            store.delete_selected_of_view(ViewKind::All)?;

            if !elsewhere.is_empty() {
                warn!(
                    "{} emails are not on the first page, deleting without local repair",
                    elsewhere.len()
                );
                transport.remove_many(&elsewhere)?;
            }
            None
        }
        Command::InitConfig => {
            let path = cfg.save()?;
            info!("Wrote client config to {}", path.display());
            None
        }
    };

    Ok(output)
}

/// Page forward from page 1; stops early on the view's last page
fn go_to_page(store: &mut EmailStore, kind: ViewKind, page: usize) -> Result<()> {
    while store.view(kind).settings().page < page {
        if !store.view(kind).settings().has_next_page() {
            warn!(
                "{} view has only {} pages",
                kind,
                store.view(kind).settings().max_page()
            );
            break;
        }
        store.next_page(kind)?;
    }
    Ok(())
}
