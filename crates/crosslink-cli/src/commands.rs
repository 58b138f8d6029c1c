use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crosslink_channel::{ChannelId, EndpointConfig, OrderedLink, PortId, Side};
use crosslink_chunkchain::ChunkKeeper;
use crosslink_metachain::{ClaimOutcome, MetaKeeper};
use crosslink_store::{MemStore, PageRequest};
use crosslink_types::{AccountId, StoredChunk, StoredMeta};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format.clone();
    match cli.command {
        Command::CreateChunk(args) => cmd_create_chunk(&cli.state, &format, args),
        Command::UpdateChunk(args) => cmd_update_chunk(&cli.state, &format, args),
        Command::DeleteChunk(args) => cmd_delete_chunk(&cli.state, &format, args),
        Command::ShowChunk(args) => cmd_show_chunk(&cli.state, &format, args),
        Command::ListChunks(args) => cmd_list_chunks(&cli.state, &format, args),
        Command::CreateMeta(args) => cmd_create_meta(&cli.state, &format, args),
        Command::UpdateMeta(args) => cmd_update_meta(&cli.state, &format, args),
        Command::DeleteMeta(args) => cmd_delete_meta(&cli.state, &format, args),
        Command::ShowMeta(args) => cmd_show_meta(&cli.state, &format, args),
        Command::ListMeta(args) => cmd_list_meta(&cli.state, &format, args),
        Command::SendChunk(args) => cmd_send_chunk(&cli.state, &format, args),
        Command::SendClaim(args) => cmd_send_claim(&cli.state, &format, args),
        Command::AdvanceTime(args) => cmd_advance_time(&cli.state, &format, args),
        Command::Demo(_) => cmd_demo(),
    }
}

// ---------------------------------------------------------------------------
// Session: both chains, one link, persisted as a JSON state file
// ---------------------------------------------------------------------------

#[derive(Default, Serialize, Deserialize)]
struct State {
    chunks: Vec<StoredChunk>,
    metas: Vec<StoredMeta>,
    clock_a_ns: u64,
    clock_b_ns: u64,
}

struct Session {
    chunks: ChunkKeeper,
    metas: MetaKeeper,
    link: Arc<OrderedLink>,
    path: PathBuf,
}

fn fresh_pair() -> (ChunkKeeper, MetaKeeper, Arc<OrderedLink>) {
    let link = Arc::new(OrderedLink::new(
        EndpointConfig {
            port: PortId::new("datastore").expect("static port id"),
            channel: ChannelId::new("channel-0").expect("static channel id"),
        },
        EndpointConfig {
            port: PortId::new("metastore").expect("static port id"),
            channel: ChannelId::new("channel-0").expect("static channel id"),
        },
    ));
    let chunks = ChunkKeeper::new(
        Arc::new(MemStore::new()),
        Arc::clone(&link),
        Side::A,
        PortId::new("datastore").expect("static port id"),
    );
    let metas = MetaKeeper::new(
        Arc::new(MemStore::new()),
        Arc::clone(&link),
        Side::B,
        PortId::new("metastore").expect("static port id"),
    );
    (chunks, metas, link)
}

impl Session {
    fn open(path: &str) -> anyhow::Result<Self> {
        let path = PathBuf::from(path);
        let state: State = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("reading state file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing state file {}", path.display()))?
        } else {
            State::default()
        };

        let (chunks, metas, link) = fresh_pair();
        for chunk in state.chunks {
            chunks.create_chunk(&chunk.creator, &chunk.index, chunk.data)?;
        }
        for meta in state.metas {
            metas.create_meta(&meta.creator, &meta.index, &meta.url, meta.addresses)?;
        }
        link.advance_time(Side::A, state.clock_a_ns);
        link.advance_time(Side::B, state.clock_b_ns);
        debug!(path = %path.display(), "session opened");

        Ok(Self {
            chunks,
            metas,
            link,
            path,
        })
    }

    fn save(&self) -> anyhow::Result<()> {
        let state = State {
            chunks: self.all_chunks()?,
            metas: self.all_metas()?,
            clock_a_ns: self.link.consensus_timestamp(Side::A),
            clock_b_ns: self.link.consensus_timestamp(Side::B),
        };
        let raw = serde_json::to_string_pretty(&state)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("writing state file {}", self.path.display()))?;
        Ok(())
    }

    fn all_chunks(&self) -> anyhow::Result<Vec<StoredChunk>> {
        let mut out = Vec::new();
        let mut req = PageRequest::default();
        loop {
            let (page, res) = self.chunks.list_chunks(&req)?;
            out.extend(page);
            match res.next_cursor {
                Some(cursor) => req = PageRequest::with_cursor(cursor, 0),
                None => return Ok(out),
            }
        }
    }

    fn all_metas(&self) -> anyhow::Result<Vec<StoredMeta>> {
        let mut out = Vec::new();
        let mut req = PageRequest::default();
        loop {
            let (page, res) = self.metas.list_meta(&req)?;
            out.extend(page);
            match res.next_cursor {
                Some(cursor) => req = PageRequest::with_cursor(cursor, 0),
                None => return Ok(out),
            }
        }
    }

    /// Resolve a relative timeout against the destination chain's clock.
    fn resolve_timeout(&self, dest: Side, relative_ns: u64) -> u64 {
        self.link.consensus_timestamp(dest) + relative_ns
    }

    fn pump(&self) -> anyhow::Result<()> {
        self.link.run_until_idle(&self.chunks, &self.metas)?;
        Ok(())
    }
}

fn resolve_creator(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| AccountId::derive(b"crosslink-operator").to_string())
}

fn page_request(args: &ListArgs) -> PageRequest {
    PageRequest {
        cursor: None,
        offset: args.offset,
        limit: args.limit,
        count_total: args.count_total,
    }
}

// ---------------------------------------------------------------------------
// Chunk commands (chain A)
// ---------------------------------------------------------------------------

fn cmd_create_chunk(state: &str, format: &OutputFormat, args: ChunkWriteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session
        .chunks
        .create_chunk(&creator, &args.index, args.data.into_bytes())?;
    session.save()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "created": args.index, "creator": creator })
        ),
        OutputFormat::Text => {
            println!("{} Chunk {} stored on chain A", "✓".green().bold(), args.index.cyan());
            println!("  Creator: {}", creator.yellow());
        }
    }
    Ok(())
}

fn cmd_update_chunk(state: &str, format: &OutputFormat, args: ChunkWriteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session
        .chunks
        .update_chunk(&creator, &args.index, args.data.into_bytes())?;
    session.save()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "updated": args.index })),
        OutputFormat::Text => println!("{} Chunk {} updated", "✓".green().bold(), args.index.cyan()),
    }
    Ok(())
}

fn cmd_delete_chunk(state: &str, format: &OutputFormat, args: DeleteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session.chunks.delete_chunk(&creator, &args.index)?;
    session.save()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "deleted": args.index })),
        OutputFormat::Text => println!("{} Chunk {} deleted", "✓".green().bold(), args.index.cyan()),
    }
    Ok(())
}

fn cmd_show_chunk(state: &str, format: &OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let chunk = session.chunks.get_chunk(&args.index)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&chunk)?),
        OutputFormat::Text => {
            println!("Chunk {}", chunk.index.cyan().bold());
            println!("  Creator: {}", chunk.creator.yellow());
            println!("  Size: {} bytes", chunk.data.len());
        }
    }
    Ok(())
}

fn cmd_list_chunks(state: &str, format: &OutputFormat, args: ListArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let (page, res) = session.chunks.list_chunks(&page_request(&args))?;
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "chunks": page, "total": res.total }))
        }
        OutputFormat::Text => {
            for chunk in &page {
                println!(
                    "{}  {}  {} bytes",
                    chunk.index.cyan(),
                    chunk.creator.dimmed(),
                    chunk.data.len()
                );
            }
            if let Some(total) = res.total {
                println!("{} of {} chunks", page.len(), total.to_string().bold());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Metadata commands (chain B)
// ---------------------------------------------------------------------------

fn cmd_create_meta(state: &str, format: &OutputFormat, args: MetaWriteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session
        .metas
        .create_meta(&creator, &args.index, &args.url, args.addresses)?;
    session.save()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "created": args.index })),
        OutputFormat::Text => {
            println!("{} Metadata {} stored on chain B", "✓".green().bold(), args.index.cyan())
        }
    }
    Ok(())
}

fn cmd_update_meta(state: &str, format: &OutputFormat, args: MetaWriteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session
        .metas
        .update_meta(&creator, &args.index, &args.url, args.addresses)?;
    session.save()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "updated": args.index })),
        OutputFormat::Text => println!("{} Metadata {} updated", "✓".green().bold(), args.index.cyan()),
    }
    Ok(())
}

fn cmd_delete_meta(state: &str, format: &OutputFormat, args: DeleteArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    session.metas.delete_meta(&creator, &args.index)?;
    session.save()?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "deleted": args.index })),
        OutputFormat::Text => println!("{} Metadata {} deleted", "✓".green().bold(), args.index.cyan()),
    }
    Ok(())
}

fn cmd_show_meta(state: &str, format: &OutputFormat, args: ShowArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let meta = session.metas.get_meta(&args.index)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&meta)?),
        OutputFormat::Text => {
            println!("Metadata {}", meta.index.cyan().bold());
            println!("  URL: {}", meta.url.blue());
            println!("  Creator: {}", meta.creator.yellow());
            println!("  Addresses: {}", meta.addresses.join(", "));
        }
    }
    Ok(())
}

fn cmd_list_meta(state: &str, format: &OutputFormat, args: ListArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let (page, res) = session.metas.list_meta(&page_request(&args))?;
    match format {
        OutputFormat::Json => println!("{}", json!({ "metas": page, "total": res.total })),
        OutputFormat::Text => {
            for meta in &page {
                println!(
                    "{}  {}  [{}]",
                    meta.index.cyan(),
                    meta.url.blue(),
                    meta.addresses.join(", ").dimmed()
                );
            }
            if let Some(total) = res.total {
                println!("{} of {} records", page.len(), total.to_string().bold());
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Packet commands
// ---------------------------------------------------------------------------

fn cmd_send_chunk(state: &str, format: &OutputFormat, args: SendChunkArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    let chunk = session.chunks.get_chunk(&args.index)?;
    let timeout = session.resolve_timeout(Side::B, args.packet_timeout_timestamp);
    let sequence = session.chunks.send_chunk(
        &creator,
        &args.source_port,
        &args.source_channel,
        &chunk.index,
        chunk.data,
        timeout,
    )?;
    session.pump()?;
    session.save()?;

    let packet_state = session.link.packet_state(Side::A, sequence);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "sequence": sequence,
                "state": format!("{packet_state:?}"),
            })
        ),
        OutputFormat::Text => {
            println!("Chunk packet {} sent from chain A", sequence.to_string().bold());
            println!("  Final state: {}", format!("{packet_state:?}").yellow());
        }
    }
    Ok(())
}

fn cmd_send_claim(state: &str, format: &OutputFormat, args: SendClaimArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let creator = resolve_creator(args.creator);
    let timeout = session.resolve_timeout(Side::A, args.packet_timeout_timestamp);
    let sequence = session.metas.send_claim(
        &creator,
        &args.source_port,
        &args.source_channel,
        &args.url,
        args.addresses,
        timeout,
    )?;
    if args.advance_dest_ns > 0 {
        session.link.advance_time(Side::A, args.advance_dest_ns);
    }
    session.pump()?;
    session.save()?;

    let outcome = session.metas.outcomes().pop();
    let packet_state = session.link.packet_state(Side::B, sequence);
    match format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "sequence": sequence,
                "state": format!("{packet_state:?}"),
                "outcome": outcome,
            })
        ),
        OutputFormat::Text => {
            println!("Claim packet {} sent from chain B", sequence.to_string().bold());
            print_outcome(outcome.as_ref());
        }
    }
    Ok(())
}

fn cmd_advance_time(state: &str, format: &OutputFormat, args: AdvanceTimeArgs) -> anyhow::Result<()> {
    let session = Session::open(state)?;
    let side = match args.side {
        SideArg::A => Side::A,
        SideArg::B => Side::B,
    };
    session.link.advance_time(side, args.delta_ns);
    session.save()?;
    let now = session.link.consensus_timestamp(side);
    match format {
        OutputFormat::Json => {
            println!("{}", json!({ "side": format!("{side}"), "now_ns": now }))
        }
        OutputFormat::Text => println!("Chain {} clock is now {} ns", side, now.to_string().bold()),
    }
    Ok(())
}

fn print_outcome(outcome: Option<&ClaimOutcome>) {
    match outcome {
        Some(ClaimOutcome::Committed { url, sequence }) => println!(
            "  {} Metadata for {} committed (packet {})",
            "✓".green().bold(),
            url.blue(),
            sequence
        ),
        Some(ClaimOutcome::Rejected { url, reason, sequence }) => println!(
            "  {} Claim for {} rejected (packet {}): {}",
            "✗".red().bold(),
            url.blue(),
            sequence,
            reason
        ),
        Some(ClaimOutcome::TimedOut { url, sequence }) => println!(
            "  {} Claim for {} timed out (packet {})",
            "⏱".yellow().bold(),
            url.blue(),
            sequence
        ),
        None => println!("  No outcome recorded"),
    }
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

fn cmd_demo() -> anyhow::Result<()> {
    let (chunks, metas, link) = fresh_pair();
    let creator = AccountId::derive(b"crosslink-operator").to_string();

    println!("{}", "Crosslink demo: verify-then-commit across two chains".bold());
    println!();

    chunks.create_chunk(&creator, "addr-a", b"alpha".to_vec())?;
    chunks.create_chunk(&creator, "addr-b", b"beta".to_vec())?;
    println!("Seeded chain A with chunks {} and {}", "addr-a".cyan(), "addr-b".cyan());

    // Success: every claimed address exists.
    let timeout = link.consensus_timestamp(Side::A) + DEFAULT_RELATIVE_TIMEOUT_NS;
    metas.send_claim(
        &creator,
        "metastore",
        "channel-0",
        "https://example.com/whole",
        vec!["addr-a".into(), "addr-b".into()],
        timeout,
    )?;
    link.run_until_idle(&chunks, &metas)?;
    print_outcome(metas.outcomes().last());

    // Rejection: one address is missing, chain A answers with an error ack.
    metas.send_claim(
        &creator,
        "metastore",
        "channel-0",
        "https://example.com/broken",
        vec!["addr-a".into(), "addr-ghost".into()],
        timeout,
    )?;
    link.run_until_idle(&chunks, &metas)?;
    print_outcome(metas.outcomes().last());

    // Timeout: the destination clock passes the threshold before delivery.
    metas.send_claim(
        &creator,
        "metastore",
        "channel-0",
        "https://example.com/late",
        vec!["addr-a".into()],
        timeout,
    )?;
    link.advance_time(Side::A, DEFAULT_RELATIVE_TIMEOUT_NS + 1);
    link.run_until_idle(&chunks, &metas)?;
    print_outcome(metas.outcomes().last());

    println!();
    let committed = metas.get_meta("https://example.com/whole")?;
    println!(
        "Chain B committed {} backed by [{}]; the other claims left no record",
        committed.url.blue(),
        committed.addresses.join(", ")
    );
    Ok(())
}
