use clap::{Args, Parser, Subcommand};

/// Default relative packet timeout: ten minutes, in nanoseconds. Resolved
/// against the destination chain's consensus timestamp at send time.
pub const DEFAULT_RELATIVE_TIMEOUT_NS: u64 = 600_000_000_000;

#[derive(Parser)]
#[command(
    name = "crosslink",
    about = "Crosslink — verify-then-commit metadata across two chains",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// State file carrying both chains' stores and clocks between
    /// invocations
    #[arg(long, global = true, default_value = "crosslink-state.json")]
    pub state: String,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SideArg {
    /// Chain A, the chunk datastore
    A,
    /// Chain B, the metadata store
    B,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a chunk on chain A
    CreateChunk(ChunkWriteArgs),
    /// Overwrite a chunk's data on chain A (creator only)
    UpdateChunk(ChunkWriteArgs),
    /// Remove a chunk from chain A (creator only)
    DeleteChunk(DeleteArgs),
    /// Show one chunk record
    ShowChunk(ShowArgs),
    /// List chunk records, paginated
    ListChunks(ListArgs),
    /// Store a metadata record on chain B directly
    CreateMeta(MetaWriteArgs),
    /// Overwrite a metadata record on chain B (creator only)
    UpdateMeta(MetaWriteArgs),
    /// Remove a metadata record from chain B (creator only)
    DeleteMeta(DeleteArgs),
    /// Show one metadata record
    ShowMeta(ShowArgs),
    /// List metadata records, paginated
    ListMeta(ListArgs),
    /// Send a stored chunk from chain A over the channel
    SendChunk(SendChunkArgs),
    /// Send a claim from chain B and commit metadata on a success verdict
    SendClaim(SendClaimArgs),
    /// Advance one chain's consensus clock
    AdvanceTime(AdvanceTimeArgs),
    /// Run a scripted walkthrough of the success, rejection, and timeout
    /// flows on a throwaway pair of chains
    Demo(DemoArgs),
}

#[derive(Args)]
pub struct ChunkWriteArgs {
    /// Content address of the chunk
    pub index: String,
    /// Chunk payload, taken verbatim as bytes
    pub data: String,
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct MetaWriteArgs {
    /// Record index
    pub index: String,
    /// URL the record describes
    pub url: String,
    /// Chunk addresses backing the URL
    #[arg(required = true, value_delimiter = ',')]
    pub addresses: Vec<String>,
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub index: String,
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub index: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value = "0")]
    pub limit: u64,
    #[arg(long, default_value = "0")]
    pub offset: u64,
    #[arg(long)]
    pub count_total: bool,
}

#[derive(Args)]
pub struct SendChunkArgs {
    /// Content address of an existing chunk on chain A
    pub index: String,
    #[arg(long, default_value = "datastore")]
    pub source_port: String,
    #[arg(long, default_value = "channel-0")]
    pub source_channel: String,
    /// Relative timeout in nanoseconds, resolved against the destination
    /// chain's consensus timestamp
    #[arg(long, default_value_t = DEFAULT_RELATIVE_TIMEOUT_NS)]
    pub packet_timeout_timestamp: u64,
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct SendClaimArgs {
    /// URL the claim is about
    pub url: String,
    /// Chunk addresses the claim asserts exist on chain A
    #[arg(required = true, value_delimiter = ',')]
    pub addresses: Vec<String>,
    #[arg(long, default_value = "metastore")]
    pub source_port: String,
    #[arg(long, default_value = "channel-0")]
    pub source_channel: String,
    /// Relative timeout in nanoseconds, resolved against the destination
    /// chain's consensus timestamp
    #[arg(long, default_value_t = DEFAULT_RELATIVE_TIMEOUT_NS)]
    pub packet_timeout_timestamp: u64,
    /// Advance the destination clock by this much after queueing, to
    /// exercise the timeout path
    #[arg(long, default_value = "0")]
    pub advance_dest_ns: u64,
    #[arg(long)]
    pub creator: Option<String>,
}

#[derive(Args)]
pub struct AdvanceTimeArgs {
    pub side: SideArg,
    pub delta_ns: u64,
}

#[derive(Args)]
pub struct DemoArgs {}
