//! bandproof CLI
//!
//! Builds the bytes an EVM bridge needs to accept a BandChain oracle result.
//!
//! ## Usage
//!
//! ```bash
//! # prove request 1 from a saved /commit + /abci_query dump
//! bandproof prove --input block_25000.json --request-id 1
//!
//! # fetch everything from a node, latest block, print calldata only
//! bandproof fetch --rpc http://127.0.0.1:26657 --request-id 1 --request-id 2 --format hex
//!
//! # prove the request counter
//! bandproof fetch --rpc http://127.0.0.1:26657 --height 25000 --count
//!
//! # show where the oracle store sits in the app hash tree
//! bandproof layout --layout v2
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info};

use bandproof_core::{
    result_store_key, CountProof, MultiProof, ProofAssembler, ProofError, SignedHeader,
    SignerPolicy, SingleProof, StoreQuery, REQUEST_COUNT_STORE_KEY,
};
use bandproof_merkle::{LayoutVersion, ORACLE_STORE};

mod cometbft;
mod config;
mod rpc;

use crate::cometbft::ProveInput;
use crate::rpc::CometClient;

#[derive(Parser, Debug)]
#[command(name = "bandproof")]
#[command(about = "evm light-client proofs for bandchain oracle results", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with signer policy, quorum and store layouts
    #[arg(long, global = true, env = "BANDPROOF_CONFIG")]
    config: Option<PathBuf>,

    /// strict or skip-unmatched
    #[arg(long, global = true, env = "BANDPROOF_SIGNER_POLICY")]
    signer_policy: Option<SignerPolicy>,

    /// Fewest recovered signatures a relay proof may carry
    #[arg(long, global = true, env = "BANDPROOF_MIN_SIGNATURES")]
    min_signatures: Option<usize>,

    /// Print the full proof as json or only the EVM bytes as hex
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Hex,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prove results from a saved commit and query dump
    Prove {
        /// JSON file: {"signed_header": <commit result>, "queries": [<abci_query result>]}
        #[arg(short, long)]
        input: PathBuf,

        /// Request to prove (repeat for a multi proof); all results in the file if omitted
        #[arg(long = "request-id", conflicts_with = "count")]
        request_ids: Vec<u64>,

        /// Prove the request counter instead of a result
        #[arg(long)]
        count: bool,
    },

    /// Fetch commit and proofs from a node, then prove
    Fetch {
        /// CometBFT RPC endpoint
        #[arg(long, env = "BANDPROOF_RPC", default_value = "http://127.0.0.1:26657")]
        rpc: String,

        /// Block to prove against (latest if omitted)
        #[arg(long)]
        height: Option<u64>,

        /// Request to prove (repeat for a multi proof)
        #[arg(long = "request-id", required_unless_present = "count", conflicts_with = "count")]
        request_ids: Vec<u64>,

        /// Prove the request counter instead of a result
        #[arg(long)]
        count: bool,
    },

    /// Print a multistore layout and the oracle store's sibling path
    Layout {
        /// laozi or v2 (both if omitted)
        #[arg(long)]
        layout: Option<LayoutVersion>,
    },
}

/// What a run produces.
#[derive(Serialize)]
#[serde(untagged)]
enum Proof {
    Single(SingleProof),
    Multi(MultiProof),
    Count(CountProof),
}

impl Proof {
    fn evm_proof_bytes(&self) -> &[u8] {
        match self {
            Proof::Single(p) => &p.evm_proof_bytes,
            Proof::Multi(p) => &p.evm_proof_bytes,
            Proof::Count(p) => &p.evm_proof_bytes,
        }
    }
}

fn assemble(assembler: &ProofAssembler, signed: &SignedHeader, queries: &[StoreQuery], count: bool) -> Result<Proof> {
    let proof = match queries {
        [] => bail!("nothing to prove"),
        [query] if count => Proof::Count(assembler.count(signed, query)?),
        _ if count => bail!("a count proof takes exactly one query"),
        [query] => Proof::Single(assembler.single_result(signed, query)?),
        _ => Proof::Multi(assembler.multi_result(signed, queries)?),
    };
    info!(height = signed.height(), queries = queries.len(), "proof assembled");
    Ok(proof)
}

/// Pick the queries a `prove` run asked for out of the input file.
fn select(queries: Vec<StoreQuery>, request_ids: &[u64], count: bool) -> Result<Vec<StoreQuery>> {
    if count {
        return match queries.into_iter().find(|q| q.key == REQUEST_COUNT_STORE_KEY) {
            Some(q) => Ok(vec![q]),
            None => bail!("input has no request count query"),
        };
    }
    if request_ids.is_empty() {
        return Ok(queries
            .into_iter()
            .filter(|q| q.key != REQUEST_COUNT_STORE_KEY)
            .collect());
    }
    request_ids
        .iter()
        .map(|&id| {
            let key = result_store_key(id);
            queries
                .iter()
                .find(|q| q.key == key)
                .cloned()
                .with_context(|| format!("input has no query for request {}", id))
        })
        .collect()
}

fn run_prove(assembler: &ProofAssembler, input: PathBuf, request_ids: Vec<u64>, count: bool) -> Result<Proof> {
    let contents = fs::read_to_string(&input)
        .with_context(|| format!("failed to read input file: {}", input.display()))?;
    let raw: ProveInput = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse input file: {}", input.display()))?;

    let signed = raw.signed_header.into_signed_header()?;
    let queries = raw
        .queries
        .into_iter()
        .map(|q| q.into_store_query())
        .collect::<Result<Vec<_>>>()?;
    let queries = select(queries, &request_ids, count)?;
    assemble(assembler, &signed, &queries, count)
}

async fn run_fetch(
    assembler: &ProofAssembler,
    rpc: String,
    height: Option<u64>,
    request_ids: Vec<u64>,
    count: bool,
) -> Result<Proof> {
    let client = CometClient::new(&rpc);
    let signed = client.commit(height).await?;
    let height = signed.height();
    info!(height, chain_id = %signed.header.chain_id, "fetched commit");

    let keys: Vec<Vec<u8>> = if count {
        vec![REQUEST_COUNT_STORE_KEY.to_vec()]
    } else {
        request_ids.iter().map(|&id| result_store_key(id)).collect()
    };
    let mut queries = Vec::with_capacity(keys.len());
    for key in &keys {
        queries.push(client.oracle_query(key, height).await?);
    }
    assemble(assembler, &signed, &queries, count)
}

fn print_layout(version: LayoutVersion) -> Result<()> {
    let layout = version.layout();
    let index = layout.index_of(ORACLE_STORE)?;
    let sides = layout.sibling_sides(ORACLE_STORE)?;
    println!("{} ({} stores, {} at index {})", version, layout.stores.len(), ORACLE_STORE, index);
    for (i, store) in layout.stores.iter().enumerate() {
        println!("  {:2} {}", i, store);
    }
    let sides: Vec<String> = sides.iter().map(|s| format!("{:?}", s).to_lowercase()).collect();
    println!("  oracle siblings, leaf to root: {}", sides.join(" "));
    Ok(())
}

fn emit(proof: &Proof, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(proof)?),
        Format::Hex => println!("0x{}", hex::encode(proof.evm_proof_bytes())),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the proof, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bandproof=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let proof_config = config::resolve(cli.config.as_deref(), cli.signer_policy, cli.min_signatures)?;
    let assembler = ProofAssembler::new(proof_config);

    let result = match cli.command {
        Commands::Prove {
            input,
            request_ids,
            count,
        } => run_prove(&assembler, input, request_ids, count),
        Commands::Fetch {
            rpc,
            height,
            request_ids,
            count,
        } => run_fetch(&assembler, rpc, height, request_ids, count).await,
        Commands::Layout { layout } => {
            let versions = match layout {
                Some(v) => vec![v],
                None => vec![LayoutVersion::Laozi, LayoutVersion::V2],
            };
            for v in versions {
                print_layout(v)?;
            }
            return Ok(());
        }
    };

    match result {
        Ok(proof) => emit(&proof, cli.format),
        Err(e) => {
            if let Some(proof_error) = e.downcast_ref::<ProofError>() {
                error!(kind = ?proof_error.kind(), "proof rejected: {}", proof_error);
            }
            Err(e)
        }
    }
}
