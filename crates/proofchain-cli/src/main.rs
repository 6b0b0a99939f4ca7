use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use proofchain_core::{
    collision::CollisionFinder,
    constants::{
        ADMIN_ID, DEFAULT_CHAIN_LENGTH, DEFAULT_COLLISION_FILE, DEFAULT_LEADING_ZEROES,
        DEFAULT_PROOFS_FILE,
    },
    mine::Miner,
    Chain, Difficulty, SearchLimits,
};
use proofchain_store::TextStore;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "proofchain")]
#[command(about = "Mine a short proof-of-work chain and search for a truncated-hash collision")]
struct Cli {
    /// Identity stamped on every mined block
    #[arg(long, global = true, default_value = "miner")]
    id: String,
    /// Identity of the collision block; must differ from --id
    #[arg(long, global = true, default_value = ADMIN_ID)]
    admin_id: String,
    /// Number of leading zero hex characters a mined hash needs
    #[arg(long, global = true, default_value_t = DEFAULT_LEADING_ZEROES)]
    leading_zeroes: usize,
    /// Blocks to mine on top of genesis
    #[arg(long, global = true, default_value_t = DEFAULT_CHAIN_LENGTH)]
    length: usize,
    /// Where the mined proof sequence is written
    #[arg(long, global = true, default_value = DEFAULT_PROOFS_FILE)]
    proofs_file: PathBuf,
    /// Where the collision proof is written
    #[arg(long, global = true, default_value = DEFAULT_COLLISION_FILE)]
    collision_file: PathBuf,
    /// Give up a search after this many candidate proofs
    #[arg(long, global = true)]
    max_attempts: Option<u64>,
    /// Spread each search across all cores
    #[arg(long, global = true)]
    parallel: bool,
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Mine, find a collision, then reload and verify both dumps (default)
    Run,
    /// Mine the chain and dump its proofs
    Mine,
    /// Reload the dumped chain and search for a collision on its tail
    Collide,
    /// Reload the dumped chain and check the dumped collision
    Verify,
}

struct Workflow {
    id: String,
    admin_id: String,
    length: usize,
    difficulty: Difficulty,
    limits: SearchLimits,
    store: TextStore,
}

impl Workflow {
    fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self {
            id: cli.id.clone(),
            admin_id: cli.admin_id.clone(),
            length: cli.length,
            difficulty: Difficulty::new(cli.leading_zeroes)?,
            limits: SearchLimits {
                start: 0,
                max_attempts: cli.max_attempts,
                parallel: cli.parallel,
            },
            store: TextStore::new(&cli.proofs_file, &cli.collision_file),
        })
    }

    fn mine(&self) -> Result<Chain> {
        let mut chain = Chain::new(self.difficulty);
        Miner::new(self.id.as_str())
            .with_limits(self.limits)
            .mine_chain(&mut chain, self.length, &self.store)?;
        info!(
            "Mined {} blocks, proofs written to {}",
            self.length,
            self.store.proofs_path().display()
        );
        Ok(chain)
    }

    fn collide(&self, chain: &Chain) -> Result<()> {
        let block = CollisionFinder::new(self.admin_id.as_str())
            .with_limits(self.limits)
            .find_and_record(chain, &self.store)?;
        println!("original proof: {}", chain.last().proof());
        println!("collision proof: {}", block.proof());
        Ok(())
    }

    fn load(&self) -> Result<Chain> {
        let chain = self
            .store
            .load_chain(self.difficulty)
            .with_context(|| format!("reloading {}", self.store.proofs_path().display()))?;
        println!("SUCCESS: loaded successfully!");
        Ok(chain)
    }

    fn verify(&self) -> Result<()> {
        let chain = self.load()?;
        match self.store.verify_collision(&chain, &self.admin_id) {
            Ok(_) => println!("SUCCESS: collision is correct!"),
            Err(err) if !err.is_fatal() => println!("ERROR: {err}"),
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let workflow = Workflow::from_cli(&cli)?;
    match cli.cmd.unwrap_or(Command::Run) {
        Command::Run => {
            let chain = workflow.mine()?;
            workflow.collide(&chain)?;
            workflow.verify()?;
        }
        Command::Mine => {
            workflow.mine()?;
        }
        Command::Collide => {
            let chain = workflow.load()?;
            workflow.collide(&chain)?;
        }
        Command::Verify => workflow.verify()?,
    }
    Ok(())
}
