use crate::PersistenceError;
use proofchain_core::{
  constants::{DEFAULT_COLLISION_FILE, DEFAULT_PROOFS_FILE},
  Block, Chain, ChainStore, Difficulty,
};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Line-oriented files holding a mined proof sequence and a collision.
///
/// Proof file: identity on line 1, then one proof per line, genesis excluded.
/// Collision file: admin identity on line 1, collision proof on line 2.
#[derive(Clone, Debug)]
pub struct TextStore {
  proofs_path: PathBuf,
  collision_path: PathBuf,
}

impl TextStore {
  pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(proofs_path: P, collision_path: Q) -> Self {
    Self {
      proofs_path: proofs_path.into(),
      collision_path: collision_path.into(),
    }
  }

  /// Store using the default file names inside `dir`.
  pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
    let dir = dir.as_ref();
    Self::new(dir.join(DEFAULT_PROOFS_FILE), dir.join(DEFAULT_COLLISION_FILE))
  }

  pub fn proofs_path(&self) -> &Path {
    &self.proofs_path
  }

  pub fn collision_path(&self) -> &Path {
    &self.collision_path
  }

  pub fn write_proofs<I>(&self, id: &str, proofs: I) -> Result<(), PersistenceError>
  where
    I: IntoIterator<Item = u64>,
  {
    let path = &self.proofs_path;
    write_lines(path, |out| {
      writeln!(out, "{id}")?;
      for proof in proofs {
        writeln!(out, "{proof}")?;
      }
      Ok(())
    })?;
    debug!("wrote proofs to {}", path.display());
    Ok(())
  }

  pub fn write_collision(&self, block: &Block) -> Result<(), PersistenceError> {
    let path = &self.collision_path;
    write_lines(path, |out| {
      writeln!(out, "{}", block.id())?;
      writeln!(out, "{}", block.proof())
    })?;
    debug!("wrote collision to {}", path.display());
    Ok(())
  }

  /// Rebuilds a chain from the proof file, replaying every block through
  /// `Chain::append` so a tampered dump fails its invariant checks.
  pub fn load_chain(&self, difficulty: Difficulty) -> Result<Chain, PersistenceError> {
    let path = &self.proofs_path;
    let text = read(path)?;
    let mut lines = text.lines().map(str::trim).enumerate();
    let (_, id) = lines
      .next()
      .ok_or_else(|| PersistenceError::MissingIdentity(path.clone()))?;

    let mut chain = Chain::new(difficulty);
    for (i, line) in lines.filter(|(_, line)| !line.is_empty()) {
      let proof = parse_proof(path, i + 1, line)?;
      let block = Chain::build(proof, chain.tip_hash(), id);
      chain.append(block)?;
    }
    info!("loaded {} mined blocks from {}", chain.len() - 1, path.display());
    Ok(chain)
  }

  /// Replays the dumped collision against `chain` and returns the rebuilt
  /// block when its truncated hash equals the tail's.
  pub fn verify_collision(&self, chain: &Chain, admin_id: &str) -> Result<Block, PersistenceError> {
    let path = &self.collision_path;
    if !path.exists() {
      warn!("no collision file at {}", path.display());
      return Err(PersistenceError::MissingCollisionFile(path.clone()));
    }
    let text = read(path)?;
    let mut lines = text.lines().map(str::trim);

    let found = lines.next().unwrap_or_default();
    if found != admin_id {
      return Err(PersistenceError::BadAdminIdentity {
        expected: admin_id.to_string(),
        found: found.to_string(),
      });
    }
    let line = lines
      .next()
      .ok_or_else(|| PersistenceError::MissingProofLine(path.clone()))?;
    let proof = parse_proof(path, 2, line)?;

    let parent = chain.parent_of_last().ok_or(PersistenceError::ChainTooShort)?;
    let block = Chain::build(proof, chain.hash_of(parent), found);
    let expected = chain.tip_hash();
    let actual = chain.hash_of(&block);
    if actual != expected {
      warn!("collision hash {actual} does not match tail hash {expected}");
      return Err(PersistenceError::CollisionMismatch { expected, actual });
    }
    Ok(block)
  }
}

impl ChainStore for TextStore {
  fn record_proofs(&self, id: &str, chain: &Chain) -> anyhow::Result<()> {
    self.write_proofs(id, chain.proofs())?;
    Ok(())
  }

  fn record_collision(&self, block: &Block) -> anyhow::Result<()> {
    self.write_collision(block)?;
    Ok(())
  }
}

fn write_lines<F>(path: &Path, body: F) -> Result<(), PersistenceError>
where
  F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
  let io_err = |source: io::Error| PersistenceError::Io {
    path: path.to_path_buf(),
    source,
  };
  let mut out = BufWriter::new(File::create(path).map_err(io_err)?);
  body(&mut out).map_err(io_err)?;
  out.flush().map_err(io_err)
}

fn read(path: &Path) -> Result<String, PersistenceError> {
  fs::read_to_string(path).map_err(|source| PersistenceError::Io {
    path: path.to_path_buf(),
    source,
  })
}

fn parse_proof(path: &Path, line: usize, text: &str) -> Result<u64, PersistenceError> {
  text.parse().map_err(|_| PersistenceError::MalformedProof {
    path: path.to_path_buf(),
    line,
    text: text.to_string(),
  })
}
