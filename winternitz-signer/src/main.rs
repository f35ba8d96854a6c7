use blake3_winternitz_signatures::{
    generate_key_from_os_rng, PublicKey, SecretKey, Signature, PUBLIC_KEY_LEN, SECRET_KEY_LEN,
    SIGNATURE_LEN,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Arguments {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    KeyGen {
        secret_key: PathBuf,
        public_key: PathBuf,
    },
    Sign {
        message: PathBuf,
        secret_key: PathBuf,
        signature: PathBuf,
        /// Leave the secret key file in place after signing. The key must
        /// still never sign a second message.
        #[arg(long, default_value_t = false)]
        keep_secret_key: bool,
    },
    Verify {
        message: PathBuf,
        signature: PathBuf,
        public_key: PathBuf,
    },
}

fn init_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => {
            eprintln!("unknown log level {}, using info", log_level);
            tracing::Level::INFO
        }
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn read_message(file: &Path) -> Result<Vec<u8>> {
    let mut f = File::options()
        .read(true)
        .open(file)
        .with_context(|| format!("open message {}", file.display()))?;
    let mut msg = Vec::new();
    f.read_to_end(&mut msg)?;
    Ok(msg)
}

fn read_exact_file<const N: usize>(file: &Path, kind: &str) -> Result<[u8; N]> {
    let bytes = fs::read(file).with_context(|| format!("read {} {}", kind, file.display()))?;
    if bytes.len() != N {
        bail!(
            "{} {} is {} bytes, expected {}",
            kind,
            file.display(),
            bytes.len(),
            N
        );
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes);
    Ok(buf)
}

pub fn read_secret_key(file: &Path) -> Result<SecretKey> {
    let buf = read_exact_file::<SECRET_KEY_LEN>(file, "secret key")?;
    Ok(buf.into())
}

pub fn read_public_key(file: &Path) -> Result<PublicKey> {
    let buf = read_exact_file::<PUBLIC_KEY_LEN>(file, "public key")?;
    Ok(buf.into())
}

pub fn read_signature(file: &Path) -> Result<Signature> {
    let buf = read_exact_file::<SIGNATURE_LEN>(file, "signature")?;
    Ok(buf.into())
}

fn write_file(file: &Path, bytes: &[u8]) -> Result<()> {
    write_file_with_mode(file, bytes, 0o644)
}

/// Writes a secret key readable by its owner only.
fn write_secret_file(file: &Path, bytes: &[u8]) -> Result<()> {
    write_file_with_mode(file, bytes, 0o600)
}

#[cfg_attr(not(unix), allow(unused_variables))]
fn write_file_with_mode(file: &Path, bytes: &[u8], mode: u32) -> Result<()> {
    let mut options = File::options();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut f = options
        .open(file)
        .with_context(|| format!("open {} for writing", file.display()))?;
    f.write_all(bytes)?;
    f.sync_all()?;
    Ok(())
}

/// Overwrites the secret key file with zeros and removes it, so the key
/// cannot be picked up for a second signature.
pub fn destroy_secret_key(file: &Path) -> Result<()> {
    write_secret_file(file, &[0u8; SECRET_KEY_LEN])?;
    fs::remove_file(file).with_context(|| format!("remove secret key {}", file.display()))?;
    Ok(())
}

pub fn key_gen(secret_key: &Path, public_key: &Path) -> Result<PublicKey> {
    let (pubk, seck) = generate_key_from_os_rng().context("generate key pair")?;
    write_secret_file(secret_key, seck.as_bytes())?;
    write_file(public_key, pubk.as_bytes())?;
    info!("public key {}", hex::encode(pubk.as_bytes()));
    Ok(pubk)
}

pub fn sign_file(
    message: &Path,
    secret_key: &Path,
    signature: &Path,
    keep_secret_key: bool,
) -> Result<()> {
    let seck = read_secret_key(secret_key)?;
    let message = read_message(message)?;
    debug!("signing {} byte message", message.len());

    let sig = seck.sign(&message);
    write_file(signature, &sig.to_bytes())?;

    if keep_secret_key {
        warn!(
            "secret key {} kept; it must not sign another message",
            secret_key.display()
        );
    } else {
        destroy_secret_key(secret_key)?;
        info!("secret key {} destroyed after use", secret_key.display());
    }
    Ok(())
}

pub fn verify_file(message: &Path, signature: &Path, public_key: &Path) -> Result<bool> {
    let pubk = read_public_key(public_key)?;
    let signature = read_signature(signature)?;
    let message = read_message(message)?;
    Ok(pubk.verify(message, &signature))
}

fn main() -> Result<()> {
    let args = Arguments::parse();
    init_logging(&args.log_level);

    use Command::*;
    match args.cmd {
        KeyGen {
            secret_key,
            public_key,
        } => {
            key_gen(&secret_key, &public_key)?;
        }
        Sign {
            message,
            secret_key,
            signature,
            keep_secret_key,
        } => sign_file(&message, &secret_key, &signature, keep_secret_key)?,
        Verify {
            message,
            signature,
            public_key,
        } => {
            let valid = verify_file(&message, &signature, &public_key)?;
            println!("signature validity: {}", valid);
            if !valid {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
