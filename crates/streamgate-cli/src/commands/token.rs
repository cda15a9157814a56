//! Token commands.
//!
//! `streamgate token mint` - Mint an access token for a video path.
//! `streamgate token verify` - Verify a token and print its claims.
//! `streamgate token inspect` - Show a token's structure without verifying.

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use streamgate_token::{
    AccessClaims, BiscuitVerifier, KeyPair, TokenIssuer, TokenVerifier, inspect_token_unverified,
    load_public_key,
};

/// Arguments of `streamgate token mint`.
#[derive(Debug)]
pub struct MintArgs {
    pub key: Option<String>,
    pub base_url: String,
    pub path: String,
    pub org_id: String,
    pub role: String,
    pub extra_data: String,
    pub expires: Option<String>,
    pub output: Option<PathBuf>,
}

/// Parse a lifetime like "24h", "7d", "30m" or "45s"; a bare number is hours.
fn parse_duration(s: &str) -> anyhow::Result<chrono::Duration> {
    let s = s.trim().to_lowercase();
    let (number, unit) = match s.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => (&s[..i], c),
        _ => (s.as_str(), 'h'),
    };
    let n: i64 = number
        .parse()
        .with_context(|| format!("invalid duration: {s}"))?;
    let duration = match unit {
        'd' => chrono::TimeDelta::try_days(n),
        'h' => chrono::TimeDelta::try_hours(n),
        'm' => chrono::TimeDelta::try_minutes(n),
        's' => chrono::TimeDelta::try_seconds(n),
        other => anyhow::bail!("unknown duration unit '{other}' in {s}"),
    };
    duration.with_context(|| format!("duration out of range: {s}"))
}

/// Read a token argument that may be a file path.
fn read_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).exists() {
        return Ok(fs::read_to_string(&token)?.trim().to_string());
    }
    Ok(token)
}

pub fn mint(args: MintArgs) -> anyhow::Result<()> {
    let key = args
        .key
        .context("Private key not provided. Pass --key or set STREAMGATE_PRIVATE_KEY")?;
    let keypair = KeyPair::from_path_or_hex(&key).context("Failed to load private key")?;

    let claims = AccessClaims::new(&args.base_url, &args.path)
        .with_org_id(args.org_id)
        .with_role(args.role)
        .with_extra_data(args.extra_data);
    let lifetime = args.expires.as_deref().map(parse_duration).transpose()?;

    let token = TokenIssuer::new(keypair).mint(&claims, lifetime)?;

    match args.output {
        Some(path) => {
            fs::write(&path, &token)?;
            println!("Token written to: {}", path.display());
            println!("  Base URL: {}", claims.base_url);
            println!("  Path: {}", claims.path);
            if let Some(e) = &args.expires {
                println!("  Expires in: {e}");
            }
        }
        None => println!("{token}"),
    }
    Ok(())
}

pub fn verify(key: Option<String>, token: String) -> anyhow::Result<()> {
    let key = key.context("Public key not provided. Pass --key or set STREAMGATE_PUBLIC_KEY")?;
    let verifier = BiscuitVerifier::new(load_public_key(&key).context("Failed to load public key")?);

    let verification = verifier.verify(&read_token(token)?)?;
    println!("{}", serde_json::to_string_pretty(&verification.payload)?);

    if verification.verified {
        println!("Token is valid.");
        Ok(())
    } else {
        anyhow::bail!("token checks failed (expired?)")
    }
}

pub fn inspect(token: String) -> anyhow::Result<()> {
    let info = inspect_token_unverified(&read_token(token)?)?;

    println!("Token Information:");
    println!("  Block count: {}", info.block_count);
    println!();
    println!("{}", info.print);
    Ok(())
}
