//! `streamgate keys generate`

use streamgate_token::KeyPair;
use std::path::PathBuf;

/// Generate a keypair, printing it or saving it under `output`.
pub fn generate(output: Option<PathBuf>) -> anyhow::Result<()> {
    let keypair = KeyPair::generate()?;

    let Some(dir) = output else {
        println!("Private key (keep secure!):");
        println!("{}", keypair.private_key_hex());
        println!();
        println!("Public key:");
        println!("{}", keypair.public_key_hex());
        println!();
        println!("Use --output <dir> to save keys to files.");
        return Ok(());
    };

    keypair.save_to_dir(&dir)?;
    let public_path = dir.join("public.key");

    println!("Generated keypair in {}", dir.display());
    println!();
    println!("The gateway only needs the public key:");
    println!("  export STREAMGATE_PUBLIC_KEY=$(cat {})", public_path.display());
    println!("or in streamgate.yaml:");
    println!("  token:");
    println!("    public_key_file: {}", public_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_writes_hex_keys() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("keys");
        generate(Some(out.clone())).unwrap();

        let private_hex = std::fs::read_to_string(out.join("private.key")).unwrap();
        let public_hex = std::fs::read_to_string(out.join("public.key")).unwrap();
        assert_eq!(private_hex.trim().len(), 64);
        assert_eq!(public_hex.trim().len(), 64);

        let keypair = KeyPair::from_private_key_hex(&private_hex).unwrap();
        assert_eq!(keypair.public_key_hex(), public_hex.trim());
    }
}
