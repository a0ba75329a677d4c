use anyhow::{Context, Result};
use std::env;

use crate::push::codec;

/// Print the raw bytes of a VAPID public key, as passed to the push
/// service on subscribe.
pub fn run(key: Option<String>) -> Result<()> {
    let key = match key {
        Some(key) => key,
        None => env::var("PUSHBELL_VAPID_PUBLIC_KEY")
            .context("No key given and PUSHBELL_VAPID_PUBLIC_KEY is not set")?,
    };
    let bytes = codec::decode(&key)?;

    println!("{} bytes", bytes.len());
    println!("{:?}", bytes.as_bytes());
    if bytes.len() == 65 && bytes.as_bytes()[0] == 0x04 {
        println!("Looks like an uncompressed P-256 public key");
    } else {
        println!("Not an uncompressed P-256 public key, push services will reject it");
    }
    Ok(())
}
