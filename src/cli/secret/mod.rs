//! Generate-secret command

use crate::config::generate_secret;

pub fn run() -> anyhow::Result<()> {
    println!("{}", generate_secret());
    Ok(())
}
