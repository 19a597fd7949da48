//! CLI module for the Team Directory API
//!
//! - `serve`: run the HTTP server
//! - `generate-secret`: print a random value for `auth.jwt_secret`

pub mod secret;
pub mod serve;

use clap::{Parser, Subcommand};

/// Team Directory - user and team directory with token sessions
#[derive(Parser)]
#[command(name = "team-directory")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Print a random signing secret
    GenerateSecret,
}
