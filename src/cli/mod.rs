//! CLI module - Command-line interface for Vitrin
//!
//! This module provides a structured CLI using clap for argument parsing.

use clap::{Parser, Subcommand};

/// Vitrin - banner/slideshow item backend
#[derive(Parser)]
#[command(name = "vitrin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Create a default config.toml if none exists
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts (users are created out-of-band, never via the API)
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user (password read from stdin)
    Add {
        /// Email address (unique)
        email: String,
        /// Role name; only "admin" may mutate items
        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// Change a user's password (read from stdin)
    Passwd {
        /// Email address of an existing user
        email: String,
    },

    /// List all users
    #[command(alias = "ls")]
    List,
}
