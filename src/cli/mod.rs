//! CLI module - Command-line interface for Armory
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

pub use commands::{cmd_search, cmd_show, cmd_sync};

use clap::{Parser, Subcommand};

use crate::constants::limits::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::db::repositories::catalog::{CRATES_FILTER, TEAM_FILTER};
use crate::domain::{ItemKind, SearchQuery};

/// Armory - Counter-Strike item catalog
/// Syncs skins, agents, crates and keys and serves search over them
#[derive(Debug, Parser)]
#[command(name = "armory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Replace the stored catalog with a fresh upstream copy
    Sync,

    /// Search one kind of item
    #[command(alias = "s")]
    Search {
        /// skins, agents, crates or keys
        kind: ItemKind,

        /// Substring matched against name and description
        term: Vec<String>,

        /// Team substring (skins, agents)
        #[arg(long)]
        team: Option<String>,

        /// Exact crate name (skins, keys)
        #[arg(long = "crate")]
        crate_name: Option<String>,

        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        #[arg(
            long,
            default_value_t = DEFAULT_PAGE_SIZE,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGE_SIZE))
        )]
        page_size: u32,
    },

    /// Print one item as JSON
    #[command(alias = "i")]
    Show {
        kind: ItemKind,
        id: String,
    },

    /// Create default config file
    Init,
}

impl Commands {
    /// Builds the search request for `Commands::Search`.
    #[must_use]
    pub fn search_query(&self) -> Option<(ItemKind, SearchQuery)> {
        let Self::Search {
            kind,
            term,
            team,
            crate_name,
            page,
            page_size,
        } = self
        else {
            return None;
        };

        let term = term.join(" ");
        let mut query = SearchQuery::new(Some(&term)).with_page(*page, *page_size);
        if let Some(team) = team {
            query = query.with_filter(TEAM_FILTER, team.as_str());
        }
        if let Some(crate_name) = crate_name {
            query = query.with_filter(CRATES_FILTER, crate_name.as_str());
        }
        Some((*kind, query.normalized()))
    }
}
