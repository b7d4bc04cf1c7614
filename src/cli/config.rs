//
//  apigee-cli
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! This module provides commands for getting, setting, and listing
//! configuration values.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{Config, CONFIG_KEYS};

use super::GlobalOptions;

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(KeyArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Reset a configuration value to its default
    Unset(KeyArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args),
            ConfigSubcommand::Unset(args) => self.unset(args),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::Path => self.path(global),
        }
    }

    fn get(&self, args: &KeyArgs, global: &GlobalOptions) -> Result<()> {
        if !CONFIG_KEYS.contains(&args.key.as_str()) {
            bail!(
                "Unknown configuration key '{}'. Valid keys: {}",
                args.key,
                CONFIG_KEYS.join(", ")
            );
        }

        let config = Config::load()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(value) = value {
            println!("{}", value);
        }

        Ok(())
    }

    fn set(&self, args: &SetArgs) -> Result<()> {
        let mut config = Config::load()?;
        config.set(&args.key, args.value.clone())?;
        config.save()?;

        println!("{} Set {} to {}", style("✓").green(), args.key, args.value);
        Ok(())
    }

    fn unset(&self, args: &KeyArgs) -> Result<()> {
        let default = Config::default().get(&args.key).unwrap_or_default();

        let mut config = Config::load()?;
        config.set(&args.key, default)?;
        config.save()?;

        println!("{} Reset {}", style("✓").green(), args.key);
        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        if global.json {
            println!("{}", serde_json::to_string_pretty(&config)?);
            return Ok(());
        }

        for key in CONFIG_KEYS {
            match config.get(key) {
                Some(value) => println!("{}={}", key, value),
                None => println!("{}=", style(key).dim()),
            }
        }

        Ok(())
    }

    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let path = Config::config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": path,
                "exists": path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", path.display());
        }

        Ok(())
    }
}
