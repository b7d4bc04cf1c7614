//
//  apigee-cli
//  cli/auth.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Authentication commands for the Apigee CLI.
//!
//! Apigee Edge uses HTTP Basic authentication. The username is kept in the
//! configuration file; the password goes to the system keyring, keyed by
//! `username@host` of the configured base URL.

use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use dialoguer::{Input, Password};

use crate::api::settings::KeyValueMapSettings;
use crate::auth::KeyringStore;
use crate::config::Config;

use super::{resolve_credentials, GlobalOptions, Session};

/// Store or remove the Apigee password.
#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Save a username and store the password in the keyring
    Login(LoginArgs),

    /// Remove the stored password
    Logout,

    /// View authentication status
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Read the password from standard input
    #[arg(long)]
    pub with_password: bool,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Check the credentials against the management API
    #[arg(long)]
    pub verify: bool,
}

impl AuthCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            AuthSubcommand::Login(args) => login(args, global),
            AuthSubcommand::Logout => logout(global),
            AuthSubcommand::Status(args) => status(args, global).await,
        }
    }
}

/// Prompts for missing values and stores the password.
fn login(args: &LoginArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(base_url) = &global.base_url {
        config.base_url = base_url.clone();
    }
    let host = config
        .host()
        .with_context(|| format!("Base URL '{}' has no host", config.base_url))?;

    let username = match global.username.clone().or_else(|| config.username.clone()) {
        Some(username) if !username.is_empty() => username,
        _ => Input::<String>::new()
            .with_prompt("Apigee username")
            .interact_text()?,
    };

    let password = if let Some(password) = &global.password {
        password.clone()
    } else if args.with_password {
        read_password_from_stdin()?
    } else {
        Password::new()
            .with_prompt(format!("Password for {}", username))
            .interact()?
    };

    if password.is_empty() {
        bail!("Password must not be empty");
    }

    KeyringStore::new().store(&KeyringStore::account(&username, &host), &password)?;

    if config.username.as_deref() != Some(username.as_str()) {
        config.username = Some(username.clone());
        config.save()?;
    }

    println!("Stored password for {} on {}", username, host);
    Ok(())
}

/// Reads the first line of stdin, without the line ending.
fn read_password_from_stdin() -> Result<String> {
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn logout(global: &GlobalOptions) -> Result<()> {
    let config = Config::load()?;

    let Some(username) = global.username.clone().or_else(|| config.username.clone()) else {
        println!("No username configured");
        return Ok(());
    };
    let host = config
        .host()
        .with_context(|| format!("Base URL '{}' has no host", config.base_url))?;

    KeyringStore::new().delete(&KeyringStore::account(&username, &host))?;

    println!("Removed stored password for {} on {}", username, host);
    Ok(())
}

async fn status(args: &StatusArgs, global: &GlobalOptions) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(base_url) = &global.base_url {
        config.base_url = base_url.clone();
    }

    println!("{}", config.base_url);

    let Some(credentials) = resolve_credentials(global, &config) else {
        println!("  Not logged in; requests are sent without credentials");
        println!();
        println!("Run 'apigee auth login' to authenticate");
        return Ok(());
    };

    println!("  Username: {}", credentials.username);
    println!(
        "  Password: {}",
        if credentials.password.is_empty() {
            "not stored"
        } else {
            "stored"
        }
    );

    if args.verify {
        let session = Session::resolve(global)?;
        let settings = KeyValueMapSettings {
            common: session.settings.clone(),
            environment: None,
        };
        match session.client.list_key_value_maps(&session.org, &settings).await {
            Ok(_) => println!("  Status: Active for organization {}", session.org),
            Err(e) => println!("  Status: Rejected ({})", e),
        }
    }

    Ok(())
}
