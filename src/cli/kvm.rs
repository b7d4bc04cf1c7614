//
//  apigee-cli
//  cli/kvm.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Key value map commands
//!
//! Maps live at organization scope unless `--env` is given.
//!
//! ```bash
//! apigee kvm create settings --entry region=eu --entry tier=gold --env test
//! apigee kvm list --env test
//! apigee kvm delete settings --env test
//! ```

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::keyvaluemaps::KeyValueMap;
use crate::api::settings::KeyValueMapSettings;
use crate::output::{format_bool, print_field, OutputWriter, TableBuilder, TableOutput};

use super::{GlobalOptions, Session};

/// Manage key value maps
#[derive(Args, Debug)]
pub struct KvmCommand {
    #[command(subcommand)]
    pub command: KvmSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum KvmSubcommand {
    /// Create a key value map
    Create(CreateArgs),

    /// Delete a key value map
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// List key value map names
    #[command(visible_alias = "ls")]
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Map name
    pub name: String,

    /// Entry as KEY=VALUE (repeatable)
    #[arg(long = "entry", short = 'E', value_parser = parse_entry)]
    pub entries: Vec<(String, String)>,

    /// Encrypt the map values
    #[arg(long)]
    pub encrypted: bool,

    /// Environment scope (organization scope when omitted)
    #[arg(long = "env", short = 'e')]
    pub environment: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Map name
    pub name: String,

    /// Environment scope (organization scope when omitted)
    #[arg(long = "env", short = 'e')]
    pub environment: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Environment scope (organization scope when omitted)
    #[arg(long = "env", short = 'e')]
    pub environment: Option<String>,
}

/// Parses `KEY=VALUE`. The value may itself contain `=`.
fn parse_entry(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(anyhow!("entry name must not be empty"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Key value map names, serialized as a plain array.
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct KvmNames(Vec<String>);

impl TableOutput for KvmNames {
    fn print_table(&self, color: bool) {
        if self.0.is_empty() {
            println!("No key value maps found.");
            return;
        }
        TableBuilder::new()
            .color(color)
            .headers(["NAME"])
            .rows(self.0.iter().map(|name| [name.clone()]))
            .print();
    }
}

impl TableOutput for KeyValueMap {
    fn print_table(&self, color: bool) {
        print_field("Name", &self.name, color);
        print_field("Encrypted", &format_bool(self.encrypted, color), color);

        if self.entry.is_empty() {
            return;
        }
        TableBuilder::new()
            .color(color)
            .headers(["KEY", "VALUE"])
            .rows(self.entry.iter().map(|e| {
                let value = if self.encrypted {
                    "*****".to_string()
                } else {
                    e.value.clone()
                };
                [e.name.clone(), value]
            }))
            .print();
    }
}

impl KvmCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::resolve(global)?;
        let writer = OutputWriter::from_json_flag(global.json);

        match &self.command {
            KvmSubcommand::Create(args) => {
                let kvm = args
                    .entries
                    .iter()
                    .fold(KeyValueMap::new(&args.name).encrypted(args.encrypted), |kvm, (k, v)| {
                        kvm.with_entry(k, v)
                    });
                let settings = settings(&session, args.environment.as_deref());

                let created = session
                    .client
                    .create_key_value_map(&session.org, &kvm, &settings)
                    .await?;

                writer.write(&created)?;
                writer.write_success(&format!("Created key value map {} in {}", created.name, settings.scope()));
            }
            KvmSubcommand::Delete(args) => {
                let settings = settings(&session, args.environment.as_deref());
                let deleted = session
                    .client
                    .delete_key_value_map(&session.org, &args.name, &settings)
                    .await?;

                writer.write(&deleted)?;
                writer.write_success(&format!("Deleted key value map {} from {}", args.name, settings.scope()));
            }
            KvmSubcommand::List(args) => {
                let settings = settings(&session, args.environment.as_deref());
                let names = session
                    .client
                    .list_key_value_maps(&session.org, &settings)
                    .await?;

                writer.write(&KvmNames(names))?;
            }
        }

        Ok(())
    }
}

fn settings(session: &Session, environment: Option<&str>) -> KeyValueMapSettings {
    KeyValueMapSettings {
        common: session.settings.clone(),
        environment: environment.map(str::to_string),
    }
}
