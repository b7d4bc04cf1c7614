//
//  apigee-cli
//  cli/proxy.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! API proxy commands
//!
//! Each subcommand is one build step against the management API.
//!
//! ## Examples
//!
//! ```bash
//! # Import a bundle, creating a new revision
//! apigee proxy import weatherapi target/weatherapi.zip
//!
//! # Deploy revision 3 to test, replacing the current revision after 15s
//! apigee proxy deploy weatherapi 3 --env test
//!
//! # Import, install npm modules and deploy in one step
//! apigee proxy release weatherapi target/weatherapi.zip --env test --npm
//!
//! # Delete every revision that is not deployed
//! apigee proxy clean weatherapi
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::common::RevisionCleanup;
use crate::api::proxies::{
    ApiProxy, ApiProxyRevision, DeployProxyResult, ImportProxyResult, NodePackagedModule,
};
use crate::api::settings::{DeployProxySettings, ImportProxySettings};
use crate::output::{format_state, print_field, print_header, OutputWriter, TableBuilder, TableOutput};

use super::{finish, spinner, GlobalOptions, Session};

/// Import, deploy and clean up API proxies
#[derive(Args, Debug)]
pub struct ProxyCommand {
    #[command(subcommand)]
    pub command: ProxySubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProxySubcommand {
    /// Import a proxy bundle as a new revision
    Import(ImportArgs),

    /// Deploy a proxy revision to an environment
    Deploy(DeployArgs),

    /// Import a bundle and deploy the new revision
    Release(ReleaseArgs),

    /// Install Node.js modules into a proxy revision
    #[command(name = "npm-install")]
    NpmInstall(RevisionArgs),

    /// Show a proxy and its revisions
    #[command(visible_alias = "view")]
    Get(ProxyArgs),

    /// Delete a single proxy revision
    #[command(name = "delete-revision")]
    DeleteRevision(RevisionArgs),

    /// Delete every revision that is not deployed
    Clean(ProxyArgs),
}

#[derive(Args, Debug)]
pub struct ProxyArgs {
    /// Proxy name
    pub name: String,
}

#[derive(Args, Debug)]
pub struct RevisionArgs {
    /// Proxy name
    pub name: String,

    /// Revision
    pub revision: String,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Proxy name
    pub name: String,

    /// Path to the proxy bundle (zip)
    pub bundle: PathBuf,

    /// Ask Apigee to validate the bundle (sent only when given)
    #[arg(long)]
    pub validate: Option<bool>,
}

#[derive(Args, Debug, Clone)]
pub struct DeploymentOptions {
    /// Target environment (defaults to the configured default_environment)
    #[arg(long = "env", short = 'e')]
    pub environment: Option<String>,

    /// Do not replace the currently deployed revision
    #[arg(long)]
    pub no_override: bool,

    /// Seconds before the previous revision is undeployed (0 to omit)
    #[arg(long, default_value_t = 15)]
    pub delay: u64,
}

impl DeploymentOptions {
    fn settings(&self, session: &Session) -> DeployProxySettings {
        DeployProxySettings {
            common: session.settings.clone(),
            r#override: Some(!self.no_override),
            delay: (self.delay > 0).then(|| Duration::from_secs(self.delay)),
        }
    }
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Proxy name
    pub name: String,

    /// Revision to deploy
    pub revision: String,

    #[command(flatten)]
    pub deployment: DeploymentOptions,
}

#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Proxy name
    pub name: String,

    /// Path to the proxy bundle (zip)
    pub bundle: PathBuf,

    /// Install Node.js modules before deploying
    #[arg(long)]
    pub npm: bool,

    /// Ask Apigee to validate the bundle (sent only when given)
    #[arg(long)]
    pub validate: Option<bool>,

    #[command(flatten)]
    pub deployment: DeploymentOptions,
}

/// Combined result of a release.
#[derive(Debug, Serialize)]
struct Release {
    import: ImportProxyResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    modules: Option<Vec<NodePackagedModule>>,
    deployment: DeployProxyResult,
}

/// Installed modules, serialized as a plain array.
#[derive(Debug, Serialize)]
#[serde(transparent)]
struct ModuleList(Vec<NodePackagedModule>);

impl TableOutput for ImportProxyResult {
    fn print_table(&self, color: bool) {
        print_field("Proxy", &self.name, color);
        print_field("Revision", &self.revision, color);
        if let Some(created_by) = &self.created_by {
            print_field("Created by", created_by, color);
        }
    }
}

impl TableOutput for DeployProxyResult {
    fn print_table(&self, color: bool) {
        if let Some(name) = &self.name {
            print_field("Proxy", name, color);
        }
        if !self.state.is_empty() {
            print_field("State", &format_state(&self.state, color), color);
        }

        let environments = self.environments();
        if !environments.is_empty() {
            TableBuilder::new()
                .color(color)
                .headers(["ENVIRONMENT", "REVISION", "STATE"])
                .rows(environments.iter().map(|e| {
                    [
                        e.environment.clone(),
                        e.revision.clone(),
                        format_state(&e.state, color),
                    ]
                }))
                .print();
        }
    }
}

impl TableOutput for ModuleList {
    fn print_table(&self, color: bool) {
        if self.0.is_empty() {
            println!("No modules installed.");
            return;
        }
        TableBuilder::new()
            .color(color)
            .headers(["MODULE", "VERSION"])
            .rows(self.0.iter().map(|m| [m.name.clone(), m.version.clone()]))
            .print();
    }
}

impl TableOutput for ApiProxy {
    fn print_table(&self, color: bool) {
        println!();
        print_header(&self.name);
        if let Some(meta) = &self.meta_data {
            if let Some(created) = meta.created_at {
                let by = meta.created_by.as_deref().unwrap_or("-");
                print_field("Created", &format!("{} by {}", created.format("%Y-%m-%d %H:%M:%S"), by), color);
            }
            if let Some(modified) = meta.last_modified_at {
                let by = meta.last_modified_by.as_deref().unwrap_or("-");
                print_field("Modified", &format!("{} by {}", modified.format("%Y-%m-%d %H:%M:%S"), by), color);
            }
            if let Some(sub_type) = &meta.sub_type {
                print_field("Type", sub_type, color);
            }
        }
        print_field("Revisions", &self.revision.join(", "), color);
    }
}

impl TableOutput for ApiProxyRevision {
    fn print_table(&self, color: bool) {
        print_field("Proxy", &self.name, color);
        print_field("Revision", &self.revision, color);
        if let Some(description) = &self.description {
            print_field("Description", description, color);
        }
    }
}

impl TableOutput for RevisionCleanup {
    fn print_table(&self, color: bool) {
        let list = |revisions: &[String]| {
            if revisions.is_empty() {
                "-".to_string()
            } else {
                revisions.join(", ")
            }
        };
        print_field("Proxy", &self.proxy, color);
        print_field("Deleted", &list(&self.deleted), color);
        print_field("Still deployed", &list(&self.retained), color);
    }
}

impl TableOutput for Release {
    fn print_table(&self, color: bool) {
        self.import.print_table(color);
        if let Some(modules) = &self.modules {
            println!();
            print_header("Node modules");
            for module in modules {
                println!("  {} {}", module.name, module.version);
            }
        }
        println!();
        self.deployment.print_table(color);
    }
}

impl ProxyCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let session = Session::resolve(global)?;
        let writer = OutputWriter::from_json_flag(global.json);

        match &self.command {
            ProxySubcommand::Import(args) => self.import(args, &session, &writer, global).await,
            ProxySubcommand::Deploy(args) => self.deploy(args, &session, &writer, global).await,
            ProxySubcommand::Release(args) => self.release(args, &session, &writer, global).await,
            ProxySubcommand::NpmInstall(args) => self.npm_install(args, &session, &writer, global).await,
            ProxySubcommand::Get(args) => self.get(args, &session, &writer).await,
            ProxySubcommand::DeleteRevision(args) => self.delete_revision(args, &session, &writer).await,
            ProxySubcommand::Clean(args) => self.clean(args, &session, &writer, global).await,
        }
    }

    async fn import(
        &self,
        args: &ImportArgs,
        session: &Session,
        writer: &OutputWriter,
        global: &GlobalOptions,
    ) -> Result<()> {
        let settings = ImportProxySettings {
            common: session.settings.clone(),
            validate: args.validate,
        };

        let pb = spinner(format!("Importing {}...", args.name), global);
        let result = session
            .client
            .import_proxy(&session.org, &args.name, &args.bundle, &settings)
            .await;
        finish(pb);
        let imported = result?;

        writer.write(&imported)?;
        writer.write_success(&format!("Imported {} revision {}", imported.name, imported.revision));
        Ok(())
    }

    async fn deploy(
        &self,
        args: &DeployArgs,
        session: &Session,
        writer: &OutputWriter,
        global: &GlobalOptions,
    ) -> Result<()> {
        let env = session.environment(args.deployment.environment.as_deref())?;
        let settings = args.deployment.settings(session);

        let pb = spinner(format!("Deploying {} revision {} to {}...", args.name, args.revision, env), global);
        let result = session
            .client
            .deploy_proxy(&session.org, &env, &args.name, &args.revision, &settings)
            .await;
        finish(pb);
        let deployed = result?;

        writer.write(&deployed)?;
        writer.write_success(&format!("Deployed {} revision {} to {}", args.name, args.revision, env));
        Ok(())
    }

    async fn release(
        &self,
        args: &ReleaseArgs,
        session: &Session,
        writer: &OutputWriter,
        global: &GlobalOptions,
    ) -> Result<()> {
        let env = session.environment(args.deployment.environment.as_deref())?;
        let import_settings = ImportProxySettings {
            common: session.settings.clone(),
            validate: args.validate,
        };

        let pb = spinner(format!("Importing {}...", args.name), global);
        let result = session
            .client
            .import_proxy(&session.org, &args.name, &args.bundle, &import_settings)
            .await;
        finish(pb);
        let imported = result?;

        let modules = if args.npm {
            let pb = spinner(format!("Installing npm modules into revision {}...", imported.revision), global);
            let result = session
                .client
                .install_node_packaged_modules_for_import(&session.org, &imported, &session.settings)
                .await;
            finish(pb);
            Some(result?)
        } else {
            None
        };

        let pb = spinner(format!("Deploying revision {} to {}...", imported.revision, env), global);
        let result = session
            .client
            .deploy_imported_proxy(&session.org, &env, &imported, &args.deployment.settings(session))
            .await;
        finish(pb);
        let deployment = result?;

        let message = format!("Released {} revision {} to {}", imported.name, imported.revision, env);
        writer.write(&Release {
            import: imported,
            modules,
            deployment,
        })?;
        writer.write_success(&message);
        Ok(())
    }

    async fn npm_install(
        &self,
        args: &RevisionArgs,
        session: &Session,
        writer: &OutputWriter,
        global: &GlobalOptions,
    ) -> Result<()> {
        let pb = spinner(format!("Installing npm modules into {} revision {}...", args.name, args.revision), global);
        let result = session
            .client
            .install_node_packaged_modules(&session.org, &args.name, &args.revision, &session.settings)
            .await;
        finish(pb);

        writer.write(&ModuleList(result?))
    }

    async fn get(&self, args: &ProxyArgs, session: &Session, writer: &OutputWriter) -> Result<()> {
        let proxy = session
            .client
            .get_api_proxy(&session.org, &args.name, &session.settings)
            .await?;
        writer.write(&proxy)
    }

    async fn delete_revision(&self, args: &RevisionArgs, session: &Session, writer: &OutputWriter) -> Result<()> {
        let deleted = session
            .client
            .delete_api_proxy_revision(&session.org, &args.name, &args.revision, &session.settings)
            .await?;

        writer.write(&deleted)?;
        writer.write_success(&format!("Deleted {} revision {}", args.name, args.revision));
        Ok(())
    }

    async fn clean(
        &self,
        args: &ProxyArgs,
        session: &Session,
        writer: &OutputWriter,
        global: &GlobalOptions,
    ) -> Result<()> {
        let pb = spinner(format!("Deleting undeployed revisions of {}...", args.name), global);
        let result = session
            .client
            .delete_all_undeployed_revisions(&session.org, &args.name, &session.settings)
            .await;
        finish(pb);
        let cleanup = result?;

        writer.write(&cleanup)?;
        if cleanup.deleted.is_empty() {
            writer.write_warning(&format!("No revisions of {} could be deleted", args.name));
        } else {
            writer.write_success(&format!(
                "Deleted {} revision(s) of {}",
                cleanup.deleted.len(),
                args.name
            ));
        }
        Ok(())
    }
}
