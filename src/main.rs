// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kennel::config::Config;
use kennel::error::KennelError;
use kennel::kubernetes::{self, ClusterConnection, ClusterGateway};
use kennel::provision::{CredentialResolver, NamespaceProvisioner};
use kennel::store::{CoOwnerStore, NamespaceStore, PostgresStore};
use kennel::sync::{NamespaceDiff, ReconciliationEngine, SyncReport};
use kennel::types::{OwnerId, TenantNamespace};

/// Provision tenant namespaces and keep the cluster in line with the database
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Kubeconfig used to reach the cluster
    #[arg(long, global = true, env = "KENNEL_KUBECONFIG")]
    kubeconfig: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a namespace with its access objects and token secret, then record it
    Provision {
        #[arg(long)]
        name: String,
        #[arg(long)]
        owner: OwnerId,
    },
    /// Bind the namespace's service account to the shared cluster role
    Bind {
        #[arg(long)]
        name: String,
    },
    /// Show which parts of a namespace exist
    Status {
        #[arg(long)]
        name: String,
    },
    /// List recorded namespaces
    List {
        #[arg(long)]
        owner: Option<OwnerId>,
    },
    /// Print a kubeconfig scoped to the namespace
    Kubeconfig {
        #[arg(long)]
        name: String,
    },
    /// Print the service account token
    Token {
        #[arg(long)]
        name: String,
    },
    /// Print the cluster CA certificate
    Certificate {
        #[arg(long)]
        name: String,
        #[arg(long)]
        base64: bool,
    },
    /// Show drift between the database and the cluster
    Diff,
    /// Repair drift between the database and the cluster
    Sync {
        #[arg(long)]
        dry_run: bool,
    },
    /// Manage namespace co-owners
    CoOwner {
        #[command(subcommand)]
        command: CoOwnerCommand,
    },
}

#[derive(Subcommand, Debug)]
enum CoOwnerCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        user: OwnerId,
    },
    Remove {
        #[arg(long)]
        name: String,
        #[arg(long)]
        user: OwnerId,
    },
    List {
        #[arg(long)]
        name: String,
    },
}

struct App {
    config: Config,
    cluster: ClusterConnection,
}

impl App {
    fn gateway(&self) -> ClusterGateway {
        ClusterGateway::new(self.cluster.client.clone())
    }

    fn credentials(&self) -> CredentialResolver {
        CredentialResolver::new(self.gateway(), self.cluster.endpoint.clone())
    }

    async fn store(&self) -> Result<Arc<PostgresStore>> {
        let store = PostgresStore::connect(self.config.database_url()?)
            .await
            .context("Failed to connect to the database")?;
        Ok(Arc::new(store))
    }

    async fn provisioner(&self) -> Result<NamespaceProvisioner> {
        Ok(NamespaceProvisioner::new(
            self.gateway(),
            self.store().await?,
            self.config.cluster_role.clone(),
        ))
    }

    async fn engine(&self) -> Result<ReconciliationEngine> {
        let store: Arc<dyn NamespaceStore> = self.store().await?;
        let provisioner =
            NamespaceProvisioner::new(self.gateway(), store.clone(), self.config.cluster_role.clone());
        Ok(ReconciliationEngine::new(
            self.gateway(),
            store,
            provisioner,
            self.config.sync_policy,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(path) = cli.kubeconfig {
        config.kubeconfig = Some(path);
    }

    let cluster = kubernetes::connect(&config).await?;
    let app = App { config, cluster };

    run(&app, cli.command).await
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Provision { name, owner } => {
            let provisioner = app.provisioner().await?;
            let record = provisioner.provision(&name, owner).await?;
            info!("Provisioned {} ({})", record.name, record.id);
            println!("{}", record.id);
        }
        Command::Bind { name } => {
            app.provisioner().await?.ensure_cluster_binding(&name).await?;
        }
        Command::Status { name } => {
            let status = app.provisioner().await?.inspect(&name).await?;
            println!("state:           {:?}", status.state());
            println!("recorded:        {}", status.recorded);
            println!("namespace:       {}", status.namespace);
            println!("service account: {}", status.service_account);
            println!("role:            {}", status.role);
            println!("role binding:    {}", status.role_binding);
            println!("cluster binding: {}", status.cluster_binding);
        }
        Command::List { owner } => {
            let store = app.store().await?;
            let namespaces = match owner {
                Some(owner) => store.list_by_owner(owner).await?,
                None => store.list().await?,
            };
            for ns in &namespaces {
                print_namespace(ns);
            }
        }
        Command::Kubeconfig { name } => {
            print!("{}", app.credentials().render_config(&name).await?);
        }
        Command::Token { name } => {
            println!("{}", app.credentials().token(&name).await?);
        }
        Command::Certificate { name, base64 } => {
            let resolver = app.credentials();
            if base64 {
                println!("{}", resolver.certificate_base64(&name).await?);
            } else {
                print!("{}", resolver.certificate(&name).await?);
            }
        }
        Command::Diff => {
            let diff = app.engine().await?.diff().await?;
            print_diff(&diff);
        }
        Command::Sync { dry_run } => {
            let engine = app.engine().await?;
            let diff = engine.diff().await?;
            print_diff(&diff);
            if dry_run {
                return Ok(());
            }

            match engine.sync(&diff).await {
                Ok(report) => print_report(&report),
                Err(KennelError::SyncFailed(report)) => {
                    print_report(&report);
                    bail!("{} namespace(s) could not be reconciled", report.failures.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::CoOwner { command } => run_co_owner(app, command).await?,
    }

    Ok(())
}

async fn run_co_owner(app: &App, command: CoOwnerCommand) -> Result<()> {
    let store = app.store().await?;

    match command {
        CoOwnerCommand::Add { name, user } => {
            let ns = recorded(&store, &name).await?;
            store.add_co_owner(ns.id, user).await?;
        }
        CoOwnerCommand::Remove { name, user } => {
            let ns = recorded(&store, &name).await?;
            store.remove_co_owner(ns.id, user).await?;
        }
        CoOwnerCommand::List { name } => {
            let ns = recorded(&store, &name).await?;
            for user in store.list_co_owners(ns.id).await? {
                println!("{}", user);
            }
        }
    }

    Ok(())
}

async fn recorded(store: &PostgresStore, name: &str) -> Result<TenantNamespace> {
    store
        .find_by_name(name)
        .await?
        .ok_or_else(|| KennelError::NotRecorded(name.to_string()).into())
}

fn print_namespace(ns: &TenantNamespace) {
    println!(
        "{}\t{}\t{}",
        ns.name,
        ns.owner_id,
        ns.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

fn print_diff(diff: &NamespaceDiff) {
    for record in &diff.missing_from_cluster {
        println!("+ {} (missing from cluster)", record.name);
    }
    for ns in &diff.missing_from_database {
        println!("- {} (missing from database)", ns.name);
    }
    if diff.is_empty() {
        println!("Database and cluster agree");
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "{} recreated, {} deleted, {} failed",
        report.created.len(),
        report.deleted.len(),
        report.failures.len()
    );
    for failure in &report.failures {
        println!("! {} {}: {}", failure.action, failure.namespace, failure.error);
    }
}
