//! Command-line interface for launchpad.
//!
//! Provides commands for listing and adding templates, launching and
//! stopping instances, and querying live status. This is the stand-in
//! consumer of the orchestrator's operation surface.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::cluster::KubeHttpClient;
use crate::config::Settings;
use crate::core::{seed_default_templates, Backend, ClusterBackend, LocalBackend, Orchestrator};
use crate::domain::{OrchestratorError, Template};
use crate::store::{JsonInstanceStore, JsonTemplateStore};

/// launchpad - per-user workload provisioning orchestrator
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the config file (default: LAUNCHPAD_CONFIG or built-in defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List launchable templates
    Templates,

    /// Add a template to the catalog
    AddTemplate {
        /// Display name
        name: String,

        /// Image reference (registry-qualified or relative)
        #[arg(short, long)]
        image: String,

        /// Container listen port
        #[arg(short, long)]
        port: u16,

        /// Icon tag
        #[arg(long, default_value = "")]
        icon: String,

        /// Human-readable description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Default environment variables as a JSON object
        #[arg(short, long, default_value = "{}")]
        env: String,
    },

    /// Launch an instance of a template
    Launch {
        /// Template ID
        template_id: String,

        /// Owning user
        #[arg(short, long, default_value = "default-user")]
        user: String,
    },

    /// List a user's running and pending instances
    Ps {
        /// Owning user
        #[arg(short, long, default_value = "default-user")]
        user: String,
    },

    /// Stop an instance and tear down its cluster resources
    Stop {
        /// Instance ID
        instance_id: String,
    },

    /// Query an instance's live status
    Status {
        /// Instance ID
        instance_id: String,
    },
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// Unknown ids (bad request) exit with code 2 so scripts can tell
    /// them apart from infrastructure failures, which exit with 1.
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;
        let orchestrator = build_orchestrator(&settings).await?;

        let result = self.dispatch(&orchestrator).await;
        if let Err(err) = &result {
            if let Some(e) = err.downcast_ref::<OrchestratorError>() {
                if e.is_not_found() {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
            }
        }
        result
    }

    async fn dispatch(self, orchestrator: &Orchestrator) -> Result<()> {
        match self.command {
            Commands::Templates => list_templates(orchestrator).await,
            Commands::AddTemplate {
                name,
                image,
                port,
                icon,
                description,
                env,
            } => {
                let mut template = Template::new(name, image, port);
                template.icon = icon;
                template.description = description;
                template.env_variables = env;

                let stored = orchestrator.add_template(template).await?;
                println!("Added template {} ({})", stored.name, stored.id);
                Ok(())
            }
            Commands::Launch { template_id, user } => {
                let id = parse_id(&template_id, "template id")?;
                let instance = orchestrator.create_instance(id, &user).await?;
                println!("Launched {} [{}]", instance.workload_name, instance.status);
                println!("  id:  {}", instance.id);
                println!("  url: {}", instance.access_url);
                Ok(())
            }
            Commands::Ps { user } => {
                let instances = orchestrator.list_instances(&user).await?;
                if instances.is_empty() {
                    println!("No running instances for {}", user);
                    return Ok(());
                }
                for i in instances {
                    println!(
                        "{}  {}  {}  {}",
                        i.id, i.workload_name, i.status, i.access_url
                    );
                }
                Ok(())
            }
            Commands::Stop { instance_id } => {
                let id = parse_id(&instance_id, "instance id")?;
                orchestrator.stop_instance(id).await?;
                println!("Stopped {}", id);
                Ok(())
            }
            Commands::Status { instance_id } => {
                let id = parse_id(&instance_id, "instance id")?;
                let status = orchestrator.instance_status(id).await?;
                println!("{}", status);
                Ok(())
            }
        }
    }
}

fn parse_id(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("Invalid {}: {}", what, raw))
}

/// Wire stores, backend strategy, and orchestrator from settings
async fn build_orchestrator(settings: &Settings) -> Result<Orchestrator> {
    let templates = Arc::new(JsonTemplateStore::open(settings.templates_path()).await?);
    let instances = Arc::new(JsonInstanceStore::open(settings.instances_path()).await?);

    seed_default_templates(templates.as_ref()).await?;

    let backend: Arc<dyn Backend> = if settings.cluster.enabled {
        let client = KubeHttpClient::new(
            settings.cluster.api_url.clone(),
            settings.cluster.namespace.clone(),
            settings.cluster.token.clone(),
            settings.request_timeout(),
        )
        .context("Failed to build cluster client")?;

        Arc::new(ClusterBackend::new(
            Arc::new(client),
            settings.cluster.namespace.clone(),
            settings.cluster.registry.clone(),
        ))
    } else {
        Arc::new(LocalBackend)
    };

    Ok(Orchestrator::new(
        templates,
        instances,
        backend,
        settings.cluster.clone(),
    ))
}

async fn list_templates(orchestrator: &Orchestrator) -> Result<()> {
    let templates = orchestrator.list_templates().await?;
    if templates.is_empty() {
        println!("No templates available");
        return Ok(());
    }

    for t in templates {
        println!("{}  {}  {}:{}", t.id, t.name, t.image, t.port);
        if !t.description.is_empty() {
            println!("    {}", t.description);
        }
    }
    Ok(())
}
