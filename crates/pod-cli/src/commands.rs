use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use pod_auth::header::wac_allow;
use pod_auth::{Credentials, PermissionSet};
use pod_ldp::{Operation, PodConfig, PodPipeline, ResponseDescription};
use pod_types::{Representation, RepresentationData, RepresentationPreferences};
use serde_json::json;

use crate::cli::*;
use crate::seed::{content_type_for, seed_from_dir};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let pod = open_pod(cli.config.as_deref(), cli.root.as_deref()).await?;
    let credentials = match &cli.agent {
        Some(web_id) => Credentials::agent(web_id.clone()),
        None => Credentials::anonymous(),
    };

    let operation = match cli.command {
        Command::Get(args) => cmd_get(&pod, args)?,
        Command::Put(args) => cmd_put(&pod, args)?,
        Command::Patch(args) => cmd_patch(&pod, args)?,
        Command::Delete(args) => Operation::delete(pod.resolve(&args.path)),
        Command::Permissions(args) => {
            return cmd_permissions(&pod, &credentials, &args.path, &cli.format).await;
        }
    };

    let response = pod.handler().handle(&credentials, operation).await;
    print_response(&response, &cli.format)?;
    if !response.is_success() {
        anyhow::bail!("request failed with status {}", response.status);
    }
    Ok(())
}

async fn open_pod(config: Option<&Path>, root: Option<&Path>) -> anyhow::Result<PodPipeline> {
    let config = match config {
        Some(path) => PodConfig::load(path)?,
        None => PodConfig::default(),
    };
    let pod = PodPipeline::in_memory(config)?;
    if let Some(dir) = root {
        let loaded = seed_from_dir(&pod, dir).await?;
        tracing::info!(dir = %dir.display(), resources = loaded, "pod seeded");
    }
    Ok(pod)
}

fn cmd_get(pod: &PodPipeline, args: GetArgs) -> anyhow::Result<Operation> {
    let mut operation = Operation::get(pod.resolve(&args.path));
    if let Some(accept) = args.accept {
        let preferences = RepresentationPreferences::parse_accept(&accept)
            .with_context(|| format!("invalid --accept value {accept:?}"))?;
        operation = operation.with_preferences(preferences);
    }
    Ok(operation)
}

fn cmd_put(pod: &PodPipeline, args: PutArgs) -> anyhow::Result<Operation> {
    let data = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let content_type = args
        .content_type
        .unwrap_or_else(|| content_type_for(&args.file).to_owned());
    Ok(Operation::put(
        pod.resolve(&args.path),
        Representation::binary(&content_type, data),
    ))
}

fn cmd_patch(pod: &PodPipeline, args: PatchArgs) -> anyhow::Result<Operation> {
    let update = std::fs::read_to_string(&args.sparql_file)
        .with_context(|| format!("reading {}", args.sparql_file.display()))?;
    Ok(Operation::patch(pod.resolve(&args.path), update))
}

async fn cmd_permissions(
    pod: &PodPipeline,
    credentials: &Credentials,
    path: &str,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let id = pod.resolve(path);
    let authorizer = pod.authorizer();
    let user = authorizer.resolve(credentials, &id).await?;
    let public = authorizer.resolve(&Credentials::anonymous(), &id).await?;

    match format {
        OutputFormat::Json => {
            let value = json!({
                "resource": id,
                "agent": credentials.web_id,
                "user": user,
                "public": public,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let agent = credentials.web_id.as_deref().unwrap_or("anonymous");
            println!("{}", id.to_string().bold());
            println!("  {:<8} {}", "agent:", agent.cyan());
            println!("  {:<8} {}", "user:", modes(&user));
            println!("  {:<8} {}", "public:", modes(&public));
            println!("  {}", wac_allow(&user, &public).dimmed());
        }
    }
    Ok(())
}

fn modes(set: &PermissionSet) -> String {
    if set.is_empty() {
        "(none)".dimmed().to_string()
    } else {
        set.to_string().green().to_string()
    }
}

fn print_response(response: &ResponseDescription, format: &OutputFormat) -> anyhow::Result<()> {
    let body = response.body.as_ref().map(body_text);
    match format {
        OutputFormat::Json => {
            let value = json!({
                "status": response.status,
                "headers": response.headers,
                "body": body,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let status = response.status.to_string();
            if response.is_success() {
                println!("{} {}", "✓".green().bold(), status.green());
            } else {
                println!("{} {}", "✗".red().bold(), status.red());
            }
            for (name, value) in &response.headers {
                println!("  {}: {}", name.dimmed(), value);
            }
            if let Some(body) = body {
                println!();
                print!("{body}");
                if !body.ends_with('\n') {
                    println!();
                }
            }
        }
    }
    Ok(())
}

fn body_text(representation: &Representation) -> String {
    match &representation.data {
        RepresentationData::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_owned(),
            Err(_) => format!("<{} bytes of {}>", bytes.len(), representation.content_type()),
        },
        RepresentationData::Quads(triples) => format!("<{} quads>", triples.len()),
    }
}
