use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pod",
    about = "Solid pod storage: run LDP operations against a directory-seeded pod",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory whose contents seed the pod
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// WebID to act as; anonymous when omitted
    #[arg(long, global = true)]
    pub agent: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a resource
    Get(GetArgs),
    /// Replace a resource with the contents of a file
    Put(PutArgs),
    /// Apply a SPARQL Update to a resource
    Patch(PatchArgs),
    /// Delete a resource
    Delete(DeleteArgs),
    /// Show the access modes the agent and the public hold
    Permissions(PermissionsArgs),
}

#[derive(Args)]
pub struct GetArgs {
    pub path: String,
    /// Accept header, e.g. "application/n-triples"
    #[arg(long)]
    pub accept: Option<String>,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    pub file: PathBuf,
    /// Content-type; guessed from the file extension when omitted
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Args)]
pub struct PatchArgs {
    pub path: String,
    pub sparql_file: PathBuf,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub path: String,
}

#[derive(Args)]
pub struct PermissionsArgs {
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get() {
        let cli = Cli::try_parse_from(["pod", "get", "/notes/"]).unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.path, "/notes/");
            assert!(args.accept.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_get_with_accept() {
        let cli = Cli::try_parse_from(["pod", "get", "doc", "--accept", "application/n-triples"])
            .unwrap();
        if let Command::Get(args) = cli.command {
            assert_eq!(args.accept.as_deref(), Some("application/n-triples"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_put() {
        let cli = Cli::try_parse_from(["pod", "put", "doc", "doc.ttl", "--content-type", "text/turtle"])
            .unwrap();
        if let Command::Put(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("doc.ttl"));
            assert_eq!(args.content_type.as_deref(), Some("text/turtle"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_patch() {
        let cli = Cli::try_parse_from(["pod", "patch", "doc", "update.rq"]).unwrap();
        if let Command::Patch(args) = cli.command {
            assert_eq!(args.sparql_file, PathBuf::from("update.rq"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_globals() {
        let cli = Cli::try_parse_from([
            "pod",
            "--root",
            "/srv/pod",
            "--agent",
            "https://alice.example/#me",
            "delete",
            "doc",
            "--format",
            "json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/srv/pod")));
        assert_eq!(cli.agent.as_deref(), Some("https://alice.example/#me"));
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Delete(_)));
    }

    #[test]
    fn parse_permissions() {
        let cli = Cli::try_parse_from(["pod", "--config", "pod.toml", "permissions", "/"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("pod.toml")));
        assert!(matches!(cli.command, Command::Permissions(_)));
    }
}
