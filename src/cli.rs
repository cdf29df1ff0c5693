//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};

/// Compose a childhood photo and a recent photo into one embrace portrait.
#[derive(Parser, Debug)]
#[command(name = "memoria", version, about)]
pub struct Cli {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a composite from two photos.
    Generate(GenerateArgs),
    /// Run the HTTP relay that holds the backend credential.
    Serve(ServeArgs),
    /// Show how to order a printed copy.
    PrintLink(PrintLinkArgs),
}

/// Arguments for `generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Childhood photo.
    #[arg(long)]
    pub old: String,

    /// Recent adult photo.
    #[arg(long)]
    pub recent: String,

    /// Caption rendered at the bottom of the image (optional).
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Output file path (defaults to `memoria_<name>.png`).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Generate through a relay at this base URL instead of calling the backend.
    #[arg(long)]
    pub relay: Option<String>,

    /// Model name or alias (overrides the config file).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Show print ordering instructions after saving.
    #[arg(long)]
    pub print: bool,
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind (overrides the config file).
    #[arg(short, long)]
    pub bind: Option<String>,
}

/// Arguments for `print-link`.
#[derive(Args, Debug)]
pub struct PrintLinkArgs {
    /// Image file to mention in the instructions.
    #[arg(long)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults() {
        let cli = Cli::parse_from(["memoria", "generate", "--old", "a", "--recent", "b"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate")
        };
        assert_eq!(args.old, "a");
        assert_eq!(args.recent, "b");
        assert_eq!(args.name, "");
        assert!(args.output.is_none());
        assert!(args.relay.is_none());
        assert!(!args.print);
        assert!(!cli.verbose);
    }

    #[test]
    fn generate_all_options() {
        let cli = Cli::parse_from([
            "memoria",
            "-v",
            "--config",
            "c.toml",
            "generate",
            "--old",
            "a.png",
            "--recent",
            "b.png",
            "-n",
            "Ana",
            "-o",
            "out.png",
            "--relay",
            "http://localhost:8787",
            "-m",
            "nano-banana-pro",
            "--print",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("c.toml"));
        let Command::Generate(args) = cli.command else {
            panic!("expected generate")
        };
        assert_eq!(args.name, "Ana");
        assert_eq!(args.output.as_deref(), Some("out.png"));
        assert_eq!(args.relay.as_deref(), Some("http://localhost:8787"));
        assert_eq!(args.model.as_deref(), Some("nano-banana-pro"));
        assert!(args.print);
    }

    #[test]
    fn serve_bind() {
        let cli = Cli::parse_from(["memoria", "serve", "--bind", "0.0.0.0:9000"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve")
        };
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
    }

    #[test]
    fn photos_are_required() {
        let parsed = Cli::try_parse_from(["memoria", "generate", "--old", "a.png"]);
        assert!(parsed.is_err());
    }
}
