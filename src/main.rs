//! Memoria - embrace portraits from a childhood photo and a recent photo.

use std::net::SocketAddr;
use std::path::Path;
use std::process;
use std::sync::Arc;

use clap::Parser;

use memoria::cli::{Cli, Command, GenerateArgs, PrintLinkArgs, ServeArgs};
use memoria::config::{self, Config};
use memoria::context::{direct_generator, ServiceContext, Transport};
use memoria::error::MemoriaError;
use memoria::output::{resolve_output_path, save_image};
use memoria::ports::CompositeGenerator;
use memoria::print::PrintOrder;
use memoria::session::{PhotoSlot, Session};
use memoria::{logging, server};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), MemoriaError> {
    let config_path = config::discover_config_path(cli.config.as_deref());
    let mut config = Config::load(&config_path).map_err(MemoriaError::Config)?;

    match cli.command {
        Command::Generate(args) => generate(args, &mut config, cli.verbose).await,
        Command::Serve(args) => serve(args, &config).await,
        Command::PrintLink(args) => print_link(&args, &config),
    }
}

async fn generate(
    args: GenerateArgs,
    config: &mut Config,
    verbose: bool,
) -> Result<(), MemoriaError> {
    if let Some(model) = args.model {
        config.backend.model = model;
    }
    let print_order = if args.print {
        Some(PrintOrder::from_config(&config.print)?)
    } else {
        None
    };
    let transport = match args.relay.or_else(|| config.relay.url.clone()) {
        Some(url) => Transport::Relay(url),
        None => Transport::Direct,
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("MEMORIA_REPLAY").ok();
    let is_recording = std::env::var("MEMORIA_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(&transport, config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(&transport, config)?, None)
    };

    if verbose {
        eprintln!("Transport: {transport:?}");
    }

    let mut session = Session::new();
    let uploads = [(PhotoSlot::Old, &args.old), (PhotoSlot::Recent, &args.recent)];
    for (slot, path) in uploads {
        if let Err(e) = session.upload(slot, Path::new(path)).await {
            eprintln!("{}", session.error().unwrap_or_default());
            return Err(e);
        }
        if verbose {
            if let Some(photo) = session.photo(slot) {
                eprintln!("{slot:?} photo: {path} ({})", photo.mime_type);
            }
        }
    }
    session.set_name(args.name);

    eprintln!("Creating your memory... this may take a moment.");
    let outcome = session.submit(&*ctx.generator).await;

    // The recorder is shared with the generator until the context goes away.
    drop(ctx);
    if let Some(recording) = recording_session {
        match recording.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }
    if let Err(e) = outcome {
        eprintln!("{}", session.error().unwrap_or_default());
        return Err(e);
    }

    let output_path = resolve_output_path(args.output.as_deref(), session.name());
    if let Some(image) = session.image() {
        save_image(image, &output_path)?;
        eprintln!("Saved: {}", output_path.display());
    }

    if let Some(order) = print_order {
        session.choose_print()?;
        let image_path = output_path.display().to_string();
        println!("{}", order.instructions(Some(&image_path))?);
    }

    Ok(())
}

async fn serve(args: ServeArgs, config: &Config) -> Result<(), MemoriaError> {
    let addr = match args.bind {
        Some(bind) => parse_bind(&bind)?,
        None => config.relay.bind,
    };

    // Refuse to start without a credential rather than failing each request.
    let timeout = Some(config.relay.backend_timeout());
    let generator: Arc<dyn CompositeGenerator> = Arc::new(direct_generator(config, timeout)?);

    let state = server::AppState::new(Some(generator), config.relay.token_ttl())
        .with_body_limit(config.relay.max_body_bytes);
    server::run(addr, state).await
}

fn parse_bind(bind: &str) -> Result<SocketAddr, MemoriaError> {
    bind.parse().map_err(|e| {
        let message = format!("Invalid bind address '{bind}': {e}");
        MemoriaError::Config(message)
    })
}

fn print_link(args: &PrintLinkArgs, config: &Config) -> Result<(), MemoriaError> {
    let order = PrintOrder::from_config(&config.print)?;
    println!("{}", order.instructions(args.image.as_deref())?);
    Ok(())
}
