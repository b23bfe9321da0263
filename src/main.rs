use clap::Parser;
use kasasagi::config::Config;
use kasasagi::proxy::KasasagiProxy;
use pingora_core::server::configuration::Opt;
use pingora_core::server::Server;
use std::path::PathBuf;

/// Kasasagi - edge image delivery proxy built with Cloudflare's Pingora
#[derive(Parser, Debug)]
#[command(name = "kasasagi")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Daemon mode
    #[arg(short = 'd', long)]
    daemon: bool,

    /// Test configuration and exit
    #[arg(long)]
    test: bool,

    /// Upgrade workers gracefully
    #[arg(long)]
    upgrade: bool,
}

fn main() {
    let args = Args::parse();

    let config = Config::from_file(&args.config).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = kasasagi::logging::init_subscriber(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %args.config.display(),
        server_address = %config.server.address,
        server_port = config.server.port,
        cloud_name = %config.origin.cloud_name,
        policy = ?config.transform.policy,
        referer_check = config.referer_policy_enabled(),
        cache_backend = ?config.cache.backend,
        "Configuration loaded successfully"
    );

    if args.test {
        println!("Configuration file {} is valid", args.config.display());
        return;
    }

    let opt = Opt {
        daemon: args.daemon,
        test: args.test,
        upgrade: args.upgrade,
        ..Default::default()
    };

    let mut server = Server::new(Some(opt)).unwrap_or_else(|e| {
        eprintln!("Failed to create Pingora server: {}", e);
        std::process::exit(1);
    });
    server.bootstrap();

    let listen_addr = config.server.listen_addr();
    let threads = config.server.threads;

    let proxy = KasasagiProxy::new(config).unwrap_or_else(|e| {
        eprintln!("Failed to initialize proxy: {:#}", e);
        std::process::exit(1);
    });

    let mut proxy_service = pingora_proxy::http_proxy_service(&server.configuration, proxy);
    proxy_service.threads = Some(threads);
    proxy_service.add_tcp(&listen_addr);

    tracing::info!(
        address = %listen_addr,
        threads = threads,
        "Starting Kasasagi image proxy"
    );

    server.add_service(proxy_service);
    server.run_forever();
}
