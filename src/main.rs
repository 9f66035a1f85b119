use clap::Parser;
use scribelink::cli::{
    discover, generate, handle_completions, handle_config_init, health, load_config, models, Cli,
    Commands, ConfigCommands,
};
use scribelink::logging::init_logging;
use scribelink::Connector;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Discover(args) => {
            let config = load_config(&args.config);
            init_logging(&config.logging);
            let connector = Connector::new(config);
            match discover::handle_discover(&args, &connector).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Health(args) => {
            let config = load_config(&args.config);
            init_logging(&config.logging);
            let connector = Connector::new(config);
            match health::handle_health(&args, &connector).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Models(args) => {
            let config = load_config(&args.config);
            init_logging(&config.logging);
            let connector = Connector::new(config);
            match models::handle_models(&args, &connector).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Generate(args) => {
            let config = load_config(&args.config);
            init_logging(&config.logging);
            let connector = Connector::new(config);
            match generate::handle_generate(&args, &connector).await {
                Ok(output) => {
                    println!("{}", output);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
