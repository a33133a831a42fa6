use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uvlambda::{
    app::AppDefinition,
    cli::{verify_target, Cli, Commands},
    config::Config,
    function::BuildContext,
    service::{BundleService, SynthService},
    verify::{self, Expectation},
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Plan { package, output } => {
            let config = Config::load()?;
            let ctx = BuildContext::from_config(&config);
            let plan = BundleService::plan(&package.props()?, &ctx, &output)?;

            // Print only the plan to stdout
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::Bundle { package, out } => {
            let config = Config::load()?;
            let ctx = BuildContext::from_config(&config);
            let out_dir = out.unwrap_or_else(|| config.build.out_dir.clone());

            let staged = BundleService::bundle(&package.props()?, &ctx, &out_dir)?;
            println!("{}", staged.path.display());
        }
        Commands::Synth { filename, out } => {
            let config = Config::load()?;
            let ctx = BuildContext::from_config(&config);
            let out_dir = out.unwrap_or_else(|| config.build.out_dir.clone());

            let app = AppDefinition::load(&filename)?;
            let manifest = SynthService::synth(&app, &ctx, &out_dir)?;
            println!("{}", out_dir.join("manifest.json").display());
            info!("{} stack(s) ready", manifest.stacks.len());
        }
        Commands::Verify {
            url,
            function,
            stack,
            via_url,
            sign,
            region,
            expect,
        } => {
            let expected = Expectation::parse(&expect);
            let target = verify_target(url, function, stack, via_url)
                .context("Exactly one of --url, --function or --stack must be set")?;

            let called = verify::run(&target, sign, region, &expected).await?;
            println!("{}", called);
            info!("Response matched: {}", expected.body);
        }
        Commands::Version => {
            println!("uvlambda {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

