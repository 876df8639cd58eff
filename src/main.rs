//! tg - travel itinerary planner CLI

use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use tripgraph::cli::{Cli, Command, OutputFormat};
use tripgraph::config::Config;
use tripgraph::connectors::{GooglePlacesConnector, GoogleWeatherConnector};
use tripgraph::domain::{TravelItinerary, TravelRequest};
use tripgraph::llm::OllamaClient;
use tripgraph::planner::Planner;

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "tripgraph: config loaded");

    match cli.command {
        Command::Plan {
            destination,
            start,
            end,
            budget,
            interests,
            travelers,
            format,
        } => {
            let mut request = TravelRequest::new(destination, start, end);
            request.budget = budget;
            request.interests = interests;
            request.travelers = travelers;

            cmd_plan(&config, request, format).await
        }
        Command::Config => {
            println!("{}", serde_yaml::to_string(&config)?);
            Ok(())
        }
    }
}

async fn cmd_plan(config: &Config, request: TravelRequest, format: OutputFormat) -> Result<()> {
    let places =
        Arc::new(GooglePlacesConnector::from_config(&config.connectors).context("Failed to create places connector")?);
    let weather = Arc::new(
        GoogleWeatherConnector::from_config(&config.connectors).context("Failed to create weather connector")?,
    );
    let llm = Arc::new(OllamaClient::from_config(&config.llm).context("Failed to create LLM client")?);

    let planner = Planner::new(places, weather, llm, config).context("Failed to wire planning graph")?;
    let itinerary = planner.run(request).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&itinerary)?),
        OutputFormat::Text => print_itinerary(&itinerary),
    }
    Ok(())
}

fn print_itinerary(itinerary: &TravelItinerary) {
    println!(
        "{} | {} to {} ({} days)",
        itinerary.destination, itinerary.start, itinerary.end, itinerary.duration
    );
    if let Some(cost) = itinerary.total_estimated_cost {
        println!("Estimated cost: {cost:.0}");
    }
    println!();

    for plan in &itinerary.day_plans {
        match &plan.forecast {
            Some(forecast) => println!(
                "{} ({}, {:.0}-{:.0}C, {}% rain)",
                plan.date, forecast.condition, forecast.temp_low, forecast.temp_high, forecast.precipitation_chance
            ),
            None => println!("{}", plan.date),
        }
        for activity in &plan.activities {
            let cost = activity.cost.map(|c| format!(" ({c:.0})")).unwrap_or_default();
            println!(
                "  {} - {}  {} [{}]{}",
                activity.start.format("%H:%M"),
                activity.end().format("%H:%M"),
                activity.name,
                activity.category,
                cost
            );
        }
        println!();
    }

    if !itinerary.recommendations.is_empty() {
        println!("Recommendations:");
        for recommendation in &itinerary.recommendations {
            println!("  - {recommendation}");
        }
    }
}
