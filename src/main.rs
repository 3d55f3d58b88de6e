use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use flight_gateway::logging::{init_logging, LogTarget};
use flight_gateway::{
    filter_by_stops, sort_flights, CabinClass, FlightSearchGateway, GatewayConfig, Passengers,
    SearchRequest, SortKey, StopsFilter, TripType,
};
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flight-gateway")]
#[command(about = "Search flights through the Sky-Scrapper API")]
struct Cli {
    /// RapidAPI key for the Sky-Scrapper API
    #[arg(long, env = "RAPIDAPI_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,
    /// Write JSON logs to this directory instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for flights
    Search {
        /// Origin city name or airport code
        #[arg(short, long)]
        from: String,
        /// Destination city name or airport code
        #[arg(short, long)]
        to: String,
        /// Departure date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Return date for round trips (YYYY-MM-DD)
        #[arg(short, long)]
        return_date: Option<String>,
        /// Number of adults
        #[arg(long, default_value = "1")]
        adults: u32,
        /// Number of children
        #[arg(long, default_value = "0")]
        children: u32,
        /// Number of infants in seat
        #[arg(long, default_value = "0")]
        infants_in_seat: u32,
        /// Number of infants on lap
        #[arg(long, default_value = "0")]
        infants_on_lap: u32,
        /// Cabin class (economy, premium-economy, business, first)
        #[arg(long, default_value = "economy")]
        class: String,
        /// Trip type (one-way, round-trip, multi-city)
        #[arg(long, default_value = "one-way")]
        trip_type: String,
        /// Sort results by price, duration or departure
        #[arg(long, default_value = "price")]
        sort: String,
        /// Keep only all, nonstop, one or multiple stop flights
        #[arg(long, default_value = "all")]
        stops: String,
        /// Fail instead of returning placeholder results when the API is unreachable
        #[arg(long)]
        no_placeholder: bool,
        /// Output file for JSON results
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {} (expected YYYY-MM-DD)", value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let target = cli.log_dir.map_or(LogTarget::Stderr, LogTarget::File);
    if let Err(e) = init_logging(target, cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match cli.command {
        Commands::Search {
            from,
            to,
            date,
            return_date,
            adults,
            children,
            infants_in_seat,
            infants_on_lap,
            class,
            trip_type,
            sort,
            stops,
            no_placeholder,
            output,
        } => {
            let departure_date = parse_date(&date)?;
            let return_date = return_date.as_deref().map(parse_date).transpose()?;

            // A return date implies a round trip
            let trip_type = if return_date.is_some() {
                TripType::RoundTrip
            } else {
                trip_type.parse::<TripType>()?
            };

            let request = SearchRequest {
                origin: from,
                destination: to,
                departure_date: Some(departure_date),
                return_date,
                passengers: Passengers {
                    adults,
                    children,
                    infants_in_seat,
                    infants_on_lap,
                },
                cabin_class: class.parse::<CabinClass>()?,
                trip_type,
            };
            let sort_key = sort.parse::<SortKey>()?;
            let stops_filter = stops.parse::<StopsFilter>()?;

            let mut config = GatewayConfig::from_env()?;
            config.api_key = cli.api_key.or(config.api_key);
            if no_placeholder {
                config.placeholder_fallback = false;
            }

            let gateway = FlightSearchGateway::new(config)?;

            eprintln!("Searching for flights...");
            let mut response = gateway.search(&request).await;

            if let Some(data) = response.data.as_mut() {
                let mut flights = filter_by_stops(std::mem::take(&mut data.outbound), stops_filter);
                sort_flights(&mut flights, sort_key);
                data.total_results = flights.len();
                data.outbound = flights;
            }

            let json = serde_json::to_string_pretty(&response)?;
            if let Some(output_file) = output {
                fs::write(&output_file, &json)?;
                eprintln!("Results saved to {}", output_file);
            } else {
                println!("{}", json);
            }

            match (&response.data, &response.error) {
                (Some(data), _) => {
                    eprintln!("\nSummary:");
                    if data.placeholder {
                        eprintln!("Upstream unavailable, showing placeholder results");
                    }
                    eprintln!("Found {} flights", data.total_results);
                    if let Some(first) = data.outbound.first() {
                        eprintln!(
                            "First result: {} {} - {}",
                            first.airline, first.flight_number, first.price
                        );
                    }
                }
                (None, Some(error)) => bail!("Flight search failed: {}", error),
                (None, None) => bail!("Flight search failed"),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "flight-gateway",
            "search",
            "--from", "Mumbai",
            "--to", "DEL",
            "--date", "2030-01-15",
            "--sort", "duration",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli { command: Commands::Search { from, to, date, sort, stops, .. }, .. }) = cli {
            assert_eq!(from, "Mumbai");
            assert_eq!(to, "DEL");
            assert_eq!(date, "2030-01-15");
            assert_eq!(sort, "duration");
            assert_eq!(stops, "all");
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2030-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2030").is_err());
    }
}
