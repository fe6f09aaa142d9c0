use crate::infra::build_availability_service;
use chrono::NaiveDate;
use clap::Args;
use oceanvillas::config::AppConfig;
use oceanvillas::error::AppError;
use oceanvillas::telemetry::{self, LogOutput};
use oceanvillas::workflows::availability::{
    DateRange, SearchError, SearchQuery, SearchResults, ValidationError, DEFAULT_GUESTS,
};

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Check-in date (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: NaiveDate,
    /// Checkout date (YYYY-MM-DD), exclusive
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: NaiveDate,
    /// Party size (defaults to 2)
    #[arg(long)]
    pub(crate) guests: Option<u32>,
    /// Print the HTTP response body instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, LogOutput::Stderr)?;

    let query = search_query(&args)?;
    let service = build_availability_service(&config.provider)?;
    let results = service.search(&query).await?;

    if args.json {
        println!("{}", render_json(&results)?);
    } else {
        render_results(&results);
    }
    Ok(())
}

fn render_json(results: &SearchResults) -> Result<String, AppError> {
    Ok(serde_json::to_string_pretty(results)?)
}

fn search_query(args: &SearchArgs) -> Result<SearchQuery, SearchError> {
    let date_range = DateRange::new(args.start_date, args.end_date)?;
    let guests = args.guests.unwrap_or(DEFAULT_GUESTS);
    if guests == 0 {
        return Err(ValidationError::InvalidGuests.into());
    }
    Ok(SearchQuery { date_range, guests })
}

fn render_results(results: &SearchResults) {
    println!("Ocean Villas availability");
    println!(
        "Stay: {} to {} ({} guests)",
        results.query.start_date, results.query.end_date, results.query.guests
    );
    println!(
        "Configured: {}  Found upstream: {}  Available: {}",
        results.total_configured, results.total_found_listings, results.available_count
    );

    if results.available_listings.is_empty() {
        println!("\nNo units are open for every night of this stay.");
    } else {
        println!("\nAvailable units");
        for listing in &results.available_listings {
            let price = listing
                .price_nightly
                .map(|price| format!("{price:.0}/night"))
                .unwrap_or_else(|| "price on request".to_string());
            println!("  - {} [{}] {}", listing.name, listing.id, price);
            println!("    {}", listing.booking_url);
        }
    }

    println!("\nVerdicts");
    for verdict in &results.verdicts {
        let reasons: Vec<&str> = verdict.reason_codes.iter().map(|code| code.label()).collect();
        let reasons = if reasons.is_empty() {
            "-".to_string()
        } else {
            reasons.join(", ")
        };
        println!(
            "  {:<12} {:<11} nights={} reasons={}",
            verdict.unit_id.as_str(),
            if verdict.available { "available" } else { "unavailable" },
            verdict.relevant_night_count,
            reasons
        );
    }
}
