//! Treatymap CLI: run membership selections from the command line
//!
//! Runs the pipeline in-process against the configured SPARQL endpoint.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use treatymap::catalog::{countries, CategoryLabel};
use treatymap::{
    AtlasConfig, CountryCode, MemberLimit, OrganizationRef, OrganizationTypeRef, SelectionReport,
    Session,
};

#[derive(Parser)]
#[command(name = "treatymap", version, about = "Treaty-membership explorer")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SPARQL endpoint URL (overrides the configuration)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Membership-size dataset (overrides the configuration)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Treaties, co-members and categories of one country
    ///
    /// CSV output is three tables separated by blank lines.
    Select {
        /// ISO 3166-1 alpha-3 code, e.g. NGA
        country: String,

        /// Keep organizations with fewer members than this ("all" for no bound)
        #[arg(long, default_value_t = MemberLimit::default())]
        max_members: MemberLimit,
    },
    /// Population, HDI and GDP of one country
    Stats {
        country: String,
    },
    /// Current members of one organization
    Members {
        /// Entity IRI or bare Q-id, e.g. Q7159
        organization: String,
    },
    /// Memberships of one country filtered by organization type
    ByType {
        country: String,

        /// Organization type Q-id, e.g. Q1127126 (military alliance)
        org_type: String,
    },
    /// Random distinct country codes from the census
    Sample {
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Category labels, the fallback included
    Categories,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Sample { count, seed } => run_sample(*count, *seed, &cli.format),
        Commands::Categories => run_categories(&cli.format),
        command => match open_session(&cli) {
            Ok(session) => run_remote(&session, command, &cli.format).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let mut config = AtlasConfig::load(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.url = endpoint.clone();
    }
    if let Some(dataset) = &cli.dataset {
        config.dataset_path = dataset.clone();
    }
    Ok(Session::from_config(&config)?)
}

async fn run_remote(session: &Session, command: &Commands, format: &OutputFormat) -> CliResult {
    match command {
        Commands::Select {
            country,
            max_members,
        } => run_select(session, country, *max_members, format).await,
        Commands::Stats { country } => run_stats(session, country, format).await,
        Commands::Members { organization } => run_members(session, organization, format).await,
        Commands::ByType { country, org_type } => {
            run_by_type(session, country, org_type, format).await
        }
        Commands::Sample { .. } | Commands::Categories => Ok(()),
    }
}

async fn run_select(
    session: &Session,
    country: &str,
    limit: MemberLimit,
    format: &OutputFormat,
) -> CliResult {
    let country = CountryCode::new(country)?;
    let selection = session.select(country, limit).await?;
    let report = &selection.report;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&selection.report)?);
        return Ok(());
    }

    let [treaties, co_members, categories] = report_tables(report);
    print_rows(format, treaties.header, &treaties.rows);
    println!();

    if let OutputFormat::Table = format {
        println!(
            "{} below {} members; {} co-member countries",
            report.country,
            report.limit,
            report.co_members.len()
        );
        let codes: Vec<&str> = report.co_members.iter().map(|c| c.as_str()).collect();
        if !codes.is_empty() {
            println!("{}", codes.join(" "));
        }
    } else {
        print_rows(format, co_members.header, &co_members.rows);
    }

    println!();
    print_rows(format, categories.header, &categories.rows);

    if !report.degraded.is_empty() {
        eprintln!("Warning: incomplete results ({})", report.degraded.join(", "));
    }

    Ok(())
}

/// One printable table of a selection report
struct ReportTable {
    header: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

/// Treaties, co-members and categories of `report`, in output order
fn report_tables(report: &SelectionReport) -> [ReportTable; 3] {
    [
        ReportTable {
            header: &["organization", "members"],
            rows: report
                .treaties
                .iter()
                .map(|t| vec![t.label.clone(), t.member_count.to_string()])
                .collect(),
        },
        ReportTable {
            header: &["co_member"],
            rows: report.co_members.iter().map(|c| vec![c.to_string()]).collect(),
        },
        ReportTable {
            header: &["category", "count"],
            rows: report
                .categories
                .sorted()
                .into_iter()
                .map(|(label, count)| vec![label.to_string(), count.to_string()])
                .collect(),
        },
    ]
}

async fn run_stats(session: &Session, country: &str, format: &OutputFormat) -> CliResult {
    let country = CountryCode::new(country)?;
    let Some(record) = session.country_stats(&country).await? else {
        return Err(format!("No statistics for {}", country).into());
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        _ => {
            let rows = vec![vec![
                record.code.to_string(),
                record.name.clone(),
                optional(record.population),
                optional(record.hdi),
                optional(record.ihdi),
                optional(record.gdp),
                optional(record.gdp_year),
            ]];
            print_rows(
                format,
                &["code", "name", "population", "hdi", "ihdi", "gdp", "gdp_year"],
                &rows,
            );
        }
    }

    Ok(())
}

async fn run_members(session: &Session, organization: &str, format: &OutputFormat) -> CliResult {
    let organization = parse_organization(organization)?;
    let members = session.treaty_members(&organization).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&members)?),
        _ => {
            let rows: Vec<Vec<String>> = members.iter().map(|c| vec![c.to_string()]).collect();
            print_rows(format, &["code"], &rows);
        }
    }

    Ok(())
}

async fn run_by_type(
    session: &Session,
    country: &str,
    org_type: &str,
    format: &OutputFormat,
) -> CliResult {
    let country = CountryCode::new(country)?;
    let org_type = OrganizationTypeRef::new(org_type);
    let found = session.memberships_of_type(&country, &org_type).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        _ => {
            let rows: Vec<Vec<String>> = found
                .iter()
                .map(|o| vec![o.label.clone(), o.organization.to_string()])
                .collect();
            print_rows(format, &["organization", "iri"], &rows);
        }
    }

    Ok(())
}

fn run_sample(count: usize, seed: Option<u64>, format: &OutputFormat) -> CliResult {
    let codes = match seed {
        Some(seed) => countries::random_sample(count, &mut StdRng::seed_from_u64(seed)),
        None => countries::random_sample(count, &mut rand::thread_rng()),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&codes)?),
        _ => {
            let rows: Vec<Vec<String>> = codes.iter().map(|c| vec![c.to_string()]).collect();
            print_rows(format, &["code"], &rows);
        }
    }

    Ok(())
}

fn run_categories(format: &OutputFormat) -> CliResult {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&CategoryLabel::ALL)?),
        _ => {
            let rows: Vec<Vec<String>> = CategoryLabel::ALL
                .iter()
                .map(|c| vec![c.to_string()])
                .collect();
            print_rows(format, &["category"], &rows);
        }
    }

    Ok(())
}

/// Accept a full entity IRI or a bare Q-id
fn parse_organization(input: &str) -> Result<OrganizationRef, Box<dyn std::error::Error>> {
    let input = input.trim();
    let iri = if input.contains(':') {
        input.to_string()
    } else {
        format!("http://www.wikidata.org/entity/{}", input)
    };
    Ok(OrganizationRef::new(iri)?)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn print_rows(format: &OutputFormat, header: &[&str], rows: &[Vec<String>]) {
    match format {
        OutputFormat::Csv => {
            for line in csv_lines(header, rows) {
                println!("{}", line);
            }
        }
        _ => {
            if rows.is_empty() {
                println!("(no results)");
                return;
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(header);

            for row in rows {
                table.add_row(row);
            }

            println!("{}", table);
            println!("{} row(s)", rows.len());
        }
    }
}

fn csv_lines(header: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let mut lines = vec![header.join(",")];
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| format_csv_value(v)).collect();
        lines.push(cells.join(","));
    }
    lines
}

fn format_csv_value(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
