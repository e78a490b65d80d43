use crate::config::env::EnvConfig;
use crate::config::RunConfig;
use crate::core::months::DEFAULT_BASE_URL;
use crate::core::source::ColumnMapping;
use crate::core::ConfigProvider;
use crate::domain::model::{DateRange, Destination, Strategy};
use crate::utils::datetime::parse_iso_datetime;
use crate::utils::error::Result;
use crate::utils::validation::validate_required_field;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "trips-etl")]
#[command(about = "Load monthly taxi trip files into a local warehouse table")]
pub struct CliConfig {
    /// First month to load (ISO-8601, inclusive)
    #[arg(long, required_unless_present = "from_env")]
    pub start: Option<String>,

    /// End of the window (ISO-8601, exclusive)
    #[arg(long, required_unless_present = "from_env")]
    pub end: Option<String>,

    #[arg(long, value_delimiter = ',', default_value = "yellow")]
    pub taxi_types: Vec<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = "./warehouse")]
    pub output_path: String,

    #[arg(long, default_value = "staging")]
    pub dataset: String,

    #[arg(long, default_value = "trips")]
    pub table: String,

    #[arg(long, value_enum, default_value = "append")]
    pub strategy: Strategy,

    /// Read dates and taxi types from BRUIN_START_DATE, BRUIN_END_DATE and BRUIN_VARS
    #[arg(long)]
    pub from_env: bool,

    /// List the files that would be fetched and exit
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,
}

impl CliConfig {
    fn window(&self) -> Result<(DateRange, Vec<String>)> {
        if self.from_env {
            let env = EnvConfig::from_env()?;
            return Ok((env.date_range()?, env.taxi_types));
        }

        let start = validate_required_field("start", &self.start)?;
        let end = validate_required_field("end", &self.end)?;
        let range = DateRange::new(
            parse_iso_datetime("start", start)?,
            parse_iso_datetime("end", end)?,
        );
        Ok((range, self.taxi_types.clone()))
    }
}

impl ConfigProvider for CliConfig {
    fn run_config(&self) -> Result<RunConfig> {
        let (range, taxi_types) = self.window()?;

        Ok(RunConfig {
            range,
            taxi_types,
            base_url: self.base_url.clone(),
            columns: ColumnMapping::default(),
            output_path: self.output_path.clone(),
            destination: Destination {
                dataset: self.dataset.clone(),
                table: self.table.clone(),
            },
            strategy: self.strategy,
        })
    }
}
