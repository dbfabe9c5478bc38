use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;

use jobserve::api::types::{IdList, SalaryBands};
use jobserve::api::JobServeClient;
use jobserve::config::Config;
use jobserve::logging;
use jobserve::services::JobServe;

#[derive(Parser, Debug)]
#[command(name = "jobserve")]
#[command(about = "Query the JobServe jobs API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/jobserve/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Print results as JSON
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show the remote service version
  Version,
  /// List countries, or look up the given IDs
  Countries { ids: Vec<String> },
  /// List currencies, or look up the given IDs
  Currencies { ids: Vec<String> },
  /// List industries, or look up the given IDs
  Industries { ids: Vec<String> },
  /// List job types, or look up the given IDs
  JobTypes { ids: Vec<String> },
  /// List salary frequencies, or look up the given IDs
  Frequencies { ids: Vec<String> },
  /// Show salary bands, optionally narrowed
  Salaries {
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    frequency: Option<String>,
  },
  /// List the search value lists, or show one member's list
  ValueLists { member: Option<String> },
  /// Search for jobs, starting from the default search
  Search {
    /// Skills or keywords
    #[arg(short, long)]
    skills: Option<String>,
    #[arg(long)]
    industry: Vec<String>,
    #[arg(long)]
    job_type: Vec<String>,
    #[arg(long)]
    max_age: Option<u32>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    page_size: Option<u32>,
    /// Only return matching job IDs
    #[arg(long)]
    ids_only: bool,
  },
  /// Fetch one or more jobs by ID
  Job {
    #[arg(required = true)]
    ids: Vec<String>,
  },
  /// Find the closest known location to a point
  Locate {
    #[arg(allow_hyphen_values = true)]
    latitude: f64,
    #[arg(allow_hyphen_values = true)]
    longitude: f64,
    /// Search radius in metres
    #[arg(long)]
    max_distance: Option<f64>,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.logging)?;

  let client = JobServeClient::new(&config)?;
  let jobserve = JobServe::new(Arc::new(client));

  run(&jobserve, args.command, args.json).await
}

async fn run(jobserve: &JobServe, command: Command, json: bool) -> Result<()> {
  match command {
    Command::Version => {
      let version = jobserve.version().await?;
      if json {
        return print_json(&version);
      }
      println!("{}", version.code_version);
      if let Some(built) = version.code_timestamp {
        println!("built {}", built);
      }
    }
    Command::Countries { ids } => {
      let items = jobserve.countries.get_countries(selection(&ids)).await?;
      print_items(json, &ids, &items, |c| format!("{}\t{}", c.id, c.text))?;
    }
    Command::Currencies { ids } => {
      let items = jobserve.currencies.get_currencies(selection(&ids)).await?;
      print_items(json, &ids, &items, |c| {
        format!("{}\t{}\t{}", c.id, c.symbol.as_deref().unwrap_or(""), c.text)
      })?;
    }
    Command::Industries { ids } => {
      let items = jobserve.industries.get_industries(selection(&ids)).await?;
      print_items(json, &ids, &items, |i| format!("{}\t{}", i.id, i.text))?;
    }
    Command::JobTypes { ids } => {
      let items = jobserve.job_types.get_job_types(selection(&ids)).await?;
      print_items(json, &ids, &items, |t| format!("{}\t{}", t.id, t.text))?;
    }
    Command::Frequencies { ids } => {
      let items = jobserve
        .salaries
        .get_salary_frequencies(selection(&ids))
        .await?;
      print_items(json, &ids, &items, |f| format!("{}\t{}", f.id, f.text))?;
    }
    Command::Salaries {
      country,
      currency,
      frequency,
    } => {
      let bands = jobserve
        .salaries
        .get_salary_bands(country.as_deref(), currency.as_deref(), frequency.as_deref())
        .await?;
      if json {
        return print_json(&bands);
      }
      for band in bands.iter().flatten() {
        print_bands(jobserve, band).await?;
      }
    }
    Command::ValueLists { member } => match member {
      None => {
        let index = jobserve.value_lists.get_index().await?;
        if json {
          return print_json(&index);
        }
        for entry in &index {
          println!("{}\t{} values", entry.key, entry.value.items.len());
        }
      }
      Some(member) => {
        let list = jobserve
          .value_lists
          .get_list(&member)
          .await?
          .ok_or_else(|| eyre!("No value list for {}", member))?;
        if json {
          return print_json(&list);
        }
        let default = list.default_value.as_ref().and_then(|d| d.value.clone());
        for item in &list.items {
          let marker = if item.value.is_some() && item.value == default {
            "*"
          } else {
            " "
          };
          println!(
            "{} {}\t{}",
            marker,
            item.value.as_deref().unwrap_or(""),
            item.description.as_deref().unwrap_or("")
          );
        }
      }
    },
    Command::Search {
      skills,
      industry,
      job_type,
      max_age,
      page,
      page_size,
      ids_only,
    } => {
      let mut search = jobserve.jobs.create_default_search().await?;
      search.job_ids_only = ids_only;
      if skills.is_some() {
        search.skills = skills;
      }
      if !industry.is_empty() {
        search.industries = Some(industry.into_iter().collect::<IdList>());
      }
      if !job_type.is_empty() {
        search.job_types = Some(job_type.into_iter().collect::<IdList>());
      }
      search.max_age = max_age.or(search.max_age);
      search.page = page.or(search.page);
      search.page_size = page_size.or(search.page_size);

      let results = jobserve.jobs.search(&search).await?;
      if json {
        return print_json(&results);
      }
      println!("{} jobs", results.job_count);
      if results.jobs.is_empty() {
        for id in &results.job_ids {
          println!("{}", id);
        }
      }
      for job in &results.jobs {
        println!("{}\t{}", job.id, job.position);
      }
    }
    Command::Job { ids } => {
      let jobs = if ids.len() == 1 {
        vec![jobserve.jobs.get_job(&ids[0]).await?]
      } else {
        jobserve.jobs.get_jobs(&ids).await?
      };
      if json {
        return print_json(&jobs);
      }
      for job in &jobs {
        println!("{}\t{}", job.id, job.position);
        if let Some(posted) = job.date_posted {
          println!("  posted {}", posted);
        }
        if let Some(link) = &job.permalink {
          println!("  {}", link);
        }
      }
    }
    Command::Locate {
      latitude,
      longitude,
      max_distance,
    } => {
      let found = jobserve
        .geo_locate(latitude, longitude, max_distance)
        .await?;
      if json {
        return print_json(&found);
      }
      println!(
        "{}\t{:.0}m away",
        found.location.text.as_deref().unwrap_or("(unnamed)"),
        found.distance
      );
    }
  }

  Ok(())
}

/// `None` (everything) when no IDs were given on the command line.
fn selection(ids: &[String]) -> Option<&[String]> {
  if ids.is_empty() {
    None
  } else {
    Some(ids)
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn print_items<T: Serialize>(
  json: bool,
  ids: &[String],
  items: &[Option<T>],
  line: impl Fn(&T) -> String,
) -> Result<()> {
  if json {
    return print_json(items);
  }
  for (position, item) in items.iter().enumerate() {
    match item {
      Some(item) => println!("{}", line(item)),
      None => match ids.get(position) {
        Some(id) => println!("{}\t(not found)", id),
        None => println!("(missing)"),
      },
    }
  }
  Ok(())
}

async fn print_bands(jobserve: &JobServe, bands: &SalaryBands) -> Result<()> {
  let meta = &bands.meta;
  println!(
    "{} {} {}",
    meta.country.as_deref().unwrap_or("-"),
    meta.currency.as_deref().unwrap_or("-"),
    meta.frequency.as_deref().unwrap_or("-")
  );

  let frequency = jobserve.salaries.frequency_of(bands).await?;
  for range in &bands.ranges {
    let text = frequency
      .as_ref()
      .and_then(|f| f.format_range(range))
      .or_else(|| range.text.clone())
      .unwrap_or_default();
    println!("  {}", text);
  }
  Ok(())
}
