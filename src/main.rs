use phytoval::batch::BatchRunner;
use phytoval::config::Config;
use phytoval::logger::init_logging;

const DEFAULT_CONFIG: &str = "./data/config/validation.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    log::info!("Starting validation with {}", config_path);

    let config = Config::from_file(&config_path)?;
    let runner = BatchRunner::new(config)?;
    let report = runner.process()?;

    if report.runs.is_empty() {
        return Err("No run could be validated".into());
    }

    let observed = &report.observed;
    println!("Observed phytoplankton: {:.2} g C m-2", observed.all_total);
    if let Some(breakup) = &observed.ice_breakup {
        println!("  Sea-ice breakup: {}", breakup.date);
    }
    for taxon in &observed.unclassified {
        println!(
            "  {:<12} {:>8.3} g C m-2 ({:.1} %)",
            taxon.name, taxon.total, taxon.percent
        );
    }

    for run in &report.runs {
        println!("{}", run.run);
        match &run.bloom_peak {
            Some(peak) => println!(
                "  Bloom peak: {} ({:.1} mg Chl m-2)",
                peak.date, peak.chl_vint
            ),
            None => println!("  Bloom peak: none"),
        }
        println!(
            "  0-100 m on May 15: {:.1} mmol N m-2, {:.1} mmol Si m-2",
            run.nutrients.nitrate, run.nutrients.silicic_acid
        );
        for group in &run.groups {
            println!(
                "  {:<8} model {:>8.2} g C m-2, obs {:>8.2} g C m-2, {} days, {} points",
                group.name,
                group.simulated_total,
                group.observed_total,
                group.days.len(),
                group.points
            );
            if let Some(taylor) = &group.taylor {
                println!(
                    "           normalized std {:.2}, correlation {:.2}",
                    taylor.normalized_std, taylor.correlation
                );
            }
        }
    }

    if let Some(path) = runner.write_reports(&report)? {
        println!("Reports written to {}", path.display());
    }

    Ok(())
}
