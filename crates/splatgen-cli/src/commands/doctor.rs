use anyhow::Result;
use console::style;

use splatgen_client::{HealthStatus, SplatApiClient};
use splatgen_core::config::{ClientConfig, ConfigSource};
use splatgen_core::formats::export::ExportFormat;

use crate::cli::DoctorArgs;
use crate::output::OutputWriter;

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "file",
        ConfigSource::Environment => "env",
        ConfigSource::Cli => "cli",
    }
}

pub async fn execute(args: DoctorArgs, config: &ClientConfig, _output: &OutputWriter) -> Result<()> {
    println!("\n{}", style("splatgen Health Check").bold().underlined());
    println!("{}", style("─".repeat(60)).dim());

    let mut checks_passed = 0;
    let mut total_checks = 0;

    // Configuration
    total_checks += 1;
    println!("{} Config: loaded", style("✓").green());
    checks_passed += 1;
    if args.verbose {
        let mut entries: Vec<_> = config.to_inspection_map().into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, (value, source)) in entries {
            println!("  {} = {} ({})", key, value, source_label(source));
        }
    }

    // The configured export format must be one the exporters know.
    total_checks += 1;
    match ExportFormat::from_name(&config.export_format.value) {
        Ok(format) => {
            println!("{} Export format: {}", style("✓").green(), format);
            checks_passed += 1;
        }
        Err(e) => {
            println!("{} Export format: {}", style("✗").red(), e);
            println!("  → Use one of: ply, obj, glb");
        }
    }

    // Service reachability
    total_checks += 1;
    match SplatApiClient::new(config) {
        Ok(client) => match client.health().await {
            HealthStatus::Online(report) => {
                println!("{} Service: online at {}", style("✓").green(), config.base_url.value);
                checks_passed += 1;
                if args.verbose {
                    if let Some(report) = report {
                        if let Some(version) = &report.version {
                            println!("  Version: {}", version);
                        }
                        if let Some(active) = report.active_jobs {
                            println!("  Active jobs: {}", active);
                        }
                        if let Some(queued) = report.queued_jobs {
                            println!("  Queued jobs: {}", queued);
                        }
                    }
                }
            }
            HealthStatus::RateLimited => {
                println!(
                    "{} Service: online but rate limited, try again in 30-60s",
                    style("⚠").yellow()
                );
                checks_passed += 1;
            }
            HealthStatus::Offline => {
                println!(
                    "{} Service: unreachable at {}",
                    style("✗").red(),
                    config.base_url.value
                );
                println!("  → Check the URL or set SPLATGEN_BASE_URL");
            }
        },
        Err(e) => {
            println!("{} Service: client setup failed: {}", style("✗").red(), e);
        }
    }

    println!();
    if checks_passed == total_checks {
        println!(
            "{} All {} checks passed",
            style("✓").green().bold(),
            total_checks
        );
    } else {
        println!(
            "{} {}/{} checks passed",
            style("⚠").yellow().bold(),
            checks_passed,
            total_checks
        );
    }

    Ok(())
}
