//! `sahayak doctor`: Diagnose configuration and collaborator health.

use sahayak_agent::language_model;
use sahayak_config::AppConfig;
use sahayak_core::collaborator::QueryExecutor;
use sahayak_tools::{HttpProcedureIndex, NewsApiSource, PostgresExecutor};
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Sahayak Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let path = super::config_path(config_path);
    let config = if path.exists() {
        match AppConfig::load_with_env(&path) {
            Ok(config) => {
                println!("  ✅ Config file valid: {}", path.display());
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                return Ok(());
            }
        }
    } else {
        println!("  ⚠️  No config file, using defaults — run `sahayak onboard`");
        issues += 1;
        let mut config = AppConfig::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    };

    // Language model
    match language_model(&config) {
        Some(model) => match model.provider.health_check().await {
            Ok(true) => println!(
                "  ✅ Language model reachable ({} / {})",
                config.default_provider, model.model
            ),
            _ => {
                println!("  ❌ Language model unreachable ({})", config.default_provider);
                issues += 1;
            }
        },
        None => {
            println!("  ⚠️  No API key — only keyword routing and SQL templates will work");
            issues += 1;
        }
    }

    // Database
    match PostgresExecutor::connect_lazy(&config.database) {
        Ok(executor) => match executor.health_check().await {
            Ok(()) => println!("  ✅ Database reachable"),
            Err(e) => {
                println!("  ❌ Database unreachable: {e}");
                issues += 1;
            }
        },
        Err(_) => {
            println!("  ⚠️  No database URL — set DATABASE_URL or [database].url");
            issues += 1;
        }
    }

    let news = NewsApiSource::from_config(&config.news, config.timeouts.news());
    if news.is_configured() {
        println!("  ✅ News API key configured");
    } else {
        println!("  ⚠️  No news API key — set NEWS_API_KEY");
        issues += 1;
    }

    let procedures =
        HttpProcedureIndex::new(config.procedures.search_url.clone(), config.timeouts.procedures());
    if procedures.is_configured() {
        println!("  ✅ Procedure search configured");
    } else {
        println!("  ⚠️  No procedure search URL — set SOP_SEARCH_URL");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
