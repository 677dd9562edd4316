//! `sahayak onboard`: First-time setup.

use sahayak_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(config_path);

    println!("🏭 Sahayak — First-Time Setup");
    println!("=============================\n");

    if let Some(dir) = config_path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        std::fs::create_dir_all(dir)?;
        println!("✅ Created config directory: {}", dir.display());
    }

    if config_path.exists() {
        println!("⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set GROQ_API_KEY (or api_key in the config)");
    println!("   2. Set DATABASE_URL, NEWS_API_KEY and SOP_SEARCH_URL as available");
    println!("   3. Run: sahayak doctor");
    println!("   4. Run: sahayak ask \"What is the copper price today?\"\n");

    Ok(())
}
