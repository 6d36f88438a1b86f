use anyhow::Result;

use carousel_core::AppConfig;

pub fn run(config: &AppConfig, init: bool) -> Result<()> {
    if init {
        let path = AppConfig::config_path();
        if path.exists() {
            println!("Config already exists at {}", path.display());
            return Ok(());
        }
        AppConfig::default().save()?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    println!("# {}", AppConfig::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}
