use anyhow::Result;
use tokenator_config::Config;

pub fn handle(config: &Config) -> Result<()> {
    println!("Config file: {}", Config::config_path().display());
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
