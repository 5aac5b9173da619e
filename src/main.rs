use anyhow::{Context, Result};
use iguana_dashboard::{server, DashboardConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_env().context("invalid dashboard configuration")?;
    if !config.data_path.exists() {
        log::warn!(
            "data file {} does not exist yet; data pages will answer 503",
            config.data_path.display()
        );
    }
    server::serve(&config)
}
