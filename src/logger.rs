use simplelog::*;
use std::fs::File;
use std::path::Path;

pub fn init(debug: bool) -> anyhow::Result<()> {
    // Ensure data/logs directory exists
    let log_dir = Path::new("data/logs");
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let log_file = File::create(log_dir.join("tou_gate.log"))?;
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };

    WriteLogger::init(level, Config::default(), log_file)?;

    Ok(())
}
