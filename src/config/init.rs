use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, validate_config, Config};
use crate::scoring::ScoreWeights;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Re-prompt until `check` accepts the input.
fn prompt_valid<T>(
    message: &str,
    default: &str,
    check: impl Fn(&str) -> Result<T, String>,
) -> Result<T> {
    loop {
        let input = prompt_with_default(message, default)?;
        match check(&input) {
            Ok(value) => return Ok(value),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    }
}

fn parse_weight(s: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err("must be a non-negative number".to_string()),
        Err(_) => Err(format!("'{}' is not a number", s)),
    }
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err("must be a whole number of at least 1".to_string()),
    }
}

fn parse_timeout(s: &str) -> Result<String, String> {
    match humantime::parse_duration(s) {
        Ok(d) if !d.is_zero() => Ok(s.to_string()),
        Ok(_) => Err("must be greater than zero".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_api_url(s: &str) -> Result<String, String> {
    let candidate = Config {
        api_url: s.to_string(),
        ..Config::default()
    };
    validate_config(&candidate)
        .map(|_| s.trim_end_matches('/').to_string())
        .map_err(|errors| errors.join("; "))
}

/// Serialize `config` as YAML and write it atomically, creating parent
/// directories as needed.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;
    Ok(())
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("Shred Score Configuration Wizard");
    println!("================================");
    println!();

    let defaults = Config::default();

    println!("Resort data comes from the Shred Score API server.");
    let api_url = prompt_valid("API URL", &defaults.api_url, parse_api_url)?;
    let request_timeout = prompt_valid(
        "Request timeout (e.g. '20s', '1m')",
        &defaults.request_timeout,
        parse_timeout,
    )?;
    let page_size = prompt_valid(
        "Resorts per page",
        &defaults.page_size.to_string(),
        parse_page_size,
    )?;

    println!();
    println!("The Shred Score adds three components: fresh snow (up to 4 points),");
    println!("base depth (up to 4) and open terrain (up to 2), then applies the");
    println!("avalanche and condition factors. Weights scale each component.");
    let scoring = if prompt_yes_no("Configure scoring weights? (n accepts defaults)", false)? {
        let base = ScoreWeights::default();
        ScoreWeights {
            freshness_weight: prompt_valid(
                "Fresh snow weight",
                &base.freshness_weight.to_string(),
                parse_weight,
            )?,
            base_snow_weight: prompt_valid(
                "Base depth weight",
                &base.base_snow_weight.to_string(),
                parse_weight,
            )?,
            terrain_weight: prompt_valid(
                "Open terrain weight",
                &base.terrain_weight.to_string(),
                parse_weight,
            )?,
        }
    } else {
        ScoreWeights::default()
    };

    let default_config_path = match default_path {
        Some(path) => path,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!("Config already exists at {}. Overwrite?", config_path.display()),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let config = Config {
        api_url,
        request_timeout,
        page_size,
        scoring,
    };
    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `shred-score` to see today's ranking.");

    Ok(())
}
