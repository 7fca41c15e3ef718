use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;

use secretlinks::config::{Cli, Command, ConfigAction, StaticConfig, init_config};
use secretlinks::errors::SecretLinksError;
use secretlinks::runtime::modes::run_server;
use secretlinks::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.selected() {
        Command::Config {
            action: ConfigAction::Generate { path },
        } => generate_config(path.as_deref()),
        Command::Serve => serve(&cli.config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<SecretLinksError>() {
                Some(err) => eprintln!("{}", err.format_colored()),
                None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: &str) -> Result<()> {
    // 配置错误直接退出，不回退到默认值（默认密钥是公开的）
    let config = init_config(config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path))?;

    // guard 需要存活到进程结束，保证日志刷盘
    let _guard = init_logging(&config.logging)?;

    run_server(&config).await
}

fn generate_config(path: Option<&str>) -> Result<()> {
    match path {
        None => {
            print!("{}", StaticConfig::generate_sample_config());
        }
        Some(path) => {
            StaticConfig::default()
                .save_to_file(path)
                .map_err(|e| anyhow!("failed to write {}: {}", path, e))?;
            println!("{} Sample configuration written to {}", "✓".green(), path);
        }
    }
    Ok(())
}
