use std::path::PathBuf;
use std::process::ExitCode;

use savecheck_core::config::SavecheckConfig;
use savecheck_runner::{RunError, Suite, logging};

/// 설정 파일 경로를 지정하는 환경 변수
const CONFIG_ENV: &str = "SAVECHECK_CONFIG";

/// 기본 설정 파일 경로
const DEFAULT_CONFIG: &str = "savecheck.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("savecheck: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init_tracing(&config.general) {
        eprintln!("savecheck: {e:#}");
        return ExitCode::from(2);
    }

    let report_path = config.run.report_path.clone();
    tracing::info!("savecheck-runner starting");

    let report = match Suite::from_config(config).run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, exit_code = e.exit_code(), "run aborted");
            return ExitCode::from(e.exit_code());
        }
    };

    report.log();
    if !report_path.is_empty() {
        if let Err(e) = report.write_json(&report_path).await {
            tracing::error!(error = %e, "failed to write report");
            return ExitCode::from(e.exit_code());
        }
    }

    ExitCode::from(report.exit_code())
}

/// 설정을 로드합니다.
///
/// `SAVECHECK_CONFIG`가 가리키는 파일, 없으면 `savecheck.toml`을 읽습니다.
/// 기본 경로에 파일이 없으면 기본값에 환경 변수 오버라이드만 적용합니다.
async fn load_config() -> Result<SavecheckConfig, RunError> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => Ok(SavecheckConfig::load(PathBuf::from(path)).await?),
        Err(_) if PathBuf::from(DEFAULT_CONFIG).exists() => {
            Ok(SavecheckConfig::load(DEFAULT_CONFIG).await?)
        }
        Err(_) => {
            let mut config = SavecheckConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}
