//! Modulo per il monitoraggio di CPU e memoria del processo server
//!
//! Raccoglie a intervalli configurabili l'utilizzo del processo corrente
//! (il binario del server) tramite `sysinfo` e lo logga via tracing ed
//! eventualmente su file. Misura il processo, non la macchina.

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time;
use tracing::{error, info};

/// Configurazione del monitor di processo
pub struct ResourceMonitorConfig {
    /// Intervallo di campionamento/logging in secondi
    pub interval_secs: u64,
    /// Path del file di log (opzionale)
    pub log_file_path: Option<String>,
}

impl Default for ResourceMonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            log_file_path: Some("resource_stats.log".to_string()),
        }
    }
}

/// Statistiche del processo raccolte in un dato momento
#[derive(Debug, Clone)]
pub struct ResourceStats {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cpu_percentage: f32,
    pub memory_usage_mb: f64,
}

impl ResourceStats {
    fn format_for_log(&self) -> String {
        format!(
            "[{}] CPU: {:.2}% | Memory: {:.2} MB",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.cpu_percentage,
            self.memory_usage_mb
        )
    }
}

/// Task di monitoraggio che gira in background per tutta la vita del server
pub async fn start_resource_monitoring(config: ResourceMonitorConfig) {
    info!(
        "Starting process resource monitoring with interval: {} seconds",
        config.interval_secs
    );

    if let Some(ref path) = config.log_file_path {
        if let Err(e) = initialize_log_file(path, config.interval_secs) {
            error!("Failed to initialize resource log file: {}", e);
        }
    }

    let mut sys = System::new_all();
    let current_pid = Pid::from_u32(std::process::id());

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));
    // il primo tick scatta subito, lo saltiamo
    interval.tick().await;

    loop {
        interval.tick().await;

        sys.refresh_processes(ProcessesToUpdate::Some(&[current_pid]), true);
        let Some(process) = sys.process(current_pid) else {
            error!("Current process disappeared from the process table");
            continue;
        };

        let stats = ResourceStats {
            timestamp: chrono::Utc::now(),
            cpu_percentage: process.cpu_usage(),
            memory_usage_mb: process.memory() as f64 / (1024.0 * 1024.0),
        };

        info!(
            cpu = stats.cpu_percentage,
            memory_mb = stats.memory_usage_mb,
            "Process resource stats"
        );

        if let Some(ref path) = config.log_file_path {
            if let Err(e) = log_to_file(path, &stats) {
                error!("Failed to write resource stats to file: {}", e);
            }
        }
    }
}

/// Il file viene resettato ad ogni avvio del server (truncate)
fn initialize_log_file(path: &str, interval_secs: u64) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    writeln!(file, "=== Process Resource Log ===")?;
    writeln!(
        file,
        "Started: {} (UTC Time)",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file, "Logging Interval: {} seconds", interval_secs)?;
    writeln!(file, "============================\n")?;
    file.flush()?;

    Ok(())
}

fn log_to_file(path: &str, stats: &ResourceStats) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "{}", stats.format_for_log())?;
    file.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_format_is_stable() {
        let stats = ResourceStats {
            timestamp: chrono::DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
            cpu_percentage: 12.345,
            memory_usage_mb: 256.789,
        };
        let line = stats.format_for_log();
        assert!(line.contains("CPU: 12.35%"));
        assert!(line.contains("Memory: 256.79 MB"));
    }
}
