use std::env;

/// Universe filter applied before convergence scoring.
#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    /// Minimum share price for candidates.
    pub min_price: f64,
    /// Maximum share price for candidates.
    pub max_price: f64,
    /// Minimum daily volume for candidates.
    pub min_volume: f64,
    /// Strict selection: minimum convergence score.
    pub strict_score: u32,
    /// Strict selection: minimum factor groups passed.
    pub strict_factors: u32,
    /// Fallback selection: minimum convergence score.
    pub fallback_score: u32,
    /// Number of picks persisted per day.
    pub top_n: usize,
    /// Days after the pick date before outcomes are verified.
    pub tracking_days: u64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            min_price: 2.0,
            max_price: 50.0,
            min_volume: 500_000.0,
            strict_score: 80,
            strict_factors: 7,
            fallback_score: 70,
            top_n: 3,
            tracking_days: 5,
        }
    }
}

/// Gain thresholds for pick outcome classification.
#[derive(Debug, Clone)]
pub struct TrackingConfig {
    /// Max-gain percentage at or above which a pick is a SUCCESS.
    pub success_pct: f64,
    /// Max-gain percentage at or above which a pick is a PARTIAL.
    pub partial_pct: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            success_pct: 15.0,
            partial_pct: 5.0,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// SQLite database path.
    pub sqlite_path: String,
    /// Trailing history window (days) fed to the per-ticker scorers.
    pub history_days: u64,
    /// Convergence scoring configuration.
    pub convergence: ConvergenceConfig,
    /// Outcome tracking configuration.
    pub tracking: TrackingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3001);

        Self {
            host,
            port,
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "kestrel.db".to_string()),
            history_days: env::var("HISTORY_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            convergence: ConvergenceConfig {
                min_price: env::var("CONVERGENCE_MIN_PRICE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(2.0),
                max_price: env::var("CONVERGENCE_MAX_PRICE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(50.0),
                min_volume: env::var("CONVERGENCE_MIN_VOLUME")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(500_000.0),
                strict_score: env::var("CONVERGENCE_STRICT_SCORE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(80),
                strict_factors: env::var("CONVERGENCE_STRICT_FACTORS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7),
                fallback_score: env::var("CONVERGENCE_FALLBACK_SCORE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(70),
                top_n: env::var("CONVERGENCE_TOP_N")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
                tracking_days: env::var("TRACKING_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            },
            tracking: TrackingConfig {
                success_pct: env::var("TRACKING_SUCCESS_PCT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15.0),
                partial_pct: env::var("TRACKING_PARTIAL_PCT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5.0),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            sqlite_path: "kestrel.db".to_string(),
            history_days: 30,
            convergence: ConvergenceConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}
