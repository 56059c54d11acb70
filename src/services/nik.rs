// src/services/nik.rs

use crate::{
    errors::{AppError, AppResult},
    models::DepartmentNikConfig,
};
use chrono::Utc;
use regex::Regex;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

/// Stored sentinel meaning "concatenate prefix and padded sequence".
pub const PREFIX_SENTINEL: &str = "PREFIX + SEQUENCE";

/// Departments whose historical NIKs were issued under an older prefix.
/// Validation accepts any prefix listed here in addition to the configured
/// one. This is a compatibility carve-out keyed by department name, not a
/// general rule.
const HISTORICAL_PREFIXES: &[(&str, &[&str])] = &[("Operational", &["OPS", "OPS19"])];

/// A `format_pattern` column resolved into its variant once, instead of
/// being re-parsed on every issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NikFormat {
    /// Pattern contains both `{prefix}` and `{sequence}` placeholders.
    Template(String),
    /// The sentinel, NULL, or anything unrecognized.
    PrefixConcat,
}

impl NikFormat {
    pub fn parse(pattern: Option<&str>) -> Self {
        match pattern {
            Some(p) if p.contains("{prefix}") && p.contains("{sequence}") => {
                NikFormat::Template(p.to_string())
            }
            Some(p) if p == PREFIX_SENTINEL => NikFormat::PrefixConcat,
            // NULL or unrecognized: same default concatenation
            _ => NikFormat::PrefixConcat,
        }
    }

    pub fn render(&self, prefix: &str, padded_sequence: &str) -> String {
        match self {
            NikFormat::Template(template) => template
                .replace("{prefix}", prefix)
                .replace("{sequence}", padded_sequence),
            NikFormat::PrefixConcat => format!("{}{}", prefix, padded_sequence),
        }
    }
}

/// Zero-pad `sequence` to `width` digits. Values wider than `width` are
/// never truncated.
pub fn pad_sequence(sequence: i64, width: i32) -> String {
    format!("{:0width$}", sequence, width = width.max(0) as usize)
}

/// Format the NIK the config would issue at its current sequence.
pub fn format_nik(config: &DepartmentNikConfig) -> String {
    let padded = pad_sequence(config.current_sequence, config.sequence_length);
    NikFormat::parse(config.format_pattern.as_deref()).render(&config.prefix, &padded)
}

/// Synthesized identifier used when no NIK configuration is resolvable or
/// a generated NIK collides: "EMP" + last 6 digits of the current timestamp.
pub fn fallback_nik() -> String {
    let ts = Utc::now().timestamp_millis();
    format!("EMP{:06}", ts.rem_euclid(1_000_000))
}

/// Check a candidate NIK against the format a department would issue.
/// The configured prefix is replaced by the historical prefix set where
/// one exists for the department name.
pub fn validate_format(candidate: &str, department_name: &str, config: &DepartmentNikConfig) -> bool {
    let prefixes: Vec<&str> = HISTORICAL_PREFIXES
        .iter()
        .find(|(name, _)| *name == department_name)
        .map(|(_, alts)| alts.to_vec())
        .unwrap_or_else(|| vec![config.prefix.as_str()]);

    let format = NikFormat::parse(config.format_pattern.as_deref());
    let digits = format!(r"\d{{{}}}", config.sequence_length.max(0));

    prefixes.iter().any(|prefix| {
        let pattern = match &format {
            NikFormat::Template(template) => regex::escape(template)
                .replace(r"\{prefix\}", &regex::escape(prefix))
                .replace(r"\{sequence\}", &digits),
            NikFormat::PrefixConcat => format!("{}{}", regex::escape(prefix), digits),
        };
        Regex::new(&format!("^{}$", pattern))
            .map(|re| re.is_match(candidate))
            .unwrap_or(false)
    })
}

async fn lock_active_config(
    tx: &mut Transaction<'_, Postgres>,
    department_id: Uuid,
) -> AppResult<Option<DepartmentNikConfig>> {
    let config = sqlx::query_as::<_, DepartmentNikConfig>(
        "SELECT * FROM department_nik_configs
         WHERE department_id = $1 AND is_active = TRUE
         FOR UPDATE",
    )
    .bind(department_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(config)
}

async fn lock_active_config_by_name(
    tx: &mut Transaction<'_, Postgres>,
    department_name: &str,
) -> AppResult<Option<DepartmentNikConfig>> {
    let config = sqlx::query_as::<_, DepartmentNikConfig>(
        "SELECT c.* FROM department_nik_configs c
         JOIN departments d ON d.id = c.department_id
         WHERE d.name = $1 AND c.is_active = TRUE
         FOR UPDATE",
    )
    .bind(department_name)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(config)
}

/// Issue the next NIK for a department and advance the counter.
///
/// The config row is locked for the duration of the transaction, so two
/// concurrent issuances against the same department serialize and can
/// never hand out the same sequence number. The counter only moves
/// forward; a failed employee insert after commit does not return the
/// number to the pool.
pub async fn generate_next_nik(
    db: &PgPool,
    department_id: Uuid,
    default_departments: &[String],
) -> AppResult<(String, DepartmentNikConfig)> {
    let mut tx = db.begin().await?;

    let mut config = lock_active_config(&mut tx, department_id).await?;

    if config.is_none() {
        for name in default_departments {
            config = lock_active_config_by_name(&mut tx, name).await?;
            if let Some(ref c) = config {
                info!(
                    department_id = %department_id,
                    fallback_department = %name,
                    config_id = %c.id,
                    "no active NIK config for department, using default"
                );
                break;
            }
        }
    }

    let config = config.ok_or_else(|| {
        AppError::NotConfigured(format!(
            "no active NIK configuration for department {} or any default department",
            department_id
        ))
    })?;

    let nik = format_nik(&config);

    sqlx::query(
        "UPDATE department_nik_configs
         SET current_sequence = current_sequence + 1, updated_at = NOW()
         WHERE id = $1",
    )
    .bind(config.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let updated = DepartmentNikConfig {
        current_sequence: config.current_sequence + 1,
        ..config
    };

    Ok((nik, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn config(prefix: &str, sequence: i64, length: i32, pattern: Option<&str>) -> DepartmentNikConfig {
        DepartmentNikConfig {
            id: Uuid::new_v4(),
            department_id: Uuid::new_v4(),
            prefix: prefix.to_string(),
            current_sequence: sequence,
            sequence_length: length,
            format_pattern: pattern.map(str::to_string),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn pads_sequence_to_width() {
        assert_eq!(pad_sequence(7, 3), "007");
        assert_eq!(pad_sequence(42, 5), "00042");
        // widths narrower than the number never truncate
        assert_eq!(pad_sequence(12345, 3), "12345");
    }

    #[test]
    fn default_concatenation() {
        assert_eq!(format_nik(&config("OPS", 7, 3, None)), "OPS007");
    }

    #[test]
    fn sentinel_concatenates() {
        assert_eq!(
            format_nik(&config("OPS", 7, 3, Some(PREFIX_SENTINEL))),
            "OPS007"
        );
    }

    #[test]
    fn template_substitution_is_exact() {
        assert_eq!(
            format_nik(&config("HR", 12, 4, Some("{prefix}-{sequence}"))),
            "HR-0012"
        );
        // placeholder order in the template does not matter
        assert_eq!(
            format_nik(&config("HR", 12, 4, Some("{sequence}/{prefix}"))),
            "0012/HR"
        );
    }

    #[test]
    fn substitution_order_independent() {
        let template = "{prefix}-{sequence}";
        let a = template.replace("{prefix}", "OPS").replace("{sequence}", "007");
        let b = template.replace("{sequence}", "007").replace("{prefix}", "OPS");
        assert_eq!(a, b);
    }

    #[test]
    fn pattern_missing_a_placeholder_falls_back_to_concat() {
        assert_eq!(
            format_nik(&config("OPS", 7, 3, Some("{prefix} only"))),
            "OPS007"
        );
    }

    #[test]
    fn validates_plain_prefix_format() {
        let cfg = config("HR", 1, 3, None);
        assert!(validate_format("HR042", "Human Resources", &cfg));
        assert!(!validate_format("HR42", "Human Resources", &cfg));
        assert!(!validate_format("XX042", "Human Resources", &cfg));
    }

    #[test]
    fn operational_accepts_both_historical_prefixes() {
        let cfg = config("OPS19", 1, 3, None);
        assert!(validate_format("OPS003", "Operational", &cfg));
        assert!(validate_format("OPS19003", "Operational", &cfg));
        assert!(!validate_format("OPS3", "Operational", &cfg));
        assert!(!validate_format("ABC003", "Operational", &cfg));
    }

    #[test]
    fn historical_prefixes_do_not_leak_to_other_departments() {
        let cfg = config("GEN", 1, 3, None);
        assert!(!validate_format("OPS003", "General", &cfg));
        assert!(validate_format("GEN003", "General", &cfg));
    }

    #[test]
    fn validates_template_format() {
        let cfg = config("HR", 1, 4, Some("{prefix}-{sequence}"));
        assert!(validate_format("HR-0012", "Human Resources", &cfg));
        assert!(!validate_format("HR0012", "Human Resources", &cfg));
    }

    #[test]
    fn fallback_nik_shape() {
        let nik = fallback_nik();
        assert!(nik.starts_with("EMP"));
        assert_eq!(nik.len(), 9);
        assert!(nik[3..].chars().all(|c| c.is_ascii_digit()));
    }
}
