//! Support policy calculator
//!
//! Turns a generation's initial release month and a named support policy
//! into open-source and enterprise support end dates. Explicit end dates in
//! the generation manifest always win over computed ones.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::{last_day_of_month, Generation, ProjectGeneration};
use crate::version::Version;

/// Named support policy
///
/// Each policy maps to fixed `(oss, enterprise, extended)` month counts
/// measured from the initial release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupportPolicy {
    #[default]
    SpringBoot,
    Downstream,
    Upstream,
}

impl SupportPolicy {
    /// `(oss, enterprise, extended)` support lengths in months
    pub fn months(&self) -> (u32, u32, u32) {
        match self {
            SupportPolicy::SpringBoot => (13, 25, 37),
            SupportPolicy::Downstream => (12, 24, 36),
            SupportPolicy::Upstream => (18, 30, 54),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportPolicy::SpringBoot => "SPRING_BOOT",
            SupportPolicy::Downstream => "DOWNSTREAM",
            SupportPolicy::Upstream => "UPSTREAM",
        }
    }
}

impl FromStr for SupportPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SPRING_BOOT" => Ok(SupportPolicy::SpringBoot),
            "DOWNSTREAM" => Ok(SupportPolicy::Downstream),
            "UPSTREAM" => Ok(SupportPolicy::Upstream),
            _ => Err(format!("unknown support policy '{}'", s)),
        }
    }
}

impl fmt::Display for SupportPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn end_after(initial: NaiveDate, months: u32) -> NaiveDate {
    let shifted = initial
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX);
    last_day_of_month(shifted)
}

/// Open-source support end for a generation released on `initial`.
pub fn oss_policy_end(
    initial: NaiveDate,
    oss_override: Option<NaiveDate>,
    policy: SupportPolicy,
) -> NaiveDate {
    oss_override.unwrap_or_else(|| end_after(initial, policy.months().0))
}

/// Enterprise support end; the last minor of a major line gets the
/// extended period.
pub fn enterprise_policy_end(
    initial: NaiveDate,
    enterprise_override: Option<NaiveDate>,
    policy: SupportPolicy,
    is_last_minor: bool,
) -> NaiveDate {
    enterprise_override.unwrap_or_else(|| {
        let (_, enterprise, extended) = policy.months();
        end_after(initial, if is_last_minor { extended } else { enterprise })
    })
}

/// Resolved support window of one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSupport {
    pub oss_end: NaiveDate,
    pub enterprise_end: NaiveDate,
}

/// Support window for `generation`, using manifest dates where present.
pub fn generation_support(
    generation: &Generation,
    all: &ProjectGeneration,
    policy: SupportPolicy,
) -> GenerationSupport {
    let initial = generation.initial_release.first_day();
    GenerationSupport {
        oss_end: oss_policy_end(initial, generation.oss_support_end, policy),
        enterprise_end: enterprise_policy_end(
            initial,
            generation.enterprise_support_end,
            policy,
            is_last_minor(&generation.name, all),
        ),
    }
}

fn generation_components(name: &str) -> Option<(u32, u32)> {
    let version = Version::parse(name.strip_suffix(".x").unwrap_or(name));
    let parts = version.parts()?;
    Some((parts.major?, parts.minor?))
}

/// True when a later major line exists and no later minor of the same major
/// does. Release train generations have no major line and are never last
/// minors.
pub fn is_last_minor(name: &str, all: &ProjectGeneration) -> bool {
    let Some((major, minor)) = generation_components(name) else {
        return false;
    };
    let others: Vec<(u32, u32)> = all
        .generations
        .iter()
        .filter_map(|g| generation_components(&g.name))
        .collect();
    let newer_major = others.iter().any(|(m, _)| *m > major);
    let newer_minor = others.iter().any(|(m, n)| *m == major && *n > minor);
    newer_major && !newer_minor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::YearMonth;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generation(name: &str, initial: &str) -> Generation {
        Generation {
            name: name.to_string(),
            initial_release: initial.parse::<YearMonth>().unwrap(),
            support: Default::default(),
            oss_support_end: None,
            enterprise_support_end: None,
            linked_generations: BTreeMap::new(),
        }
    }

    #[test]
    fn test_spring_boot_oss_end() {
        assert_eq!(
            oss_policy_end(date(2022, 11, 24), None, SupportPolicy::SpringBoot),
            date(2023, 12, 31)
        );
    }

    #[test]
    fn test_overrides_win() {
        let fixed = date(2030, 1, 15);
        assert_eq!(
            oss_policy_end(date(2022, 11, 24), Some(fixed), SupportPolicy::Upstream),
            fixed
        );
        assert_eq!(
            enterprise_policy_end(date(2022, 11, 24), Some(fixed), SupportPolicy::Upstream, true),
            fixed
        );
    }

    #[test]
    fn test_enterprise_end_uses_extended_for_last_minor() {
        let initial = date(2022, 11, 1);
        assert_eq!(
            enterprise_policy_end(initial, None, SupportPolicy::SpringBoot, false),
            date(2024, 12, 31)
        );
        assert_eq!(
            enterprise_policy_end(initial, None, SupportPolicy::SpringBoot, true),
            date(2025, 12, 31)
        );
    }

    #[test]
    fn test_month_end_clamping() {
        // 31 January + 1 month clamps to February before taking the month end
        assert_eq!(end_after(date(2023, 1, 31), 1), date(2023, 2, 28));
    }

    #[test]
    fn test_is_last_minor() {
        let all = ProjectGeneration::new(vec![
            generation("2.6.x", "2021-11"),
            generation("2.7.x", "2022-05"),
            generation("3.0.x", "2022-11"),
            generation("3.1.x", "2023-05"),
        ]);
        assert!(is_last_minor("2.7.x", &all));
        assert!(!is_last_minor("2.6.x", &all));
        // no 4.x yet
        assert!(!is_last_minor("3.1.x", &all));
        assert!(!is_last_minor("Moore.x", &all));
    }

    #[test]
    fn test_generation_support_combines_manifest_and_policy() {
        let mut boot_27 = generation("2.7.x", "2022-05");
        boot_27.oss_support_end = Some(date(2023, 11, 18));
        let all = ProjectGeneration::new(vec![boot_27.clone(), generation("3.0.x", "2022-11")]);

        let support = generation_support(&boot_27, &all, SupportPolicy::SpringBoot);
        assert_eq!(support.oss_end, date(2023, 11, 18));
        assert_eq!(support.enterprise_end, date(2025, 6, 30));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("spring-boot".parse(), Ok(SupportPolicy::SpringBoot));
        assert_eq!("UPSTREAM".parse(), Ok(SupportPolicy::Upstream));
        assert!("LTS".parse::<SupportPolicy>().is_err());
        assert_eq!(SupportPolicy::Downstream.to_string(), "DOWNSTREAM");
    }
}
