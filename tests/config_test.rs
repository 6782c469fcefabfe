//! Configuration loading and its effect on the engine.

use api_sign::canonical::{ApiSpec, Endpoint, Parameter, ParameterLocation, Protocol};
use api_sign::compat::{ChangeCategory, ChangelogConfig, ChangelogEngine, RiskLevel, RiskWeights};
use api_sign::spec::Compatibility;
use std::io::Write;

fn old_spec() -> ApiSpec {
    ApiSpec::new("billing", "1.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/invoices"))
        .with_endpoint(Endpoint::new("GET", "/internal/debug"))
        .with_endpoint(
            Endpoint::new("POST", "/invoices")
                .with_parameter(Parameter::new(
                    "dryRun",
                    ParameterLocation::Query,
                    "boolean",
                    false,
                )),
        )
}

fn new_spec() -> ApiSpec {
    ApiSpec::new("billing", "2.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/invoices"))
        .with_endpoint(Endpoint::new("POST", "/invoices"))
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        r#"
changelog:
  fail_on_breaking: true
  except_categories:
    - parameter
  ignore:
    - "GET /internal"
  weights:
    breaking: 50
"#
    )
    .unwrap();

    let config = ChangelogConfig::from_yaml_file(file.path()).unwrap();
    assert!(config.fail_on_breaking);
    assert_eq!(config.excluded_categories(), vec![ChangeCategory::Parameter]);
    assert_eq!(config.ignore, vec!["GET /internal".to_string()]);
    assert_eq!(
        config.weights,
        RiskWeights {
            breaking: 50,
            ..RiskWeights::default()
        }
    );
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = ChangelogConfig::from_yaml_file(dir.path().join("absent.yaml"));
    assert!(result.is_err());
}

#[test]
fn test_empty_and_foreign_documents_yield_defaults() {
    assert_eq!(ChangelogConfig::from_yaml_str("").unwrap(), ChangelogConfig::default());
    assert_eq!(
        ChangelogConfig::from_yaml_str("other_tool:\n  enabled: true\n").unwrap(),
        ChangelogConfig::default()
    );
}

#[test]
fn test_malformed_yaml_is_an_error() {
    assert!(ChangelogConfig::from_yaml_str("changelog: [unclosed").is_err());
}

#[test]
fn test_unfiltered_engine_reports_everything() {
    let changelog = ChangelogEngine::default().compare_rest(Some(&old_spec()), Some(&new_spec()));
    let categories: Vec<_> = changelog.changes.iter().map(|c| c.category()).collect();
    assert_eq!(categories, vec![ChangeCategory::Endpoint, ChangeCategory::Parameter]);
}

#[test]
fn test_filters_drop_changes_before_scoring() {
    let config = ChangelogConfig::from_yaml_str(
        r#"
changelog:
  except_categories: [PARAMETER, NOT_A_CATEGORY]
  ignore: ["GET /internal"]
"#,
    )
    .unwrap();
    let engine = ChangelogEngine::new(config);

    let changelog = engine.compare_rest(Some(&old_spec()), Some(&new_spec()));
    assert!(changelog.is_empty());
    assert_eq!(changelog.summary.total_changes, 0);
    assert_eq!(changelog.risk_assessment.overall_score, 0);
}

#[test]
fn test_weights_change_the_score() {
    let heavy = ChangelogConfig {
        weights: RiskWeights {
            breaking: 90,
            ..RiskWeights::default()
        },
        ..ChangelogConfig::default()
    };
    let old = ApiSpec::new("billing", "1.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/invoices"));
    let new = ApiSpec::new("billing", "2.0.0", Protocol::Rest);

    let default_score = ChangelogEngine::default().compare_rest(Some(&old), Some(&new));
    let heavy_score = ChangelogEngine::new(heavy).compare_rest(Some(&old), Some(&new));

    assert_eq!(default_score.risk_assessment.overall_score, 25);
    assert_eq!(default_score.risk_assessment.level, RiskLevel::Low);
    assert_eq!(heavy_score.risk_assessment.overall_score, 90);
    assert_eq!(heavy_score.risk_assessment.level, RiskLevel::Critical);
}

#[test]
fn test_compatibility_follows_the_filtered_changelog() {
    let old = ApiSpec::new("billing", "1.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/invoices"))
        .with_endpoint(Endpoint::new("GET", "/legacy"));
    let new = ApiSpec::new("billing", "2.0.0", Protocol::Rest)
        .with_endpoint(Endpoint::new("GET", "/invoices"));

    let unfiltered = ChangelogEngine::default().compare_rest(Some(&old), Some(&new));
    assert_eq!(Compatibility::of(&unfiltered), Compatibility::Red);

    let config =
        ChangelogConfig::from_yaml_str("changelog:\n  except_categories: [ENDPOINT]\n").unwrap();
    let filtered = ChangelogEngine::new(config).compare_rest(Some(&old), Some(&new));
    assert_eq!(filtered.summary.breaking_changes, 0);
    assert_eq!(Compatibility::of(&filtered), Compatibility::Green);

    let mut additive = new.clone();
    additive.endpoints.push(Endpoint::new("GET", "/credits"));
    let config =
        ChangelogConfig::from_yaml_str("changelog:\n  ignore: [\"GET /legacy\"]\n").unwrap();
    let changelog = ChangelogEngine::new(config).compare_rest(Some(&old), Some(&additive));
    assert_eq!(Compatibility::of(&changelog), Compatibility::Yellow);
}
