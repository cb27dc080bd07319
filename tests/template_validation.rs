//! Integration tests for template validation: seeded reproducibility,
//! exclusion of unconfigured panels, and the rendered report.

use pretty_assertions::assert_eq;

use slip_grid::validation::{PanelCoordinates, TemplateValidator, ValidatorConfig};
use slip_grid::{map_template, validate_template, MapConfig, PositionMap, Template};

const TEMPLATE: &str = r#"
[metadata]
name = "Validation fixture"

[validation]
max_tests = 10
number_range = [1, 10]
sample_size = 10

[[panels]]
id = "main"
corners = [[0, 0], [100, 40]]
columns = 5
rows = 2
start = 1
end = 10
fill_order = "row_left_to_right"

# Number 1 lands on x = 0, outside the plausible image area
[[panels]]
id = "bonus"
corners = [[-10, 10], [90, 30]]
columns = 5
rows = 1
start = 1
end = 5
fill_order = "row_left_to_right"
expected_range = [1, 5]

# Corners not yet captured
[[panels]]
id = "quick_pick"
corners = [[0, 0], [0, 0]]
columns = 1
rows = 1
start = 1
end = 1
"#;

fn template() -> Template {
    Template::from_toml_str(TEMPLATE).expect("fixture should parse")
}

#[test]
fn test_report() {
    let mut result = validate_template(&template(), &MapConfig::default(), 1);
    result.validation_time_ms = 0;
    let report = result.to_string();

    insta::assert_snapshot!(report.trim_end(), @r"
    TEMPLATE VALIDATION: FAILED
    Configured panels: 2/3
    Coordinates mapped: 15
    Tests run: 20
    Average coverage: 90.0%
    Time: 0 ms

    [bonus] PARTIAL
        Coordinates: 5
        Coverage: 80.0% (4/5)
        Trials passed: 0/10
        Errors:
          - Number 1: coordinate (0, 20) outside 0..10000

    [main] PASSED
        Coordinates: 10
        Coverage: 100.0% (10/10)
        Trials passed: 10/10

    [quick_pick] NOT CONFIGURED
    ");
}

#[test]
fn test_unconfigured_panel_cannot_fail_template() {
    let template = template();
    let maps = map_template(&template, &MapConfig::default());
    let panels = vec![
        PanelCoordinates::new("main", maps["main"].clone()),
        PanelCoordinates::new("quick_pick", PositionMap::new()),
    ];
    let validator = TemplateValidator::new(template.validation.clone());
    let result = validator.validate(&panels, 11);

    assert!(result.overall_pass());
    assert_eq!(result.configured_panels(), 1);
    assert_eq!(result.panels["quick_pick"].coordinates_mapped, 0);
    assert_eq!(result.failed_panels(), Vec::<&str>::new());
}

#[test]
fn test_same_seed_same_panel_results() {
    let template = template();
    let config = ValidatorConfig::new().with_max_tests(50).with_sample_size(3);
    let maps = map_template(&template, &MapConfig::default());
    let panels: Vec<PanelCoordinates> = maps
        .into_iter()
        .map(|(id, positions)| PanelCoordinates::new(id, positions))
        .collect();

    let validator = TemplateValidator::new(config);
    let first = validator.validate(&panels, 2024);
    let second = validator.validate(&panels, 2024);
    assert_eq!(first.panels, second.panels);

    // Panel order in the input does not matter
    let reversed: Vec<PanelCoordinates> = panels.into_iter().rev().collect();
    let third = validator.validate(&reversed, 2024);
    assert_eq!(first.panels, third.panels);
}

#[test]
fn test_sample_size_limits_per_trial_coverage() {
    let positions: PositionMap = template().panels[0].positions(&MapConfig::default());
    let validator = TemplateValidator::new(
        ValidatorConfig::new()
            .with_max_tests(1)
            .with_sample_size(3)
            .with_number_range(1..=10),
    );
    let result = validator.validate(&[PanelCoordinates::new("main", positions)], 0);
    let main = &result.panels["main"];
    assert_eq!(main.numbers_tested.len(), 3);
    assert_eq!(main.coverage_percentage, 30.0);
    assert!(main.passed);
}
