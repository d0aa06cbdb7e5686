//! Rendering of a computed posterior: Markdown summary and SVG chart.

use postcalc_core::*;
use postcalc_render::*;

fn default_case() -> (Prior, Vec<f64>, Posterior) {
    let prior = Prior::new(0.0, 1.0).unwrap();
    let ys = vec![1.0, 2.0];
    let post = update_with(&prior, &ys, &NoiseModel::new(0.5).unwrap()).unwrap();
    (prior, ys, post)
}

#[test]
fn summary_matches_result_panel_layout() {
    let (_, ys, post) = default_case();
    let text = Summary {
        observations: &ys,
        posterior: &post,
    }
    .to_string();

    let expected = "### Observations\n\
                    1.0, 2.0\n\
                    \n\
                    ### Posterior Parameters\n\
                    - **Posterior Mean (μₚ)**: 1.3333\n\
                    - **Posterior Standard Deviation (σₚ)**: 0.3333";
    assert_eq!(text, expected);
}

#[test]
fn observations_echo_in_input_order() {
    assert_eq!(format_observations(&[3.0, -1.5, 0.25]), "3.0, -1.5, 0.25");
}

#[test]
fn display_precision_is_four_decimals() {
    assert_eq!(display4(0.2_f64.sqrt()), "0.4472");
    assert_eq!(display4(0.8), "0.8000");
}

#[test]
fn chart_contains_both_curves_fill_and_mean_marker() {
    let (prior, _, post) = default_case();
    let grid = DensityGrid::build(&prior.as_gaussian(), &post.as_gaussian(), 500, 4.0).unwrap();
    let opts = ChartOptions::default();
    let svg = DensityChart {
        grid: &grid,
        posterior: post.as_gaussian(),
        options: &opts,
    }
    .to_string();

    assert!(svg.starts_with("<?xml"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains("width=\"1000\" height=\"600\""));
    assert!(svg.contains("class=\"prior\""));
    assert!(svg.contains("class=\"posterior\""));
    assert!(svg.contains("class=\"posterior-fill\""));
    assert!(svg.contains("class=\"posterior-mean\""));
    assert!(svg.contains("Probability Density"));
    assert!(svg.contains(DEFAULT_TITLE));

    // One coordinate pair per grid point on the prior curve.
    let prior_line = svg
        .lines()
        .find(|l| l.contains("class=\"prior\""))
        .unwrap();
    let pts = prior_line.split("points=\"").nth(1).unwrap().split('"').next().unwrap();
    assert_eq!(pts.split(' ').count(), 500);
}

#[test]
fn chart_respects_custom_size_and_escapes_title() {
    let (prior, _, post) = default_case();
    let grid = DensityGrid::build(&prior.as_gaussian(), &post.as_gaussian(), 10, 4.0).unwrap();
    let opts = ChartOptions {
        width: 400,
        height: 300,
        title: "μ <posterior>".to_string(),
    };
    let svg = DensityChart {
        grid: &grid,
        posterior: post.as_gaussian(),
        options: &opts,
    }
    .to_string();

    assert!(svg.contains("viewBox=\"0 0 400 300\""));
    assert!(svg.contains("μ &lt;posterior&gt;"));
}
