mod test_signals;

use approx::assert_abs_diff_eq;
use tiltcomp::config::SeparatorConfig;
use tiltcomp::constants::GRAVITY_EARTH;
use tiltcomp::{GravityLinearSeparator, MovingAverageFilter, Vector3};

use test_signals::{flat, sample_with_magnitude};

fn separator_with(count_threshold: usize) -> GravityLinearSeparator {
    GravityLinearSeparator::new(&SeparatorConfig {
        count_threshold,
        ..SeparatorConfig::default()
    })
    .expect("default tuning is valid")
}

#[test]
fn test_window_three_means() {
    let mut filter = MovingAverageFilter::new(3);
    let means: Vec<f32> = [1.0, 2.0, 3.0, 4.0]
        .iter()
        .map(|&v| filter.insert(v))
        .collect();

    for (got, expected) in means.iter().zip([1.0, 1.5, 2.0, 3.0]) {
        assert_abs_diff_eq!(*got, expected, epsilon = 1e-6);
    }
}

#[test]
fn test_two_sample_latch() {
    let mut separator = separator_with(2);
    let raw = Vector3::new(0.0, 0.0, 9.8);

    separator.process(raw);
    let out = separator.process(raw);

    assert_eq!(out.gravity, raw);
    assert_eq!(out.linear, Vector3::ZERO);
    assert_eq!(separator.gravity(), raw);
}

#[test]
fn test_disqualifying_sample_breaks_run() {
    let mut separator = separator_with(5);

    for _ in 0..4 {
        let out = separator.process(flat());
        assert!(out.qualifying);
        assert!(!out.latched);
    }
    assert_eq!(separator.qualifying_run_count(), 4);

    let spike = sample_with_magnitude(Vector3::new(0.3, 0.1, 1.0), 2.0);
    let out = separator.process(spike);

    assert!(!out.qualifying);
    assert_eq!(separator.qualifying_run_count(), 0);
    assert_eq!(separator.gravity(), Vector3::ZERO);
    assert_eq!(out.linear, spike);

    // A fresh run of four is still not enough
    for _ in 0..4 {
        separator.process(flat());
    }
    assert_eq!(separator.gravity(), Vector3::ZERO);
    separator.process(flat());
    assert_eq!(separator.gravity(), flat());
}

#[test]
fn test_unit_magnitude_converges_to_latest_sample() {
    let mut separator = separator_with(5);
    let directions = [
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.1, 0.0, 1.0),
        Vector3::new(0.2, -0.1, 1.0),
        Vector3::new(0.3, -0.2, 0.9),
        Vector3::new(0.4, -0.3, 0.8),
        Vector3::new(0.5, -0.3, 0.7),
        Vector3::new(0.6, -0.4, 0.6),
    ];

    let mut last = None;
    for direction in directions {
        let raw = sample_with_magnitude(direction, 1.0);
        last = Some((raw, separator.process(raw)));
    }

    let (raw, out) = last.unwrap();
    assert_eq!(out.gravity, raw);
    assert_abs_diff_eq!(out.linear.norm(), 0.0, epsilon = 1e-6);
}

#[test]
fn test_threshold_follows_recurrence_exactly() {
    let config = SeparatorConfig {
        alpha: 0.3,
        count_threshold: 5,
        initial_threshold: 1.05,
        window_size: 4,
    };
    let mut separator = GravityLinearSeparator::new(&config).unwrap();
    let mut reference_filter = MovingAverageFilter::new(4);
    let mut threshold = f64::from(config.initial_threshold);

    let magnitudes = [
        1.0, 0.99, 1.02, 1.4, 0.97, 1.01, 0.9, 1.0, 1.03, 0.98, 2.0, 1.0,
    ];
    for magnitude in magnitudes {
        let raw = sample_with_magnitude(Vector3::new(0.2, 0.4, 1.0), magnitude);
        let actual_magnitude = raw.norm() / GRAVITY_EARTH;
        let before = separator.threshold();
        assert_abs_diff_eq!(before, threshold, epsilon = 1e-5);

        let qualifies = f64::from(actual_magnitude) <= threshold && actual_magnitude > 0.95;
        if qualifies {
            let mean = f64::from(reference_filter.insert(actual_magnitude));
            threshold += f64::from(config.alpha) * (mean - threshold) + 0.01;
        }

        let out = separator.process(raw);
        assert_eq!(out.qualifying, qualifies, "magnitude {}", magnitude);
        if qualifies {
            assert_abs_diff_eq!(out.threshold, threshold, epsilon = 1e-5);
        } else {
            assert_eq!(out.threshold, before);
            assert_eq!(out.run_count, 0);
        }
    }
}

#[test]
fn test_threshold_creeps_upward_over_long_static_run() {
    let mut separator = separator_with(5);

    // Fixed point of the recurrence is mean + 0.01 / alpha
    for _ in 0..200 {
        separator.process(flat());
    }
    assert_abs_diff_eq!(separator.threshold(), 1.0 + 0.01 / 0.5, epsilon = 1e-4);

    // With alpha = 0 only the bias remains and the threshold rises forever
    separator.set_alpha(0.0).unwrap();
    let start = separator.threshold();
    for _ in 0..100 {
        separator.process(flat());
    }
    assert_abs_diff_eq!(separator.threshold(), start + 1.0, epsilon = 1e-9);
}

#[test]
fn test_bias_accumulates_without_rounding_drift() {
    let config = SeparatorConfig {
        alpha: 0.0,
        count_threshold: 5,
        initial_threshold: 1.05,
        window_size: 20,
    };
    let mut separator = GravityLinearSeparator::new(&config).unwrap();

    for _ in 0..20_000 {
        separator.process(flat());
    }
    let expected = f64::from(config.initial_threshold) + 20_000.0 * 0.01;
    assert_abs_diff_eq!(separator.threshold(), expected, epsilon = 1e-6);
}

#[test]
fn test_runtime_reconfiguration_keeps_state() {
    let mut separator = separator_with(3);
    for _ in 0..3 {
        separator.process(flat());
    }
    let gravity = separator.gravity();
    assert_eq!(gravity, flat());

    separator.set_count_threshold(50);
    separator.set_window_size(2).unwrap();

    let tilted = sample_with_magnitude(Vector3::new(1.0, 0.0, 1.0), 1.0);
    let out = separator.process(tilted);
    assert_eq!(separator.qualifying_run_count(), 4);
    assert_eq!(out.gravity, gravity);
    assert_abs_diff_eq!(out.linear.x, tilted.x, epsilon = 1e-6);
}
