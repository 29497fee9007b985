//! Tick value generation for continuous axes.

/// Rounds a raw step up to 1, 2 or 5 times a power of ten.
pub(crate) fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Roughly `target` nicely spaced values inside `[min, max]`.
///
/// With `integer` set, the step is at least one and every value is a
/// whole number. Returns the values and the step used.
pub(crate) fn ticks_within(min: f64, max: f64, target: usize, integer: bool) -> (Vec<f64>, f64) {
    let span = max - min;
    if span <= 0.0 || target == 0 {
        return (Vec::new(), 0.0);
    }

    let mut step = nice_step(span / target as f64);
    if integer {
        step = step.max(1.0).round();
    }
    if step <= 0.0 {
        return (Vec::new(), 0.0);
    }

    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    let values = (first..=last)
        .map(|i| {
            let value = i as f64 * step;
            if value == 0.0 { 0.0 } else { value }
        })
        .collect();
    (values, step)
}

/// Formats `value` with as many decimals as `step` needs.
pub(crate) fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 || step <= 0.0 {
        0
    } else {
        (-step.log10().floor()).max(0.0) as usize
    };
    let label = format!("{value:.decimals$}");
    if label.starts_with('-') && label.trim_start_matches(['-', '0', '.']).is_empty() {
        label[1..].to_string()
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_nice_step_thresholds() {
        assert_approx_eq!(f64, nice_step(0.8), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, nice_step(1.4), 1.0, epsilon = 1e-12);
        assert_approx_eq!(f64, nice_step(1.6), 2.0, epsilon = 1e-12);
        assert_approx_eq!(f64, nice_step(4.0), 5.0, epsilon = 1e-12);
        assert_approx_eq!(f64, nice_step(8.0), 10.0, epsilon = 1e-12);
        assert_approx_eq!(f64, nice_step(230.0), 200.0, epsilon = 1e-9);
        assert_eq!(nice_step(0.0), 0.0);
    }

    #[test]
    fn test_ticks_stay_inside_domain() {
        let (values, step) = ticks_within(3.0, 97.0, 5, false);
        assert_approx_eq!(f64, step, 20.0, epsilon = 1e-12);
        assert_eq!(values, vec![20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_ticks_include_exact_endpoints() {
        let (values, _) = ticks_within(0.0, 100.0, 4, false);
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&100.0));
    }

    #[test]
    fn test_integer_ticks_never_fractional() {
        let (values, step) = ticks_within(0.0, 3.0, 10, true);
        assert_approx_eq!(f64, step, 1.0);
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);

        let (values, _) = ticks_within(0.2, 0.8, 4, true);
        assert!(values.is_empty());
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(20.0, 20.0), "20");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
        assert_eq!(format_tick(0.5, 0.1), "0.5");
        assert_eq!(format_tick(-0.0001, 0.1), "0.0");
    }
}
