/// Least squares fit `y = slope * x + intercept` with Pearson correlation `r`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|value| !value.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);

    match sorted.len() {
        0 => None,
        len if len % 2 == 1 => Some(sorted[len / 2]),
        len => Some((sorted[len / 2 - 1] + sorted[len / 2]) / 2.0),
    }
}

/// Linear regression over `points`, `None` with fewer than two points or without spread in x.
/// Points with a NaN coordinate are ignored.
pub fn linear_regression(points: &[(f64, f64)]) -> Option<Trend> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .collect();

    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxx, syy, sxy) = points.iter().fold((0.0, 0.0, 0.0), |(sxx, syy, sxy), (x, y)| {
        let (dx, dy) = (x - mean_x, y - mean_y);
        (sxx + dx * dx, syy + dy * dy, sxy + dx * dy)
    });

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    let r = if syy == 0.0 {
        0.0
    } else {
        sxy / (sxx * syy).sqrt()
    };

    Some(Trend {
        slope,
        intercept: mean_y - slope * mean_x,
        r,
    })
}
