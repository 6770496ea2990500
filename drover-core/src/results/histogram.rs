use std::fmt::Write;
use std::time::Duration;

const BAR: char = '▇';
const COLUMN_PADDING: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Lower bound in seconds.
    pub min: f64,
    /// Upper bound in seconds.
    pub max: f64,
    pub count: usize,
}

/// Equal-width linear buckets spanning the observed range of a set of latencies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    pub buckets: Vec<Bucket>,
    pub total: usize,
}

impl Histogram {
    /// Splits `[min, max]` of `values` into `bins` buckets of equal width.
    ///
    /// The maximum lands in the last bucket. When every value is equal there is a single bucket
    /// holding all of them. Empty input or `bins == 0` yields an empty histogram.
    pub fn new(bins: usize, values: &[f64]) -> Self {
        if values.is_empty() || bins == 0 {
            return Self::default();
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });

        if min == max {
            return Self {
                buckets: vec![Bucket {
                    min,
                    max,
                    count: values.len(),
                }],
                total: values.len(),
            };
        }

        let scale = (max - min) / bins as f64;
        let mut buckets: Vec<_> = (0..bins)
            .map(|i| Bucket {
                min: min + i as f64 * scale,
                max: min + (i + 1) as f64 * scale,
                count: 0,
            })
            .collect();

        for v in values {
            let idx = (((v - min) / scale) as usize).min(bins - 1);
            buckets[idx].count += 1;
        }

        Self {
            buckets,
            total: values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }

    /// Share of all values held by bucket `idx`, in percent.
    pub fn percent(&self, idx: usize) -> f64 {
        self.buckets[idx].count as f64 * 100. / self.total as f64
    }

    /// Bar length of bucket `idx`, linear in its count relative to the fullest bucket.
    pub fn bar_len(&self, idx: usize, width: usize) -> usize {
        let max_count = self.buckets.iter().map(|b| b.count).max().unwrap_or(0);
        if max_count == 0 {
            return 0;
        }
        self.buckets[idx].count * width / max_count
    }

    /// One line per bucket, lowest first: time range, percentage, bar and count, with the first
    /// two columns aligned.
    pub fn render(&self, width: usize) -> String {
        let rows: Vec<_> = self
            .buckets
            .iter()
            .enumerate()
            .map(|(idx, bucket)| {
                let range = format!(
                    "{}-{}",
                    format_secs(bucket.min),
                    format_secs(bucket.max)
                );
                let percent = format!("{}%", format_percent(self.percent(idx)));
                let label = if bucket.count > 0 {
                    bucket.count.to_string()
                } else {
                    String::new()
                };
                let bar: String = std::iter::repeat(BAR)
                    .take(self.bar_len(idx, width))
                    .collect();
                (range, percent, format!("{bar} {label}"))
            })
            .collect();

        let range_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0) + COLUMN_PADDING;
        let percent_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0) + COLUMN_PADDING;

        let mut out = String::new();
        for (range, percent, bar) in rows {
            let line = format!("{range:<range_width$}{percent:<percent_width$}{bar}");
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

fn format_secs(secs: f64) -> String {
    let dur = Duration::from_secs_f64(secs.max(0.));
    let dur = if dur >= Duration::from_secs(1) {
        Duration::from_millis(dur.as_millis() as u64)
    } else {
        Duration::from_micros(dur.as_micros() as u64)
    };
    humantime::format_duration(dur).to_string()
}

/// Three significant digits, trailing zeros trimmed.
fn format_percent(value: f64) -> String {
    if value == 0. || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let s = format!("{value:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
