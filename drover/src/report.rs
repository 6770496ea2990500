//! Human-readable run reports.
use crate::ReportError;
use drover_core::{ResultStore, RunConfig, REPORT_HISTOGRAM_BINS, REPORT_HISTOGRAM_WIDTH};
use num_format::{Locale, ToFormattedString};
use std::borrow::Cow;
use std::fmt;

/// Template used by [`Orchestrator::report`](crate::Orchestrator::report).
///
/// Placeholders take the form `{{.Field}}`, where `Field` is one of the names listed on
/// [`Report`].
pub const DEFAULT_TEMPLATE: &str = "
[Setting]
* warm up time:   {{.WarmUpTime}}
* duration:       {{.Duration}}
* max concurrent: {{.MaxConcurrent}}
* max RPS:        {{.MaxRPS}}

[Request]
* total:      {{.TotalRequests}}
* succeeded:  {{.Succeeded}}
* failed:     {{.Failed}}
* error rate: {{.ErrorRate}} %
* RPS:        {{.RPS}}

[Latency]
* max: {{.MaxLatency}} ms
* min: {{.MinLatency}} ms
* avg: {{.AvgLatency}} ms
* med: {{.MedLatency}} ms
* 99th percentile: {{.Latency99p}} ms
* 90th percentile: {{.Latency90p}} ms
";

/// Formatted statistics of a finished run.
///
/// Template fields: `TotalRequests`, `Succeeded`, `Failed`, `WarmUpTime`, `Duration`,
/// `MaxConcurrent`, `MaxRPS`, `ErrorRate`, `RPS`, `MaxLatency`, `MinLatency`, `AvgLatency`,
/// `MedLatency`, `Latency99p`, `Latency90p`, `Histogram`. Latencies are in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub total_requests: String,
    pub succeeded: String,
    pub failed: String,
    pub warm_up_time: String,
    pub duration: String,
    pub max_concurrent: u32,
    pub max_rps: u32,
    pub error_rate: String,
    pub rps: String,
    pub max_latency: String,
    pub min_latency: String,
    pub avg_latency: String,
    pub med_latency: String,
    pub latency_99p: String,
    pub latency_90p: String,
    pub histogram: String,
}

impl Report {
    /// Fails when `results` holds no measured executions.
    pub fn new<E>(results: &ResultStore<E>, config: &RunConfig) -> Result<Self, ReportError> {
        let succeeded = results.succeeded();
        let failed = results.failed();
        let total = succeeded + failed;

        let max = results.percentile_latency(100)?;
        let min = results.percentile_latency(0)?;
        let p99 = results.percentile_latency(99)?;
        let p90 = results.percentile_latency(90)?;
        let p50 = results.percentile_latency(50)?;
        let avg = results.mean_latency()?;

        Ok(Self {
            total_requests: comma(total),
            succeeded: comma(succeeded),
            failed: comma(failed),
            warm_up_time: humantime::format_duration(config.warm_up()).to_string(),
            duration: humantime::format_duration(config.run_duration()).to_string(),
            max_concurrent: config.max_concurrent(),
            max_rps: config.max_rps(),
            error_rate: commaf(failed as f64 / total as f64 * 100., 1),
            rps: commaf(total as f64 / config.run_duration().as_secs_f64(), 1),
            max_latency: commaf(max * 1000., 1),
            min_latency: commaf(min * 1000., 1),
            avg_latency: commaf(avg * 1000., 1),
            med_latency: commaf(p50 * 1000., 1),
            latency_99p: commaf(p99 * 1000., 1),
            latency_90p: commaf(p90 * 1000., 1),
            histogram: results.histogram(REPORT_HISTOGRAM_BINS, REPORT_HISTOGRAM_WIDTH),
        })
    }

    /// Substitute every `{{.Field}}` placeholder of `template`.
    pub fn render(&self, template: &str) -> Result<String, ReportError> {
        if template.is_empty() {
            return Err(ReportError::EmptyTemplate);
        }

        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let close = after.find("}}").ok_or(ReportError::UnclosedPlaceholder)?;
            let name = after[..close].trim();
            out.push_str(&self.field(name.strip_prefix('.').unwrap_or(name))?);
            rest = &after[close + 2..];
        }
        out.push_str(rest);

        Ok(out)
    }

    fn field(&self, name: &str) -> Result<Cow<'_, str>, ReportError> {
        let value = match name {
            "TotalRequests" => Cow::Borrowed(self.total_requests.as_str()),
            "Succeeded" => Cow::Borrowed(self.succeeded.as_str()),
            "Failed" => Cow::Borrowed(self.failed.as_str()),
            "WarmUpTime" => Cow::Borrowed(self.warm_up_time.as_str()),
            "Duration" => Cow::Borrowed(self.duration.as_str()),
            "MaxConcurrent" => Cow::Owned(self.max_concurrent.to_string()),
            "MaxRPS" => Cow::Owned(self.max_rps.to_string()),
            "ErrorRate" => Cow::Borrowed(self.error_rate.as_str()),
            "RPS" => Cow::Borrowed(self.rps.as_str()),
            "MaxLatency" => Cow::Borrowed(self.max_latency.as_str()),
            "MinLatency" => Cow::Borrowed(self.min_latency.as_str()),
            "AvgLatency" => Cow::Borrowed(self.avg_latency.as_str()),
            "MedLatency" => Cow::Borrowed(self.med_latency.as_str()),
            "Latency99p" => Cow::Borrowed(self.latency_99p.as_str()),
            "Latency90p" => Cow::Borrowed(self.latency_90p.as_str()),
            "Histogram" => Cow::Borrowed(self.histogram.as_str()),
            _ => return Err(ReportError::UnknownField(name.to_string())),
        };
        Ok(value)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.render(DEFAULT_TEMPLATE).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

fn comma(n: u64) -> String {
    n.to_formatted_string(&Locale::en)
}

/// `value` with at most `digits` decimals, trailing zeros dropped and thousands separated.
fn commaf(value: f64, digits: usize) -> String {
    let formatted = format!("{value:.digits$}");
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac = frac.trim_end_matches('0');

    // Rounded to `digits` decimals already; only magnitudes past u64 keep their raw digits.
    let int = int
        .parse::<u64>()
        .map_or_else(|_| int.to_string(), |n| n.to_formatted_string(&Locale::en));
    if frac.is_empty() {
        format!("{sign}{int}")
    } else {
        format!("{sign}{int}.{frac}")
    }
}
