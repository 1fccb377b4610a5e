use crate::metrics::{MetricsByAsset, MetricsResult};
use crate::stats;
use serde::Serialize;

/// An asset and its total return, as quoted in headlines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub label: String,
    pub total_return_pct: f64,
}

/// Headline numbers across every asset that produced metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub best: Option<Performer>,
    pub worst: Option<Performer>,
    pub mean_total_return_pct: Option<f64>,
    pub median_volatility_pct: Option<f64>,
    pub worst_max_drawdown_pct: Option<f64>,
    /// Assets that could not be measured.
    pub failed: Vec<String>,
}

/// Top and bottom asset of one universe group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupLeaders {
    pub group: String,
    pub top: Option<Performer>,
    pub bottom: Option<Performer>,
}

/// Successful results ordered by total return, best first; ties by label.
pub fn rank_by_total_return(metrics: &MetricsByAsset) -> Vec<(&str, &MetricsResult)> {
    let mut ranked: Vec<(&str, &MetricsResult)> = metrics
        .iter()
        .filter_map(|(label, result)| result.as_ref().ok().map(|m| (label.as_str(), m)))
        .collect();
    ranked.sort_by(|(la, a), (lb, b)| {
        b.total_return_pct
            .total_cmp(&a.total_return_pct)
            .then_with(|| la.cmp(lb))
    });
    ranked
}

pub fn overview(metrics: &MetricsByAsset) -> Overview {
    let ranked = rank_by_total_return(metrics);
    let performer = |(label, m): &(&str, &MetricsResult)| Performer {
        label: label.to_string(),
        total_return_pct: m.total_return_pct,
    };

    let returns: Vec<f64> = ranked.iter().map(|(_, m)| m.total_return_pct).collect();
    let vols: Vec<f64> = ranked.iter().map(|(_, m)| m.annualized_volatility_pct).collect();

    Overview {
        best: ranked.first().map(performer),
        worst: ranked.last().map(performer),
        mean_total_return_pct: stats::mean(&returns),
        median_volatility_pct: stats::median(&vols),
        worst_max_drawdown_pct: ranked
            .iter()
            .map(|(_, m)| m.max_drawdown_pct)
            .min_by(|a, b| a.total_cmp(b)),
        failed: metrics
            .iter()
            .filter(|(_, r)| r.is_err())
            .map(|(label, _)| label.clone())
            .collect(),
    }
}

/// Best and worst asset of every group, among the assets that produced
/// metrics, in the order the groups are given. A group without any such
/// asset has no leaders.
pub fn group_leaders(metrics: &MetricsByAsset, groups: &[(String, Vec<String>)]) -> Vec<GroupLeaders> {
    let ranked = rank_by_total_return(metrics);
    groups
        .iter()
        .map(|(group, labels)| {
            let mut members = ranked
                .iter()
                .filter(|(label, _)| labels.iter().any(|l| l == label));
            let to_performer = |(label, m): &(&str, &MetricsResult)| Performer {
                label: label.to_string(),
                total_return_pct: m.total_return_pct,
            };
            let top = members.next().map(to_performer);
            let bottom = members.last().map(to_performer).or_else(|| top.clone());
            GroupLeaders {
                group: group.clone(),
                top,
                bottom,
            }
        })
        .collect()
}
