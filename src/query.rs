//! Query Engine
//!
//! Derives one of four views from the snapshot's runs, chosen by which of
//! the `runner` / `level` filters are present:
//!
//! | runner | level | view |
//! |--------|-------|------|
//! | -      | -     | points per runner, highest first |
//! | -      | yes   | that level's runs |
//! | yes    | -     | that runner's runs |
//! | yes    | yes   | one run |
//!
//! `None` means "no data": the filtered views never return an empty list.

use crate::scoring::points_for_place;
use crate::snapshot::Run;
use serde::{Deserialize, Serialize};

/// Optional filters taken from the request
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryFilter {
    pub runner: Option<String>,
    pub level: Option<String>,
}

impl QueryFilter {
    pub fn new(runner: Option<&str>, level: Option<&str>) -> Self {
        Self {
            runner: runner.map(str::to_string),
            level: level.map(str::to_string),
        }
    }

    /// Drop filters given as empty strings
    pub fn normalized(self) -> Self {
        Self {
            runner: self.runner.filter(|s| !s.is_empty()),
            level: self.level.filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerTotal {
    pub runner: String,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelEntry {
    pub level: String,
    pub time: f64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunnerEntry {
    pub runner: String,
    pub time: f64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunLookup {
    pub time: f64,
    pub points: i64,
}

/// Payload of a successful query, serialized without a tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Aggregate(Vec<RunnerTotal>),
    Level(Vec<LevelEntry>),
    Runner(Vec<RunnerEntry>),
    Single(RunLookup),
}

pub fn execute(runs: &[Run], filter: &QueryFilter) -> Option<QueryResult> {
    match (filter.runner.as_deref(), filter.level.as_deref()) {
        (Some(runner), Some(level)) => lookup(runs, runner, level).map(QueryResult::Single),
        (None, Some(level)) => level_runs(runs, level).map(QueryResult::Level),
        (Some(runner), None) => runner_runs(runs, runner).map(QueryResult::Runner),
        (None, None) => Some(QueryResult::Aggregate(aggregate(runs))),
    }
}

/// Points per runner summed across levels, sorted descending.
///
/// Runners appear once, in first-seen order among equal totals.
pub fn aggregate(runs: &[Run]) -> Vec<RunnerTotal> {
    let mut totals: Vec<RunnerTotal> = Vec::new();
    for run in runs {
        let points = points_for_place(run.place);
        match totals.iter_mut().find(|t| t.runner == run.runner) {
            Some(total) => total.points += points,
            None => totals.push(RunnerTotal {
                runner: run.runner.clone(),
                points,
            }),
        }
    }
    // sort_by is stable
    totals.sort_by(|a, b| b.points.cmp(&a.points));
    totals
}

pub fn level_runs(runs: &[Run], level: &str) -> Option<Vec<LevelEntry>> {
    let entries: Vec<LevelEntry> = runs
        .iter()
        .filter(|r| r.level == level)
        .map(|r| LevelEntry {
            level: r.level.clone(),
            time: r.time,
            points: points_for_place(r.place),
        })
        .collect();
    (!entries.is_empty()).then_some(entries)
}

pub fn runner_runs(runs: &[Run], runner: &str) -> Option<Vec<RunnerEntry>> {
    let entries: Vec<RunnerEntry> = runs
        .iter()
        .filter(|r| r.runner == runner)
        .map(|r| RunnerEntry {
            runner: r.runner.clone(),
            time: r.time,
            points: points_for_place(r.place),
        })
        .collect();
    (!entries.is_empty()).then_some(entries)
}

pub fn lookup(runs: &[Run], runner: &str, level: &str) -> Option<RunLookup> {
    runs.iter()
        .find(|r| r.runner == runner && r.level == level)
        .map(|r| RunLookup {
            time: r.time,
            points: points_for_place(r.place),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(level: &str, runner: &str, place: i64) -> Run {
        Run {
            level: level.to_string(),
            time: place as f64 * 10.0,
            place,
            runner: runner.to_string(),
        }
    }

    #[test]
    fn test_aggregate_sums_per_runner() {
        let runs = vec![run("a", "alice", 1), run("b", "alice", 3), run("a", "bob", 2)];

        let totals = aggregate(&runs);
        assert_eq!(
            totals,
            vec![
                RunnerTotal {
                    runner: "alice".to_string(),
                    points: 195
                },
                RunnerTotal {
                    runner: "bob".to_string(),
                    points: 97
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_sorted_descending() {
        // 50, 200 (100 + 100), 80
        let runs = vec![
            run("a", "fifty", 48),
            run("a", "two_hundred", 1),
            run("b", "two_hundred", 1),
            run("c", "eighty", 18),
        ];

        let order: Vec<(String, i64)> = aggregate(&runs)
            .into_iter()
            .map(|t| (t.runner, t.points))
            .collect();
        assert_eq!(
            order,
            vec![
                ("two_hundred".to_string(), 200),
                ("eighty".to_string(), 80),
                ("fifty".to_string(), 50),
            ]
        );
    }

    #[test]
    fn test_aggregate_ties_keep_first_seen_order() {
        let runs = vec![run("a", "zed", 5), run("b", "amy", 5), run("c", "max", 1)];
        let names: Vec<String> = aggregate(&runs).into_iter().map(|t| t.runner).collect();
        assert_eq!(names, vec!["max", "zed", "amy"]);
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(
            execute(&[], &QueryFilter::default()),
            Some(QueryResult::Aggregate(vec![]))
        );
    }

    #[test]
    fn test_level_view_preserves_run_order() {
        let runs = vec![run("a", "bob", 2), run("b", "x", 1), run("a", "alice", 1)];
        let result = execute(&runs, &QueryFilter::new(None, Some("a")));

        assert_eq!(
            result,
            Some(QueryResult::Level(vec![
                LevelEntry {
                    level: "a".to_string(),
                    time: 20.0,
                    points: 97
                },
                LevelEntry {
                    level: "a".to_string(),
                    time: 10.0,
                    points: 100
                },
            ]))
        );
    }

    #[test]
    fn test_level_view_no_match_is_no_data() {
        let runs = vec![run("a", "bob", 2)];
        assert_eq!(execute(&runs, &QueryFilter::new(None, Some("zzz"))), None);
    }

    #[test]
    fn test_runner_view() {
        let runs = vec![run("a", "bob", 2), run("b", "bob", 4), run("a", "alice", 1)];
        match execute(&runs, &QueryFilter::new(Some("bob"), None)) {
            Some(QueryResult::Runner(entries)) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].points, 94);
                assert!(entries.iter().all(|e| e.runner == "bob"));
            }
            other => panic!("Expected runner view, got: {:?}", other),
        }
        assert_eq!(execute(&runs, &QueryFilter::new(Some("carol"), None)), None);
    }

    #[test]
    fn test_single_lookup() {
        let runs = vec![run("a", "bob", 2), run("b", "bob", 3)];

        assert_eq!(
            execute(&runs, &QueryFilter::new(Some("bob"), Some("b"))),
            Some(QueryResult::Single(RunLookup {
                time: 30.0,
                points: 95
            }))
        );
        assert_eq!(execute(&runs, &QueryFilter::new(Some("bob"), Some("c"))), None);
        assert_eq!(execute(&runs, &QueryFilter::new(Some("eve"), Some("a"))), None);
    }

    #[test]
    fn test_empty_filters_are_absent() {
        let filter = QueryFilter::new(Some(""), Some("a")).normalized();
        assert_eq!(filter, QueryFilter::new(None, Some("a")));
    }

    #[test]
    fn test_result_json_shapes() {
        let level = serde_json::to_value(QueryResult::Level(vec![LevelEntry {
            level: "a".to_string(),
            time: 1.5,
            points: 100,
        }]))
        .unwrap();
        assert_eq!(level, serde_json::json!([{"level": "a", "time": 1.5, "points": 100}]));

        let single = serde_json::to_value(QueryResult::Single(RunLookup {
            time: 2.0,
            points: 97,
        }))
        .unwrap();
        assert_eq!(single, serde_json::json!({"time": 2.0, "points": 97}));
    }
}
