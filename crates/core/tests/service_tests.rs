// ═══════════════════════════════════════════════════════════════════
// Service Tests — FilterService, AggregationService, BreakdownService,
// FetchService, RequestGenerations
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use networth_dashboard_core::api::traits::DashboardApi;
use networth_dashboard_core::errors::CoreError;
use networth_dashboard_core::models::account::{
    Account, AccountType, AssetClass, Classification, Portfolio, Term,
};
use networth_dashboard_core::models::chart::{SeriesPoint, TOTAL_NET_WORTH_LABEL};
use networth_dashboard_core::models::selection::{FilterSpec, TimeWindow, ViewMode};
use networth_dashboard_core::models::value::{ClassifiedValue, DateRange, Value, ValueQuery};
use networth_dashboard_core::services::aggregation_service::AggregationService;
use networth_dashboard_core::services::breakdown_service::{month_key, BreakdownService};
use networth_dashboard_core::services::fetch_service::{FetchService, RequestGenerations};
use networth_dashboard_core::services::filter_service::FilterService;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn v(account: &str, amount: f64, date: NaiveDate) -> Value {
    Value::new(format!("{account}-{date}"), account, amount, date)
}

fn labels(names: &[&str]) -> FilterSpec {
    names
        .iter()
        .map(|l| Classification::parse(l).unwrap())
        .collect()
}

fn names(accounts: &[Account]) -> Vec<&str> {
    accounts.iter().map(|a| a.name.as_str()).collect()
}

fn catalog() -> Vec<Account> {
    vec![
        Account::new("a")
            .with_type(AccountType::Asset)
            .with_term(Term::ShortTerm),
        Account::new("b")
            .with_type(AccountType::Asset)
            .with_term(Term::LongTerm),
        Account::new("c")
            .with_type(AccountType::Liability)
            .with_term(Term::ShortTerm),
        Account::new("d"),
    ]
}

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock API
// ═══════════════════════════════════════════════════════════════════

/// Serves canned values per account and records every request.
#[derive(Default)]
struct MockApi {
    values: HashMap<String, Vec<Value>>,
    failing: BTreeSet<String>,
    calls: AtomicUsize,
    ranges: Mutex<Vec<Option<DateRange>>>,
}

impl MockApi {
    fn with_values(values: Vec<Value>) -> Self {
        let mut by_account: HashMap<String, Vec<Value>> = HashMap::new();
        for value in values {
            by_account
                .entry(value.account_name.clone())
                .or_default()
                .push(value);
        }
        Self {
            values: by_account,
            ..Self::default()
        }
    }

    fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn list_accounts(&self) -> Result<Vec<Account>, CoreError> {
        Ok(vec![])
    }

    async fn get_account(&self, name: &str) -> Result<Account, CoreError> {
        Err(CoreError::AccountNotFound(name.to_string()))
    }

    async fn list_values(&self, _query: &ValueQuery) -> Result<Vec<Value>, CoreError> {
        Ok(vec![])
    }

    async fn values_for_account(
        &self,
        name: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<Value>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push(range.cloned());
        if self.failing.contains(name) {
            return Err(CoreError::Api {
                status: 500,
                message: format!("boom for {name}"),
            });
        }
        Ok(self.values.get(name).cloned().unwrap_or_default())
    }
}

// ═══════════════════════════════════════════════════════════════════
// FilterService
// ═══════════════════════════════════════════════════════════════════

mod filter_service {
    use super::*;

    #[test]
    fn empty_filter_is_identity_and_keeps_order() {
        let accounts = catalog();
        let result = FilterService::new().filter(&accounts, &FilterSpec::new());
        assert_eq!(result, accounts);
    }

    #[test]
    fn and_across_dimensions() {
        let result = FilterService::new().filter(&catalog(), &labels(&["Asset", "Short Term"]));
        assert_eq!(names(&result), vec!["a"]);
    }

    #[test]
    fn or_within_dimension() {
        let result = FilterService::new().filter(&catalog(), &labels(&["Asset", "Liability"]));
        assert_eq!(names(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn or_within_and_across_combined() {
        let result = FilterService::new().filter(
            &catalog(),
            &labels(&["Asset", "Liability", "Short Term"]),
        );
        assert_eq!(names(&result), vec!["a", "c"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let service = FilterService::new();
        for spec in [
            labels(&[]),
            labels(&["Asset"]),
            labels(&["Short Term", "Long Term"]),
            labels(&["Liability", "Long Term"]),
        ] {
            let once = service.filter(&catalog(), &spec);
            let twice = service.filter(&once, &spec);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn no_match_gives_empty() {
        let result = FilterService::new().filter(&catalog(), &labels(&["Liability", "Long Term"]));
        assert!(result.is_empty());
    }

    #[test]
    fn visible_names_in_catalog_order() {
        let visible = FilterService::new().visible_names(&catalog(), &labels(&["Short Term"]));
        assert_eq!(visible, vec!["a", "c"]);
    }

    #[test]
    fn reconcile_intersects_in_selection_order() {
        let selected = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        let visible = vec!["a".to_string(), "c".to_string()];
        let result = FilterService::new().reconcile(&selected, &visible);
        assert_eq!(result, vec!["c", "a"]);
    }

    #[test]
    fn reconcile_never_adds_names() {
        let selected = vec!["a".to_string()];
        let visible = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(FilterService::new().reconcile(&selected, &visible), vec!["a"]);
    }

    #[test]
    fn reconcile_is_a_fixed_point() {
        let service = FilterService::new();
        let selected = vec!["b".to_string(), "x".to_string(), "a".to_string()];
        let visible = vec!["a".to_string(), "b".to_string()];
        let once = service.reconcile(&selected, &visible);
        let twice = service.reconcile(&once, &visible);
        assert_eq!(once, twice);
        assert_eq!(once, vec!["b", "a"]);
    }

    #[test]
    fn reconcile_collapses_repeated_names() {
        let selected = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let visible = vec!["a".to_string(), "b".to_string()];
        assert_eq!(FilterService::new().reconcile(&selected, &visible), vec!["a", "b"]);
    }

    #[test]
    fn available_labels_sorted_and_distinct() {
        let result = FilterService::new().available_labels(&catalog());
        assert_eq!(
            result,
            vec![
                Classification::Type(AccountType::Asset),
                Classification::Type(AccountType::Liability),
                Classification::Term(Term::ShortTerm),
                Classification::Term(Term::LongTerm),
            ]
        );
    }

    #[test]
    fn breakdown_candidates_require_asset_type_and_class() {
        let accounts = vec![
            Account::new("isa")
                .with_type(AccountType::Asset)
                .with_portfolio(Portfolio::Liquid)
                .with_asset_class(AssetClass::Equities),
            Account::new("no class")
                .with_type(AccountType::Asset)
                .with_portfolio(Portfolio::Liquid),
            Account::new("loan")
                .with_type(AccountType::Liability)
                .with_portfolio(Portfolio::Liquid)
                .with_asset_class(AssetClass::Cash),
            Account::new("house")
                .with_type(AccountType::Asset)
                .with_portfolio(Portfolio::Illiquid)
                .with_asset_class(AssetClass::RealEstate),
            Account::new("no portfolio")
                .with_type(AccountType::Asset)
                .with_asset_class(AssetClass::Cash),
        ];
        let liquid: BTreeSet<Portfolio> = [Portfolio::Liquid].into_iter().collect();
        let result = FilterService::new().breakdown_candidates(&accounts, &liquid);
        assert_eq!(names(&result), vec!["isa"]);

        let all: BTreeSet<Portfolio> = Portfolio::ALL.into_iter().collect();
        let result = FilterService::new().breakdown_candidates(&accounts, &all);
        assert_eq!(names(&result), vec!["isa", "house"]);
    }

    #[test]
    fn breakdown_candidates_empty_selection_matches_nothing() {
        let accounts = vec![Account::new("isa")
            .with_type(AccountType::Asset)
            .with_portfolio(Portfolio::Liquid)
            .with_asset_class(AssetClass::Equities)];
        let result = FilterService::new().breakdown_candidates(&accounts, &BTreeSet::new());
        assert!(result.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// AggregationService
// ═══════════════════════════════════════════════════════════════════

mod aggregation_service {
    use super::*;

    fn sample() -> Vec<Value> {
        vec![
            v("A", 10.0, d(2024, 1, 1)),
            v("B", 5.0, d(2024, 1, 1)),
            v("A", 3.0, d(2024, 2, 1)),
        ]
    }

    #[test]
    fn empty_input_gives_no_series() {
        let service = AggregationService::new();
        assert!(service.aggregate(&[], ViewMode::Aggregated).is_empty());
        assert!(service.aggregate(&[], ViewMode::Split).is_empty());
    }

    #[test]
    fn aggregated_sums_per_date() {
        let series = AggregationService::new().aggregate(&sample(), ViewMode::Aggregated);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].label, TOTAL_NET_WORTH_LABEL);
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint::new(d(2024, 1, 1), 15.0),
                SeriesPoint::new(d(2024, 2, 1), 3.0),
            ]
        );
    }

    #[test]
    fn aggregated_sorts_unsorted_input() {
        let values = vec![
            v("A", 1.0, d(2024, 3, 1)),
            v("A", 2.0, d(2023, 12, 1)),
            v("B", 4.0, d(2024, 1, 15)),
        ];
        let series = AggregationService::new().aggregate(&values, ViewMode::Aggregated);
        let dates: Vec<NaiveDate> = series[0].points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2023, 12, 1), d(2024, 1, 15), d(2024, 3, 1)]);
    }

    #[test]
    fn aggregated_sums_same_account_duplicates() {
        let values = vec![v("A", 1.5, d(2024, 1, 1)), v("A", 2.5, d(2024, 1, 1))];
        let series = AggregationService::new().aggregate(&values, ViewMode::Aggregated);
        assert_eq!(series[0].points, vec![SeriesPoint::new(d(2024, 1, 1), 4.0)]);
    }

    #[test]
    fn aggregated_handles_negative_amounts() {
        let values = vec![v("House", 300_000.0, d(2024, 1, 1)), v("Mortgage", -250_000.0, d(2024, 1, 1))];
        let series = AggregationService::new().aggregate(&values, ViewMode::Aggregated);
        assert_eq!(series[0].points[0].amount, 50_000.0);
    }

    #[test]
    fn split_one_series_per_account() {
        let series = AggregationService::new().aggregate(&sample(), ViewMode::Split);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "A");
        assert_eq!(
            series[0].points,
            vec![
                SeriesPoint::new(d(2024, 1, 1), 10.0),
                SeriesPoint::new(d(2024, 2, 1), 3.0),
            ]
        );
        assert_eq!(series[1].label, "B");
        assert_eq!(series[1].points, vec![SeriesPoint::new(d(2024, 1, 1), 5.0)]);
    }

    #[test]
    fn split_follows_input_order_not_alphabetical() {
        // values arrive concatenated per account in selection order: Zeta, then Alpha
        let values = vec![
            v("Zeta", 1.0, d(2024, 2, 1)),
            v("Zeta", 2.0, d(2024, 1, 1)),
            v("Alpha", 3.0, d(2023, 1, 1)),
        ];
        let series = AggregationService::new().aggregate(&values, ViewMode::Split);
        let labels: Vec<&str> = series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Zeta", "Alpha"]);
        assert_eq!(series[0].points[0].date, d(2024, 1, 1));
    }

    #[test]
    fn split_keeps_same_date_points_separate() {
        let values = vec![v("A", 1.0, d(2024, 1, 1)), v("A", 2.0, d(2024, 1, 1))];
        let series = AggregationService::new().aggregate(&values, ViewMode::Split);
        let amounts: Vec<f64> = series[0].points.iter().map(|p| p.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0]);
    }

    #[test]
    fn amounts_are_not_rounded() {
        let values = vec![v("A", 0.1, d(2024, 1, 1)), v("B", 0.2, d(2024, 1, 1))];
        let series = AggregationService::new().aggregate(&values, ViewMode::Aggregated);
        assert_eq!(series[0].points[0].amount, 0.1 + 0.2);
    }

    #[test]
    fn summarize_change_and_percentage() {
        let series = AggregationService::new().aggregate(
            &[v("A", 200.0, d(2024, 1, 1)), v("A", 250.0, d(2024, 6, 1))],
            ViewMode::Aggregated,
        );
        let summary = AggregationService::new().summarize(&series[0]).unwrap();
        assert_eq!(summary.starting_value, 200.0);
        assert_eq!(summary.current_value, 250.0);
        assert_eq!(summary.change, 50.0);
        assert_eq!(summary.change_pct, 25.0);
    }

    #[test]
    fn summarize_zero_start_has_zero_pct() {
        let series = AggregationService::new().aggregate(
            &[v("A", 0.0, d(2024, 1, 1)), v("A", 10.0, d(2024, 2, 1))],
            ViewMode::Aggregated,
        );
        let summary = AggregationService::new().summarize(&series[0]).unwrap();
        assert_eq!(summary.change, 10.0);
        assert_eq!(summary.change_pct, 0.0);
    }

    #[test]
    fn summarize_empty_series_is_none() {
        let empty = networth_dashboard_core::models::chart::Series::new("x", vec![]);
        assert!(AggregationService::new().summarize(&empty).is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
// BreakdownService
// ═══════════════════════════════════════════════════════════════════

mod breakdown_service {
    use super::*;

    fn cv(class: AssetClass, amount: f64, date: NaiveDate) -> ClassifiedValue {
        ClassifiedValue {
            asset_class: class,
            amount,
            date,
        }
    }

    #[test]
    fn month_key_format() {
        assert_eq!(month_key(d(2024, 3, 9)), "2024-03");
        assert_eq!(month_key(d(2023, 12, 31)), "2023-12");
    }

    #[test]
    fn empty_input() {
        let b = BreakdownService::new().breakdown(&[], TimeWindow::All, d(2024, 6, 1));
        assert!(b.is_empty());
        assert!(b.series.is_empty());
    }

    #[test]
    fn groups_by_month_and_class_with_zero_fill() {
        let values = vec![
            cv(AssetClass::Equities, 100.0, d(2024, 1, 5)),
            cv(AssetClass::Equities, 50.0, d(2024, 1, 20)),
            cv(AssetClass::Cash, 10.0, d(2024, 2, 1)),
            cv(AssetClass::Equities, 120.0, d(2024, 2, 28)),
        ];
        let b = BreakdownService::new().breakdown(&values, TimeWindow::All, d(2024, 6, 1));
        assert_eq!(b.labels, vec!["2024-01", "2024-02"]);
        assert_eq!(b.series.len(), 2);
        assert_eq!(b.series[0].asset_class, AssetClass::Cash);
        assert_eq!(b.series[0].amounts, vec![0.0, 10.0]);
        assert_eq!(b.series[1].asset_class, AssetClass::Equities);
        assert_eq!(b.series[1].amounts, vec![150.0, 120.0]);
    }

    #[test]
    fn classes_sorted_by_name() {
        let values = vec![
            cv(AssetClass::RealEstate, 1.0, d(2024, 1, 1)),
            cv(AssetClass::Equities, 1.0, d(2024, 1, 1)),
            cv(AssetClass::Crypto, 1.0, d(2024, 1, 1)),
            cv(AssetClass::Cash, 1.0, d(2024, 1, 1)),
        ];
        let b = BreakdownService::new().breakdown(&values, TimeWindow::All, d(2024, 6, 1));
        let order: Vec<AssetClass> = b.series.iter().map(|s| s.asset_class).collect();
        assert_eq!(
            order,
            vec![
                AssetClass::Cash,
                AssetClass::Crypto,
                AssetClass::Equities,
                AssetClass::RealEstate,
            ]
        );
    }

    #[test]
    fn month_totals_match_raw_sums_in_window() {
        let today = d(2024, 6, 15);
        let values = vec![
            cv(AssetClass::Cash, 5.0, d(2023, 1, 1)), // outside 1y window
            cv(AssetClass::Cash, 7.0, d(2024, 4, 2)),
            cv(AssetClass::Crypto, -2.0, d(2024, 4, 30)),
            cv(AssetClass::Equities, 11.0, d(2024, 5, 1)),
            cv(AssetClass::Crypto, 3.5, d(2024, 5, 9)),
        ];
        let b = BreakdownService::new().breakdown(&values, TimeWindow::OneYear, today);
        let cutoff = TimeWindow::OneYear.cutoff(today).unwrap();
        for (i, month) in b.labels.iter().enumerate() {
            let raw: f64 = values
                .iter()
                .filter(|v| v.date >= cutoff && month_key(v.date) == *month)
                .map(|v| v.amount)
                .sum();
            assert_eq!(b.month_total(i), raw, "month {month}");
        }
        assert_eq!(b.labels, vec!["2024-04", "2024-05"]);
    }

    #[test]
    fn all_window_includes_epoch() {
        let epoch = d(1970, 1, 1);
        let b = BreakdownService::new().breakdown(
            &[cv(AssetClass::Cash, 1.0, epoch)],
            TimeWindow::All,
            d(2024, 6, 1),
        );
        assert_eq!(b.labels, vec!["1970-01"]);
    }

    #[test]
    fn three_month_window_excludes_four_months_ago() {
        let today = d(2024, 6, 15);
        let values = vec![
            cv(AssetClass::Cash, 1.0, d(2024, 2, 15)), // four months before
            cv(AssetClass::Cash, 2.0, d(2024, 3, 1)),  // exactly the cutoff
        ];
        let b = BreakdownService::new().breakdown(&values, TimeWindow::ThreeMonths, today);
        assert_eq!(b.labels, vec!["2024-03"]);
        assert_eq!(b.series[0].amounts, vec![2.0]);
    }

    #[test]
    fn class_outside_window_has_no_series() {
        let today = d(2024, 6, 15);
        let values = vec![
            cv(AssetClass::Crypto, 1.0, d(2020, 1, 1)),
            cv(AssetClass::Cash, 2.0, d(2024, 6, 1)),
        ];
        let b = BreakdownService::new().breakdown(&values, TimeWindow::SixMonths, today);
        assert_eq!(b.series.len(), 1);
        assert_eq!(b.series[0].asset_class, AssetClass::Cash);
    }
}

// ═══════════════════════════════════════════════════════════════════
// FetchService
// ═══════════════════════════════════════════════════════════════════

mod fetch_service {
    use super::*;

    #[tokio::test]
    async fn no_names_makes_no_calls() {
        let api = MockApi::with_values(vec![v("A", 1.0, d(2024, 1, 1))]);
        let values = FetchService::new().fetch_values(&api, &[], None).await.unwrap();
        assert!(values.is_empty());
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn one_call_per_account_concatenated_in_order() {
        let api = MockApi::with_values(vec![
            v("A", 1.0, d(2024, 1, 1)),
            v("B", 2.0, d(2023, 1, 1)),
            v("A", 3.0, d(2024, 2, 1)),
        ]);
        let names = vec!["B".to_string(), "A".to_string()];
        let values = FetchService::new().fetch_values(&api, &names, None).await.unwrap();
        assert_eq!(api.calls(), 2);
        let order: Vec<&str> = values.iter().map(|v| v.account_name.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "A"]);
    }

    #[tokio::test]
    async fn any_failure_fails_the_batch() {
        let api = MockApi::with_values(vec![v("A", 1.0, d(2024, 1, 1))]).failing_for("B");
        let names = vec!["A".to_string(), "B".to_string()];
        let err = FetchService::new()
            .fetch_values(&api, &names, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn passes_date_range_through() {
        let api = MockApi::default();
        let range = DateRange::new(Some("2024-01-01".into()), Some("2024-12-31".into()));
        FetchService::new()
            .fetch_values(&api, &["A".to_string()], Some(&range))
            .await
            .unwrap();
        assert_eq!(*api.ranges.lock().unwrap(), vec![Some(range)]);
    }

    #[tokio::test]
    async fn account_without_values_contributes_nothing() {
        let api = MockApi::with_values(vec![v("A", 1.0, d(2024, 1, 1))]);
        let names = vec!["A".to_string(), "Empty".to_string()];
        let values = FetchService::new().fetch_values(&api, &names, None).await.unwrap();
        assert_eq!(values.len(), 1);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RequestGenerations
// ═══════════════════════════════════════════════════════════════════

mod request_generations {
    use super::*;

    #[test]
    fn starts_at_zero() {
        assert_eq!(RequestGenerations::new().latest(), 0);
    }

    #[test]
    fn newest_ticket_is_current() {
        let generations = RequestGenerations::new();
        let first = generations.begin();
        assert!(generations.is_current(first));
        let second = generations.begin();
        assert!(!generations.is_current(first));
        assert!(generations.is_current(second));
        assert!(second > first);
        assert_eq!(second.value(), 2);
    }
}
