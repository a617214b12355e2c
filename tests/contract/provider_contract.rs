use std::sync::Arc;

use krxboard_core::adapters::warehouse::row_to_record;
use krxboard_core::{
    FeaturedProvider, HealthState, LoadRequest, Market, ProviderId, SampleProvider,
    SourceErrorKind, StockRowProvider, Warehouse, WarehouseConfig, WarehouseProvider,
};
use tempfile::TempDir;

struct ProviderCase {
    id: ProviderId,
    source: Arc<dyn StockRowProvider>,
    // Keeps the warehouse directory alive for the duration of the case.
    _home: Option<TempDir>,
}

fn seeded_warehouse() -> (Warehouse, TempDir) {
    let home = tempfile::tempdir().expect("tempdir");
    let warehouse = Warehouse::open(WarehouseConfig::at_home(home.path())).expect("warehouse");

    let rows = SampleProvider::with_seed(11)
        .load(&LoadRequest::new(50, None).expect("request"))
        .expect("sample rows");
    let records = rows.rows().iter().map(row_to_record).collect::<Vec<_>>();
    warehouse
        .ingest_stock_rows("sample", "request-contract", &records)
        .expect("ingest");

    (warehouse, home)
}

fn provider_cases() -> Vec<ProviderCase> {
    let (warehouse, home) = seeded_warehouse();
    vec![
        ProviderCase {
            id: ProviderId::Sample,
            source: Arc::new(SampleProvider::default()),
            _home: None,
        },
        ProviderCase {
            id: ProviderId::Featured,
            source: Arc::new(FeaturedProvider),
            _home: None,
        },
        ProviderCase {
            id: ProviderId::Warehouse,
            source: Arc::new(WarehouseProvider::new(warehouse)),
            _home: Some(home),
        },
    ]
}

#[test]
fn every_provider_reports_its_own_id() {
    for case in provider_cases() {
        assert_eq!(case.source.id(), case.id);
    }
}

#[test]
fn load_respects_limit_for_all_providers() {
    let request = LoadRequest::new(3, None).expect("request");

    for case in provider_cases() {
        let rows = case
            .source
            .load(&request)
            .unwrap_or_else(|error| panic!("provider '{}' load failed: {error}", case.id));
        assert_eq!(rows.len(), 3, "provider '{}': row count", case.id);
    }
}

#[test]
fn load_only_returns_requested_market() {
    for market in [Market::Kospi, Market::Kosdaq] {
        let request = LoadRequest::new(1_000, Some(market)).expect("request");

        for case in provider_cases() {
            let rows = case.source.load(&request).expect("load");
            assert!(
                rows.rows().iter().all(|row| row.market() == market),
                "provider '{}': market {market}",
                case.id
            );
        }
    }
}

#[test]
fn populated_providers_are_healthy() {
    for case in provider_cases() {
        assert_eq!(
            case.source.health().state,
            HealthState::Healthy,
            "provider '{}': health",
            case.id
        );
    }
}

#[test]
fn warehouse_rows_round_trip_from_sample() {
    let (warehouse, _home) = seeded_warehouse();
    let request = LoadRequest::new(1_000, None).expect("request");

    let stored = WarehouseProvider::new(warehouse).load(&request).expect("load");
    let generated = SampleProvider::with_seed(11).load(&request).expect("load");

    assert_eq!(stored, generated);
}

#[test]
fn empty_warehouse_is_degraded() {
    let home = tempfile::tempdir().expect("tempdir");
    let warehouse = Warehouse::open(WarehouseConfig::at_home(home.path())).expect("warehouse");

    let provider = WarehouseProvider::new(warehouse);

    assert_eq!(provider.health().state, HealthState::Degraded);
    let rows = provider
        .load(&LoadRequest::new(10, None).expect("request"))
        .expect("load");
    assert!(rows.is_empty());
}

#[test]
fn zero_limit_requests_are_rejected_before_reaching_a_provider() {
    let error = LoadRequest::new(0, None).expect_err("must fail");
    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
}
