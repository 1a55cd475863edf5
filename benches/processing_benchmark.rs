use ans_expenses::models::{OperatorEntry, OperatorRegistry, RawTransaction};
use ans_expenses::processors::{
    ChunkedConsolidator, ConsolidationReport, Enricher, GlobalReducer, RollupCalculator,
};
use ans_expenses::readers::TransactionBlock;
use ans_expenses::utils::{is_valid_tax_id, parse_locale_decimal};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const TAX_IDS: [&str; 4] = [
    "11222333000181",
    "11444777000161",
    "11.222.333/0001-81",
    "11222333000182",
];

// Registry of operators cycling through the checksum-valid tax ids
fn create_registry(operator_count: u32) -> OperatorRegistry {
    OperatorRegistry::from_entries((1..=operator_count).map(|id| {
        OperatorEntry::new(
            id,
            TAX_IDS[(id % 2) as usize].to_string(),
            format!("OPERADORA {}", id),
            "Medicina de Grupo".to_string(),
            if id % 3 == 0 { "MG" } else { "SP" }.to_string(),
        )
    }))
}

fn create_block(index: usize, rows: usize, operator_count: u32) -> TransactionBlock {
    let rows = (0..rows)
        .map(|i| {
            let month = (i % 12) + 1;
            let code = if i % 5 == 0 { "521000" } else { "41111" };
            RawTransaction::new(
                ((i as u32 % operator_count) + 1).to_string(),
                code,
                format!("2025-{:02}-15", month),
                format!("{},{:02}", i * 7, i % 100),
            )
        })
        .collect();

    TransactionBlock {
        index,
        rows,
        malformed: 0,
    }
}

fn benchmark_tax_id_validation(c: &mut Criterion) {
    c.bench_function("tax_id_validation", |b| {
        b.iter(|| {
            let valid = TAX_IDS
                .iter()
                .filter(|id| is_valid_tax_id(black_box(id)))
                .count();
            black_box(valid)
        })
    });
}

fn benchmark_decimal_parsing(c: &mut Criterion) {
    let values = ["100,50", "0", "-1234,56", "1e3", "98765432,10"];

    c.bench_function("locale_decimal_parsing", |b| {
        b.iter(|| {
            let parsed = values
                .iter()
                .filter_map(|v| parse_locale_decimal(black_box(v)).ok())
                .count();
            black_box(parsed)
        })
    });
}

fn benchmark_block_consolidation(c: &mut Criterion) {
    let registry = create_registry(200);
    let lookup = registry.lookup();
    let consolidator = ChunkedConsolidator::new(&lookup);
    let block = create_block(0, 10_000, 200);

    c.bench_function("block_consolidation", |b| {
        b.iter(|| {
            let mut report = ConsolidationReport::new();
            let partial = consolidator.consolidate_block(0, black_box(&block), &mut report);
            black_box(partial.len())
        })
    });
}

fn benchmark_varying_block_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("consolidation_by_block_size");
    let registry = create_registry(500);
    let lookup = registry.lookup();
    let total_rows = 50_000;

    for &block_size in &[1_000, 10_000, 50_000] {
        let blocks: Vec<TransactionBlock> = (0..total_rows / block_size)
            .map(|index| create_block(index, block_size, 500))
            .collect();

        group.bench_with_input(
            BenchmarkId::new("rows_per_block", block_size),
            &blocks,
            |b, blocks| {
                let consolidator = ChunkedConsolidator::new(&lookup);
                b.iter(|| {
                    let mut report = ConsolidationReport::new();
                    let mut reducer = GlobalReducer::new();
                    for block in blocks {
                        reducer
                            .merge(consolidator.consolidate_block(0, block, &mut report))
                            .unwrap();
                    }
                    black_box(reducer.finish().len())
                })
            },
        );
    }

    group.finish();
}

fn benchmark_enrichment_and_rollup(c: &mut Criterion) {
    let registry = create_registry(500);
    let lookup = registry.lookup();
    let consolidator = ChunkedConsolidator::new(&lookup);
    let mut report = ConsolidationReport::new();
    let consolidated = GlobalReducer::reduce(
        (0..5).map(|index| consolidator.consolidate_block(0, &create_block(index, 10_000, 500), &mut report)),
    )
    .unwrap();

    c.bench_function("enrichment_and_rollup", |b| {
        b.iter(|| {
            let enriched = Enricher::new(&registry).enrich(black_box(&consolidated));
            let rollup = RollupCalculator::new().rollup(&enriched).unwrap();
            black_box(rollup.len())
        })
    });
}

criterion_group!(
    benches,
    benchmark_tax_id_validation,
    benchmark_decimal_parsing,
    benchmark_block_consolidation,
    benchmark_varying_block_sizes,
    benchmark_enrichment_and_rollup
);
criterion_main!(benches);
