use criterion::{black_box, criterion_group, criterion_main, Criterion};
use video_catalog_sync::{Asset, Category, CategoryTables, CollectionResolver, ManualRuleEngine, NumberNormalizer, Organizer, TitleParser};

fn sample_titles() -> Vec<String> {
    (1..=200)
        .map(|i| match i % 4 {
            0 => format!("m{:02}-l{:02}-facing_and_pocketing.mp4", i / 10 + 1, i % 10 + 1),
            1 => format!("Module_{}_Lesson_{}_Contour Toolpath.MOV", i / 10 + 1, i % 10 + 1),
            2 => format!("Lathe Part {} Threading OD.mp4", i),
            _ => format!("5-axis swarf demo {}.mkv", i),
        })
        .collect()
}

fn bench_title_parser(c: &mut Criterion) {
    let parser = TitleParser::new(ManualRuleEngine::empty()).unwrap();
    let assets: Vec<Asset> = sample_titles()
        .into_iter()
        .enumerate()
        .map(|(i, title)| Asset::new(format!("guid-{}", i), title, 60))
        .collect();

    c.bench_function("parse_200_titles", |b| {
        b.iter(|| {
            for asset in &assets {
                black_box(parser.parse(black_box(asset), None));
            }
        })
    });

    c.bench_function("detect_category", |b| {
        b.iter(|| {
            black_box(parser.detect_category("Multi Axis Part 3 - simultaneous roughing"));
            black_box(parser.detect_category("Turning the OD profile"));
            black_box(parser.detect_category("Shop safety"));
        })
    });

    let descriptors: Vec<_> = assets.iter().map(|a| parser.parse(a, Some(Category::Mill))).collect();
    let organizer = Organizer::new(true, 10);
    c.bench_function("organize_200_descriptors", |b| {
        b.iter(|| black_box(organizer.organize(descriptors.clone())))
    });
}

fn bench_normalizer(c: &mut Criterion) {
    let normalizer = NumberNormalizer::new().unwrap();
    let titles: Vec<String> = (1..=100).map(|i| format!("Lesson {} - Video 0{}", i, i % 9 + 1)).collect();

    c.bench_function("normalize_batch_100", |b| {
        b.iter(|| black_box(normalizer.normalize_batch(black_box(&titles))))
    });
}

fn bench_resolver(c: &mut Criterion) {
    let tables = CategoryTables {
        collection_ids: Default::default(),
        collection_names: CategoryTables::default_names(),
    };
    let parser = TitleParser::new(ManualRuleEngine::empty()).unwrap();
    let resolver = CollectionResolver::new(&tables, parser);

    c.bench_function("resolve_collection_partial_name", |b| {
        b.iter(|| black_box(resolver.resolve_category("unknown-id", black_box("Advanced Mill 3D Surfacing"), None)))
    });
}

criterion_group!(benches, bench_title_parser, bench_normalizer, bench_resolver);
criterion_main!(benches);
