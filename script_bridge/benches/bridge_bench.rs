use console_api::api_registry;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use script_bridge::{extract_outline, marshal, unpack_color_key, CallArgs, ScriptValue};

fn bench_marshal(c: &mut Criterion) {
    let registry = api_registry();
    let mut group = c.benchmark_group("marshal");

    let spr = registry.get("spr").expect("spr registered");
    let positional = vec![
        ScriptValue::Int(17),
        ScriptValue::Int(64),
        ScriptValue::Int(32),
        ScriptValue::List(vec![ScriptValue::Int(0), ScriptValue::Int(5)]),
        ScriptValue::Int(2),
    ];
    group.bench_function("spr_positional", |b| {
        b.iter(|| marshal(spr, CallArgs::positional(black_box(&positional))))
    });

    let btnp = registry.get("btnp").expect("btnp registered");
    let ids = vec![ScriptValue::Int(4)];
    let keywords = vec![("period".to_string(), ScriptValue::Int(6))];
    group.bench_function("btnp_keywords", |b| {
        b.iter(|| marshal(btnp, CallArgs::with_keywords(black_box(&ids), &keywords)))
    });
    group.finish();

    let palette = ScriptValue::Tuple((0..16).map(ScriptValue::Int).collect());
    c.bench_function("unpack_color_key_full_palette", |b| {
        b.iter(|| unpack_color_key(black_box(&palette)))
    });
}

fn synthetic_source(functions: usize) -> String {
    let mut source = String::new();
    for index in 0..functions {
        source.push_str(&format!(
            "# helper {index}\ndef update_{index}(x, y):\n    return (x * 8 + y, 0, 0)\n\n"
        ));
        if index % 10 == 0 {
            source.push_str(&format!("class Actor{index}:\n    '''docs'''\n    pass\n"));
        }
    }
    source
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");
    for functions in [10usize, 100, 1000] {
        let source = synthetic_source(functions);
        group.bench_with_input(
            BenchmarkId::from_parameter(functions),
            &source,
            |b, source| b.iter(|| extract_outline(black_box(source))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_marshal, bench_outline);
criterion_main!(benches);
